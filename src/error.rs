//! Error types for worker handles.

use thiserror::Error;

use crate::WorkerState;

/// Result type for worker handle operations.
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Errors surfaced by [`WorkerHandle`](crate::WorkerHandle) operations.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Operation is not allowed in the handle's current state.
    #[error("cannot {operation} a worker that is {state}")]
    InvalidState {
        operation: &'static str,
        state: WorkerState,
    },

    /// One or more message callbacks failed during a dispatch pass.
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// The channel factory could not produce a channel.
    #[error("failed to create worker channel: {0}")]
    ChannelCreation(ChannelError),

    /// A channel primitive (start, post) failed.
    #[error("worker channel error: {0}")]
    Channel(ChannelError),
}

impl WorkerError {
    /// Returns true if this is a state-contract violation
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    /// Returns true if this reports failed message callbacks
    pub fn is_callback_error(&self) -> bool {
        matches!(self, Self::Callback(_))
    }

    /// Returns true if the underlying channel failed
    pub fn is_channel_error(&self) -> bool {
        matches!(self, Self::ChannelCreation(_) | Self::Channel(_))
    }

    /// Get the callback failures if this is a callback error
    pub fn callback_failures(&self) -> Option<&[CallbackFailure]> {
        match self {
            Self::Callback(e) => Some(e.failures()),
            _ => None,
        }
    }
}

/// Error reported by a platform channel or channel factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ChannelError(pub String);

impl ChannelError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Boxed error returned by a failing message callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single callback failure within a dispatch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFailure {
    /// Position of the callback in registration order
    pub index: usize,
    pub message: String,
}

impl std::fmt::Display for CallbackFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "callback #{}: {}", self.index, self.message)
    }
}

/// All callback failures collected while dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} message callback(s) failed: {}", failures.len(), join_failures(failures))]
pub struct CallbackError {
    failures: Vec<CallbackFailure>,
}

impl CallbackError {
    pub(crate) fn new(failures: Vec<CallbackFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[CallbackFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<CallbackFailure> {
        self.failures
    }
}

fn join_failures(failures: &[CallbackFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
