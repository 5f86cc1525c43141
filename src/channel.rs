//! Worker channel capabilities
//!
//! A channel is the platform's native background worker (a browser Web
//! Worker, a runtime isolate, ...). This crate never implements one; it only
//! drives whatever a [`ChannelFactory`] hands it.
//!
//! Channels deliver events through an [`EventSink`], the sending half of the
//! handle's dispatch queue. The sink is `Send`, so a channel may deliver from
//! any thread; the handle dispatches on its owning thread.

use crate::error::ChannelError;
use crate::log::LogSender;
use crate::{MessageEvent, Payload, Script};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Opaque worker identifier, unique per factory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a worker
///
/// Only moves forward: `Ready -> Running -> Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Ready,
    Running,
    Terminated,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Terminated => "terminated",
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receive slot target for a channel
///
/// Cloning is cheap. Delivery never blocks.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<MessageEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<MessageEvent>) -> Self {
        Self { tx }
    }

    /// Queue an event for dispatch on the owning handle
    ///
    /// Returns false if the handle is gone.
    pub fn deliver(&self, event: MessageEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Check if the owning handle has been dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Platform worker primitive driven by a [`WorkerHandle`](crate::WorkerHandle)
///
/// The handle owns the channel exclusively and calls these methods from its
/// owning thread only.
pub trait WorkerChannel {
    /// Begin executing the script
    fn start(&mut self) -> Result<(), ChannelError>;

    /// Post a message to the running worker (must not block)
    fn post_message(&mut self, message: Payload) -> Result<(), ChannelError>;

    /// Stop the worker as soon as possible
    ///
    /// Events already queued on the sink may still arrive.
    fn terminate(&mut self);

    /// Assign the receive slot. Replaces any previous sink.
    fn set_on_receive(&mut self, sink: EventSink);

    /// Forward worker console output to `log_tx`
    ///
    /// Default: console output is discarded.
    fn set_log_sender(&mut self, _log_tx: LogSender) {}
}

/// What a factory reports for a freshly created channel
pub struct ChannelInit {
    pub channel: Box<dyn WorkerChannel>,
    pub id: WorkerId,
    pub state: WorkerState,
}

impl ChannelInit {
    /// A channel in the `Ready` state
    pub fn ready(channel: impl WorkerChannel + 'static, id: WorkerId) -> Self {
        Self {
            channel: Box::new(channel),
            id,
            state: WorkerState::Ready,
        }
    }
}

impl std::fmt::Debug for ChannelInit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelInit")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Creates platform channels for scripts
///
/// Passed explicitly to [`WorkerHandle::new`](crate::WorkerHandle::new).
/// Any `Fn(&Script) -> Result<ChannelInit, ChannelError>` is a factory.
pub trait ChannelFactory {
    fn create(&self, script: &Script) -> Result<ChannelInit, ChannelError>;
}

impl<F> ChannelFactory for F
where
    F: Fn(&Script) -> Result<ChannelInit, ChannelError>,
{
    fn create(&self, script: &Script) -> Result<ChannelInit, ChannelError> {
        self(script)
    }
}
