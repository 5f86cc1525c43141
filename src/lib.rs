//! Handles for browser-style background workers
//!
//! This crate wraps a platform worker primitive (a Web Worker, a runtime
//! isolate, ...) behind a [`WorkerHandle`] with a fixed lifecycle and
//! ordered message-callback dispatch. The platform side is supplied through
//! the [`ChannelFactory`] and [`WorkerChannel`] traits.

mod callback;
mod channel;
mod error;
mod event;
mod log;
mod options;
mod script;
mod worker;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use callback::{CallbackResult, MessageLog, OnMessage};
pub use channel::{ChannelFactory, ChannelInit, EventSink, WorkerChannel, WorkerId, WorkerState};
pub use error::{BoxError, CallbackError, CallbackFailure, ChannelError, Result, WorkerError};
pub use event::{MessageEvent, Payload};
pub use log::{LogEvent, LogLevel, LogSender};
pub use options::{FailurePolicy, WorkerOptions};
pub use script::Script;
pub use worker::WorkerHandle;
