//! In-memory channel fakes
//!
//! These stand in for a platform worker so handles can be exercised
//! anywhere. The echo channel answers every posted message with a
//! [`MessageEvent`] carrying the same payload (or a transformed one),
//! delivered through the handle's receive slot.
//!
//! ```ignore
//! use webworker_core::testing::EchoFactory;
//! use webworker_core::WorkerHandle;
//!
//! let factory = EchoFactory::new();
//! let mut worker = WorkerHandle::new(&factory, "echo", vec![])?;
//! worker.start()?;
//! worker.send("ping")?;
//! worker.process_pending()?;
//! ```

use crate::error::ChannelError;
use crate::log::{LogEvent, LogLevel, LogSender};
use crate::{
    ChannelFactory, ChannelInit, EventSink, MessageEvent, Payload, Script, WorkerChannel, WorkerId,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Transform = Rc<dyn Fn(Payload) -> Payload>;

#[derive(Default)]
struct EchoState {
    script: Script,
    started: bool,
    terminated: bool,
    fail_start: bool,
    fail_post: bool,
    posted: Vec<Payload>,
    undelivered: Vec<MessageEvent>,
    dropped_logs: Vec<LogEvent>,
    sink: Option<EventSink>,
    log_tx: Option<LogSender>,
    next_event_id: u64,
}

impl EchoState {
    /// Events with no receive slot, or whose handle is gone, are kept in
    /// `undelivered`.
    fn deliver(&mut self, event: MessageEvent) -> bool {
        let delivered = match &self.sink {
            Some(sink) => sink.deliver(event.clone()),
            None => false,
        };
        if !delivered {
            self.undelivered.push(event);
        }
        delivered
    }

    fn log(&mut self, level: LogLevel, message: &str) {
        if let Some(tx) = &self.log_tx {
            if let Err(e) = tx.send(LogEvent::new(level, message)) {
                self.dropped_logs.push(e.0);
            }
        }
    }
}

/// Inspection side of an [`EchoChannel`], kept by tests after the channel
/// has moved into a handle
#[derive(Clone)]
pub struct EchoProbe(Rc<RefCell<EchoState>>);

impl EchoProbe {
    /// Script the channel was created with
    pub fn script(&self) -> Script {
        self.0.borrow().script.clone()
    }

    pub fn is_started(&self) -> bool {
        self.0.borrow().started
    }

    pub fn is_terminated(&self) -> bool {
        self.0.borrow().terminated
    }

    /// Payloads posted to the worker, in order
    pub fn posted(&self) -> Vec<Payload> {
        self.0.borrow().posted.clone()
    }

    /// Check if a receive slot has been assigned
    pub fn has_receiver(&self) -> bool {
        self.0.borrow().sink.is_some()
    }

    /// Push an event through the receive slot as if the worker sent it
    ///
    /// Returns false if no slot is assigned or the handle is gone; the
    /// event is then kept in [`undelivered`](Self::undelivered).
    pub fn emit(&self, event: MessageEvent) -> bool {
        self.0.borrow_mut().deliver(event)
    }

    /// Replies and emitted events that never reached a handle
    pub fn undelivered(&self) -> Vec<MessageEvent> {
        self.0.borrow().undelivered.clone()
    }

    /// Emit console output as if the worker script logged it
    pub fn console(&self, level: LogLevel, message: &str) {
        self.0.borrow_mut().log(level, message);
    }

    /// Console output whose receiver was gone
    pub fn dropped_logs(&self) -> Vec<LogEvent> {
        self.0.borrow().dropped_logs.clone()
    }
}

/// Channel that echoes every posted message back to its handle
pub struct EchoChannel {
    state: Rc<RefCell<EchoState>>,
    transform: Option<Transform>,
}

impl WorkerChannel for EchoChannel {
    fn start(&mut self) -> Result<(), ChannelError> {
        let mut state = self.state.borrow_mut();
        if state.fail_start {
            return Err(ChannelError::new("worker script failed to load"));
        }
        state.started = true;
        state.log(LogLevel::Log, "worker created");
        Ok(())
    }

    fn post_message(&mut self, message: Payload) -> Result<(), ChannelError> {
        let mut state = self.state.borrow_mut();
        if state.terminated {
            return Err(ChannelError::new("worker terminated"));
        }
        if state.fail_post {
            return Err(ChannelError::new("message could not be cloned"));
        }
        state.posted.push(message.clone());

        let data = match &self.transform {
            Some(transform) => transform(message),
            None => message,
        };
        state.next_event_id += 1;
        let event = MessageEvent::new(data).with_last_event_id(state.next_event_id.to_string());

        state.deliver(event);
        Ok(())
    }

    fn terminate(&mut self) {
        let mut state = self.state.borrow_mut();
        state.terminated = true;
        state.log(LogLevel::Debug, "worker terminated");
    }

    fn set_on_receive(&mut self, sink: EventSink) {
        self.state.borrow_mut().sink = Some(sink);
    }

    fn set_log_sender(&mut self, log_tx: LogSender) {
        self.state.borrow_mut().log_tx = Some(log_tx);
    }
}

/// Factory producing [`EchoChannel`]s with sequential ids (`00000001`, ...)
#[derive(Default)]
pub struct EchoFactory {
    next_id: Cell<u32>,
    probes: RefCell<Vec<EchoProbe>>,
    transform: Option<Transform>,
    fail_start: bool,
    fail_post: bool,
}

impl EchoFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `f(message)` instead of the message itself
    pub fn with_transform<F>(f: F) -> Self
    where
        F: Fn(Payload) -> Payload + 'static,
    {
        Self {
            transform: Some(Rc::new(f)),
            ..Self::default()
        }
    }

    /// Channels whose start primitive always fails
    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    /// Channels that start but refuse every posted message
    pub fn failing_post() -> Self {
        Self {
            fail_post: true,
            ..Self::default()
        }
    }

    /// Number of channels created so far
    pub fn created(&self) -> usize {
        self.probes.borrow().len()
    }

    pub fn probe(&self, index: usize) -> Option<EchoProbe> {
        self.probes.borrow().get(index).cloned()
    }

    pub fn last_probe(&self) -> Option<EchoProbe> {
        self.probes.borrow().last().cloned()
    }
}

impl ChannelFactory for EchoFactory {
    fn create(&self, script: &Script) -> Result<ChannelInit, ChannelError> {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);

        let state = Rc::new(RefCell::new(EchoState {
            script: script.clone(),
            fail_start: self.fail_start,
            fail_post: self.fail_post,
            ..EchoState::default()
        }));
        self.probes.borrow_mut().push(EchoProbe(state.clone()));

        let channel = EchoChannel {
            state,
            transform: self.transform.clone(),
        };
        Ok(ChannelInit::ready(channel, WorkerId::new(format!("{:08}", n))))
    }
}

/// Factory that refuses every script
pub struct FailingFactory {
    reason: String,
}

impl FailingFactory {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ChannelFactory for FailingFactory {
    fn create(&self, _script: &Script) -> Result<ChannelInit, ChannelError> {
        Err(ChannelError::new(self.reason.clone()))
    }
}
