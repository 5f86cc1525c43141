//! Worker handle: lifecycle and ordered message dispatch over a channel.

use crate::callback::{MessageLog, OnMessage};
use crate::error::{CallbackError, CallbackFailure, ChannelError, Result, WorkerError};
use crate::options::{FailurePolicy, WorkerOptions};
use crate::{
    ChannelFactory, ChannelInit, EventSink, MessageEvent, Payload, Script, WorkerChannel, WorkerId,
    WorkerState,
};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Handle to a platform worker
///
/// Owns the channel created for its script and dispatches every event the
/// channel delivers: the event is recorded first, then each registered
/// callback runs in registration order.
///
/// Events are queued by the channel and dispatched on the owner's turn
/// ([`process_pending`](Self::process_pending) or
/// [`dispatch_next`](Self::dispatch_next)). The handle is not `Send`.
pub struct WorkerHandle {
    script: Script,
    channel: Box<dyn WorkerChannel>,
    id: WorkerId,
    state: WorkerState,
    on_message_actions: Vec<OnMessage>,
    messages: MessageLog,
    options: WorkerOptions,
    sink: EventSink,
    events: mpsc::UnboundedReceiver<MessageEvent>,
}

impl WorkerHandle {
    /// Create a worker for `script` using a channel from `factory`
    ///
    /// The channel is created but not started.
    pub fn new<F>(
        factory: &F,
        script: impl Into<Script>,
        on_message_actions: Vec<OnMessage>,
    ) -> Result<Self>
    where
        F: ChannelFactory + ?Sized,
    {
        Self::with_options(factory, script, on_message_actions, WorkerOptions::default())
    }

    /// Create a worker with explicit options
    ///
    /// A channel the factory reports in any state other than `Ready` is
    /// terminated and rejected with [`WorkerError::ChannelCreation`].
    pub fn with_options<F>(
        factory: &F,
        script: impl Into<Script>,
        on_message_actions: Vec<OnMessage>,
        options: WorkerOptions,
    ) -> Result<Self>
    where
        F: ChannelFactory + ?Sized,
    {
        let script = script.into();
        let ChannelInit {
            mut channel,
            id,
            state,
        } = factory.create(&script).map_err(|e| {
            warn!(name = ?options.name, error = %e, "failed to create worker channel");
            WorkerError::ChannelCreation(e)
        })?;

        // The receive slot is only installed by start(), which needs Ready.
        if state != WorkerState::Ready {
            channel.terminate();
            warn!(worker_id = %id, %state, "factory returned a worker that is not ready");
            return Err(WorkerError::ChannelCreation(ChannelError::new(format!(
                "worker {id} was created {state}, expected ready"
            ))));
        }

        let (tx, events) = mpsc::unbounded_channel();

        debug!(
            worker_id = %id,
            name = ?options.name,
            callbacks = on_message_actions.len(),
            "worker created"
        );

        Ok(Self {
            script,
            channel,
            id,
            state: WorkerState::Ready,
            on_message_actions,
            messages: MessageLog::default(),
            options,
            sink: EventSink::new(tx),
            events,
        })
    }

    /// Start the worker
    ///
    /// Fails with [`WorkerError::InvalidState`] unless the worker is ready.
    /// If the channel refuses to start, the state is left unchanged.
    pub fn start(&mut self) -> Result<()> {
        if self.state != WorkerState::Ready {
            return Err(self.invalid_state("start"));
        }

        // Receive slot goes in first so events emitted during start are kept.
        self.channel.set_on_receive(self.sink.clone());
        if let Some(log_tx) = &self.options.log_tx {
            self.channel.set_log_sender(log_tx.clone());
        }

        self.channel.start().map_err(|e| {
            warn!(worker_id = %self.id, error = %e, "worker failed to start");
            WorkerError::Channel(e)
        })?;

        self.state = WorkerState::Running;
        debug!(worker_id = %self.id, "worker started");
        Ok(())
    }

    /// Post a message to the running worker
    ///
    /// Returns immediately; replies arrive as events.
    pub fn send(&mut self, message: impl Into<Payload>) -> Result<()> {
        if self.state != WorkerState::Running {
            return Err(self.invalid_state("send to"));
        }

        self.channel
            .post_message(message.into())
            .map_err(WorkerError::Channel)?;

        trace!(worker_id = %self.id, "message posted");
        Ok(())
    }

    /// Terminate the worker. Calling it again is a no-op.
    ///
    /// Events the channel queued before termination are still dispatched.
    pub fn kill(&mut self) {
        if self.state == WorkerState::Terminated {
            return;
        }

        self.channel.terminate();
        self.state = WorkerState::Terminated;
        debug!(worker_id = %self.id, "worker terminated");
    }

    /// Replace the recorded script
    ///
    /// The channel keeps running the script it was created with.
    pub fn set_script(&mut self, script: impl Into<Script>) {
        self.script = script.into();
        debug!(worker_id = %self.id, state = %self.state, "worker script record updated");
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.options.name.as_deref()
    }

    /// Every event received so far, oldest first
    pub fn messages(&self) -> Vec<MessageEvent> {
        self.messages.snapshot()
    }

    /// Shared view of the received events
    pub fn message_log(&self) -> MessageLog {
        self.messages.clone()
    }

    /// User-registered callbacks in registration order
    pub fn on_message_actions(&self) -> &[OnMessage] {
        &self.on_message_actions
    }

    /// Append a callback; it runs after all previously registered ones
    pub fn add_callback(&mut self, callback: OnMessage) {
        self.on_message_actions.push(callback);
    }

    /// Run one dispatch pass for `event`
    ///
    /// The event is recorded before any callback runs, whatever the state.
    /// Callback failures are handled per the configured [`FailurePolicy`].
    pub fn dispatch(&self, event: MessageEvent) -> std::result::Result<(), CallbackError> {
        self.messages.push(event.clone());
        trace!(
            worker_id = %self.id,
            state = %self.state,
            received = self.messages.len(),
            "dispatching message"
        );

        let mut failures = Vec::new();
        for (index, action) in self.on_message_actions.iter().enumerate() {
            if let Err(e) = action.call(&event) {
                warn!(worker_id = %self.id, index, error = %e, "message callback failed");
                failures.push(CallbackFailure {
                    index,
                    message: e.to_string(),
                });

                if self.options.failure_policy == FailurePolicy::FailFast {
                    break;
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CallbackError::new(failures))
        }
    }

    /// Dispatch every event queued by the channel, in delivery order
    ///
    /// Returns the number of events dispatched. Stops at the first event
    /// whose callbacks fail and returns that error instead, so the count is
    /// not reported; the failing event and those before it are already in
    /// [`message_log`](Self::message_log). Later events stay queued for the
    /// next call.
    pub fn process_pending(&mut self) -> Result<usize> {
        let mut dispatched = 0;
        while let Ok(event) = self.events.try_recv() {
            dispatched += 1;
            self.dispatch(event)?;
        }
        Ok(dispatched)
    }

    /// Wait for the next queued event and dispatch it
    ///
    /// Returns `Ok(false)` without waiting if the worker was never started,
    /// or if it is terminated and nothing is queued.
    pub async fn dispatch_next(&mut self) -> Result<bool> {
        let event = match self.state {
            WorkerState::Ready => return Ok(false),
            WorkerState::Terminated => match self.events.try_recv() {
                Ok(event) => event,
                Err(_) => return Ok(false),
            },
            WorkerState::Running => match self.events.recv().await {
                Some(event) => event,
                None => return Ok(false),
            },
        };

        self.dispatch(event)?;
        Ok(true)
    }

    fn invalid_state(&self, operation: &'static str) -> WorkerError {
        debug!(worker_id = %self.id, state = %self.state, operation, "rejected operation");
        WorkerError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if self.state != WorkerState::Terminated {
            self.channel.terminate();
            debug!(worker_id = %self.id, "worker terminated on drop");
        }
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("id", &self.id)
            .field("name", &self.options.name)
            .field("state", &self.state)
            .field("callbacks", &self.on_message_actions.len())
            .field("received", &self.messages.len())
            .finish()
    }
}
