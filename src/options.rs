use crate::log::LogSender;

/// What a dispatch pass does when a message callback fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Run every callback, then report all failures together
    #[default]
    CollectAll,
    /// Stop at the first failing callback and report it alone
    FailFast,
}

/// Worker handle configuration
#[derive(Debug, Clone, Default)]
pub struct WorkerOptions {
    /// Label attached to log records (default: none)
    pub name: Option<String>,
    /// Callback failure handling (default: collect all)
    pub failure_policy: FailurePolicy,
    /// Destination for worker console output (default: discarded)
    pub log_tx: Option<LogSender>,
}

impl WorkerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn log_tx(mut self, log_tx: LogSender) -> Self {
        self.log_tx = Some(log_tx);
        self
    }
}
