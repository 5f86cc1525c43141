use crate::MessageEvent;
use crate::error::BoxError;
use std::cell::RefCell;
use std::rc::Rc;

/// Outcome of a message callback
pub type CallbackResult = Result<(), BoxError>;

/// Message callback registered on a [`WorkerHandle`](crate::WorkerHandle)
///
/// Clones share the same function; equality is identity, so a clone of a
/// registered callback compares equal to it.
#[derive(Clone)]
pub struct OnMessage(Rc<dyn Fn(&MessageEvent) -> CallbackResult>);

impl OnMessage {
    /// Wrap a fallible callback
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&MessageEvent) -> CallbackResult + 'static,
    {
        Self(Rc::new(f))
    }

    /// Wrap a callback that cannot fail
    pub fn infallible<F>(f: F) -> Self
    where
        F: Fn(&MessageEvent) + 'static,
    {
        Self::new(move |event| {
            f(event);
            Ok(())
        })
    }

    pub fn call(&self, event: &MessageEvent) -> CallbackResult {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for OnMessage {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for OnMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OnMessage({:p})", Rc::as_ptr(&self.0))
    }
}

/// Append-only record of every event a handle has received
///
/// Shared by clone: callbacks may hold one to inspect the history while a
/// dispatch pass is running.
#[derive(Debug, Clone, Default)]
pub struct MessageLog(Rc<RefCell<Vec<MessageEvent>>>);

impl MessageLog {
    pub(crate) fn push(&self, event: MessageEvent) {
        self.0.borrow_mut().push(event);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Most recently received event
    pub fn last(&self) -> Option<MessageEvent> {
        self.0.borrow().last().cloned()
    }

    /// Copy of the full history, oldest first
    pub fn snapshot(&self) -> Vec<MessageEvent> {
        self.0.borrow().clone()
    }
}
