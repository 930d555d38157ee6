//! Ordered observer registry with per-subscriber fault isolation.
//!
//! Subscribers run synchronously, in registration order, and all of them see
//! the same value. A subscriber that returns an error or panics is logged and
//! skipped; the rest still run and `notify` itself never fails.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Error type subscriber callbacks may return.
pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

type Callback<T> = Box<dyn Fn(&T) -> Result<(), SubscriberError> + Send>;

/// Handle returned by [`ChangeNotifier::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

pub struct ChangeNotifier<T> {
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
    next_id: u64,
}

impl<T> ChangeNotifier<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&T) -> Result<(), SubscriberError> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Deliver `value` to every subscriber. Returns how many succeeded.
    pub fn notify(&self, value: &T) -> usize {
        let mut delivered = 0;
        for (id, callback) in &self.subscribers {
            match catch_unwind(AssertUnwindSafe(|| callback(value))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(subscriber = %id, error = %e, "subscriber failed");
                }
                Err(_) => {
                    tracing::error!(subscriber = %id, "subscriber panicked");
                }
            }
        }
        delivered
    }

    /// Drop every subscriber.
    pub fn destroy(&mut self) {
        self.subscribers.clear();
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<T> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
