//! Unbounded FIFO work queue.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

/// Unbounded, insertion-ordered queue of work items.
///
/// `push` is non-blocking and safe from any thread, including host event
/// callbacks. Duplicate entries are permitted; consumers see at-least-once
/// semantics. Ownership of an item transfers to the caller on pop.
#[derive(Debug, Default)]
pub struct WorkQueue<T> {
    inner: Mutex<VecDeque<T>>,
    notify: Notify,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
        }
    }

    /// Append an item. O(1), never blocks.
    pub fn push(&self, item: T) {
        self.inner.lock().unwrap().push_back(item);
        self.notify.notify_one();
    }

    /// Remove the oldest item, or `None` when empty.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().unwrap().pop_front()
    }

    /// Remove the oldest item, waiting until one is available.
    pub async fn pop(&self) -> T {
        loop {
            // Register interest before re-checking so a concurrent push
            // between the check and the await cannot be missed.
            let notified = self.notify.notified();
            if let Some(item) = self.try_pop() {
                // Hand a consumed-but-unused wakeup to the next waiter.
                self.notify.notify_one();
                return item;
            }
            notified.await;
        }
    }

    /// Remove and return everything currently queued, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.inner.lock().unwrap().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
