//! Resizable concurrency admission gate.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Returned when a gate acquisition is cancelled before a permit frees up.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("gate acquisition cancelled")]
pub struct GateCancelled;

#[derive(Debug)]
struct GateState {
    capacity: usize,
    held: usize,
}

/// Counting admission control with a capacity that can change at runtime.
///
/// Unlike `tokio::sync::Semaphore`, capacity can shrink: already-held
/// permits are never revoked, new admissions simply wait until holders
/// drain below the new capacity. Admission requires `held < capacity`.
#[derive(Debug)]
pub struct ConcurrencyGate {
    state: Mutex<GateState>,
    notify: Notify,
}

impl ConcurrencyGate {
    /// Create a gate admitting up to `capacity` concurrent holders.
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(GateState { capacity, held: 0 }),
            notify: Notify::new(),
        })
    }

    /// Wait for a permit, or fail with [`GateCancelled`] when the token
    /// fires first. A cancelled acquisition consumes nothing.
    pub async fn acquire(
        self: &Arc<Self>,
        cancel: &CancellationToken,
    ) -> Result<GatePermit, GateCancelled> {
        loop {
            // Register interest before checking so a release between the
            // check and the await cannot be missed.
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().unwrap();
                if state.held < state.capacity {
                    state.held += 1;
                    return Ok(GatePermit {
                        gate: Arc::clone(self),
                    });
                }
            }
            tokio::select! {
                _ = cancel.cancelled() => {
                    // The dropped `notified` may have swallowed a release
                    // wakeup meant for another waiter. Pass it on.
                    self.notify.notify_one();
                    return Err(GateCancelled);
                }
                _ = notified => {}
            }
        }
    }

    /// Change capacity. Growth admits waiters immediately; shrink lets
    /// effective concurrency drain down as holders release.
    pub fn resize(&self, new_capacity: usize) {
        let grew = {
            let mut state = self.state.lock().unwrap();
            let grew = new_capacity > state.capacity;
            debug!(
                "Gate capacity {} -> {} ({} held)",
                state.capacity, new_capacity, state.held
            );
            state.capacity = new_capacity;
            grew
        };
        if grew {
            self.notify.notify_waiters();
        }
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().unwrap().capacity
    }

    /// Number of permits currently held.
    pub fn held(&self) -> usize {
        self.state.lock().unwrap().held
    }

    fn release(&self) {
        let mut state = self.state.lock().unwrap();
        debug_assert!(state.held > 0, "release without a held permit");
        state.held = state.held.saturating_sub(1);
        drop(state);
        self.notify.notify_one();
    }
}

/// A held admission slot. Releasing is dropping.
#[derive(Debug)]
pub struct GatePermit {
    gate: Arc<ConcurrencyGate>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}
