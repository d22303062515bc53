//! Work queues and the concurrency admission gate.

mod gate;
mod work_queue;

pub use gate::{ConcurrencyGate, GateCancelled, GatePermit};
pub use work_queue::WorkQueue;
