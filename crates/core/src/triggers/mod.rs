//! Catch-up trigger layer: host lifecycle events feeding the work queues.

mod catchup;
mod types;

pub use catchup::CatchupTriggers;
pub use types::LibraryEvent;
