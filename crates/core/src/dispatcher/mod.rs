//! Extraction worker dispatcher.
//!
//! Converts scheduled batches and the live extraction queue into completed
//! extraction operations: gate-bounded concurrency, per-item failure
//! isolation, atomic progress accounting, and conditional chaining into
//! the analysis queue.

mod runner;
mod types;

pub use runner::ExtractionDispatcher;
pub use types::{BatchReport, DispatcherStatus, ProgressSender};
