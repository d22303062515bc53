//! Dispatcher types.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Channel end receiving fractional progress reports (0.0 to 100.0).
pub type ProgressSender = mpsc::UnboundedSender<f64>;

/// Summary of one batch run.
///
/// The batch itself has no failure state; item-level outcomes surface
/// here as counters and otherwise only through logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Items in the batch.
    pub total: usize,
    /// Items that finished, whatever the outcome.
    pub completed: usize,
    /// Items extracted successfully.
    pub succeeded: usize,
    /// Items that failed; each failure was contained to its item.
    pub failed: usize,
    /// Whether cancellation stopped dispatch before the end of the batch.
    pub cancelled: bool,
}

/// Current dispatcher status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatcherStatus {
    /// Whether the live queue drain loop is running.
    pub running: bool,
    /// Items waiting for extraction.
    pub extract_queue_depth: usize,
    /// Items waiting for intro/credits analysis.
    pub analysis_queue_depth: usize,
    /// Gate capacity.
    pub gate_capacity: usize,
    /// Permits currently held.
    pub gate_held: usize,
}
