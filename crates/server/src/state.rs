use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use libretto_core::{
    BatchReport, CatchupTriggers, Config, DispatcherStatus, ExtractionDispatcher, ModeResolver,
    SanitizedConfig, WorkItem, WorkQueue,
};

/// One extraction batch run tracked by the API.
pub struct ActiveRun {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Latest fractional progress (0.0 to 100.0).
    pub progress: RwLock<f64>,
    /// Final report, set once the run finishes.
    pub report: RwLock<Option<BatchReport>>,
    pub cancel: CancellationToken,
}

impl ActiveRun {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            progress: RwLock::new(0.0),
            report: RwLock::new(None),
            cancel,
        }
    }

    pub fn is_done(&self) -> bool {
        self.report.read().unwrap().is_some()
    }
}

/// Shared application state
pub struct AppState {
    config: Config,
    pub resolver: Arc<ModeResolver>,
    pub dispatcher: Arc<ExtractionDispatcher>,
    pub triggers: Arc<CatchupTriggers>,
    pub extract_queue: Arc<WorkQueue<WorkItem>>,
    pub analysis_queue: Arc<WorkQueue<WorkItem>>,
    /// The most recent batch run, if any. One run at a time.
    pub active_run: Mutex<Option<Arc<ActiveRun>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        resolver: Arc<ModeResolver>,
        dispatcher: Arc<ExtractionDispatcher>,
        triggers: Arc<CatchupTriggers>,
        extract_queue: Arc<WorkQueue<WorkItem>>,
        analysis_queue: Arc<WorkQueue<WorkItem>>,
    ) -> Self {
        Self {
            config,
            resolver,
            dispatcher,
            triggers,
            extract_queue,
            analysis_queue,
            active_run: Mutex::new(None),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn dispatcher_status(&self) -> DispatcherStatus {
        self.dispatcher.status()
    }
}
