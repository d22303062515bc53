//! Extraction dispatcher implementation.
//!
//! Two entry paths share the same per-item processing:
//! - `run_batch` / `run_items`: a scheduled, bounded batch with progress
//!   reporting and run-scoped timeout overrides.
//! - the live drain loop (`start`/`stop`): items arriving through the
//!   catch-up triggers, processed as they come.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::library::{
    ChapterAnalysis, ExtractFilter, ExtractOptions, LibraryError, MediaLibrary, WorkItem,
};
use crate::monitor::SessionMonitor;
use crate::queue::{ConcurrencyGate, WorkQueue};
use crate::resolver::{ModeResolver, ModeSnapshot, RunOverrides};

use super::types::{BatchReport, DispatcherStatus, ProgressSender};

/// The extraction worker dispatcher.
pub struct ExtractionDispatcher {
    library: Arc<dyn MediaLibrary>,
    chapters: Arc<dyn ChapterAnalysis>,
    monitor: Arc<dyn SessionMonitor>,
    resolver: Arc<ModeResolver>,
    gate: Arc<ConcurrencyGate>,
    extract_queue: Arc<WorkQueue<WorkItem>>,
    analysis_queue: Arc<WorkQueue<WorkItem>>,

    // Runtime state of the live drain loop
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    drain_cancel: std::sync::Mutex<CancellationToken>,
}

impl ExtractionDispatcher {
    pub fn new(
        library: Arc<dyn MediaLibrary>,
        chapters: Arc<dyn ChapterAnalysis>,
        monitor: Arc<dyn SessionMonitor>,
        resolver: Arc<ModeResolver>,
        gate: Arc<ConcurrencyGate>,
        extract_queue: Arc<WorkQueue<WorkItem>>,
        analysis_queue: Arc<WorkQueue<WorkItem>>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            library,
            chapters,
            monitor,
            resolver,
            gate,
            extract_queue,
            analysis_queue,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            drain_cancel: std::sync::Mutex::new(CancellationToken::new()),
        }
    }

    /// Current dispatcher status.
    pub fn status(&self) -> DispatcherStatus {
        DispatcherStatus {
            running: self.running.load(Ordering::Relaxed),
            extract_queue_depth: self.extract_queue.len(),
            analysis_queue_depth: self.analysis_queue.len(),
            gate_capacity: self.gate.capacity(),
            gate_held: self.gate.held(),
        }
    }

    /// Fetch the pending batch from the host catalog and process it.
    pub async fn run_batch(
        &self,
        cancel: CancellationToken,
        progress: Option<ProgressSender>,
    ) -> BatchReport {
        let snapshot = self.resolver.current();
        let filter = ExtractFilter {
            lightweight_only: snapshot.lightweight_only,
            library_scope: snapshot.extract_library_scope.clone(),
        };

        let items = match self.library.fetch_pending(&filter).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Pending item fetch failed: {}", e);
                Vec::new()
            }
        };

        self.run_items(items, cancel, progress).await
    }

    /// Process a bounded batch of items in input order under the gate.
    ///
    /// A single item's failure never affects its siblings and the batch
    /// itself never fails; cancellation stops new dispatch while letting
    /// in-flight items finish.
    pub async fn run_items(
        &self,
        items: Vec<WorkItem>,
        cancel: CancellationToken,
        progress: Option<ProgressSender>,
    ) -> BatchReport {
        let total = items.len();
        info!("Extract run started: {} items", total);

        if total == 0 {
            report_progress(&progress, 100.0);
            info!("Extract run complete");
            return BatchReport::default();
        }

        let snapshot = self.resolver.current();
        info!("Max concurrent: {}", snapshot.max_concurrent);
        info!("Image capture enabled: {}", snapshot.enable_capture);
        info!("Intro skip enabled: {}", snapshot.intro_skip_enabled);

        // Run-scoped timeout relaxations: probing always, capture only
        // when the capture path can be taken. Reverted after the run,
        // whatever happens in between.
        self.resolver.apply_run_overrides(RunOverrides {
            relaxed_probe_timeout: true,
            relaxed_capture_timeout: snapshot.enable_capture,
        });

        let completed = Arc::new(AtomicUsize::new(0));
        let succeeded = Arc::new(AtomicUsize::new(0));
        let failed = Arc::new(AtomicUsize::new(0));
        let mut cancelled = false;
        let mut tasks = Vec::new();

        for (index, item) in items.into_iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Extract run cancelled");
                cancelled = true;
                break;
            }

            let permit = match self.gate.acquire(&cancel).await {
                Ok(permit) => permit,
                Err(_) => {
                    info!("Extract run cancelled");
                    cancelled = true;
                    break;
                }
            };

            let library = Arc::clone(&self.library);
            let chapters = Arc::clone(&self.chapters);
            let monitor = Arc::clone(&self.monitor);
            let analysis_queue = Arc::clone(&self.analysis_queue);
            // Fresh snapshot per item: mid-run settings changes apply to
            // items not yet dispatched.
            let snapshot = self.resolver.current();
            let cancel = cancel.clone();
            let progress = progress.clone();
            let completed = Arc::clone(&completed);
            let succeeded = Arc::clone(&succeeded);
            let failed = Arc::clone(&failed);

            tasks.push(tokio::spawn(async move {
                let result = process_item(
                    &library,
                    &chapters,
                    &monitor,
                    &analysis_queue,
                    &snapshot,
                    &item,
                    &cancel,
                )
                .await;

                match &result {
                    Ok(()) => {
                        succeeded.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) if e.is_cancelled() => {
                        info!("Extract item cancelled: {} - {}", item.name, item.path);
                    }
                    Err(e) => {
                        failed.fetch_add(1, Ordering::SeqCst);
                        info!("Extract item failed: {} - {}", item.name, item.path);
                        debug!("Item {} failure: {}", item.id, e);
                    }
                }

                // Single finalization step for every outcome.
                let count = completed.fetch_add(1, Ordering::SeqCst) + 1;
                report_progress(&progress, count as f64 / total as f64 * 100.0);
                info!(
                    "Extract run {}/{} - task {}: {}",
                    count,
                    total,
                    index + 1,
                    item.path
                );
                drop(permit);
            }));
        }

        futures::future::join_all(tasks).await;

        self.resolver.clear_run_overrides();
        report_progress(&progress, 100.0);
        info!("Extract run complete");

        BatchReport {
            total,
            completed: completed.load(Ordering::SeqCst),
            succeeded: succeeded.load(Ordering::SeqCst),
            failed: failed.load(Ordering::SeqCst),
            cancelled,
        }
    }

    /// Start the live drain loop over the extraction queue.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Extraction dispatcher already running");
            return;
        }

        let cancel = CancellationToken::new();
        *self.drain_cancel.lock().unwrap() = cancel.clone();

        let library = Arc::clone(&self.library);
        let chapters = Arc::clone(&self.chapters);
        let monitor = Arc::clone(&self.monitor);
        let resolver = Arc::clone(&self.resolver);
        let gate = Arc::clone(&self.gate);
        let extract_queue = Arc::clone(&self.extract_queue);
        let analysis_queue = Arc::clone(&self.analysis_queue);
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Extraction drain loop started");
            loop {
                let item = tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    item = extract_queue.pop() => item,
                };

                let permit = match gate.acquire(&cancel).await {
                    Ok(permit) => permit,
                    Err(_) => {
                        // Stopped while waiting: hand the item back.
                        extract_queue.push(item);
                        break;
                    }
                };

                if !running.load(Ordering::Relaxed) {
                    extract_queue.push(item);
                    break;
                }

                let library = Arc::clone(&library);
                let chapters = Arc::clone(&chapters);
                let monitor = Arc::clone(&monitor);
                let analysis_queue = Arc::clone(&analysis_queue);
                let snapshot = resolver.current();
                let cancel = cancel.clone();

                tokio::spawn(async move {
                    let result = process_item(
                        &library,
                        &chapters,
                        &monitor,
                        &analysis_queue,
                        &snapshot,
                        &item,
                        &cancel,
                    )
                    .await;

                    match result {
                        Ok(()) => debug!("Queued item extracted: {}", item.path),
                        Err(e) if e.is_cancelled() => {
                            info!("Queued item cancelled: {} - {}", item.name, item.path)
                        }
                        Err(e) => {
                            info!("Queued item failed: {} - {}", item.name, item.path);
                            debug!("Item {} failure: {}", item.id, e);
                        }
                    }
                    drop(permit);
                });
            }
            info!("Extraction drain loop stopped");
        });
    }

    /// Stop the live drain loop. In-flight items finish on their own.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Extraction dispatcher not running");
            return;
        }

        let _ = self.shutdown_tx.send(());
        self.drain_cancel.lock().unwrap().cancel();
        info!("Extraction dispatcher stopping");
    }
}

fn report_progress(progress: &Option<ProgressSender>, value: f64) {
    if let Some(tx) = progress {
        let _ = tx.send(value);
    }
}

/// Process one item end to end: pick the extraction operation, run it,
/// and chain eligible episodes into the analysis queue.
async fn process_item(
    library: &Arc<dyn MediaLibrary>,
    chapters: &Arc<dyn ChapterAnalysis>,
    monitor: &Arc<dyn SessionMonitor>,
    analysis_queue: &Arc<WorkQueue<WorkItem>>,
    snapshot: &ModeSnapshot,
    item: &WorkItem,
    cancel: &CancellationToken,
) -> Result<(), LibraryError> {
    if snapshot.enable_capture && !item.has_primary_image {
        let options = ExtractOptions {
            exclusive: snapshot.exclusive,
            relaxed_timeouts: snapshot.run_overrides.relaxed_capture_timeout,
            capture_lightweight: item.lightweight,
        };
        library.capture_refresh(item, &options, cancel).await?;
    } else {
        let options = ExtractOptions {
            exclusive: snapshot.exclusive,
            relaxed_timeouts: snapshot.run_overrides.relaxed_probe_timeout,
            capture_lightweight: false,
        };
        library.probe(item, &options, cancel).await?;
    }

    if snapshot.intro_skip_enabled
        && monitor.is_in_scope(item)
        && item.is_episode()
        && chapters.has_intro_credits_pattern(item).await
    {
        debug!("Queueing episode {} for intro/credits analysis", item.id);
        analysis_queue.push(item.clone());
    }

    Ok(())
}
