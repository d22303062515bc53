//! Mock media library for testing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::library::{ExtractFilter, ExtractOptions, LibraryError, MediaLibrary, WorkItem};

/// Mock implementation of the [`MediaLibrary`] trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable pending items
/// - Inject per-item probe/capture failures
/// - Add an artificial per-call delay (cancellation-aware)
/// - Track calls, options, and peak concurrency for assertions
pub struct MockLibrary {
    pending: Mutex<Vec<WorkItem>>,
    fail_fetch: AtomicBool,
    failing_probe: Mutex<HashSet<String>>,
    failing_capture: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    probe_log: Mutex<Vec<(String, ExtractOptions)>>,
    capture_log: Mutex<Vec<(String, ExtractOptions)>>,
    fetch_log: Mutex<Vec<ExtractFilter>>,
    refresh_users_count: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl Default for MockLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLibrary {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            failing_probe: Mutex::new(HashSet::new()),
            failing_capture: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
            probe_log: Mutex::new(Vec::new()),
            capture_log: Mutex::new(Vec::new()),
            fetch_log: Mutex::new(Vec::new()),
            refresh_users_count: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Items returned by the next `fetch_pending` calls.
    pub fn set_pending(&self, items: Vec<WorkItem>) {
        *self.pending.lock().unwrap() = items;
    }

    /// Make `fetch_pending` fail.
    pub fn fail_fetch(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    /// Make `probe` fail for the given item id.
    pub fn fail_probe_for(&self, id: &str) {
        self.failing_probe.lock().unwrap().insert(id.to_string());
    }

    /// Make `capture_refresh` fail for the given item id.
    pub fn fail_capture_for(&self, id: &str) {
        self.failing_capture.lock().unwrap().insert(id.to_string());
    }

    /// Delay every probe/capture call; the delay honors cancellation.
    pub fn set_probe_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Item ids probed so far, in call order.
    pub fn probe_calls(&self) -> Vec<String> {
        self.probe_log
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Item ids capture-refreshed so far, in call order.
    pub fn capture_calls(&self) -> Vec<String> {
        self.capture_log
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Options passed to the first probe of the given item.
    pub fn recorded_probe_options(&self, id: &str) -> Option<ExtractOptions> {
        self.probe_log
            .lock()
            .unwrap()
            .iter()
            .find(|(call_id, _)| call_id == id)
            .map(|(_, options)| *options)
    }

    /// Options passed to the first capture of the given item.
    pub fn recorded_capture_options(&self, id: &str) -> Option<ExtractOptions> {
        self.capture_log
            .lock()
            .unwrap()
            .iter()
            .find(|(call_id, _)| call_id == id)
            .map(|(_, options)| *options)
    }

    /// Filters passed to `fetch_pending`, in call order.
    pub fn fetch_filters(&self) -> Vec<ExtractFilter> {
        self.fetch_log.lock().unwrap().clone()
    }

    pub fn refresh_users_calls(&self) -> usize {
        self.refresh_users_count.load(Ordering::SeqCst)
    }

    /// Highest number of probe/capture calls observed in flight at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn run_operation(
        &self,
        id: &str,
        failing: &Mutex<HashSet<String>>,
        cancel: &CancellationToken,
    ) -> Result<(), LibraryError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        let result = async {
            if let Some(delay) = delay {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(LibraryError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            } else if cancel.is_cancelled() {
                return Err(LibraryError::Cancelled);
            }

            if failing.lock().unwrap().contains(id) {
                return Err(LibraryError::Api(format!("injected failure for {}", id)));
            }
            Ok(())
        }
        .await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl MediaLibrary for MockLibrary {
    async fn fetch_pending(&self, filter: &ExtractFilter) -> Result<Vec<WorkItem>, LibraryError> {
        self.fetch_log.lock().unwrap().push(filter.clone());
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(LibraryError::Api("injected fetch failure".to_string()));
        }
        Ok(self.pending.lock().unwrap().clone())
    }

    async fn probe(
        &self,
        item: &WorkItem,
        options: &ExtractOptions,
        cancel: &CancellationToken,
    ) -> Result<(), LibraryError> {
        self.probe_log
            .lock()
            .unwrap()
            .push((item.id.clone(), *options));
        self.run_operation(&item.id, &self.failing_probe, cancel).await
    }

    async fn capture_refresh(
        &self,
        item: &WorkItem,
        options: &ExtractOptions,
        cancel: &CancellationToken,
    ) -> Result<(), LibraryError> {
        self.capture_log
            .lock()
            .unwrap()
            .push((item.id.clone(), *options));
        self.run_operation(&item.id, &self.failing_capture, cancel)
            .await
    }

    async fn refresh_users(&self) -> Result<(), LibraryError> {
        self.refresh_users_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
