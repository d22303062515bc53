//! Event-driven producers for the extraction and analysis queues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::library::{MediaLibrary, WorkItem};
use crate::monitor::SessionMonitor;
use crate::queue::WorkQueue;

use super::types::LibraryEvent;

/// Routes host lifecycle events into the work queues.
///
/// `handle_event` only inspects local state and pushes queue entries, so
/// it is safe on whatever task delivers the event. The catch-up paths are
/// gated by the subscription flag toggled through `start`/`stop`; the
/// intro-skip path follows the session monitor's own active state.
pub struct CatchupTriggers {
    enabled: AtomicBool,
    library: Arc<dyn MediaLibrary>,
    monitor: Arc<dyn SessionMonitor>,
    extract_queue: Arc<WorkQueue<WorkItem>>,
    analysis_queue: Arc<WorkQueue<WorkItem>>,
}

impl CatchupTriggers {
    pub fn new(
        library: Arc<dyn MediaLibrary>,
        monitor: Arc<dyn SessionMonitor>,
        extract_queue: Arc<WorkQueue<WorkItem>>,
        analysis_queue: Arc<WorkQueue<WorkItem>>,
    ) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            library,
            monitor,
            extract_queue,
            analysis_queue,
        }
    }

    /// Subscribe the catch-up paths. Idempotent.
    pub fn start(&self) {
        if !self.enabled.swap(true, Ordering::SeqCst) {
            info!("Catch-up triggers enabled");
        }
    }

    /// Unsubscribe the catch-up paths. Idempotent.
    pub fn stop(&self) {
        if self.enabled.swap(false, Ordering::SeqCst) {
            info!("Catch-up triggers disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Route one host event. Non-blocking.
    pub fn handle_event(&self, event: LibraryEvent) {
        match event {
            LibraryEvent::ItemAdded { item } => self.on_item_added(item),
            LibraryEvent::FavoriteSaved { item, is_favorite } => {
                self.on_favorite_saved(item, is_favorite)
            }
            LibraryEvent::UserCreated { user_id } | LibraryEvent::UserDeleted { user_id } => {
                self.on_user_changed(user_id)
            }
        }
    }

    fn on_item_added(&self, item: WorkItem) {
        if self.is_enabled() && item.lightweight {
            debug!("Catch-up: queueing added item {} for extraction", item.id);
            self.extract_queue.push(item.clone());
        }

        // Independent of catch-up mode: keep the analysis pipeline fed for
        // items landing inside the intro-skip scope.
        if self.monitor.is_active() && self.monitor.is_in_scope(&item) {
            if !item.has_media_stream {
                debug!(
                    "Intro-skip: item {} lacks a media stream, queueing extraction",
                    item.id
                );
                self.extract_queue.push(item);
            } else if item.is_episode() {
                debug!("Intro-skip: queueing episode {} for analysis", item.id);
                self.analysis_queue.push(item);
            }
        }
    }

    fn on_favorite_saved(&self, item: WorkItem, is_favorite: bool) {
        if self.is_enabled() && is_favorite {
            debug!("Catch-up: queueing favorite {} for extraction", item.id);
            self.extract_queue.push(item);
        }
    }

    fn on_user_changed(&self, user_id: String) {
        let library = Arc::clone(&self.library);
        tokio::spawn(async move {
            if let Err(e) = library.refresh_users().await {
                warn!("User roster refresh after {} change failed: {}", user_id, e);
            }
        });
    }
}
