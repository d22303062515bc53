use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use tracing::info;

use crate::library::WorkItem;

use super::SessionMonitor;

/// Session monitor backed by path-prefix library scoping.
///
/// Scope checks answer from local state only, so they are safe to call
/// from event handlers that must not block.
#[derive(Debug, Default)]
pub struct ScopedSessionMonitor {
    active: AtomicBool,
    library_paths: RwLock<Vec<String>>,
    users: RwLock<Vec<String>>,
}

impl ScopedSessionMonitor {
    pub fn new(library_paths: Vec<String>, users: Vec<String>) -> Self {
        Self {
            active: AtomicBool::new(false),
            library_paths: RwLock::new(library_paths),
            users: RwLock::new(users),
        }
    }

    /// Users the monitor currently acts for.
    pub fn user_scope(&self) -> Vec<String> {
        self.users.read().unwrap().clone()
    }
}

impl SessionMonitor for ScopedSessionMonitor {
    fn start(&self) {
        if !self.active.swap(true, Ordering::SeqCst) {
            info!("Session monitor started");
        }
    }

    fn stop(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("Session monitor stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn is_in_scope(&self, item: &WorkItem) -> bool {
        let paths = self.library_paths.read().unwrap();
        paths.is_empty() || paths.iter().any(|prefix| item.path.starts_with(prefix))
    }

    fn update_library_scope(&self, libraries: Vec<String>) {
        *self.library_paths.write().unwrap() = libraries;
    }

    fn update_user_scope(&self, users: Vec<String>) {
        *self.users.write().unwrap() = users;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MediaKind;

    fn item(path: &str) -> WorkItem {
        WorkItem {
            id: "i1".to_string(),
            name: "n".to_string(),
            path: path.to_string(),
            kind: MediaKind::Episode,
            has_primary_image: false,
            lightweight: false,
            has_media_stream: true,
        }
    }

    #[test]
    fn test_empty_scope_matches_everything() {
        let monitor = ScopedSessionMonitor::default();
        assert!(monitor.is_in_scope(&item("/anywhere/file.mkv")));
    }

    #[test]
    fn test_prefix_scope_matching() {
        let monitor = ScopedSessionMonitor::new(vec!["/mnt/shows".to_string()], Vec::new());
        assert!(monitor.is_in_scope(&item("/mnt/shows/s01e01.mkv")));
        assert!(!monitor.is_in_scope(&item("/mnt/movies/film.mkv")));
    }

    #[test]
    fn test_scope_update_replaces_previous() {
        let monitor = ScopedSessionMonitor::new(vec!["/mnt/shows".to_string()], Vec::new());
        monitor.update_library_scope(vec!["/mnt/movies".to_string()]);
        assert!(!monitor.is_in_scope(&item("/mnt/shows/s01e01.mkv")));
        assert!(monitor.is_in_scope(&item("/mnt/movies/film.mkv")));
    }

    #[test]
    fn test_lifecycle_is_idempotent() {
        let monitor = ScopedSessionMonitor::default();
        assert!(!monitor.is_active());
        monitor.start();
        monitor.start();
        assert!(monitor.is_active());
        monitor.stop();
        assert!(!monitor.is_active());
    }
}
