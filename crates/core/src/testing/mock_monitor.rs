//! Mock session monitor for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::library::WorkItem;
use crate::monitor::SessionMonitor;

/// Mock implementation of the [`SessionMonitor`] trait with call counting.
pub struct MockSessionMonitor {
    active: AtomicBool,
    in_scope: AtomicBool,
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
    library_scope_count: AtomicUsize,
    user_scope_count: AtomicUsize,
    last_library_scope: Mutex<Vec<String>>,
    last_user_scope: Mutex<Vec<String>>,
}

impl Default for MockSessionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSessionMonitor {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            in_scope: AtomicBool::new(true),
            start_count: AtomicUsize::new(0),
            stop_count: AtomicUsize::new(0),
            library_scope_count: AtomicUsize::new(0),
            user_scope_count: AtomicUsize::new(0),
            last_library_scope: Mutex::new(Vec::new()),
            last_user_scope: Mutex::new(Vec::new()),
        }
    }

    /// Fix the scope answer for every item.
    pub fn set_in_scope(&self, in_scope: bool) {
        self.in_scope.store(in_scope, Ordering::SeqCst);
    }

    pub fn start_calls(&self) -> usize {
        self.start_count.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_count.load(Ordering::SeqCst)
    }

    pub fn library_scope_updates(&self) -> usize {
        self.library_scope_count.load(Ordering::SeqCst)
    }

    pub fn user_scope_updates(&self) -> usize {
        self.user_scope_count.load(Ordering::SeqCst)
    }

    pub fn last_library_scope(&self) -> Vec<String> {
        self.last_library_scope.lock().unwrap().clone()
    }

    pub fn last_user_scope(&self) -> Vec<String> {
        self.last_user_scope.lock().unwrap().clone()
    }
}

impl SessionMonitor for MockSessionMonitor {
    fn start(&self) {
        self.active.store(true, Ordering::SeqCst);
        self.start_count.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.stop_count.fetch_add(1, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn is_in_scope(&self, _item: &WorkItem) -> bool {
        self.in_scope.load(Ordering::SeqCst)
    }

    fn update_library_scope(&self, libraries: Vec<String>) {
        self.library_scope_count.fetch_add(1, Ordering::SeqCst);
        *self.last_library_scope.lock().unwrap() = libraries;
    }

    fn update_user_scope(&self, users: Vec<String>) {
        self.user_scope_count.fetch_add(1, Ordering::SeqCst);
        *self.last_user_scope.lock().unwrap() = users;
    }
}
