//! Playback session monitor boundary.
//!
//! The session monitor proper (watching play sessions and applying skip
//! decisions) belongs to the host; the pipeline only needs its lifecycle
//! and its library/user scope filter.

mod scope;

pub use scope::ScopedSessionMonitor;

use crate::library::WorkItem;

/// Session-monitor collaborator contract.
pub trait SessionMonitor: Send + Sync {
    /// Bring the monitor up. Idempotent.
    fn start(&self);

    /// Tear the monitor down. Idempotent.
    fn stop(&self);

    /// Whether the monitor is currently up (intro-skip enabled).
    fn is_active(&self) -> bool;

    /// Whether the item falls inside the configured library scope.
    fn is_in_scope(&self, item: &WorkItem) -> bool;

    /// Replace the library scope. Empty means everything is in scope.
    fn update_library_scope(&self, libraries: Vec<String>);

    /// Replace the user scope. Empty means all users.
    fn update_user_scope(&self, users: Vec<String>);
}
