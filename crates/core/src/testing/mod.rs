//! Testing utilities and mock implementations.
//!
//! Mock implementations of the host collaborator traits, allowing the
//! pipeline and the server surface to be exercised without a real media
//! server.
//!
//! # Example
//!
//! ```rust,ignore
//! use libretto_core::testing::{fixtures, MockLibrary};
//!
//! let library = MockLibrary::new();
//! library.set_pending(vec![fixtures::media_item("i1")]);
//! library.fail_probe_for("i1");
//!
//! // Use in a dispatcher...
//! ```

mod mock_chapters;
mod mock_library;
mod mock_monitor;

pub use mock_chapters::MockChapterAnalysis;
pub use mock_library::MockLibrary;
pub use mock_monitor::MockSessionMonitor;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::library::{MediaKind, WorkItem};

    /// Create a plain media item with a usable stream.
    pub fn media_item(id: &str) -> WorkItem {
        WorkItem {
            id: id.to_string(),
            name: id.to_string(),
            path: format!("/mnt/media/{}.mkv", id),
            kind: MediaKind::Other,
            has_primary_image: false,
            lightweight: false,
            has_media_stream: true,
        }
    }

    /// Create an episode item.
    pub fn episode_item(id: &str) -> WorkItem {
        WorkItem {
            kind: MediaKind::Episode,
            path: format!("/mnt/shows/{}.mkv", id),
            ..media_item(id)
        }
    }

    /// Create a lightweight (shortcut) reference without a media stream.
    pub fn lightweight_item(id: &str) -> WorkItem {
        WorkItem {
            lightweight: true,
            has_media_stream: false,
            path: format!("/mnt/media/{}.strm", id),
            ..media_item(id)
        }
    }
}
