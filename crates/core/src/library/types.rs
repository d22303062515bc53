//! Types shared across the library boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from host media server calls.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The operation was cancelled cooperatively. Never a failure.
    #[error("operation cancelled")]
    Cancelled,

    /// The host did not answer within the configured timeout.
    #[error("media server request timed out")]
    Timeout,

    /// The host could not be reached.
    #[error("media server connection failed: {0}")]
    ConnectionFailed(String),

    /// The host answered with an error.
    #[error("media server API error: {0}")]
    Api(String),

    /// The host answered with a payload we could not decode.
    #[error("media server response decode error: {0}")]
    Decode(String),
}

impl LibraryError {
    /// Whether this error is a cooperative cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LibraryError::Cancelled)
    }
}

/// Kind of catalog entry a work item points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Episode,
    Movie,
    Other,
}

impl Default for MediaKind {
    fn default() -> Self {
        MediaKind::Other
    }
}

/// Reference to a catalog entry scheduled for extraction or analysis.
///
/// Items are opaque to this service and immutable while queued. The
/// item-state flags are snapshotted by the host when the item is handed
/// over (batch fetch or event payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Stable catalog identifier.
    pub id: String,
    /// Display name, used only in logs.
    pub name: String,
    /// Filesystem path on the host, used for scope matching and logs.
    pub path: String,
    #[serde(default)]
    pub kind: MediaKind,
    /// Item already has a primary image.
    #[serde(default)]
    pub has_primary_image: bool,
    /// Item is a lightweight reference (shortcut), not a direct media file.
    #[serde(default)]
    pub lightweight: bool,
    /// Item already has a usable media stream.
    #[serde(default)]
    pub has_media_stream: bool,
}

impl WorkItem {
    pub fn is_episode(&self) -> bool {
        self.kind == MediaKind::Episode
    }
}

/// Explicit per-item behavior overrides, scoped to one extraction call.
///
/// These replace any form of shared mutable patch state: the flags travel
/// with the call and expire with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Claim the item exclusively towards the host's own extractors.
    pub exclusive: bool,
    /// Run with the batch-scoped relaxed probe/capture timeouts.
    pub relaxed_timeouts: bool,
    /// Let the capture path treat a lightweight reference as local media.
    pub capture_lightweight: bool,
}

/// Filter for scheduled batch fetches from the host catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractFilter {
    /// Only lightweight (shortcut) references.
    pub lightweight_only: bool,
    /// Library ids to fetch from. Empty means all.
    pub library_scope: Vec<String>,
}
