//! Collaborator contracts towards the host media server.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::types::{ExtractFilter, ExtractOptions, LibraryError, WorkItem};

/// Host media library operations consumed by the extraction pipeline.
///
/// Implementations must honor the cancellation token passed to the
/// per-item operations and surface it as [`LibraryError::Cancelled`].
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Fetch the items awaiting extraction for a scheduled batch run.
    async fn fetch_pending(&self, filter: &ExtractFilter) -> Result<Vec<WorkItem>, LibraryError>;

    /// Generic metadata probe of one item.
    async fn probe(
        &self,
        item: &WorkItem,
        options: &ExtractOptions,
        cancel: &CancellationToken,
    ) -> Result<(), LibraryError>;

    /// Image-capture refresh of one item (capture path).
    async fn capture_refresh(
        &self,
        item: &WorkItem,
        options: &ExtractOptions,
        cancel: &CancellationToken,
    ) -> Result<(), LibraryError>;

    /// Reload the cached user roster from the host.
    async fn refresh_users(&self) -> Result<(), LibraryError>;
}

/// Chapter-marker analysis collaborator.
///
/// The statistical intro/credits boundary scan lives host-side; this is
/// the single decision function the dispatcher consults per episode.
#[async_trait]
pub trait ChapterAnalysis: Send + Sync {
    /// Whether the episode's season shows a confirmed intro/credits
    /// chapter marker pattern.
    async fn has_intro_credits_pattern(&self, item: &WorkItem) -> bool;
}
