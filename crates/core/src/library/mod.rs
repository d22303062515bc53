//! Host media library boundary: work item model, collaborator traits, and
//! the HTTP client implementation used against a real media server.

mod http;
mod traits;
mod types;

pub use http::HttpLibraryClient;
pub use traits::{ChapterAnalysis, MediaLibrary};
pub use types::{ExtractFilter, ExtractOptions, LibraryError, MediaKind, WorkItem};
