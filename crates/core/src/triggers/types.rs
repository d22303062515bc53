//! Host lifecycle event payloads.

use serde::{Deserialize, Serialize};

use crate::library::WorkItem;

/// Events delivered asynchronously by the host media server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LibraryEvent {
    /// A new item appeared in the catalog.
    ItemAdded { item: WorkItem },

    /// A user saved item preferences.
    FavoriteSaved { item: WorkItem, is_favorite: bool },

    /// A user account was created.
    UserCreated { user_id: String },

    /// A user account was deleted.
    UserDeleted { user_id: String },
}
