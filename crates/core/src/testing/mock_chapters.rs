//! Mock chapter-analysis collaborator for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::library::{ChapterAnalysis, WorkItem};

/// Mock implementation of the [`ChapterAnalysis`] decision function.
pub struct MockChapterAnalysis {
    default_detected: AtomicBool,
    per_item: Mutex<HashMap<String, bool>>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockChapterAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChapterAnalysis {
    pub fn new() -> Self {
        Self {
            default_detected: AtomicBool::new(false),
            per_item: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer for items without a per-item override.
    pub fn set_pattern_detected(&self, detected: bool) {
        self.default_detected.store(detected, Ordering::SeqCst);
    }

    /// Answer for one specific item.
    pub fn set_pattern_for(&self, id: &str, detected: bool) {
        self.per_item.lock().unwrap().insert(id.to_string(), detected);
    }

    /// Item ids queried so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChapterAnalysis for MockChapterAnalysis {
    async fn has_intro_credits_pattern(&self, item: &WorkItem) -> bool {
        self.calls.lock().unwrap().push(item.id.clone());
        self.per_item
            .lock()
            .unwrap()
            .get(&item.id)
            .copied()
            .unwrap_or_else(|| self.default_detected.load(Ordering::SeqCst))
    }
}
