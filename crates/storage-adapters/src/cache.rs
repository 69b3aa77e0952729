//! # PageCache
//!
//! Rendered HTML keyed by route path and a per-viewer variant. Invalidation
//! is path-keyed: revalidating a path drops every variant stored under it.

use dashmap::DashMap;
use domains::ViewInvalidator;
use tracing::debug;

#[derive(Debug, Default)]
pub struct PageCache {
    entries: DashMap<(String, String), String>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str, variant: &str) -> Option<String> {
        self.entries
            .get(&(path.to_string(), variant.to_string()))
            .map(|entry| entry.value().clone())
    }

    pub fn put(&self, path: &str, variant: &str, html: String) {
        self.entries
            .insert((path.to_string(), variant.to_string()), html);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ViewInvalidator for PageCache {
    fn revalidate(&self, path: &str) {
        let before = self.entries.len();
        self.entries.retain(|(cached_path, _), _| cached_path != path);
        debug!(path, dropped = before - self.entries.len(), "views revalidated");
    }
}
