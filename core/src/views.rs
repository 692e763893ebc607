//! History of visited admin views (the tab strip above the content area).
//!
//! The list and the active path are persisted after every change under
//! `visitedViews` and `activePath`, so a reload restores the tabs. Both live
//! in whichever `TokenStore` the caller hands in; the admin app keeps them in
//! session-scoped storage.

use serde::{Deserialize, Serialize};

use crate::auth::TokenStore;
use crate::error::ApiError;

pub const VISITED_VIEWS_KEY: &str = "visitedViews";
pub const ACTIVE_PATH_KEY: &str = "activePath";

/// One visited view. `path` identifies it; extra route data rides along.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagView {
    pub name: String,
    pub path: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TagView {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewHistory {
    visited: Vec<TagView>,
    active_path: String,
}

impl ViewHistory {
    /// Restore the history saved in `store`; nothing saved means empty.
    pub fn load(store: &dyn TokenStore) -> Result<Self, ApiError> {
        let visited = match store.get(VISITED_VIEWS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| ApiError::Storage(e.to_string()))?,
            None => Vec::new(),
        };
        let active_path = store.get(ACTIVE_PATH_KEY)?.unwrap_or_default();
        Ok(Self { visited, active_path })
    }

    pub fn visited(&self) -> &[TagView] {
        &self.visited
    }

    pub fn active_path(&self) -> &str {
        &self.active_path
    }

    /// Record `view` as visited. A path already in the list keeps its first
    /// entry and position.
    pub fn add(&mut self, store: &dyn TokenStore, view: TagView) -> Result<(), ApiError> {
        if !self.visited.iter().any(|v| v.path == view.path) {
            self.visited.push(view);
        }
        self.save_visited(store)
    }

    /// Drop the view at `index`. An index past the end changes nothing.
    pub fn remove(&mut self, store: &dyn TokenStore, index: usize) -> Result<Option<TagView>, ApiError> {
        let removed = (index < self.visited.len()).then(|| self.visited.remove(index));
        self.save_visited(store)?;
        Ok(removed)
    }

    /// Mark `view` active. `None` only re-reads the persisted active path.
    pub fn set_active(&mut self, store: &dyn TokenStore, view: Option<&TagView>) -> Result<(), ApiError> {
        if let Some(saved) = store.get(ACTIVE_PATH_KEY)?.filter(|p| !p.is_empty()) {
            self.active_path = saved;
        }
        if let Some(view) = view {
            self.active_path = view.path.clone();
            store.set(ACTIVE_PATH_KEY, &view.path)?;
        }
        Ok(())
    }

    fn save_visited(&self, store: &dyn TokenStore) -> Result<(), ApiError> {
        let raw = serde_json::to_string(&self.visited).map_err(|e| ApiError::Storage(e.to_string()))?;
        store.set(VISITED_VIEWS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::MemoryTokenStore;

    #[test]
    fn nothing_saved_is_empty() {
        let history = ViewHistory::load(&MemoryTokenStore::new()).unwrap();
        assert!(history.visited().is_empty());
        assert_eq!(history.active_path(), "");
    }

    #[test]
    fn add_dedupes_by_path_and_keeps_first() {
        let store = MemoryTokenStore::new();
        let mut history = ViewHistory::default();
        history.add(&store, TagView::new("Articles", "/article")).unwrap();
        history.add(&store, TagView::new("Projects", "/project")).unwrap();
        history.add(&store, TagView::new("Articles again", "/article")).unwrap();

        let names: Vec<_> = history.visited().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Articles", "Projects"]);
    }

    #[test]
    fn history_survives_a_reload() {
        let store = MemoryTokenStore::new();
        let mut history = ViewHistory::default();
        let view = TagView::new("Users", "/user");
        history.add(&store, view.clone()).unwrap();
        history.set_active(&store, Some(&view)).unwrap();

        let reloaded = ViewHistory::load(&store).unwrap();
        assert_eq!(reloaded, history);
        assert_eq!(reloaded.active_path(), "/user");
    }

    #[test]
    fn remove_by_index_persists() {
        let store = MemoryTokenStore::new();
        let mut history = ViewHistory::default();
        history.add(&store, TagView::new("A", "/a")).unwrap();
        history.add(&store, TagView::new("B", "/b")).unwrap();

        let removed = history.remove(&store, 0).unwrap();
        assert_eq!(removed.map(|v| v.path), Some("/a".to_string()));
        assert_eq!(history.remove(&store, 5).unwrap(), None);

        let reloaded = ViewHistory::load(&store).unwrap();
        assert_eq!(reloaded.visited(), &[TagView::new("B", "/b")]);
    }

    #[test]
    fn set_active_without_view_reads_saved_path() {
        let store = MemoryTokenStore::new();
        store.set(ACTIVE_PATH_KEY, "/project").unwrap();
        let mut history = ViewHistory::default();
        history.set_active(&store, None).unwrap();
        assert_eq!(history.active_path(), "/project");
    }

    #[test]
    fn extra_route_fields_round_trip() {
        let store = MemoryTokenStore::new();
        store
            .set(VISITED_VIEWS_KEY, r#"[{"name":"Edit","path":"/article/edit","query":{"id":3}}]"#)
            .unwrap();
        let history = ViewHistory::load(&store).unwrap();
        assert_eq!(history.visited()[0].extra["query"], json!({"id": 3}));
    }

    #[test]
    fn corrupt_saved_list_is_storage_error() {
        let store = MemoryTokenStore::new();
        store.set(VISITED_VIEWS_KEY, "[not json").unwrap();
        assert!(matches!(ViewHistory::load(&store), Err(ApiError::Storage(_))));
    }
}
