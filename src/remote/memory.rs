//! In-memory folder tree implementing `PageFetcher`.
//!
//! Used by tests and by anyone driving the crawl without network access. Supports
//! paging, injected failures on a given call, and a log of every fetch.

use crate::error::ApiError;
use crate::remote::PageFetcher;
use crate::types::{EntryKind, NodeId, Page, RawEntry};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct TreeState {
    children: HashMap<NodeId, Vec<RawEntry>>,
    ids_by_path: HashMap<String, NodeId>,
    next_id: u64,
    calls: Vec<(NodeId, Option<String>)>,
    fail_on_call: Option<usize>,
    failing_nodes: Vec<NodeId>,
}

/// Scriptable in-memory tree rooted at `NodeId::root()` with path `""`.
pub struct MemoryTree {
    page_size: usize,
    state: Mutex<TreeState>,
}

impl MemoryTree {
    pub fn new(page_size: usize) -> Self {
        let mut state = TreeState {
            next_id: 1,
            ..TreeState::default()
        };
        state.ids_by_path.insert(String::new(), NodeId::root());
        state.children.insert(NodeId::root(), Vec::new());
        Self {
            page_size: page_size.max(1),
            state: Mutex::new(state),
        }
    }

    /// Add a folder at `path` (e.g. `/alpha/photos`), creating missing parents.
    pub fn add_folder(&self, path: &str) -> NodeId {
        let mut state = self.state.lock();
        Self::ensure_folder(&mut state, path)
    }

    /// Add a file at `path`, creating missing parent folders.
    pub fn add_file(&self, path: &str) -> NodeId {
        self.add_entry(path, EntryKind::File, Vec::new())
    }

    pub fn add_tagged_file(&self, path: &str, tags: &[&str]) -> NodeId {
        self.add_entry(
            path,
            EntryKind::File,
            tags.iter().map(|t| t.to_string()).collect(),
        )
    }

    /// Add an entry of an arbitrary kind, e.g. a `web_link`.
    pub fn add_entry(&self, path: &str, kind: EntryKind, tags: Vec<String>) -> NodeId {
        let mut state = self.state.lock();
        let (parent_path, name) = split_path(path);
        let parent = Self::ensure_folder(&mut state, parent_path);
        let id = Self::allocate(&mut state);
        state.children.entry(parent).or_default().push(RawEntry {
            kind,
            id: id.clone(),
            name: name.to_string(),
            tags,
        });
        id
    }

    /// Make the `n`th fetch call (1-based, counted over the tree's lifetime) fail once.
    pub fn fail_on_call(&self, n: usize) {
        self.state.lock().fail_on_call = Some(n);
    }

    /// Make every fetch for `node_id` fail until `heal` is called.
    pub fn fail_node(&self, node_id: &NodeId) {
        self.state.lock().failing_nodes.push(node_id.clone());
    }

    pub fn heal(&self) {
        let mut state = self.state.lock();
        state.failing_nodes.clear();
        state.fail_on_call = None;
    }

    pub fn id_of(&self, path: &str) -> Option<NodeId> {
        self.state.lock().ids_by_path.get(path).cloned()
    }

    /// Every fetch made so far as `(node, cursor)`.
    pub fn calls(&self) -> Vec<(NodeId, Option<String>)> {
        self.state.lock().calls.clone()
    }

    /// Nodes whose first page was requested, in request order.
    pub fn expansions(&self) -> Vec<NodeId> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|(_, cursor)| cursor.is_none())
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn allocate(state: &mut TreeState) -> NodeId {
        let id = NodeId::new(state.next_id.to_string());
        state.next_id += 1;
        id
    }

    fn ensure_folder(state: &mut TreeState, path: &str) -> NodeId {
        let path = path.trim_end_matches('/');
        if let Some(id) = state.ids_by_path.get(path) {
            return id.clone();
        }

        let (parent_path, name) = split_path(path);
        let parent = Self::ensure_folder(state, parent_path);
        let id = Self::allocate(state);
        state.children.entry(parent).or_default().push(RawEntry {
            kind: EntryKind::Folder,
            id: id.clone(),
            name: name.to_string(),
            tags: Vec::new(),
        });
        state.children.insert(id.clone(), Vec::new());
        state.ids_by_path.insert(path.to_string(), id.clone());
        id
    }
}

fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    }
}

#[async_trait]
impl PageFetcher for MemoryTree {
    async fn fetch(&self, node_id: &NodeId, cursor: Option<&str>) -> Result<Page, ApiError> {
        let mut state = self.state.lock();
        state
            .calls
            .push((node_id.clone(), cursor.map(|c| c.to_string())));

        let call = state.calls.len();
        if state.fail_on_call == Some(call) {
            state.fail_on_call = None;
            return Err(ApiError::remote(Some(503), "injected failure"));
        }
        if state.failing_nodes.contains(node_id) {
            return Err(ApiError::remote(Some(503), "injected failure"));
        }

        let children = state.children.get(node_id).ok_or_else(|| {
            ApiError::remote(Some(404), format!("no folder with id {}", node_id))
        })?;

        let start = match cursor {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| ApiError::remote(Some(400), format!("bad marker {}", c)))?,
            None => 0,
        };
        let end = (start + self.page_size).min(children.len());
        let entries = children.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_cursor = (end < children.len()).then(|| end.to_string());

        Ok(Page {
            entries,
            next_cursor,
        })
    }
}
