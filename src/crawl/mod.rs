//! Crawl Engine
//!
//! Breadth-first traversal of the remote folder tree. The frontier is a single
//! append-only queue read through a `tail` cursor, so when a run stops early
//! `queue[tail..]` is exactly the unexpanded remainder and becomes the checkpoint.
//!
//! A run ends in one of three ways:
//! - frontier exhausted: checkpoint cleared, `CrawlStatus::Completed`
//! - batch cap reached or cancelled: checkpoint saved, `CrawlStatus::Interrupted`
//! - listing failure: checkpoint saved, error returned
//!
//! A node leaves the frontier only after all of its pages were fetched and all of
//! its children recorded. Pagination progress inside a node is not persisted; a
//! node interrupted mid-listing is fetched again from its first page on resume.

pub mod identity;

pub use identity::identity_hash;
pub use tokio_util::sync::CancellationToken;

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::error::ApiError;
use crate::remote::{fetch_all, PageFetcher};
use crate::types::{CommandKind, EntryKind, FileEntry, Folder, NodeId, QueueItem, RawEntry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parameters of one crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub command: CommandKind,
    /// Binds checkpoints to this invocation; see `identity_hash`.
    pub identity_hash: String,
    /// Where a fresh crawl starts.
    pub root: QueueItem,
    /// Pause before each listing call after the first of a run.
    pub delay: Duration,
    /// Node expansions per run; 0 means unbounded.
    pub batch_size: u32,
    /// Ignore any existing checkpoint, even a corrupt one.
    pub restart: bool,
}

impl CrawlConfig {
    pub fn new(command: CommandKind, identity_hash: impl Into<String>) -> Self {
        Self {
            command,
            identity_hash: identity_hash.into(),
            root: QueueItem {
                id: NodeId::root(),
                path: String::new(),
            },
            delay: Duration::ZERO,
            batch_size: 0,
            restart: false,
        }
    }

    pub fn with_root(mut self, id: NodeId, path: impl Into<String>) -> Self {
        self.root = QueueItem {
            id,
            path: path.into(),
        };
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_restart(mut self, restart: bool) -> Self {
        self.restart = restart;
        self
    }
}

/// Why a run stopped before the frontier emptied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    BatchLimit,
    Cancelled,
}

impl std::fmt::Display for InterruptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterruptReason::BatchLimit => f.write_str("batch limit"),
            InterruptReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    Completed,
    Interrupted(InterruptReason),
}

impl CrawlStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, CrawlStatus::Completed)
    }
}

/// Outcome of a run that did not fail
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Everything discovered so far, including what a resumed checkpoint carried.
    pub folders: Vec<Folder>,
    pub files: Vec<FileEntry>,
    pub status: CrawlStatus,
    /// Nodes expanded by this run.
    pub expanded: usize,
    /// Frontier nodes left for a later run.
    pub remaining: usize,
    pub resumed: bool,
}

/// In-memory crawl state: the frontier and everything recorded so far.
#[derive(Debug, Default)]
struct CrawlState {
    queue: Vec<QueueItem>,
    folders: Vec<Folder>,
    files: Vec<FileEntry>,
    resumed: bool,
}

impl CrawlState {
    fn fresh(root: &QueueItem) -> Self {
        Self {
            queue: vec![root.clone()],
            ..Self::default()
        }
    }

    fn resumed(checkpoint: Checkpoint) -> Self {
        Self {
            queue: checkpoint.queue,
            folders: checkpoint.folders,
            files: checkpoint.files,
            resumed: true,
        }
    }

    /// Record the children of `parent`, in listing order. Subfolders join the frontier.
    fn record(&mut self, parent: &QueueItem, entries: Vec<RawEntry>) {
        for entry in entries {
            let path = format!("{}/{}", parent.path, entry.name);
            match entry.kind {
                EntryKind::Folder => {
                    self.queue.push(QueueItem {
                        id: entry.id.clone(),
                        path: path.clone(),
                    });
                    self.folders.push(Folder {
                        id: entry.id,
                        name: entry.name,
                        path,
                        tags: entry.tags,
                    });
                }
                EntryKind::File => {
                    self.files.push(FileEntry {
                        id: entry.id,
                        file_name: entry.name,
                        file_path: path,
                        tags: entry.tags,
                    });
                }
                EntryKind::Other(kind) => {
                    debug!(kind = %kind, path = %path, "Skipping entry of unsupported type");
                }
            }
        }
    }

    fn snapshot(&self, identity_hash: &str, tail: usize) -> Checkpoint {
        Checkpoint::new(
            identity_hash,
            self.queue[tail..].to_vec(),
            self.folders.clone(),
            self.files.clone(),
        )
    }
}

/// Resumable, throttled BFS over a `PageFetcher`
pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    store: CheckpointStore,
}

impl CrawlEngine {
    pub fn new(fetcher: Arc<dyn PageFetcher>, store: CheckpointStore) -> Self {
        Self { fetcher, store }
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Run until the frontier empties, the batch cap is hit, `cancel` fires, or a
    /// listing call fails.
    pub async fn run(
        &self,
        config: &CrawlConfig,
        cancel: &CancellationToken,
    ) -> Result<CrawlReport, ApiError> {
        let mut state = self.initial_state(config)?;
        let mut tail = 0;
        let mut expanded = 0usize;

        info!(
            command = %config.command,
            resumed = state.resumed,
            frontier = state.queue.len(),
            "Starting crawl"
        );

        while tail < state.queue.len() {
            if expanded > 0 && !config.delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(config.delay) => {}
                    _ = cancel.cancelled() => {}
                }
            }

            if cancel.is_cancelled() {
                return self.interrupt(config, state, tail, expanded, InterruptReason::Cancelled);
            }

            let item = state.queue[tail].clone();
            let listing = match fetch_all(self.fetcher.as_ref(), &item.id).await {
                Ok(listing) => listing,
                Err(err) => {
                    warn!(node_id = %item.id, path = %item.path, error = %err, "Listing failed");
                    let checkpoint = state.snapshot(&config.identity_hash, tail);
                    if let Err(save_err) = self.store.save(&checkpoint) {
                        warn!(
                            checkpoint = %self.store.path().display(),
                            error = %save_err,
                            "Failed to save checkpoint after listing failure"
                        );
                    }
                    return Err(err);
                }
            };

            debug!(
                node_id = %item.id,
                path = %item.path,
                pages = listing.pages,
                entries = listing.entries.len(),
                "Expanded folder"
            );
            state.record(&item, listing.entries);
            tail += 1;
            expanded += 1;

            let remaining = state.queue.len() - tail;
            if config.batch_size > 0 && expanded >= config.batch_size as usize && remaining > 0 {
                return self.interrupt(config, state, tail, expanded, InterruptReason::BatchLimit);
            }
        }

        self.store.clear()?;
        info!(
            expanded,
            folders = state.folders.len(),
            files = state.files.len(),
            "Crawl complete"
        );

        Ok(CrawlReport {
            folders: state.folders,
            files: state.files,
            status: CrawlStatus::Completed,
            expanded,
            remaining: 0,
            resumed: state.resumed,
        })
    }

    fn initial_state(&self, config: &CrawlConfig) -> Result<CrawlState, ApiError> {
        if config.restart {
            debug!("Restart requested, ignoring any checkpoint");
            return Ok(CrawlState::fresh(&config.root));
        }

        match self.store.load()? {
            Some(checkpoint) if checkpoint.is_resumable_for(&config.identity_hash) => {
                info!(
                    checkpoint = %self.store.path().display(),
                    remaining = checkpoint.queue.len(),
                    "Resuming from checkpoint"
                );
                Ok(CrawlState::resumed(checkpoint))
            }
            Some(checkpoint) => {
                if checkpoint.identity_hash != config.identity_hash {
                    info!(
                        checkpoint = %self.store.path().display(),
                        "Checkpoint belongs to a different invocation, starting fresh"
                    );
                }
                Ok(CrawlState::fresh(&config.root))
            }
            None => Ok(CrawlState::fresh(&config.root)),
        }
    }

    fn interrupt(
        &self,
        config: &CrawlConfig,
        state: CrawlState,
        tail: usize,
        expanded: usize,
        reason: InterruptReason,
    ) -> Result<CrawlReport, ApiError> {
        self.store.save(&state.snapshot(&config.identity_hash, tail))?;
        let remaining = state.queue.len() - tail;
        info!(
            reason = %reason,
            expanded,
            remaining,
            checkpoint = %self.store.path().display(),
            "Crawl interrupted"
        );

        Ok(CrawlReport {
            folders: state.folders,
            files: state.files,
            status: CrawlStatus::Interrupted(reason),
            expanded,
            remaining,
            resumed: state.resumed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryTree;
    use tempfile::TempDir;

    fn sample_tree() -> Arc<MemoryTree> {
        let tree = MemoryTree::new(2);
        tree.add_folder("/alpha/pending");
        tree.add_folder("/alpha/photos/new");
        tree.add_file("/alpha/photos/cat.jpg");
        tree.add_folder("/beta");
        tree.add_file("/readme.txt");
        Arc::new(tree)
    }

    fn engine(tree: &Arc<MemoryTree>, dir: &TempDir) -> CrawlEngine {
        let fetcher: Arc<dyn PageFetcher> = tree.clone();
        CrawlEngine::new(fetcher, CheckpointStore::new(dir.path().join("ckpt.json")))
    }

    #[tokio::test]
    async fn test_full_crawl_builds_paths() {
        let tree = sample_tree();
        let dir = TempDir::new().unwrap();
        let config = CrawlConfig::new(CommandKind::ListFiles, "h");

        let report = engine(&tree, &dir)
            .run(&config, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.status, CrawlStatus::Completed);
        let folder_paths: Vec<_> = report.folders.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            folder_paths,
            vec!["/alpha", "/beta", "/alpha/pending", "/alpha/photos", "/alpha/photos/new"]
        );
        let file_paths: Vec<_> = report.files.iter().map(|f| f.file_path.as_str()).collect();
        assert_eq!(file_paths, vec!["/readme.txt", "/alpha/photos/cat.jpg"]);
        // root, alpha, beta, pending, photos, new
        assert_eq!(report.expanded, 6);
        assert!(!dir.path().join("ckpt.json").exists());
    }

    #[tokio::test]
    async fn test_failure_checkpoints_unexpanded_frontier() {
        let tree = sample_tree();
        let dir = TempDir::new().unwrap();
        let engine = engine(&tree, &dir);
        let beta = tree.id_of("/beta").unwrap();
        tree.fail_node(&beta);

        let config = CrawlConfig::new(CommandKind::ListFolders, "h");
        let err = engine.run(&config, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::RemoteError { status: Some(503), .. }));

        let checkpoint = engine.store().load().unwrap().unwrap();
        assert_eq!(checkpoint.identity_hash, "h");
        assert_eq!(checkpoint.queue[0].id, beta);
        assert_eq!(checkpoint.queue[0].path, "/beta");
        assert!(checkpoint.folders.iter().any(|f| f.path == "/alpha"));
    }

    #[tokio::test]
    async fn test_failed_node_restarts_at_first_page() {
        let tree = sample_tree();
        let dir = TempDir::new().unwrap();
        let engine = engine(&tree, &dir);
        // root has 3 children at page size 2: calls 1 and 2 list the root
        tree.fail_on_call(2);

        let config = CrawlConfig::new(CommandKind::ListFiles, "h");
        assert!(engine.run(&config, &CancellationToken::new()).await.is_err());

        tree.heal();
        let report = engine.run(&config, &CancellationToken::new()).await.unwrap();
        assert_eq!(report.status, CrawlStatus::Completed);
        assert!(report.resumed);

        let calls = tree.calls();
        assert_eq!(calls[2], (NodeId::root(), None));
    }

    #[tokio::test]
    async fn test_batch_cap_interrupts_and_resumes() {
        let tree = sample_tree();
        let dir = TempDir::new().unwrap();
        let engine = engine(&tree, &dir);
        let config = CrawlConfig::new(CommandKind::ListFiles, "h").with_batch_size(4);

        let first = engine.run(&config, &CancellationToken::new()).await.unwrap();
        assert_eq!(
            first.status,
            CrawlStatus::Interrupted(InterruptReason::BatchLimit)
        );
        // root, alpha, beta, pending; photos is still queued
        assert_eq!(first.expanded, 4);
        assert_eq!(first.remaining, 1);

        let second = engine.run(&config, &CancellationToken::new()).await.unwrap();
        assert_eq!(second.status, CrawlStatus::Completed);
        assert_eq!(second.expanded, 2);
        assert_eq!(tree.expansions().len(), 6);
    }

    #[tokio::test]
    async fn test_cap_reached_on_last_node_completes() {
        let tree = Arc::new(MemoryTree::new(10));
        tree.add_file("/only.txt");
        let dir = TempDir::new().unwrap();
        let config = CrawlConfig::new(CommandKind::ListFiles, "h").with_batch_size(1);

        let report = engine(&tree, &dir)
            .run(&config, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.status, CrawlStatus::Completed);
    }

    #[tokio::test]
    async fn test_stale_checkpoint_is_ignored() {
        let tree = sample_tree();
        let dir = TempDir::new().unwrap();
        let engine = engine(&tree, &dir);
        let stale = Checkpoint::new(
            "other",
            vec![QueueItem {
                id: NodeId::new("999"),
                path: "/gone".to_string(),
            }],
            Vec::new(),
            Vec::new(),
        );
        engine.store().save(&stale).unwrap();

        let config = CrawlConfig::new(CommandKind::ListFiles, "h");
        let report = engine.run(&config, &CancellationToken::new()).await.unwrap();
        assert!(!report.resumed);
        assert_eq!(tree.expansions()[0], NodeId::root());
    }

    #[tokio::test]
    async fn test_cancel_before_start_saves_root() {
        let tree = sample_tree();
        let dir = TempDir::new().unwrap();
        let engine = engine(&tree, &dir);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let config = CrawlConfig::new(CommandKind::ListFiles, "h");
        let report = engine.run(&config, &cancel).await.unwrap();
        assert_eq!(
            report.status,
            CrawlStatus::Interrupted(InterruptReason::Cancelled)
        );
        assert!(tree.calls().is_empty());
        let checkpoint = engine.store().load().unwrap().unwrap();
        assert_eq!(checkpoint.queue, vec![config.root.clone()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_expansions() {
        let tree = sample_tree();
        let dir = TempDir::new().unwrap();
        let config = CrawlConfig::new(CommandKind::ListFiles, "h")
            .with_delay(Duration::from_millis(500));

        let started = tokio::time::Instant::now();
        let report = engine(&tree, &dir)
            .run(&config, &CancellationToken::new())
            .await
            .unwrap();

        // no delay before the first of six expansions
        assert_eq!(report.expanded, 6);
        assert!(started.elapsed() >= Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_cuts_delay_short() {
        let tree = sample_tree();
        let dir = TempDir::new().unwrap();
        let engine = engine(&tree, &dir);
        let config = CrawlConfig::new(CommandKind::ListFiles, "h")
            .with_delay(Duration::from_secs(3600));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = tokio::time::Instant::now();
        let report = engine.run(&config, &cancel).await.unwrap();
        assert_eq!(
            report.status,
            CrawlStatus::Interrupted(InterruptReason::Cancelled)
        );
        assert_eq!(report.expanded, 1);
        assert!(started.elapsed() < Duration::from_secs(3600));
        assert_eq!(engine.store().load().unwrap().unwrap().queue.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_entry_types_are_skipped() {
        let tree = Arc::new(MemoryTree::new(10));
        tree.add_entry("/link", EntryKind::Other("web_link".to_string()), Vec::new());
        tree.add_file("/a.txt");
        let dir = TempDir::new().unwrap();

        let config = CrawlConfig::new(CommandKind::ListFiles, "h");
        let report = engine(&tree, &dir)
            .run(&config, &CancellationToken::new())
            .await
            .unwrap();
        assert!(report.folders.is_empty());
        assert_eq!(report.files.len(), 1);
    }
}
