//! Deduplication and glob filtering of crawl results.
//!
//! Results from resumed runs may repeat a node. `Inventory` collapses them by
//! node id (first occurrence wins), then callers filter and sort for output.

use crate::crawl::CrawlReport;
use crate::glob::PathGlob;
use crate::types::{FileEntry, Folder, Node};
use std::collections::HashSet;

/// Drop repeated node ids, keeping the first occurrence and its position.
pub fn dedupe<T: Node>(nodes: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(nodes.len());
    nodes
        .into_iter()
        .filter(|node| seen.insert(node.node_id().clone()))
        .collect()
}

/// Nodes whose path matches `glob`, in their original relative order.
pub fn filter_by_glob<'a, T: Node>(nodes: &'a [T], glob: &PathGlob) -> Vec<&'a T> {
    nodes
        .iter()
        .filter(|node| glob.matches(node.node_path()))
        .collect()
}

/// Stable sort by path.
pub fn sort_by_path<T: Node>(nodes: &mut [T]) {
    nodes.sort_by(|a, b| a.node_path().cmp(b.node_path()));
}

/// Deduplicated crawl results
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    folders: Vec<Folder>,
    files: Vec<FileEntry>,
}

impl Inventory {
    pub fn new(folders: Vec<Folder>, files: Vec<FileEntry>) -> Self {
        Self {
            folders: dedupe(folders),
            files: dedupe(files),
        }
    }

    pub fn from_report(report: CrawlReport) -> Self {
        Self::new(report.folders, report.files)
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Matching folders, sorted by path.
    pub fn folders_matching(&self, glob: &PathGlob) -> Vec<Folder> {
        let mut matched: Vec<Folder> = filter_by_glob(&self.folders, glob)
            .into_iter()
            .cloned()
            .collect();
        sort_by_path(&mut matched);
        matched
    }

    /// Matching files, sorted by path.
    pub fn files_matching(&self, glob: &PathGlob) -> Vec<FileEntry> {
        let mut matched: Vec<FileEntry> = filter_by_glob(&self.files, glob)
            .into_iter()
            .cloned()
            .collect();
        sort_by_path(&mut matched);
        matched
    }
}
