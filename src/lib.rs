//! Boxwalk: Resumable Inventory of a Box Folder Tree
//!
//! Walks a Box account breadth-first, one folder listing at a time, with a delay
//! between calls. Progress is checkpointed whenever a run stops early so the next
//! invocation picks up where the last one left off. Results are deduplicated by
//! node id and filtered with a small path glob language.

pub mod checkpoint;
pub mod config;
pub mod crawl;
pub mod credentials;
pub mod error;
pub mod glob;
pub mod inventory;
pub mod logging;
pub mod remote;
pub mod tooling;
pub mod types;
