//! Remote listing
//!
//! A `PageFetcher` lists the children of one folder a page at a time. The crawl
//! drains every page of a node before recording any of its children.

pub mod box_api;
pub mod memory;

use crate::error::ApiError;
use crate::types::{NodeId, Page, RawEntry};
use async_trait::async_trait;
use tracing::debug;

pub use box_api::BoxApiClient;
pub use memory::MemoryTree;

/// Paginated "list children of a folder" capability
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page of children of `node_id`. `cursor` is `None` for the first
    /// page and the previous page's `next_cursor` afterwards.
    async fn fetch(&self, node_id: &NodeId, cursor: Option<&str>) -> Result<Page, ApiError>;
}

/// All children of a node, in page order.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub entries: Vec<RawEntry>,
    pub pages: usize,
}

/// Fetch every page of `node_id`. Any failure abandons the node; nothing from the
/// pages already fetched is returned.
pub async fn fetch_all(fetcher: &dyn PageFetcher, node_id: &NodeId) -> Result<Listing, ApiError> {
    let mut listing = Listing::default();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetcher.fetch(node_id, cursor.as_deref()).await?;
        listing.pages += 1;
        listing.entries.extend(page.entries);

        match page.next_cursor.filter(|c| !c.is_empty()) {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    debug!(
        node_id = %node_id,
        pages = listing.pages,
        entries = listing.entries.len(),
        "Listed folder"
    );
    Ok(listing)
}
