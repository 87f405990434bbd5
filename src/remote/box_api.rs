//! Box folder listing over HTTP.
//!
//! `GET {base_url}/folders/{id}/items` with marker-based pagination. One request
//! per `fetch`; no retries, a failed request ends the crawl at a checkpoint.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::remote::PageFetcher;
use crate::types::{EntryKind, NodeId, Page, RawEntry};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::trace;

const BASE_FIELDS: &str = "id,type,name";

/// Longest slice of an error body carried into `RemoteError`.
const MAX_ERROR_BODY: usize = 256;

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(default)]
    total_count: Option<u64>,
    #[serde(default)]
    entries: Vec<ItemEntry>,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ItemEntry {
    #[serde(rename = "type")]
    kind: String,
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Authenticated Box API client
pub struct BoxApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    page_size: u32,
    include_tags: bool,
}

impl BoxApiClient {
    /// Build a client with the configured timeout. `token` is an opaque bearer token.
    pub fn new(config: &ApiConfig, token: String, include_tags: bool) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            page_size: config.page_size,
            include_tags,
        })
    }

    fn items_url(&self, node_id: &NodeId) -> String {
        format!("{}/folders/{}/items", self.base_url, node_id)
    }

    fn fields(&self) -> String {
        if self.include_tags {
            format!("{},tags", BASE_FIELDS)
        } else {
            BASE_FIELDS.to_string()
        }
    }
}

/// Decode one `items` response body into a page.
pub fn parse_page(body: &[u8]) -> Result<Page, ApiError> {
    let reply: ItemsResponse = serde_json::from_slice(body)
        .map_err(|e| ApiError::remote(None, format!("Malformed listing response: {}", e)))?;

    trace!(
        total = ?reply.total_count,
        entries = reply.entries.len(),
        "Decoded listing page"
    );

    let entries = reply
        .entries
        .into_iter()
        .map(|e| RawEntry {
            kind: EntryKind::parse(&e.kind),
            id: NodeId::new(e.id),
            name: e.name,
            tags: e.tags.unwrap_or_default(),
        })
        .collect();

    Ok(Page {
        entries,
        next_cursor: reply.next_marker.filter(|m| !m.is_empty()),
    })
}

#[async_trait]
impl PageFetcher for BoxApiClient {
    async fn fetch(&self, node_id: &NodeId, cursor: Option<&str>) -> Result<Page, ApiError> {
        let mut query: Vec<(&str, String)> = vec![
            ("fields", self.fields()),
            ("limit", self.page_size.to_string()),
            ("usemarker", "true".to_string()),
        ];
        if let Some(marker) = cursor {
            query.push(("marker", marker.to_string()));
        }

        let response = self
            .http
            .get(self.items_url(node_id))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let snippet: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(ApiError::remote(
                Some(status.as_u16()),
                format!("Error listing folder {} ({}): {}", node_id, status, snippet),
            ));
        }

        parse_page(&body)
    }
}
