//! Configuration
//!
//! Layered settings: built-in defaults, an optional config file, then `BOXWALK__*`
//! environment variables. CLI flags are applied on top by the caller.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.box.com/2.0";
pub const DEFAULT_TOKEN_URL: &str = "https://api.box.com/oauth2/token";
pub const DEFAULT_PAGE_SIZE: u32 = 128;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_DELAY_MS: u64 = 500;
pub const DEFAULT_CHECKPOINT: &str = ".checkpoint";
pub const DEFAULT_CREDENTIALS: &str = ".credentials.json";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxwalkConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub crawl: CrawlSettings,

    /// Credentials file; defaults to `.credentials.json` in the working directory.
    #[serde(default = "default_credentials")]
    pub credentials: PathBuf,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for BoxwalkConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            crawl: CrawlSettings::default(),
            credentials: default_credentials(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Remote API endpoints and transport limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Entries requested per listing page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Client-side timeout for every HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_url: default_token_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Crawl pacing and persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSettings {
    /// Delay between listing calls, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Folder expansions per run; 0 means unbounded
    #[serde(default)]
    pub batch_size: u32,

    #[serde(default = "default_checkpoint")]
    pub checkpoint: PathBuf,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            batch_size: 0,
            checkpoint: default_checkpoint(),
        }
    }
}

impl BoxwalkConfig {
    /// Reject values that would make a crawl meaningless.
    pub fn validate(&self) -> Result<(), String> {
        if self.api.page_size == 0 {
            return Err("api.page_size must be positive".to_string());
        }
        if self.api.timeout_secs == 0 {
            return Err("api.timeout_secs must be positive".to_string());
        }
        for (key, url) in [
            ("api.base_url", &self.api.base_url),
            ("api.token_url", &self.api.token_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("{} must be an http(s) URL, got {}", key, url));
            }
        }
        if self.crawl.checkpoint.as_os_str().is_empty() {
            return Err("crawl.checkpoint must not be empty".to_string());
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_checkpoint() -> PathBuf {
    PathBuf::from(DEFAULT_CHECKPOINT)
}

fn default_credentials() -> PathBuf {
    PathBuf::from(DEFAULT_CREDENTIALS)
}
