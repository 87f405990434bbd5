//! Built-in defaults, registered as the lowest-precedence layer.

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_CHECKPOINT, DEFAULT_CREDENTIALS, DEFAULT_DELAY_MS,
    DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_URL,
};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub(crate) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.token_url", DEFAULT_TOKEN_URL)?
        .set_default("api.page_size", DEFAULT_PAGE_SIZE as u64)?
        .set_default("api.timeout_secs", DEFAULT_TIMEOUT_SECS)?
        .set_default("crawl.delay_ms", DEFAULT_DELAY_MS)?
        .set_default("crawl.batch_size", 0u64)?
        .set_default("crawl.checkpoint", DEFAULT_CHECKPOINT)?
        .set_default("credentials", DEFAULT_CREDENTIALS)
}
