//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::BoxwalkConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from defaults and environment.
    pub fn load() -> Result<BoxwalkConfig, ConfigError> {
        MergeService::load(None)
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<BoxwalkConfig, ConfigError> {
        MergeService::load(Some(path))
    }
}
