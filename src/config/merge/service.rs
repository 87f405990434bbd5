//! MergeService: orchestrates sources, applies merge policy, deserializes to BoxwalkConfig.

use crate::config::sources::{environment, file};
use crate::config::BoxwalkConfig;
use config::ConfigError;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> config file -> environment (highest).
    pub fn load(config_file: Option<&Path>) -> Result<BoxwalkConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = match config_file {
            Some(path) => file::add_to_builder(builder, path)?,
            None => builder,
        };
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        let config: BoxwalkConfig = config.try_deserialize()?;
        config.validate().map_err(ConfigError::Message)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[crawl]\ndelay_ms = 50\nbatch_size = 10\n\n[api]\npage_size = 500"
        )
        .unwrap();

        let config = MergeService::load(Some(file.path())).unwrap();
        assert_eq!(config.crawl.delay_ms, 50);
        assert_eq!(config.crawl.batch_size, 10);
        assert_eq!(config.api.page_size, 500);
        assert_eq!(config.api.timeout_secs, 60);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = MergeService::load(Some(Path::new("/nonexistent/boxwalk.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\npage_size = 0").unwrap();

        let err = MergeService::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }
}
