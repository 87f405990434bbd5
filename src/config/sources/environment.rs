//! Environment variable source: BOXWALK prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `BOXWALK__CRAWL__DELAY_MS=100` sets `crawl.delay_ms`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("BOXWALK")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
