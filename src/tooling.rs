//! Tooling & Integration Layer
//!
//! Command-line interface and output formatting over the crawl engine.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, CommandOutput, Commands, CrawlArgs};
pub use format::OutputFormat;
