//! CLI Tooling
//!
//! Command-line interface for inventorying a Box account. Each listing command is
//! one crawl invocation: it resumes a matching checkpoint, expands folders up to the
//! batch cap, and prints results only once the whole tree has been walked.

use crate::checkpoint::CheckpointStore;
use crate::config::{BoxwalkConfig, ConfigLoader};
use crate::crawl::{
    identity_hash, CancellationToken, CrawlConfig, CrawlEngine, CrawlReport, CrawlStatus,
};
use crate::credentials::{BoxCredentials, Credentials, TokenEndpoint};
use crate::error::ApiError;
use crate::glob::PathGlob;
use crate::inventory::Inventory;
use crate::logging::LoggingConfig;
use crate::remote::{BoxApiClient, PageFetcher};
use crate::tooling::format::{
    format_files_json, format_files_text, format_folders_json, format_folders_text,
    format_interrupted_json, OutputFormat,
};
use crate::types::CommandKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Exit code for a hard failure.
pub const EXIT_ERROR: i32 = 1;
/// Exit code for a run stopped by the batch cap or Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 3;

/// Boxwalk CLI - resumable inventory of a Box folder tree
#[derive(Parser)]
#[command(name = "boxwalk")]
#[command(version)]
#[command(about = "Resumable, rate-limited inventory of a Box folder tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Credentials file (overrides config)
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply `--log-*` flags on top of the configured logging settings.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List folders whose path matches a glob
    ListFolders(CrawlArgs),
    /// List files whose path matches a glob
    ListFiles(CrawlArgs),
}

impl Commands {
    pub fn kind(&self) -> CommandKind {
        match self {
            Commands::ListFolders(_) => CommandKind::ListFolders,
            Commands::ListFiles(_) => CommandKind::ListFiles,
        }
    }

    pub fn args(&self) -> &CrawlArgs {
        match self {
            Commands::ListFolders(args) | Commands::ListFiles(args) => args,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Path glob: "" (everything), "/", "/a", "/a/", "/a/*" or "/a/**"
    #[arg(default_value = "")]
    pub glob: String,

    /// Checkpoint file (overrides config)
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Ignore any existing checkpoint and start from the root
    #[arg(long)]
    pub no_resume: bool,

    /// Pause between listing calls, e.g. 500ms, 2s, 1m (bare numbers are milliseconds)
    #[arg(long, value_parser = parse_duration)]
    pub delay: Option<Duration>,

    /// Folder expansions per run; 0 means unbounded
    #[arg(long)]
    pub batch_size: Option<u32>,

    /// Request and print tags
    #[arg(long)]
    pub tags: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Parse `500ms`, `2s`, `1.5m`, `1h`, or a bare number of milliseconds.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration: {:?}", s))?;

    let secs = match unit {
        "" | "ms" => value / 1000.0,
        "s" => value,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        other => return Err(format!("unknown duration unit {:?} in {:?}", other, s)),
    };
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration {:?}: {}", s, e))
}

/// Result of a command: what to print and how to exit
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Printed to stdout when non-empty.
    pub body: String,
    /// Warning or informational message for stderr.
    pub notice: Option<String>,
    pub status: CrawlStatus,
}

impl CommandOutput {
    pub fn exit_code(&self) -> i32 {
        match self.status {
            CrawlStatus::Completed => 0,
            CrawlStatus::Interrupted(_) => EXIT_INTERRUPTED,
        }
    }
}

/// Where listings come from
enum Remote {
    /// Authenticate with a credentials file and talk to the Box API.
    Box { credentials: PathBuf },
    /// A ready-made fetcher acting as `account`.
    Fixed {
        fetcher: Arc<dyn PageFetcher>,
        account: String,
    },
}

/// CLI context holding configuration and the remote to crawl
pub struct CliContext {
    config: BoxwalkConfig,
    remote: Remote,
}

impl CliContext {
    /// Create a context that crawls the Box API.
    pub fn new(config_path: Option<PathBuf>, credentials: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        let credentials = credentials.unwrap_or_else(|| config.credentials.clone());
        Ok(Self {
            config,
            remote: Remote::Box { credentials },
        })
    }

    /// Create a context over an existing fetcher, e.g. `remote::MemoryTree`.
    pub fn with_fetcher(
        config: BoxwalkConfig,
        fetcher: Arc<dyn PageFetcher>,
        account: impl Into<String>,
    ) -> Self {
        Self {
            config,
            remote: Remote::Fixed {
                fetcher,
                account: account.into(),
            },
        }
    }

    pub fn config(&self) -> &BoxwalkConfig {
        &self.config
    }

    /// Execute a CLI command on a fresh runtime.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to start async runtime: {}", e)))?;
        runtime.block_on(self.execute_async(command))
    }

    async fn execute_async(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        let kind = command.kind();
        let args = command.args();
        let glob = PathGlob::compile(&args.glob);

        let (fetcher, account) = self.connect(args.tags).await?;

        // Tagged and untagged results must not share a checkpoint.
        let root_spec = if args.tags {
            format!("{} +tags", args.glob)
        } else {
            args.glob.clone()
        };
        let crawl = CrawlConfig::new(kind, identity_hash(kind, &account, &root_spec))
            .with_delay(
                args.delay
                    .unwrap_or_else(|| Duration::from_millis(self.config.crawl.delay_ms)),
            )
            .with_batch_size(args.batch_size.unwrap_or(self.config.crawl.batch_size))
            .with_restart(args.no_resume);

        let checkpoint = args
            .checkpoint
            .clone()
            .unwrap_or_else(|| self.config.crawl.checkpoint.clone());
        let engine = CrawlEngine::new(fetcher, CheckpointStore::new(checkpoint));

        let cancel = CancellationToken::new();
        let ctrl_c = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping after the current folder");
                    cancel.cancel();
                }
            })
        };
        let result = engine.run(&crawl, &cancel).await;
        ctrl_c.abort();

        render(kind, args, &glob, &engine, result?)
    }

    async fn connect(&self, include_tags: bool) -> Result<(Arc<dyn PageFetcher>, String), ApiError> {
        match &self.remote {
            Remote::Fixed { fetcher, account } => Ok((Arc::clone(fetcher), account.clone())),
            Remote::Box { credentials } => {
                let credentials = BoxCredentials::load(credentials)?;
                let endpoint = TokenEndpoint::new(&self.config.api)?;
                let token = credentials.authenticate(&endpoint).await?;
                if !token.is_valid() {
                    return Err(ApiError::AuthError(
                        "Access token is empty or about to expire".to_string(),
                    ));
                }
                info!(expires_at = %token.expires_at(), "Authenticated");

                let client =
                    BoxApiClient::new(&self.config.api, token.secret().to_string(), include_tags)?;
                Ok((Arc::new(client), credentials.fingerprint()))
            }
        }
    }
}

fn render(
    kind: CommandKind,
    args: &CrawlArgs,
    glob: &PathGlob,
    engine: &CrawlEngine,
    report: CrawlReport,
) -> Result<CommandOutput, ApiError> {
    if let CrawlStatus::Interrupted(reason) = report.status {
        let notice = format!(
            "Crawl interrupted ({}): expanded {} folders, {} remaining. Re-run to resume from {}",
            reason,
            report.expanded,
            report.remaining,
            engine.store().path().display()
        );
        let body = match args.format {
            OutputFormat::Json => {
                format_interrupted_json(&reason.to_string(), report.expanded, report.remaining)?
            }
            OutputFormat::Text => String::new(),
        };
        return Ok(CommandOutput {
            body,
            notice: Some(notice),
            status: report.status,
        });
    }

    let status = report.status;
    let inventory = Inventory::from_report(report);
    let (body, matched, noun) = match kind {
        CommandKind::ListFolders => {
            let folders = inventory.folders_matching(glob);
            let body = match args.format {
                OutputFormat::Json => format_folders_json(&folders)?,
                OutputFormat::Text if folders.is_empty() => String::new(),
                OutputFormat::Text => format_folders_text(&folders, args.tags),
            };
            (body, folders.len(), "folders")
        }
        CommandKind::ListFiles => {
            let files = inventory.files_matching(glob);
            let body = match args.format {
                OutputFormat::Json => format_files_json(&files)?,
                OutputFormat::Text if files.is_empty() => String::new(),
                OutputFormat::Text => format_files_text(&files, args.tags),
            };
            (body, files.len(), "files")
        }
    };

    let notice = (matched == 0).then(|| format!("No {} matched {:?}", noun, args.glob));
    Ok(CommandOutput {
        body,
        notice,
        status,
    })
}
