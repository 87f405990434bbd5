//! Boxwalk CLI Binary
//!
//! Command-line interface for the Box folder tree inventory.

use boxwalk::logging::init_logging;
use boxwalk::tooling::cli::{Cli, CliContext, EXIT_ERROR};
use clap::Parser;
use owo_colors::OwoColorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    let context = match CliContext::new(cli.config.clone(), cli.credentials.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {}", "Error loading configuration:".red(), e);
            process::exit(EXIT_ERROR);
        }
    };

    let logging = cli.logging_config(&context.config().logging);
    if let Err(e) = init_logging(Some(&logging)) {
        eprintln!("{} {}", "Error initializing logging:".red(), e);
        process::exit(EXIT_ERROR);
    }

    match context.execute(&cli.command) {
        Ok(output) => {
            if !output.body.is_empty() {
                println!("{}", output.body);
            }
            if let Some(notice) = &output.notice {
                eprintln!("{} {}", "warning:".yellow(), notice);
            }
            process::exit(output.exit_code());
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(EXIT_ERROR);
        }
    }
}
