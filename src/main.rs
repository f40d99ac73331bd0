//! pathdex - A flat file-path index with fast substring lookups
//!
//! pathdex provides:
//! - Parallel, fault-tolerant crawling of every ready volume
//! - A JSON snapshot that is loaded instead of re-crawling
//! - Case-insensitive substring search with highlight spans
//! - Unified output formats (raw/md/jsonl/json)

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod core;
mod crawl;
mod orchestrator;
mod search;
mod store;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    cli::run(cli)
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}
