//! CLI module - Command-line interface definitions and handlers

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::core::config::{Config, DEFAULT_INDEX_FILE, DEFAULT_MAX_DEPTH};
use crate::core::error::UsageError;
use crate::core::render::{OutputFormat, RenderConfig, Renderer};
use crate::orchestrator::{Orchestrator, StartupReport};

/// Exit code for a rejected query
const EXIT_USAGE: u8 = 2;

/// Why a command stopped early
#[derive(Debug, thiserror::Error)]
enum Failure {
    /// Loading, crawling or saving the index failed
    #[error("Error during indexing: {0:#}")]
    Indexing(anyhow::Error),

    /// Reading queries or writing results failed
    #[error("Error: {0}")]
    Io(#[from] io::Error),
}

impl Failure {
    /// Exit code and stderr message; a closed stdout ends the run quietly
    fn report(&self) -> (ExitCode, Option<String>) {
        match self {
            Failure::Io(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                (ExitCode::SUCCESS, None)
            }
            other => (ExitCode::FAILURE, Some(other.to_string())),
        }
    }
}

/// pathdex - index every file path on the machine and look paths up by substring.
#[derive(Parser, Debug)]
#[command(name = "pathdex")]
#[command(
    author,
    version,
    about,
    long_about = r#"pathdex keeps a flat index of every file path on all ready volumes and
answers case-insensitive substring queries against it.

The first run crawls every volume (or the --root directories) and saves a
snapshot; later runs load the snapshot instead. Use `pathdex index --force`
to rebuild it.

Output formats:
- raw: one path per line, match highlighted (default)
- md: Markdown bullet list, match in bold
- jsonl: one JSON object per line
- json: a single JSON array

Examples:
    pathdex index
    pathdex search report.txt
    pathdex --root ~/Documents --index docs.json search invoice
    pathdex --format jsonl search "2024"
"#
)]
pub struct Cli {
    /// Snapshot file location.
    #[arg(
        long,
        global = true,
        env = "PATHDEX_INDEX",
        default_value = DEFAULT_INDEX_FILE,
        value_name = "PATH",
        long_help = "Location of the persisted index snapshot.\n\n\
If the file exists it is loaded instead of crawling. A file that exists but cannot\n\
be read or parsed is reported as an error; it is never silently replaced."
    )]
    pub index: PathBuf,

    /// Crawl these directories instead of every volume.
    #[arg(
        long = "root",
        global = true,
        value_name = "DIR",
        long_help = "Crawl only the given directory. Repeat to crawl several.\n\n\
If omitted, every ready volume on the host is crawled."
    )]
    pub roots: Vec<PathBuf>,

    /// Maximum directory depth below a root.
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_MAX_DEPTH,
        value_name = "N",
        long_help = "Maximum directory depth below a root. Deeper directories are skipped\n\
and reported as diagnostics."
    )]
    pub max_depth: usize,

    /// Crawl worker threads.
    #[arg(
        long,
        global = true,
        env = "PATHDEX_THREADS",
        value_name = "N",
        long_help = "Number of crawl worker threads.\n\n\
Defaults to the available parallelism, capped at 16."
    )]
    pub threads: Option<usize>,

    /// Output format (raw/md/jsonl/json).
    #[arg(
        long,
        global = true,
        default_value = "raw",
        value_name = "FORMAT",
        long_help = "Select the output format for search results.\n\n\
Supported values:\n\
- raw (default)\n\
- md (markdown)\n\
- jsonl\n\
- json\n\n\
JSON records carry prefix, match, suffix and fullPath fields."
    )]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable the highlight in raw output. This is useful when piping to files or\n\
when your terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (errors only).
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        long_help = "Only report errors on stderr. Results are still printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable detailed diagnostics, including every skipped directory and\n\
crawl statistics. RUST_LOG overrides this when set."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the index, or crawl and save it.
    #[command(
        long_about = "Load the snapshot if present, otherwise crawl and save a new one, then\n\
print how long it took and how many files are indexed.\n\n\
Examples:\n\
  pathdex index\n\
  pathdex index --force\n"
    )]
    Index {
        /// Crawl even when a snapshot exists.
        #[arg(
            long,
            long_help = "Ignore any existing snapshot, crawl, and replace the snapshot wholesale."
        )]
        force: bool,
    },

    /// Find indexed paths containing QUERY.
    #[command(
        long_about = r#"Find indexed paths that contain QUERY (case-insensitive substring match).

Results keep index order. An empty query is rejected with exit code 2.

Examples:
    pathdex search cargo.toml
    pathdex --format md search readme
"#
    )]
    Search {
        /// Substring to look for.
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Read queries from stdin, one per line.
    #[command(
        long_about = "Index once, then treat every line read from stdin as a query.\n\
Empty lines print a warning and are otherwise ignored. The session ends at EOF.\n\n\
Example:\n\
  printf 'report\\ninvoice\\n' | pathdex shell\n"
    )]
    Shell,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            index_location: self.index.clone(),
            roots: self.roots.clone(),
            max_depth: self.max_depth,
            threads: self.threads,
        }
    }

    fn render_config(&self) -> RenderConfig {
        let format: OutputFormat = self.format.parse().unwrap_or_default();
        RenderConfig::new(format)
            .with_pretty(self.pretty)
            .with_color(!self.no_color)
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> ExitCode {
    let renderer = Renderer::with_config(cli.render_config());
    let mut orchestrator = Orchestrator::new(cli.config());

    let outcome = match &cli.command {
        Commands::Index { force } => run_index(&mut orchestrator, *force),
        Commands::Search { query } => run_search(&mut orchestrator, &renderer, query, cli.quiet),
        Commands::Shell => run_shell(&mut orchestrator, &renderer, cli.quiet),
    };

    match outcome {
        Ok(code) => code,
        Err(failure) => {
            let (code, message) = failure.report();
            if let Some(message) = message {
                eprintln!("{message}");
            }
            code
        }
    }
}

fn run_index(orchestrator: &mut Orchestrator, force: bool) -> Result<ExitCode, Failure> {
    let report = if force {
        orchestrator.reindex()
    } else {
        orchestrator.startup()
    }
    .map_err(Failure::Indexing)?;
    log_startup(orchestrator, &report);
    println!("{}", report.summary());
    Ok(ExitCode::SUCCESS)
}

fn run_search(
    orchestrator: &mut Orchestrator,
    renderer: &Renderer,
    query: &str,
    quiet: bool,
) -> Result<ExitCode, Failure> {
    // Rejected before any indexing work
    if query.trim().is_empty() {
        eprintln!("{}", UsageError::EmptyQuery);
        return Ok(ExitCode::from(EXIT_USAGE));
    }

    startup(orchestrator, quiet)?;
    match orchestrator.search(query) {
        Ok(records) => {
            renderer.render_to(&records, io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::from(EXIT_USAGE))
        }
    }
}

fn run_shell(
    orchestrator: &mut Orchestrator,
    renderer: &Renderer,
    quiet: bool,
) -> Result<ExitCode, Failure> {
    startup(orchestrator, quiet)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match orchestrator.search(&line) {
            Ok(records) => {
                let mut out = io::stdout().lock();
                renderer.render_to(&records, &mut out)?;
                out.flush()?;
            }
            Err(err) => eprintln!("{err}"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Load or build the index, reporting the completion notice on stderr
fn startup(orchestrator: &mut Orchestrator, quiet: bool) -> Result<(), Failure> {
    let report = orchestrator.startup().map_err(Failure::Indexing)?;
    log_startup(orchestrator, &report);
    if !quiet {
        eprintln!("{}", report.summary());
    }
    Ok(())
}

fn log_startup(orchestrator: &Orchestrator, report: &StartupReport) {
    tracing::debug!(
        index = %orchestrator.config().index_location.display(),
        source = ?report.source,
        files = report.files,
        "index ready"
    );
    if let Some(crawl) = &report.crawl {
        tracing::debug!(
            roots = crawl.roots.len(),
            roots_skipped = crawl.roots_skipped,
            dirs_skipped = crawl.dirs_skipped,
            "crawl summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["pathdex", "search", "foo"]).unwrap();
        let config = cli.config();

        assert_eq!(config.index_location, PathBuf::from(DEFAULT_INDEX_FILE));
        assert!(config.roots.is_empty());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(cli.render_config().format, OutputFormat::Raw);
        assert!(matches!(cli.command, Commands::Search { ref query } if query == "foo"));
    }

    #[test]
    fn test_cli_repeatable_roots_and_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pathdex", "--root", "/a", "index", "--root", "/b", "--force", "--format", "md",
            "--no-color",
        ])
        .unwrap();

        assert_eq!(cli.config().roots, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        let render = cli.render_config();
        assert_eq!(render.format, OutputFormat::Markdown);
        assert!(!render.color);
        assert!(matches!(cli.command, Commands::Index { force: true }));
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["pathdex", "-q", "-v", "shell"]).is_err());
    }

    #[test]
    fn test_indexing_failure_message() {
        let failure = Failure::Indexing(
            anyhow::anyhow!("index is corrupt").context("Failed to load index from i.json"),
        );
        let (_, message) = failure.report();
        assert_eq!(
            message.as_deref(),
            Some("Error during indexing: Failed to load index from i.json: index is corrupt")
        );
    }

    #[test]
    fn test_io_failure_is_not_an_indexing_error() {
        let failure = Failure::from(io::Error::new(
            io::ErrorKind::InvalidData,
            "stream did not contain valid UTF-8",
        ));
        let (_, message) = failure.report();
        let message = message.unwrap();
        assert!(message.starts_with("Error: "));
        assert!(!message.contains("indexing"));
    }

    #[test]
    fn test_broken_pipe_ends_quietly() {
        let failure = Failure::from(io::Error::from(io::ErrorKind::BrokenPipe));
        let (_, message) = failure.report();
        assert!(message.is_none());
    }

    #[test]
    fn test_unknown_format_falls_back_to_raw() {
        let cli = Cli::try_parse_from(["pathdex", "--format", "xml", "shell"]).unwrap();
        assert_eq!(cli.render_config().format, OutputFormat::Raw);
    }
}
