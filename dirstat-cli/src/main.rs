mod ui;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use color_eyre::{Result, eyre::eyre};
use dirstat_core::{Analyzer, ScanMessage, Stats, WalkConfig, parse_size};
use tracing::Level;

use ui::{StatusLine, write_json, write_table};

/// Patterns excluded unless `--exclude` is given (dropped in `--dirs` mode)
const DEFAULT_EXCLUDES: [&str; 2] = [r".*\.git/.*", r".*node_modules/.*"];

/// Redraw cadence of the status line
const STATUS_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// dirstat - analyze directory contents and report statistics by file extension
#[derive(Parser, Debug)]
#[command(name = "dirstat")]
#[command(about = "Analyze directory contents and report statistics by file extension")]
#[command(
    long_about = "Analyze directory contents and report statistics by file extension.\n\n\
    The default mode reports per-extension totals and the largest files. \
    Use --dirs to aggregate by directory instead."
)]
#[command(version)]
struct Args {
    /// Directory to analyze (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// File suffixes to include (e.g. .go,.md). Prefix with '!' to exclude (e.g. !.log,!_test.go)
    #[arg(short = 'x', long = "ext", value_delimiter = ',', allow_hyphen_values = true)]
    extensions: Vec<String>,

    /// Minimum file size (e.g. 1KB, 2MiB)
    #[arg(long, default_value = "0", value_parser = parse_min_size)]
    min_size: u64,

    /// Number of top entries to display
    #[arg(short, long, default_value_t = 10)]
    top: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Regex patterns to exclude [default: .*\.git/.*,.*node_modules/.*]
    #[arg(short, long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Maximum traversal depth (0 = unlimited)
    #[arg(short, long, default_value_t = 0)]
    depth: usize,

    /// Analyze directories instead of individual files
    #[arg(long)]
    dirs: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Number of parallel threads (0 = auto)
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,
}

impl Args {
    fn walk_config(&self) -> WalkConfig {
        let excludes = match &self.exclude {
            Some(patterns) => patterns.clone(),
            None if self.dirs => Vec::new(),
            None => DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect(),
        };

        WalkConfig::new(&self.path)
            .with_suffixes(&self.extensions)
            .with_exclude_patterns(excludes)
            .with_min_size(self.min_size)
            .with_max_depth(self.depth)
            .with_directory_mode(self.dirs)
            .with_top_n(self.top)
            .with_threads(self.threads)
    }

    fn show_status(&self) -> bool {
        self.output == OutputFormat::Table && !self.debug && io::stderr().is_terminal()
    }
}

fn parse_min_size(value: &str) -> std::result::Result<u64, String> {
    parse_size(value).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.debug { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .init();

    let stats = if args.show_status() {
        scan_with_status(&args)?
    } else {
        Analyzer::new(args.walk_config()).run()?
    };

    let mut stdout = io::stdout().lock();
    match args.output {
        OutputFormat::Json => write_json(&stats, &mut stdout)?,
        OutputFormat::Table => write_table(&stats, &mut stdout)?,
    }
    stdout.flush()?;

    Ok(())
}

/// Run the scan in the background while redrawing a status line on stderr
fn scan_with_status(args: &Args) -> Result<Stats> {
    let config = args.walk_config().with_progress_interval(STATUS_INTERVAL);
    let (rx, handle) = Analyzer::new(config).spawn();

    let mut status = StatusLine::start(args.dirs)?;
    for msg in rx {
        match msg {
            ScanMessage::Progress(progress) => status.update(&progress)?,
            ScanMessage::Finalizing => {}
            ScanMessage::Completed | ScanMessage::Cancelled | ScanMessage::Error(_) => break,
        }
    }
    status.finish()?;

    let stats = handle
        .join()
        .map_err(|_| eyre!("scan thread panicked"))??;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["dirstat"]);
        let config = args.walk_config();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.top_n, 10);
        assert_eq!(config.exclude_patterns, DEFAULT_EXCLUDES.to_vec());
        assert_eq!(config.min_size, 0);
        assert!(!config.directory_mode);
    }

    #[test]
    fn test_dirs_mode_drops_default_excludes() {
        let args = Args::parse_from(["dirstat", "--dirs", "src"]);
        let config = args.walk_config();
        assert!(config.exclude_patterns.is_empty());
        assert!(config.directory_mode);
        assert_eq!(config.root, PathBuf::from("src"));

        let args = Args::parse_from(["dirstat", "--dirs", "-e", "target"]);
        assert_eq!(args.walk_config().exclude_patterns, vec!["target"]);
    }

    #[test]
    fn test_suffixes_and_sizes() {
        let args = Args::parse_from([
            "dirstat",
            "-x",
            ".go,!_test.go",
            "--min-size",
            "1KB",
            "-d",
            "3",
            "-o",
            "json",
        ]);
        let config = args.walk_config();
        assert_eq!(config.include_suffixes, vec![".go"]);
        assert_eq!(config.exclude_suffixes, vec!["_test.go"]);
        assert_eq!(config.min_size, 1_000);
        assert_eq!(config.max_depth, 3);
        assert_eq!(args.output, OutputFormat::Json);
        assert!(!args.show_status());
    }

    #[test]
    fn test_bad_min_size_rejected() {
        assert!(Args::try_parse_from(["dirstat", "--min-size", "lots"]).is_err());
        assert!(Args::try_parse_from(["dirstat", "-o", "yaml"]).is_err());
    }
}
