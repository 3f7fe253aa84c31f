//! CLI entry point for the cloc line counter.
//!
//! This binary counts blank, comment and code lines in source trees and
//! prints the totals per language or per file.
//!
//! # Usage
//!
//! ```bash
//! cloc [OPTIONS] [PATHS]...
//!
//! # Count a tree, skipping build output
//! cloc -x target -x node_modules .
//!
//! # One row per file, sorted by path, as CSV
//! cloc --by-file --sort name --format csv src
//!
//! # Settings from a JSON file, overridden by flags
//! cloc --config cloc.json -j 4
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::fmt::Write as _;
use std::io::Write;

use camino::Utf8PathBuf;
use cloc_core::{Config, DistributorKind, ReportMode, SortKey, StatsRow};
use cloc_scanner::{Report, ScanResult, Scanner};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Count blank, comment and code lines in source files.
///
/// Directories are searched recursively. Files are recognised by extension;
/// anything else is skipped.
#[derive(Debug, Parser)]
#[command(name = "cloc", version, about, long_about = None)]
struct Cli {
    /// Files or directories to count.
    #[arg(value_name = "PATHS")]
    paths: Vec<Utf8PathBuf>,

    /// Skip directories with this name, or this exact directory.
    #[arg(short = 'x', long = "exclude", value_name = "DIR")]
    exclude: Vec<String>,

    /// Number of worker threads.
    ///
    /// Defaults to one per core, capped at the number of files found.
    #[arg(short = 'j', long, value_name = "N", env = "CLOC_THREADS")]
    threads: Option<usize>,

    /// Count on the calling thread only.
    #[arg(short = 's', long = "single-thread")]
    single_thread: bool,

    /// Report one row per file instead of per language.
    #[arg(short = 'f', long)]
    by_file: bool,

    /// Row order.
    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Hand out files through a mutex instead of the lock-free cursor.
    #[arg(long)]
    locked: bool,

    /// Follow symbolic links.
    #[arg(short = 'L', long)]
    follow_links: bool,

    /// Read size per file, in bytes.
    #[arg(long, value_name = "BYTES")]
    chunk_size: Option<usize>,

    /// Capacity of the arena holding file records, in bytes.
    #[arg(long, value_name = "BYTES")]
    arena_size: Option<usize>,

    /// JSON configuration file; flags override its values.
    #[arg(long, value_name = "FILE", env = "CLOC_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
}

/// Row order accepted by `--sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    /// Most code lines first.
    Code,
    /// Most total lines first.
    Lines,
    /// Most files first.
    Files,
    /// Alphabetical by label.
    Name,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Code => Self::Code,
            SortArg::Lines => Self::Lines,
            SortArg::Files => Self::Files,
            SortArg::Name => Self::Name,
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned columns with a summary footer.
    Table,
    /// Pretty-printed JSON of the whole result.
    Json,
    /// Comma-separated values.
    Csv,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `warn` level by default.
/// Logs go to stderr so stdout carries only the report.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the optional config file and CLI arguments.
///
/// Flags win over the file. Validation happens when the scanner is built,
/// so every problem is reported at once.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            debug!(path = %path, "Loading configuration file");
            Config::from_json_file(path)?
        }
        None => Config::default(),
    };

    let scan = &mut config.scan;
    if !cli.paths.is_empty() {
        scan.inputs.clone_from(&cli.paths);
    }
    scan.exclude.extend(cli.exclude.iter().cloned());
    if cli.threads.is_some() {
        scan.threads = cli.threads;
    }
    scan.single_threaded |= cli.single_thread;
    scan.follow_links |= cli.follow_links;
    if let Some(bytes) = cli.chunk_size {
        scan.chunk_size = bytes;
    }
    if let Some(bytes) = cli.arena_size {
        scan.arena_capacity = bytes;
    }
    if cli.locked {
        scan.distributor = DistributorKind::Locked;
    }

    if cli.by_file {
        config.report.mode = ReportMode::Files;
    }
    if let Some(sort) = cli.sort {
        config.report.sort = sort.into();
    }

    Ok(config)
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Width of each numeric column in the table.
const COLUMN: usize = 11;

/// Renders the report as aligned columns.
fn render_table(report: &Report) -> String {
    let heading = match report.mode {
        ReportMode::Languages => "Language",
        ReportMode::Files => "File",
    };
    let width = report
        .rows
        .iter()
        .map(|row| row.label.len())
        .chain([heading.len(), report.total.label.len()])
        .max()
        .unwrap_or_default();
    let rule = "-".repeat(width + 4 * COLUMN);

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{heading:<width$}{:>COLUMN$}{:>COLUMN$}{:>COLUMN$}{:>COLUMN$}",
        "Files", "Blank", "Comment", "Code"
    );
    let _ = writeln!(output, "{rule}");
    for row in &report.rows {
        write_table_row(&mut output, row, width);
    }
    let _ = writeln!(output, "{rule}");
    write_table_row(&mut output, &report.total, width);
    output
}

fn write_table_row(output: &mut String, row: &StatsRow, width: usize) {
    let stats = &row.stats;
    let _ = writeln!(
        output,
        "{:<width$}{:>COLUMN$}{:>COLUMN$}{:>COLUMN$}{:>COLUMN$}",
        row.label, stats.files, stats.blank, stats.comment, stats.code
    );
}

/// Summarises run throughput below the table.
fn render_footer(result: &ScanResult) -> String {
    let progress = &result.progress;
    let mut footer = format!(
        "{} files, {} lines in {:.3}s ({:.1} MB/s, {:.0} lines/s) on {} thread{}",
        progress.files,
        progress.lines,
        result.elapsed.as_secs_f64(),
        progress.megabytes_per_second(result.elapsed),
        progress.lines_per_second(result.elapsed),
        result.threads,
        if result.threads == 1 { "" } else { "s" },
    );
    if progress.unreadable > 0 {
        let _ = write!(footer, "; {} unreadable", progress.unreadable);
    }
    footer
}

/// Renders the report as CSV, total row last.
fn render_csv(report: &Report) -> String {
    let mut output = String::from("label,language,files,blank,comment,code\n");

    for row in report.rows.iter().chain([&report.total]) {
        let label = escape_csv(&row.label);
        let language = row.language.map(|language| escape_csv(language.name())).unwrap_or_default();
        let stats = &row.stats;

        // Use write! to avoid extra allocation from format!
        let _ = writeln!(
            output,
            "{label},{language},{},{},{},{}",
            stats.files, stats.blank, stats.comment, stats.code
        );
    }

    output
}

/// Escapes a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_owned()
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Merge configuration and validate it
    let config = build_config(&cli)?;
    let scanner = Scanner::new(config.scan)?;

    // 5. Count and render
    let result = scanner.scan_with(config.report)?;
    info!(rows = result.report.rows.len(), format = ?cli.format, "Rendering report");

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match cli.format {
        OutputFormat::Table => {
            write!(handle, "{}", render_table(&result.report))?;
            writeln!(handle)?;
            writeln!(handle, "{}", render_footer(&result))?;
        }
        OutputFormat::Json => writeln!(handle, "{}", serde_json::to_string_pretty(&result)?)?,
        OutputFormat::Csv => write!(handle, "{}", render_csv(&result.report))?,
    }
    handle.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use cloc_core::{Language, Stats};

    use super::*;

    fn stats(files: u64, blank: u64, comment: u64, code: u64) -> Stats {
        Stats { blank, comment, code, files }
    }

    fn report() -> Report {
        Report {
            mode: ReportMode::Languages,
            sort: SortKey::Code,
            rows: vec![
                StatsRow::for_language(Language::C, stats(2, 1, 2, 35)),
                StatsRow::for_language(Language::Rust, stats(1, 10, 10, 20)),
            ],
            total: StatsRow::total(stats(3, 11, 12, 55)),
        }
    }

    #[test]
    fn test_render_table() {
        insta::assert_snapshot!(render_table(&report()).trim_end(), @r"
        Language      Files      Blank    Comment       Code
        ----------------------------------------------------
        C                 2          1          2         35
        Rust              1         10         10         20
        ----------------------------------------------------
        Total             3         11         12         55
        ");
    }

    #[test]
    fn test_render_table_widens_for_paths() {
        let mut report = report();
        report.mode = ReportMode::Files;
        report.rows = vec![StatsRow::for_file("/src/a_long_name.c", Language::C, stats(1, 0, 0, 7))];
        report.total = StatsRow::total(stats(1, 0, 0, 7));

        let table = render_table(&report);
        let widths: Vec<_> = table.lines().map(str::len).collect();
        assert!(widths.iter().all(|&width| width == "/src/a_long_name.c".len() + 4 * COLUMN));
        assert!(table.starts_with("File "));
    }

    #[test]
    fn test_render_csv() {
        let mut report = report();
        report.rows.push(StatsRow::for_file("/odd,name.c", Language::C, stats(1, 0, 0, 1)));

        insta::assert_snapshot!(render_csv(&report).trim_end(), @r#"
        label,language,files,blank,comment,code
        C,C,2,1,2,35
        Rust,Rust,1,10,10,20
        "/odd,name.c",C,1,0,0,1
        Total,,3,11,12,55
        "#);
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "cloc", "-x", "target", "-x", "vendor", "-j", "3", "-f", "--sort", "name", "--locked",
            "-L", "--chunk-size", "4096", "--arena-size", "1024", "src", "tests",
        ])
        .unwrap();
        let config = build_config(&cli).unwrap();

        assert_eq!(config.scan.inputs, [Utf8PathBuf::from("src"), Utf8PathBuf::from("tests")]);
        assert_eq!(config.scan.exclude, ["target", "vendor"]);
        assert_eq!(config.scan.threads, Some(3));
        assert!(config.scan.follow_links);
        assert_eq!(config.scan.chunk_size, 4096);
        assert_eq!(config.scan.arena_capacity, 1024);
        assert_eq!(config.scan.distributor, DistributorKind::Locked);
        assert_eq!(config.report.mode, ReportMode::Files);
        assert_eq!(config.report.sort, SortKey::Name);
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::try_parse_from(["cloc", "."]).unwrap();
        assert_eq!(cli.format, OutputFormat::Table);

        let config = build_config(&cli).unwrap();
        assert_eq!(config.scan.distributor, DistributorKind::LockFree);
        assert_eq!(config.report.mode, ReportMode::Languages);
        assert!(!config.scan.single_threaded);
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        assert!(Cli::try_parse_from(["cloc", "--frobnicate", "."]).is_err());
        assert!(Cli::try_parse_from(["cloc", "--sort", "size", "."]).is_err());
    }
}
