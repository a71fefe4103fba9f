//! arenalog-parse-worker - Batch parser for arena combat log files.
//!
//! Each file gets its own parser instance; files are processed in
//! parallel. One JSON record per emitted match is written to stdout,
//! followed by one report line per file.
//!
//! Usage: arenalog-parse-worker [--format retail|classic] [--year N] <files>...

use arenalog_core::arena_match::{MalformedMatch, MatchSummary};
use arenalog_core::{
    ArenaLogParser, LogFormat, ParserConfig, ParserConfigExt, ParserOutput, ParserStats,
    detect_log_format,
};
use clap::Parser;
use encoding_rs::UTF_8;
use memchr::memchr_iter;
use memmap2::Mmap;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Extract arena matches from combat log files")]
struct Cli {
    /// Combat log files to parse
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Log format; skips header detection
    #[arg(short, long)]
    format: Option<LogFormat>,

    /// Year for timestamps that carry only month and day
    #[arg(short, long)]
    year: Option<i32>,

    /// Parser config file instead of the user config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Leave malformed matches out of the output
    #[arg(long)]
    matches_only: bool,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record<'a> {
    Match {
        file: &'a str,
        #[serde(flatten)]
        summary: MatchSummary,
    },
    Malformed {
        file: &'a str,
        id: &'a str,
        start_time: i64,
        lines: usize,
        lines_not_parsed: usize,
    },
    Report {
        file: &'a str,
        format: LogFormat,
        stats: ParserStats,
        elapsed_ms: u128,
    },
}

impl<'a> Record<'a> {
    fn malformed(file: &'a str, m: &'a MalformedMatch) -> Self {
        Record::Malformed {
            file,
            id: &m.id,
            start_time: m.start_time,
            lines: m.raw_lines.len(),
            lines_not_parsed: m.lines_not_parsed,
        }
    }
}

struct FileResult {
    format: LogFormat,
    outputs: Vec<ParserOutput>,
    stats: ParserStats,
    elapsed_ms: u128,
}

/// Initialize logging, writing to ARENALOG_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("ARENALOG_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<ParserConfig, String> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::load_from(path).map_err(|e| e.to_string())?,
        None => ParserConfig::load(),
    };
    if let Some(year) = cli.year {
        config.default_year = year;
    }
    if let Some(format) = cli.format {
        config.log_format = format;
        config.detect_format = false;
    }
    Ok(config)
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load config");
            std::process::exit(1);
        }
    };

    let results: Vec<(String, Result<FileResult, String>)> = cli
        .files
        .par_iter()
        .map(|path| (path.display().to_string(), parse_file(path, &config)))
        .collect();

    let mut failed = false;
    for (file, result) in &results {
        match result {
            Ok(result) => print_file(file, result, cli.matches_only),
            Err(e) => {
                tracing::error!(file = %file, error = %e, "Parse error");
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn print_file(file: &str, result: &FileResult, matches_only: bool) {
    for output in &result.outputs {
        let record = match output {
            ParserOutput::Match(m) => Record::Match {
                file,
                summary: m.summary(),
            },
            ParserOutput::Malformed(_) if matches_only => continue,
            ParserOutput::Malformed(m) => Record::malformed(file, m),
        };
        emit(&record);
    }
    emit(&Record::Report {
        file,
        format: result.format,
        stats: result.stats,
        elapsed_ms: result.elapsed_ms,
    });
}

fn emit(record: &Record) {
    match serde_json::to_string(record) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialize record"),
    }
}

fn parse_file(path: &Path, config: &ParserConfig) -> Result<FileResult, String> {
    let timer = std::time::Instant::now();

    let file = File::open(path).map_err(|e| format!("Failed to open file: {}", e))?;
    let mmap = unsafe { Mmap::map(&file).map_err(|e| format!("Failed to mmap: {}", e))? };
    let bytes = mmap.as_ref();

    // Find line boundaries
    let mut line_ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        if end > start {
            line_ranges.push((start, end));
        }
        start = end + 1;
    }
    if start < bytes.len() {
        line_ranges.push((start, bytes.len()));
    }

    let mut file_config = config.clone();
    if config.detect_format
        && let Some(&(start, end)) = line_ranges.first()
    {
        let (header, _, _) = UTF_8.decode(&bytes[start..end]);
        match detect_log_format(&header) {
            Some(format) => file_config.log_format = format,
            None => tracing::debug!(
                file = %path.display(),
                format = %config.log_format,
                "No COMBAT_LOG_VERSION header, using configured format"
            ),
        }
    }

    // Lines must reach the parser in file order
    let mut parser = ArenaLogParser::new(file_config);
    let mut outputs = Vec::new();
    for &(start, end) in &line_ranges {
        let (line, _, had_errors) = UTF_8.decode(&bytes[start..end]);
        if had_errors {
            tracing::trace!(offset = start, "Replaced invalid UTF-8 in line");
        }
        outputs.extend(parser.push_line(&line));
    }
    outputs.extend(parser.flush());

    let stats = parser.stats();
    tracing::info!(
        file = %path.display(),
        lines = stats.lines_seen,
        matches = stats.matches,
        malformed = stats.malformed,
        "Parsed file"
    );

    Ok(FileResult {
        format: parser.format(),
        outputs,
        stats,
        elapsed_ms: timer.elapsed().as_millis(),
    })
}
