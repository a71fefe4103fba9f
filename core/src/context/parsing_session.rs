//! Line-feeding entry point for one logical log stream.

use arenalog_types::{DEFAULT_YEAR, LogFormat, ParserConfig};
use serde::Serialize;

use crate::arena_match::{MalformedMatch, Match, build_match};
use crate::combat_log::{LineDeduplicator, parse_line};
use crate::events::EventClassifier;
use crate::segment::{Segment, Segmenter};

/// Receives every match the parser emits.
pub trait MatchHandler {
    fn on_match_ended(&mut self, m: &Match);
    fn on_match_malformed(&mut self, m: &MalformedMatch);
}

#[derive(Debug, Clone)]
pub enum ParserOutput {
    Match(Box<Match>),
    Malformed(MalformedMatch),
}

impl ParserOutput {
    pub fn id(&self) -> &str {
        match self {
            ParserOutput::Match(m) => &m.id,
            ParserOutput::Malformed(m) => &m.id,
        }
    }

    pub fn as_match(&self) -> Option<&Match> {
        match self {
            ParserOutput::Match(m) => Some(m),
            ParserOutput::Malformed(_) => None,
        }
    }

    pub fn as_malformed(&self) -> Option<&MalformedMatch> {
        match self {
            ParserOutput::Match(_) => None,
            ParserOutput::Malformed(m) => Some(m),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParserStats {
    pub lines_seen: u64,
    pub lines_deduplicated: u64,
    /// Lines that failed to tokenize or classify, inside or outside matches.
    pub lines_not_parsed: u64,
    pub matches: u64,
    pub malformed: u64,
}

/// Parser for one stream of log lines.
///
/// Independent streams need independent instances; nothing is shared
/// between them.
pub struct ArenaLogParser {
    config: ParserConfig,
    classifier: EventClassifier,
    dedup: Option<LineDeduplicator>,
    segmenter: Segmenter,
    handlers: Vec<Box<dyn MatchHandler + Send>>,
    stats: ParserStats,
}

impl ArenaLogParser {
    pub fn new(config: ParserConfig) -> Self {
        let format = config.log_format;
        Self {
            classifier: EventClassifier::new(format),
            dedup: format.needs_dedup().then(LineDeduplicator::new),
            segmenter: Segmenter::new(),
            handlers: Vec::new(),
            stats: ParserStats::default(),
            config,
        }
    }

    pub fn with_format(format: LogFormat) -> Self {
        Self::new(ParserConfig::with_format(format))
    }

    pub fn format(&self) -> LogFormat {
        self.classifier.format()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Register an output channel for completed and malformed matches.
    pub fn add_handler(&mut self, handler: Box<dyn MatchHandler + Send>) {
        self.handlers.push(handler);
    }

    /// Feed one raw line. Returns the matches this line completed, which
    /// have also been passed to every handler.
    pub fn push_line(&mut self, line: &str) -> Vec<ParserOutput> {
        let raw = line.trim_end_matches(['\r', '\n']);
        if raw.trim().is_empty() {
            return Vec::new();
        }
        self.stats.lines_seen += 1;

        if let Some(dedup) = &mut self.dedup
            && !dedup.accept(raw)
        {
            self.stats.lines_deduplicated += 1;
            return Vec::new();
        }

        let event = match parse_line(raw, self.config.default_year) {
            Ok(parsed) => self.classifier.classify(parsed),
            Err(e) => {
                tracing::trace!(error = %e, line = raw, "Unparsable line");
                None
            }
        };

        match event {
            Some(event) => match self.segmenter.push(event) {
                Some(segment) => self.emit(segment),
                None => Vec::new(),
            },
            None => {
                self.stats.lines_not_parsed += 1;
                self.segmenter.push_unparsed(raw);
                Vec::new()
            }
        }
    }

    /// Signal end of input. An open match is emitted as malformed.
    /// Calling it again yields nothing.
    pub fn flush(&mut self) -> Vec<ParserOutput> {
        if let Some(dedup) = &mut self.dedup {
            dedup.reset();
        }
        match self.segmenter.flush() {
            Some(segment) => self.emit(segment),
            None => Vec::new(),
        }
    }

    fn emit(&mut self, segment: Segment) -> Vec<ParserOutput> {
        let output = match build_match(segment, self.format()) {
            Ok(m) => {
                self.stats.matches += 1;
                for handler in &mut self.handlers {
                    handler.on_match_ended(&m);
                }
                ParserOutput::Match(Box::new(m))
            }
            Err(malformed) => {
                self.stats.malformed += 1;
                for handler in &mut self.handlers {
                    handler.on_match_malformed(&malformed);
                }
                ParserOutput::Malformed(malformed)
            }
        };
        vec![output]
    }
}

/// Pick the log format from a `COMBAT_LOG_VERSION` header line.
///
/// `PROJECT_ID` 1 is the retail client and any other project a classic
/// one. Without a project id, build major 9 and later is retail.
pub fn detect_log_format(header: &str) -> Option<LogFormat> {
    let line = parse_line(header, DEFAULT_YEAR).ok()?;
    if line.event_kind != "COMBAT_LOG_VERSION" {
        return None;
    }

    let mut project_id = None;
    let mut build_major = None;
    // Version number first, then key/value pairs
    let mut i = 1;
    while i + 1 < line.len() {
        match line.str_at(i) {
            Some("PROJECT_ID") => project_id = line.i64_at(i + 1),
            Some("BUILD_VERSION") => {
                build_major = line
                    .id_at(i + 1)
                    .and_then(|v| v.split('.').next().and_then(|m| m.parse::<u32>().ok()));
            }
            _ => {}
        }
        i += 2;
    }

    let format = match (project_id, build_major) {
        (Some(1), _) => LogFormat::Retail,
        (Some(_), _) => LogFormat::Classic,
        (None, Some(major)) if major >= 9 => LogFormat::Retail,
        (None, Some(_)) => LogFormat::Classic,
        (None, None) => return None,
    };
    tracing::debug!(?project_id, ?build_major, %format, "Detected log format");
    Some(format)
}
