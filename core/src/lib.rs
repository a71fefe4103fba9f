pub mod arena_match;
pub mod combat_log;
pub mod context;
pub mod error;
pub mod events;
pub mod game_data;
pub mod segment;

// Re-exports for convenience
pub use arena_match::{CombatResult, CombatUnit, MalformedMatch, Match, MatchSummary};
pub use combat_log::{LogLine, ParamValue, parse_line};
pub use context::{
    ArenaLogParser, MatchHandler, ParserConfigExt, ParserOutput, ParserStats, detect_log_format,
};
pub use error::{ConfigError, MatchBuildError, ParseError};
pub use events::{CombatEvent, EventClassifier};
pub use segment::{Segment, SegmentEnd, Segmenter};

pub use arenalog_types::{LogFormat, ParserConfig};
