mod config;
mod parsing_session;

#[cfg(test)]
mod parsing_session_tests;

pub use config::{APP_NAME, ParserConfigExt};
pub use parsing_session::{
    ArenaLogParser, MatchHandler, ParserOutput, ParserStats, detect_log_format,
};
