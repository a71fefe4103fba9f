use thiserror::Error;

/// Reasons a raw line cannot be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing timestamp separator")]
    MissingSeparator,
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("empty event kind")]
    EmptyEventKind,
    #[error("unterminated quoted string at byte {0}")]
    UnterminatedQuote(usize),
    #[error("unbalanced bracket at byte {0}")]
    UnbalancedBracket(usize),
}

/// Internal invariant violations while building a match.
///
/// These abort the segment being built, never the stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchBuildError {
    #[error("unit {0} missing after creation")]
    UnitMissing(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(#[source] confy::ConfyError),
    #[error("failed to store config: {0}")]
    Store(#[source] confy::ConfyError),
}
