//! Match assembly: units, outcome, validation and canonical ids.

mod builder;
mod inference;
mod summary;
mod unit;
mod validation;


pub use builder::{MatchBuilder, build_match};
pub use summary::{MatchSummary, UnitSummary};
pub use unit::CombatUnit;
pub use validation::{ValidationFailure, validate};

use arenalog_types::LogFormat;
use hashbrown::HashMap;
use serde::Serialize;

use crate::events::{ArenaMatchEndInfo, ArenaMatchStartInfo, CombatEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum CombatResult {
    #[default]
    Unknown,
    Draw,
    Lose,
    Win,
}

impl CombatResult {
    pub fn is_decided(self) -> bool {
        matches!(self, CombatResult::Win | CombatResult::Lose)
    }
}

/// A validated match.
#[derive(Debug, Clone)]
pub struct Match {
    pub id: String,
    pub version: LogFormat,
    pub start_time: i64,
    pub end_time: i64,
    pub units: HashMap<String, CombatUnit>,
    pub player_team_id: Option<String>,
    pub player_team_rating: i64,
    pub result: CombatResult,
    pub has_advanced_logging: bool,
    pub raw_lines: Vec<String>,
    pub lines_not_parsed: usize,
    pub start_info: Option<ArenaMatchStartInfo>,
    pub end_info: Option<ArenaMatchEndInfo>,
    pub events: Vec<CombatEvent>,
}

impl Match {
    pub fn unit(&self, id: &str) -> Option<&CombatUnit> {
        self.units.get(id)
    }

    /// Units sorted by id.
    pub fn sorted_units(&self) -> Vec<&CombatUnit> {
        let mut units: Vec<_> = self.units.values().collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));
        units
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary::from_match(self)
    }
}

/// Diagnostic record for a segment that did not validate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedMatch {
    pub id: String,
    pub start_time: i64,
    pub raw_lines: Vec<String>,
    pub lines_not_parsed: usize,
}

/// Canonical match id: lowercase hex MD5 of the raw lines joined by `\n`.
pub fn match_id<S: AsRef<str>>(lines: &[S]) -> String {
    let mut ctx = md5::Context::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            ctx.consume(b"\n");
        }
        ctx.consume(line.as_ref().as_bytes());
    }
    format!("{:x}", ctx.compute())
}
