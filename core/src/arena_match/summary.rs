use arenalog_types::LogFormat;
use serde::Serialize;

use super::unit::CombatUnit;
use super::{CombatResult, Match};
use crate::events::{ArenaMatchEndInfo, ArenaMatchStartInfo};
use crate::game_data::{
    CombatUnitClass, CombatUnitReaction, CombatUnitSpec, CombatUnitType, arena_name,
};

/// Serializable projection of a [`Match`], units sorted by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub id: String,
    pub version: LogFormat,
    pub arena: Option<&'static str>,
    pub start_time: i64,
    pub end_time: i64,
    pub result: CombatResult,
    pub player_team_id: Option<String>,
    pub player_team_rating: i64,
    pub has_advanced_logging: bool,
    pub lines: usize,
    pub lines_not_parsed: usize,
    pub start_info: Option<ArenaMatchStartInfo>,
    pub end_info: Option<ArenaMatchEndInfo>,
    pub units: Vec<UnitSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSummary {
    pub id: String,
    pub name: String,
    pub unit_type: CombatUnitType,
    pub reaction: CombatUnitReaction,
    pub class: CombatUnitClass,
    pub spec: CombatUnitSpec,
    pub team_id: Option<String>,
    pub owner_id: Option<String>,
    pub damage_out: i64,
    pub damage_in: i64,
    pub heal_out: i64,
    pub heal_in: i64,
    pub deaths: usize,
}

impl UnitSummary {
    fn from_unit(unit: &CombatUnit) -> Self {
        Self {
            id: unit.id.clone(),
            name: unit.name().to_string(),
            unit_type: unit.unit_type(),
            reaction: unit.reaction(),
            class: unit.class(),
            spec: unit.spec(),
            team_id: unit.team_id().map(str::to_string),
            owner_id: unit.owner_id().map(str::to_string),
            damage_out: unit.total_damage_out(),
            damage_in: unit.total_damage_in(),
            heal_out: unit.total_heal_out(),
            heal_in: unit.total_heal_in(),
            deaths: unit.death_records.len(),
        }
    }
}

impl MatchSummary {
    pub fn from_match(m: &Match) -> Self {
        Self {
            id: m.id.clone(),
            version: m.version,
            arena: m.start_info.as_ref().and_then(|s| arena_name(s.zone_id)),
            start_time: m.start_time,
            end_time: m.end_time,
            result: m.result,
            player_team_id: m.player_team_id.clone(),
            player_team_rating: m.player_team_rating,
            has_advanced_logging: m.has_advanced_logging,
            lines: m.raw_lines.len(),
            lines_not_parsed: m.lines_not_parsed,
            start_info: m.start_info.clone(),
            end_info: m.end_info.clone(),
            units: m.sorted_units().into_iter().map(UnitSummary::from_unit).collect(),
        }
    }
}
