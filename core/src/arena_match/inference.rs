//! Legacy-format inference.
//!
//! Legacy logs carry no combatant snapshots and no match info on their
//! boundary markers. Participants are taken from player-vs-player
//! activity after the gates open, and the outcome from the last player
//! death.

use hashbrown::HashMap;

use super::unit::CombatUnit;
use crate::events::{
    ActionDetails, ActionKind, ArenaMatchEndInfo, ArenaMatchStartInfo, CombatAction, CombatEvent,
    CombatantInfo,
};
use crate::game_data::{CombatUnitReaction, is_arena_preparation};

pub const LEGACY_PLAYER_TEAM_ID: &str = "0";

/// Team id assigned to an inferred combatant by reaction.
pub fn team_for_reaction(reaction: CombatUnitReaction) -> Option<&'static str> {
    match reaction {
        CombatUnitReaction::Friendly => Some("0"),
        CombatUnitReaction::Hostile => Some("1"),
        CombatUnitReaction::Neutral => None,
    }
}

/// Combatants trusted by the significance heuristic.
const CONFIRMED_LIMIT: usize = 2;

/// Flags the first units seen fighting across reactions once
/// preparation ends.
#[derive(Debug, Default)]
pub struct SignificanceTracker {
    preparation_over: bool,
    confirmed: Vec<String>,
}

impl SignificanceTracker {
    pub fn observe(&mut self, action: &CombatAction, units: &HashMap<String, CombatUnit>) {
        if !self.preparation_over {
            if action.kind == ActionKind::AuraRemoved
                && action.spell_id().is_some_and(is_arena_preparation)
            {
                tracing::trace!(timestamp = action.timestamp(), "Arena preparation ended");
                self.preparation_over = true;
            }
            return;
        }
        if self.confirmed.len() >= CONFIRMED_LIMIT {
            return;
        }

        let (Some(src_id), Some(dest_id)) = (&action.src_unit_id, &action.dest_unit_id) else {
            return;
        };
        let (Some(src), Some(dest)) = (units.get(src_id), units.get(dest_id)) else {
            return;
        };
        if !(src.is_player() && dest.is_player()) {
            return;
        }
        if !(src.has_reaction_proof() && dest.has_reaction_proof()) {
            return;
        }
        if !src.reaction().opposes(dest.reaction()) {
            return;
        }

        for id in [src_id, dest_id] {
            if self.confirmed.len() < CONFIRMED_LIMIT && !self.confirmed.contains(id) {
                self.confirmed.push(id.clone());
            }
        }
    }

    /// Confirmed combatants in first-seen order.
    pub fn confirmed(&self) -> &[String] {
        &self.confirmed
    }
}

/// Give every confirmed combatant without a snapshot a zero-valued one.
pub fn synthesize_snapshots(confirmed: &[String], units: &mut HashMap<String, CombatUnit>) {
    for id in confirmed {
        let Some(unit) = units.get_mut(id) else {
            continue;
        };
        if unit.info.is_some() {
            continue;
        }
        if let Some(team) = team_for_reaction(unit.reaction()) {
            unit.set_info(CombatantInfo::synthesized(team));
        }
    }
}

pub fn synthesize_start_info(
    timestamp: i64,
    zone_id: i64,
    confirmed: &[String],
    units: &HashMap<String, CombatUnit>,
) -> ArenaMatchStartInfo {
    let side = |reaction: CombatUnitReaction| {
        confirmed
            .iter()
            .filter(|id| units.get(*id).is_some_and(|u| u.reaction() == reaction))
            .count()
    };
    let per_side = side(CombatUnitReaction::Friendly).max(side(CombatUnitReaction::Hostile));

    ArenaMatchStartInfo {
        timestamp,
        zone_id,
        item2: String::new(),
        bracket: format!("{per_side}v{per_side}"),
        is_ranked: false,
    }
}

/// The winner is the side opposite to the last player who died.
/// Feigned deaths do not count.
/// `None` when no player death with a known reaction exists.
pub fn synthesize_end_info(
    start_time: i64,
    end_time: i64,
    events: &[CombatEvent],
    units: &HashMap<String, CombatUnit>,
) -> Option<ArenaMatchEndInfo> {
    let loser = events.iter().rev().find_map(|event| {
        let CombatEvent::Action(action) = event else {
            return None;
        };
        if !matches!(action.details, ActionDetails::Death { unconscious: false }) {
            return None;
        }
        let unit = units.get(action.dest_unit_id.as_deref()?)?;
        if !unit.is_player() {
            return None;
        }
        team_for_reaction(unit.reaction())
    })?;

    let winning_team_id = if loser == "0" { "1" } else { "0" };
    Some(ArenaMatchEndInfo {
        timestamp: end_time,
        winning_team_id: winning_team_id.to_string(),
        match_duration_secs: (end_time - start_time) / 1000,
        team0_mmr: 0,
        team1_mmr: 0,
    })
}
