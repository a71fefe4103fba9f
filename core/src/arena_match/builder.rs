//! Per-segment unit accumulation and match finalization.

use std::sync::Arc;

use arenalog_types::LogFormat;
use hashbrown::HashMap;

use super::inference::{
    LEGACY_PLAYER_TEAM_ID, SignificanceTracker, synthesize_end_info, synthesize_snapshots,
    synthesize_start_info,
};
use super::unit::CombatUnit;
use super::validation::{ValidationFailure, validate};
use super::{CombatResult, MalformedMatch, Match, match_id};
use crate::error::MatchBuildError;
use crate::events::{
    ActionDetails, ActionKind, ArenaMatchEndInfo, ArenaMatchStartInfo, CombatAction, CombatEvent,
};
use crate::game_data::{CombatUnitReaction, class_for_spell};
use crate::segment::Segment;

/// Selects one of a unit's event lists.
type UnitList = fn(&mut CombatUnit) -> &mut Vec<Arc<CombatAction>>;

/// Accumulates the events of one segment into units.
#[derive(Debug)]
pub struct MatchBuilder {
    format: LogFormat,
    units: HashMap<String, CombatUnit>,
    events: Vec<CombatEvent>,
    zone_id: i64,
    start_info: Option<ArenaMatchStartInfo>,
    end_info: Option<ArenaMatchEndInfo>,
    has_advanced_logging: bool,
    significance: SignificanceTracker,
}

impl MatchBuilder {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            units: HashMap::new(),
            events: Vec::new(),
            zone_id: 0,
            start_info: None,
            end_info: None,
            has_advanced_logging: false,
            significance: SignificanceTracker::default(),
        }
    }

    pub fn unit(&self, id: &str) -> Option<&CombatUnit> {
        self.units.get(id)
    }

    pub fn units(&self) -> &HashMap<String, CombatUnit> {
        &self.units
    }

    pub fn process(&mut self, event: CombatEvent) -> Result<(), MatchBuildError> {
        match &event {
            CombatEvent::MatchStart(start) => {
                self.zone_id = start.zone_id;
                if self.start_info.is_none() {
                    self.start_info = start.info.clone();
                }
            }
            CombatEvent::MatchEnd(end) => {
                if end.info.is_some() {
                    self.end_info = end.info.clone();
                }
            }
            CombatEvent::UnitInfoSnapshot(snapshot) => {
                self.observe(&snapshot.unit_id, None, 0, snapshot.line.timestamp);
                self.unit_mut(&snapshot.unit_id)?
                    .set_info(snapshot.info.clone());
            }
            CombatEvent::Action(action) => self.process_action(action)?,
        }
        self.events.push(event);
        Ok(())
    }

    fn process_action(&mut self, action: &Arc<CombatAction>) -> Result<(), MatchBuildError> {
        let ts = action.timestamp();
        let src = action.src_unit_id.as_deref();
        let dest = action.dest_unit_id.as_deref();

        if let Some(id) = src {
            self.observe(id, action.src_unit_name.as_deref(), action.src_unit_flags, ts);
        }
        if let Some(id) = dest {
            self.observe(id, action.dest_unit_name.as_deref(), action.dest_unit_flags, ts);
        }

        if let Some(adv) = &action.advanced {
            self.has_advanced_logging = true;
            self.observe(&adv.actor_id, None, 0, ts);
            let actor = self.unit_mut(&adv.actor_id)?;
            actor.advanced_actions.push(Arc::clone(action));
            if let Some(owner) = &adv.owner_id {
                actor.prove_owner(owner);
            }
        }

        match action.kind {
            ActionKind::Damage => {
                self.push_to(src, action, |u| &mut u.damage_out)?;
                self.push_to(dest, action, |u| &mut u.damage_in)?;
            }
            ActionKind::Heal => {
                self.push_to(src, action, |u| &mut u.heal_out)?;
                self.push_to(dest, action, |u| &mut u.heal_in)?;
            }
            ActionKind::Absorb => {
                if let ActionDetails::Absorb {
                    shield_owner_id: Some(owner),
                    shield_owner_name,
                    shield_owner_flags,
                    ..
                } = &action.details
                {
                    self.observe(owner, shield_owner_name.as_deref(), *shield_owner_flags, ts);
                    self.push_to(Some(owner.as_str()), action, |u| &mut u.absorbs_out)?;
                }
                self.push_to(dest, action, |u| &mut u.absorbs_in)?;
                self.push_to(src, action, |u| &mut u.absorbs_damaged)?;
            }
            kind if kind.is_aura() => {
                self.push_to(dest, action, |u| &mut u.aura_events)?;
            }
            kind if kind.is_cast() => {
                self.push_to(src, action, |u| &mut u.spell_cast_events)?;
                if kind == ActionKind::CastSuccess
                    && self.format.needs_inference()
                    && let Some(id) = src
                    && let Some(class) = action.spell_id().and_then(class_for_spell)
                {
                    let unit = self.unit_mut(id)?;
                    if unit.is_player() {
                        unit.infer_class(class);
                    }
                }
            }
            ActionKind::Summon => {
                self.push_to(src, action, |u| &mut u.actions_out)?;
                if let (Some(owner), Some(pet)) = (src, dest) {
                    self.unit_mut(pet)?.prove_owner(owner);
                }
            }
            ActionKind::Death => {
                if matches!(action.details, ActionDetails::Death { unconscious: true }) {
                    self.push_to(dest, action, |u| &mut u.conscious_death_records)?;
                } else {
                    self.push_to(dest, action, |u| &mut u.death_records)?;
                }
            }
            _ => {
                self.push_to(src, action, |u| &mut u.actions_out)?;
                self.push_to(dest, action, |u| &mut u.actions_in)?;
            }
        }

        if self.format.needs_inference() {
            self.significance.observe(action, &self.units);
        }
        Ok(())
    }

    /// Create the unit on first reference and apply this event's evidence.
    fn observe(&mut self, id: &str, name: Option<&str>, flags: i64, timestamp: i64) {
        let unit = self
            .units
            .entry(id.to_string())
            .or_insert_with(|| CombatUnit::new(id, timestamp));
        unit.touch(timestamp);
        if let Some(name) = name {
            unit.prove_name(name);
        }
        unit.prove_flags(flags);
    }

    fn unit_mut(&mut self, id: &str) -> Result<&mut CombatUnit, MatchBuildError> {
        self.units
            .get_mut(id)
            .ok_or_else(|| MatchBuildError::UnitMissing(id.to_string()))
    }

    fn push_to(
        &mut self,
        id: Option<&str>,
        action: &Arc<CombatAction>,
        list: UnitList,
    ) -> Result<(), MatchBuildError> {
        if let Some(id) = id {
            list(self.unit_mut(id)?).push(Arc::clone(action));
        }
        Ok(())
    }

    /// Finalize units and compute the match-level outcome.
    pub fn finish(mut self, id: String, raw_lines: Vec<String>, lines_not_parsed: usize) -> Match {
        let start_time = self.events.first().map(CombatEvent::timestamp).unwrap_or(0);
        let end_time = self.events.last().map(CombatEvent::timestamp).unwrap_or(start_time);

        for unit in self.units.values_mut() {
            unit.end_activity();
        }

        let player_team_id = if self.format.needs_inference() {
            let confirmed = self.significance.confirmed().to_vec();
            synthesize_snapshots(&confirmed, &mut self.units);
            if self.start_info.is_none() {
                self.start_info = Some(synthesize_start_info(
                    start_time,
                    self.zone_id,
                    &confirmed,
                    &self.units,
                ));
            }
            if self.end_info.is_none() {
                self.end_info =
                    synthesize_end_info(start_time, end_time, &self.events, &self.units);
            }
            Some(LEGACY_PLAYER_TEAM_ID.to_string())
        } else {
            self.snapshot_player_team()
        };

        self.merge_pets();

        let result = compute_result(self.end_info.as_ref(), player_team_id.as_deref());
        let player_team_rating = team_rating(self.end_info.as_ref(), player_team_id.as_deref());

        Match {
            id,
            version: self.format,
            start_time,
            end_time,
            units: self.units,
            player_team_id,
            player_team_rating,
            result,
            has_advanced_logging: self.has_advanced_logging,
            raw_lines,
            lines_not_parsed,
            start_info: self.start_info,
            end_info: self.end_info,
            events: self.events,
        }
    }

    /// Team of the lowest-id friendly unit carrying a snapshot.
    fn snapshot_player_team(&self) -> Option<String> {
        self.units
            .values()
            .filter(|u| u.reaction() == CombatUnitReaction::Friendly && u.info.is_some())
            .min_by(|a, b| a.id.cmp(&b.id))
            .and_then(|u| u.team_id())
            .map(str::to_string)
    }

    /// Fold each owned non-player unit's output into its owner's lists.
    ///
    /// Lists are taken before any merge, so a pet's own pets never reach
    /// the player through it.
    fn merge_pets(&mut self) {
        let mut pets: Vec<(String, String)> = self
            .units
            .values()
            .filter(|u| !u.is_player())
            .filter_map(|u| Some((u.id.clone(), u.owner_id()?.to_string())))
            .collect();
        pets.sort();

        let merges: Vec<(String, PetOutput)> = pets
            .into_iter()
            .filter_map(|(pet_id, owner_id)| {
                if !self.units.contains_key(&owner_id) {
                    tracing::trace!(pet_id = %pet_id, owner_id = %owner_id, "Pet owner never appeared in segment");
                    return None;
                }
                let pet = self.units.get(&pet_id)?;
                let output = PetOutput {
                    damage: pet.damage_out.clone(),
                    heal: pet.heal_out.clone(),
                    actions: pet.actions_out.clone(),
                };
                Some((owner_id, output))
            })
            .collect();

        for (owner_id, output) in merges {
            if let Some(owner) = self.units.get_mut(&owner_id) {
                merge_sorted(&mut owner.damage_out, output.damage);
                merge_sorted(&mut owner.heal_out, output.heal);
                merge_sorted(&mut owner.actions_out, output.actions);
            }
        }
    }
}

/// A pet's outgoing lists as they stood before merging.
struct PetOutput {
    damage: Vec<Arc<CombatAction>>,
    heal: Vec<Arc<CombatAction>>,
    actions: Vec<Arc<CombatAction>>,
}

fn merge_sorted(into: &mut Vec<Arc<CombatAction>>, from: Vec<Arc<CombatAction>>) {
    if from.is_empty() {
        return;
    }
    into.extend(from);
    into.sort_by_key(|a| a.timestamp());
}

fn compute_result(end_info: Option<&ArenaMatchEndInfo>, player_team: Option<&str>) -> CombatResult {
    let (Some(end), Some(team)) = (end_info, player_team) else {
        return CombatResult::Unknown;
    };
    if end.winning_team_id == team {
        CombatResult::Win
    } else if !matches!(end.winning_team_id.as_str(), "0" | "1") {
        CombatResult::Draw
    } else {
        CombatResult::Lose
    }
}

fn team_rating(end_info: Option<&ArenaMatchEndInfo>, player_team: Option<&str>) -> i64 {
    match (end_info, player_team) {
        (Some(end), Some("0")) => end.team0_mmr,
        (Some(end), Some("1")) => end.team1_mmr,
        _ => 0,
    }
}

/// Build one segment into a validated match, or the malformed record
/// that stands in for it. Every segment yields exactly one of the two.
pub fn build_match(segment: Segment, format: LogFormat) -> Result<Match, MalformedMatch> {
    let id = match_id(&segment.lines);
    let start_time = segment.start_time().unwrap_or(0);
    let complete = segment.is_complete();
    let Segment {
        events,
        lines,
        lines_not_parsed,
        end,
    } = segment;

    let malformed = |raw_lines| MalformedMatch {
        id: id.clone(),
        start_time,
        raw_lines,
        lines_not_parsed,
    };

    if !complete {
        tracing::warn!(
            match_id = %id,
            failure = ?ValidationFailure::Incomplete,
            ?end,
            "Rejecting match"
        );
        return Err(malformed(lines));
    }

    let mut builder = MatchBuilder::new(format);
    for event in events {
        if let Err(err) = builder.process(event) {
            tracing::error!(match_id = %id, error = %err, "Failed to build match");
            return Err(malformed(lines));
        }
    }

    let built = builder.finish(id.clone(), lines, lines_not_parsed);
    match validate(&built) {
        Ok(()) => {
            tracing::debug!(
                match_id = %built.id,
                units = built.units.len(),
                result = ?built.result,
                "Match built"
            );
            Ok(built)
        }
        Err(failure) => {
            tracing::warn!(match_id = %built.id, ?failure, "Rejecting match");
            Err(malformed(built.raw_lines))
        }
    }
}
