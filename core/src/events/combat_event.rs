use std::sync::Arc;

use serde::Serialize;

use crate::combat_log::LogLine;
use crate::game_data::{CombatUnitReaction, CombatUnitSpec, CombatUnitType};

/// A classified log line. Every variant keeps its source [`LogLine`].
#[derive(Debug, Clone)]
pub enum CombatEvent {
    MatchStart(MatchStart),
    MatchEnd(MatchEnd),
    UnitInfoSnapshot(Arc<CombatantInfoEvent>),
    Action(Arc<CombatAction>),
}

impl CombatEvent {
    pub fn line(&self) -> &LogLine {
        match self {
            CombatEvent::MatchStart(e) => &e.line,
            CombatEvent::MatchEnd(e) => &e.line,
            CombatEvent::UnitInfoSnapshot(e) => &e.line,
            CombatEvent::Action(e) => &e.line,
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.line().timestamp
    }

    pub fn is_match_start(&self) -> bool {
        matches!(self, CombatEvent::MatchStart(_))
    }

    pub fn is_match_end(&self) -> bool {
        matches!(self, CombatEvent::MatchEnd(_))
    }
}

/// Start marker. `info` is absent for legacy zone-change markers.
#[derive(Debug, Clone)]
pub struct MatchStart {
    pub line: LogLine,
    pub zone_id: i64,
    pub info: Option<ArenaMatchStartInfo>,
}

/// End marker. `info` is absent for legacy zone-change markers.
#[derive(Debug, Clone)]
pub struct MatchEnd {
    pub line: LogLine,
    pub info: Option<ArenaMatchEndInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArenaMatchStartInfo {
    pub timestamp: i64,
    pub zone_id: i64,
    pub item2: String,
    pub bracket: String,
    pub is_ranked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArenaMatchEndInfo {
    pub timestamp: i64,
    pub winning_team_id: String,
    pub match_duration_secs: i64,
    pub team0_mmr: i64,
    pub team1_mmr: i64,
}

#[derive(Debug, Clone)]
pub struct CombatantInfoEvent {
    pub line: LogLine,
    pub unit_id: String,
    pub info: CombatantInfo,
}

/// Per-unit snapshot from `COMBATANT_INFO`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombatantInfo {
    pub team_id: String,
    pub stats: CombatantStats,
    pub spec: CombatUnitSpec,
    pub talents: Vec<Talent>,
    pub pvp_talents: Vec<i64>,
    pub equipment: Vec<EquippedItem>,
    pub interesting_auras_json: String,
    pub honor_level: i64,
    pub season: i64,
    pub personal_rating: i64,
    pub highest_pvp_tier: i64,
}

impl CombatantInfo {
    /// Zero-valued snapshot for units only known through inference.
    pub fn synthesized(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            interesting_auras_json: "[]".to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CombatantStats {
    pub strength: i64,
    pub agility: i64,
    pub stamina: i64,
    pub intelligence: i64,
    pub dodge: i64,
    pub parry: i64,
    pub block: i64,
    pub crit_melee: i64,
    pub crit_ranged: i64,
    pub crit_spell: i64,
    pub speed: i64,
    pub lifesteal: i64,
    pub haste_melee: i64,
    pub haste_ranged: i64,
    pub haste_spell: i64,
    pub avoidance: i64,
    pub mastery: i64,
    pub versatility_damage_done: i64,
    pub versatility_healing_done: i64,
    pub versatility_damage_taken: i64,
    pub armor: i64,
}

impl CombatantStats {
    pub const COUNT: usize = 21;

    pub fn from_values(v: [i64; Self::COUNT]) -> Self {
        Self {
            strength: v[0],
            agility: v[1],
            stamina: v[2],
            intelligence: v[3],
            dodge: v[4],
            parry: v[5],
            block: v[6],
            crit_melee: v[7],
            crit_ranged: v[8],
            crit_spell: v[9],
            speed: v[10],
            lifesteal: v[11],
            haste_melee: v[12],
            haste_ranged: v[13],
            haste_spell: v[14],
            avoidance: v[15],
            mastery: v[16],
            versatility_damage_done: v[17],
            versatility_healing_done: v[18],
            versatility_damage_taken: v[19],
            armor: v[20],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Talent {
    pub id: i64,
    pub spell_id: i64,
    pub rank: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EquippedItem {
    pub item_id: i64,
    pub item_level: i64,
    pub enchants: Vec<i64>,
    pub bonus_ids: Vec<i64>,
    pub gems: Vec<i64>,
}

/// Broad family of a combat action, derived from its event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionKind {
    Damage,
    Heal,
    Absorb,
    AuraApplied,
    AuraRemoved,
    AuraRefresh,
    AuraAppliedDose,
    AuraRemovedDose,
    AuraBroken,
    CastStart,
    CastSuccess,
    CastFailed,
    Interrupt,
    Dispel,
    Stolen,
    ExtraAttacks,
    Summon,
    Death,
    /// Recognized combat event without dedicated bucketing.
    Other,
}

impl ActionKind {
    pub fn is_aura(self) -> bool {
        matches!(
            self,
            ActionKind::AuraApplied
                | ActionKind::AuraRemoved
                | ActionKind::AuraRefresh
                | ActionKind::AuraAppliedDose
                | ActionKind::AuraRemovedDose
                | ActionKind::AuraBroken
        )
    }

    pub fn is_cast(self) -> bool {
        matches!(
            self,
            ActionKind::CastStart | ActionKind::CastSuccess | ActionKind::CastFailed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpellInfo {
    pub id: i64,
    pub name: String,
    pub school: i64,
}

/// High-resolution actor state, present when advanced logging is on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedActorInfo {
    pub actor_id: String,
    pub owner_id: Option<String>,
    pub current_hp: i64,
    pub max_hp: i64,
    pub attack_power: i64,
    pub spell_power: i64,
    pub armor: i64,
    /// Retail only.
    pub absorb: Option<i64>,
    pub power_type: i64,
    pub current_power: i64,
    pub max_power: i64,
    pub power_cost: i64,
    pub position_x: f64,
    pub position_y: f64,
    pub ui_map_id: i64,
    pub facing: f64,
    /// Character level (legacy) or average item level (retail).
    pub level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ActionDetails {
    None,
    Damage {
        amount: i64,
        overkill: i64,
        absorbed: i64,
        critical: bool,
        environmental_type: Option<String>,
    },
    Heal {
        amount: i64,
        overhealing: i64,
        absorbed: i64,
        critical: bool,
    },
    Absorb {
        shield_owner_id: Option<String>,
        shield_owner_name: Option<String>,
        shield_owner_flags: i64,
        shield_spell: SpellInfo,
        amount: i64,
    },
    Aura {
        aura_type: String,
        amount: Option<i64>,
    },
    CastFailed {
        reason: String,
    },
    ExtraSpell {
        spell: SpellInfo,
        aura_type: Option<String>,
    },
    ExtraAttacks {
        amount: i64,
    },
    Death {
        unconscious: bool,
    },
}

/// One combat action (damage, heal, aura, cast, death, ...).
///
/// When `advanced` is set this is the advanced sub-variant: the action
/// carries its actor's health, power, position and gear level.
#[derive(Debug, Clone)]
pub struct CombatAction {
    pub line: LogLine,
    pub kind: ActionKind,
    pub src_unit_id: Option<String>,
    pub src_unit_name: Option<String>,
    pub src_unit_flags: i64,
    pub dest_unit_id: Option<String>,
    pub dest_unit_name: Option<String>,
    pub dest_unit_flags: i64,
    pub spell: Option<SpellInfo>,
    pub advanced: Option<AdvancedActorInfo>,
    pub details: ActionDetails,
}

impl CombatAction {
    pub fn timestamp(&self) -> i64 {
        self.line.timestamp
    }

    pub fn event_kind(&self) -> &str {
        &self.line.event_kind
    }

    pub fn is_advanced(&self) -> bool {
        self.advanced.is_some()
    }

    pub fn spell_id(&self) -> Option<i64> {
        self.spell.as_ref().map(|s| s.id)
    }

    pub fn src_type(&self) -> Option<CombatUnitType> {
        CombatUnitType::from_flags(self.src_unit_flags)
    }

    pub fn src_reaction(&self) -> Option<CombatUnitReaction> {
        CombatUnitReaction::from_flags(self.src_unit_flags)
    }

    pub fn dest_type(&self) -> Option<CombatUnitType> {
        CombatUnitType::from_flags(self.dest_unit_flags)
    }

    pub fn dest_reaction(&self) -> Option<CombatUnitReaction> {
        CombatUnitReaction::from_flags(self.dest_unit_flags)
    }

    /// Signed health change for damage/heal actions (damage is negative).
    pub fn effective_amount(&self) -> i64 {
        match &self.details {
            ActionDetails::Damage { amount, .. } => amount.saturating_neg(),
            ActionDetails::Heal {
                amount, overhealing, ..
            } => amount.saturating_sub(*overhealing),
            _ => 0,
        }
    }
}
