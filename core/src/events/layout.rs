//! Per-format parameter offsets.
//!
//! Each log format gets one [`FieldLayout`] constant, selected once when
//! the classifier is built. Adding a format means adding a table here.

use arenalog_types::LogFormat;

/// Number of fixed source/destination parameters on every combat action.
pub const BASE_PARAM_COUNT: usize = 8;

/// Width of the spell prefix (`spellId,spellName,spellSchool`).
pub const SPELL_PREFIX_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvancedLayout {
    pub len: usize,
    pub actor_id: usize,
    pub owner_id: usize,
    pub current_hp: usize,
    pub max_hp: usize,
    pub attack_power: usize,
    pub spell_power: usize,
    pub armor: usize,
    pub absorb: Option<usize>,
    pub power_type: usize,
    pub current_power: usize,
    pub max_power: usize,
    pub power_cost: usize,
    pub position_x: usize,
    pub position_y: usize,
    pub ui_map_id: usize,
    pub facing: usize,
    pub level: usize,
}

/// Offsets relative to the start of the damage suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageLayout {
    pub amount: usize,
    pub overkill: usize,
    pub absorbed: usize,
    pub critical: usize,
}

/// Offsets relative to the start of the heal suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealLayout {
    pub amount: usize,
    pub overhealing: usize,
    pub absorbed: usize,
    pub critical: usize,
}

/// Absolute offsets of `COMBATANT_INFO` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatantInfoLayout {
    pub unit_id: usize,
    pub team_id: usize,
    pub first_stat: usize,
    pub spec: usize,
    pub talents: usize,
    pub pvp_talents: usize,
    pub equipment: usize,
    pub auras: usize,
    pub honor_level: usize,
    pub season: usize,
    pub personal_rating: usize,
    pub highest_pvp_tier: usize,
}

impl CombatantInfoLayout {
    /// Parameters required up to and including the aura list.
    pub fn min_len(&self) -> usize {
        self.auras + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub format: LogFormat,
    pub advanced: AdvancedLayout,
    pub damage: DamageLayout,
    pub heal: HealLayout,
    /// `SPELL_ABSORBED` carries the attacker's spell prefix at this length or more.
    pub absorb_spell_prefix_min_len: usize,
    pub combatant_info: Option<CombatantInfoLayout>,
    /// `ARENA_MATCH_START`/`END` markers with info, or zone-change markers.
    pub explicit_markers: bool,
}

pub const RETAIL_LAYOUT: FieldLayout = FieldLayout {
    format: LogFormat::Retail,
    advanced: AdvancedLayout {
        len: 17,
        actor_id: 0,
        owner_id: 1,
        current_hp: 2,
        max_hp: 3,
        attack_power: 4,
        spell_power: 5,
        armor: 6,
        absorb: Some(7),
        power_type: 8,
        current_power: 9,
        max_power: 10,
        power_cost: 11,
        position_x: 12,
        position_y: 13,
        ui_map_id: 14,
        facing: 15,
        level: 16,
    },
    // amount, baseAmount, overkill, school, resisted, blocked, absorbed, critical, ...
    damage: DamageLayout {
        amount: 0,
        overkill: 2,
        absorbed: 6,
        critical: 7,
    },
    // amount, baseAmount, overhealing, absorbed, critical
    heal: HealLayout {
        amount: 0,
        overhealing: 2,
        absorbed: 3,
        critical: 4,
    },
    absorb_spell_prefix_min_len: 19,
    combatant_info: Some(CombatantInfoLayout {
        unit_id: 0,
        team_id: 1,
        first_stat: 2,
        spec: 23,
        talents: 24,
        pvp_talents: 25,
        equipment: 26,
        auras: 27,
        honor_level: 28,
        season: 29,
        personal_rating: 30,
        highest_pvp_tier: 31,
    }),
    explicit_markers: true,
};

pub const CLASSIC_LAYOUT: FieldLayout = FieldLayout {
    format: LogFormat::Classic,
    advanced: AdvancedLayout {
        len: 16,
        actor_id: 0,
        owner_id: 1,
        current_hp: 2,
        max_hp: 3,
        attack_power: 4,
        spell_power: 5,
        armor: 6,
        absorb: None,
        power_type: 7,
        current_power: 8,
        max_power: 9,
        power_cost: 10,
        position_x: 11,
        position_y: 12,
        ui_map_id: 13,
        facing: 14,
        level: 15,
    },
    // amount, overkill, school, resisted, blocked, absorbed, critical, ...
    damage: DamageLayout {
        amount: 0,
        overkill: 1,
        absorbed: 5,
        critical: 6,
    },
    // amount, overhealing, absorbed, critical
    heal: HealLayout {
        amount: 0,
        overhealing: 1,
        absorbed: 2,
        critical: 3,
    },
    absorb_spell_prefix_min_len: 19,
    combatant_info: None,
    explicit_markers: false,
};

pub fn layout_for(format: LogFormat) -> &'static FieldLayout {
    match format {
        LogFormat::Retail => &RETAIL_LAYOUT,
        LogFormat::Classic => &CLASSIC_LAYOUT,
    }
}
