//! Turns tokenized lines into typed [`CombatEvent`]s.
//!
//! Dispatch is on the event kind; every field offset comes from the
//! [`FieldLayout`] chosen at construction.

use std::sync::Arc;

use arenalog_types::LogFormat;
use phf::phf_map;

use super::combat_event::*;
use super::layout::{BASE_PARAM_COUNT, FieldLayout, SPELL_PREFIX_LEN, layout_for};
use crate::combat_log::{LogLine, ParamValue};
use crate::game_data::{CombatUnitSpec, is_arena_zone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    /// Swing / unit events: no spell fields.
    None,
    Spell,
    /// `ENVIRONMENTAL_DAMAGE`: the environment type follows the advanced block.
    Environmental,
}

#[derive(Debug, Clone, Copy)]
struct ActionShape {
    kind: ActionKind,
    prefix: Prefix,
    advanced: bool,
    /// A second spell (`id,name,school`) opens the suffix.
    extra_spell: bool,
}

const fn shape(kind: ActionKind, prefix: Prefix, advanced: bool) -> ActionShape {
    ActionShape {
        kind,
        prefix,
        advanced,
        extra_spell: false,
    }
}

const fn with_extra_spell(kind: ActionKind) -> ActionShape {
    ActionShape {
        kind,
        prefix: Prefix::Spell,
        advanced: false,
        extra_spell: true,
    }
}

static ACTION_SHAPES: phf::Map<&'static str, ActionShape> = phf_map! {
    // Damage
    "SWING_DAMAGE" => shape(ActionKind::Damage, Prefix::None, true),
    "SWING_DAMAGE_LANDED" => shape(ActionKind::Damage, Prefix::None, true),
    "RANGE_DAMAGE" => shape(ActionKind::Damage, Prefix::Spell, true),
    "SPELL_DAMAGE" => shape(ActionKind::Damage, Prefix::Spell, true),
    "SPELL_PERIODIC_DAMAGE" => shape(ActionKind::Damage, Prefix::Spell, true),
    "SPELL_BUILDING_DAMAGE" => shape(ActionKind::Damage, Prefix::Spell, true),
    "DAMAGE_SHIELD" => shape(ActionKind::Damage, Prefix::Spell, true),
    "DAMAGE_SPLIT" => shape(ActionKind::Damage, Prefix::Spell, true),
    "ENVIRONMENTAL_DAMAGE" => shape(ActionKind::Damage, Prefix::Environmental, true),
    // Healing
    "SPELL_HEAL" => shape(ActionKind::Heal, Prefix::Spell, true),
    "SPELL_PERIODIC_HEAL" => shape(ActionKind::Heal, Prefix::Spell, true),
    // Absorbs (variable prefix, handled separately)
    "SPELL_ABSORBED" => shape(ActionKind::Absorb, Prefix::None, false),
    // Auras
    "SPELL_AURA_APPLIED" => shape(ActionKind::AuraApplied, Prefix::Spell, false),
    "SPELL_AURA_REMOVED" => shape(ActionKind::AuraRemoved, Prefix::Spell, false),
    "SPELL_AURA_REFRESH" => shape(ActionKind::AuraRefresh, Prefix::Spell, false),
    "SPELL_AURA_APPLIED_DOSE" => shape(ActionKind::AuraAppliedDose, Prefix::Spell, false),
    "SPELL_AURA_REMOVED_DOSE" => shape(ActionKind::AuraRemovedDose, Prefix::Spell, false),
    "SPELL_AURA_BROKEN" => shape(ActionKind::AuraBroken, Prefix::Spell, false),
    "SPELL_AURA_BROKEN_SPELL" => with_extra_spell(ActionKind::AuraBroken),
    // Casts
    "SPELL_CAST_START" => shape(ActionKind::CastStart, Prefix::Spell, false),
    "SPELL_CAST_SUCCESS" => shape(ActionKind::CastSuccess, Prefix::Spell, true),
    "SPELL_CAST_FAILED" => shape(ActionKind::CastFailed, Prefix::Spell, false),
    // Control
    "SPELL_INTERRUPT" => with_extra_spell(ActionKind::Interrupt),
    "SPELL_DISPEL" => with_extra_spell(ActionKind::Dispel),
    "SPELL_STOLEN" => with_extra_spell(ActionKind::Stolen),
    "SPELL_EXTRA_ATTACKS" => shape(ActionKind::ExtraAttacks, Prefix::Spell, false),
    "SPELL_SUMMON" => shape(ActionKind::Summon, Prefix::Spell, false),
    "UNIT_DIED" => shape(ActionKind::Death, Prefix::None, false),
    // Recognized, no dedicated bucket
    "SPELL_ENERGIZE" => shape(ActionKind::Other, Prefix::Spell, true),
    "SPELL_PERIODIC_ENERGIZE" => shape(ActionKind::Other, Prefix::Spell, true),
    "SPELL_DRAIN" => shape(ActionKind::Other, Prefix::Spell, true),
    "SPELL_PERIODIC_DRAIN" => shape(ActionKind::Other, Prefix::Spell, true),
    "SPELL_LEECH" => shape(ActionKind::Other, Prefix::Spell, true),
    "SPELL_PERIODIC_LEECH" => shape(ActionKind::Other, Prefix::Spell, true),
    "SWING_MISSED" => shape(ActionKind::Other, Prefix::None, false),
    "RANGE_MISSED" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_MISSED" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_PERIODIC_MISSED" => shape(ActionKind::Other, Prefix::Spell, false),
    "DAMAGE_SHIELD_MISSED" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_DISPEL_FAILED" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_HEAL_ABSORBED" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_CREATE" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_INSTAKILL" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_RESURRECT" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_DURABILITY_DAMAGE" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_EMPOWER_START" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_EMPOWER_END" => shape(ActionKind::Other, Prefix::Spell, false),
    "SPELL_EMPOWER_INTERRUPT" => shape(ActionKind::Other, Prefix::Spell, false),
    "UNIT_DESTROYED" => shape(ActionKind::Other, Prefix::None, false),
    "UNIT_DISSIPATES" => shape(ActionKind::Other, Prefix::None, false),
    "PARTY_KILL" => shape(ActionKind::Other, Prefix::None, false),
};

/// Classifies lines for one log format.
#[derive(Debug, Clone, Copy)]
pub struct EventClassifier {
    layout: &'static FieldLayout,
}

impl EventClassifier {
    pub fn new(format: LogFormat) -> Self {
        Self {
            layout: layout_for(format),
        }
    }

    pub fn format(&self) -> LogFormat {
        self.layout.format
    }

    pub fn layout(&self) -> &'static FieldLayout {
        self.layout
    }

    /// Classify one line. `None` for unknown kinds and lines too short
    /// for their kind; never panics on malformed input.
    pub fn classify(&self, line: LogLine) -> Option<CombatEvent> {
        let explicit = self.layout.explicit_markers;
        match line.event_kind.as_str() {
            "ARENA_MATCH_START" if explicit => self.match_start(line),
            "ARENA_MATCH_END" if explicit => self.match_end(line),
            "ZONE_CHANGE" if !explicit => self.zone_change(line),
            "COMBATANT_INFO" => self.combatant_info(line),
            kind => {
                let shape = *ACTION_SHAPES.get(kind)?;
                self.action(line, shape)
                    .map(|action| CombatEvent::Action(Arc::new(action)))
            }
        }
    }

    fn match_start(&self, line: LogLine) -> Option<CombatEvent> {
        if line.len() < 4 {
            return None;
        }
        let zone_id = line.i64_at(0)?;
        let info = ArenaMatchStartInfo {
            timestamp: line.timestamp,
            zone_id,
            item2: line.id_at(1).unwrap_or_default(),
            bracket: line.id_at(2).unwrap_or_default(),
            is_ranked: line.i64_at(3) == Some(1),
        };
        Some(CombatEvent::MatchStart(MatchStart {
            line,
            zone_id,
            info: Some(info),
        }))
    }

    fn match_end(&self, line: LogLine) -> Option<CombatEvent> {
        if line.len() < 4 {
            return None;
        }
        let info = ArenaMatchEndInfo {
            timestamp: line.timestamp,
            winning_team_id: line.id_at(0)?,
            match_duration_secs: line.i64_at(1).unwrap_or(0),
            team0_mmr: line.i64_at(2).unwrap_or(0),
            team1_mmr: line.i64_at(3).unwrap_or(0),
        };
        Some(CombatEvent::MatchEnd(MatchEnd {
            line,
            info: Some(info),
        }))
    }

    /// Legacy boundaries: entering an arena starts a match, any other
    /// zone change ends one.
    fn zone_change(&self, line: LogLine) -> Option<CombatEvent> {
        let zone_id = line.i64_at(0)?;
        if is_arena_zone(zone_id) {
            Some(CombatEvent::MatchStart(MatchStart {
                line,
                zone_id,
                info: None,
            }))
        } else {
            Some(CombatEvent::MatchEnd(MatchEnd { line, info: None }))
        }
    }

    fn combatant_info(&self, line: LogLine) -> Option<CombatEvent> {
        let l = self.layout.combatant_info?;
        if line.len() < l.min_len() {
            return None;
        }

        let unit_id = line.guid_at(l.unit_id)?;
        let spec_id = line.i64_at(l.spec)?;
        let Some(spec) = CombatUnitSpec::from_id(spec_id) else {
            tracing::debug!(unit_id = %unit_id, spec_id, "Ignoring COMBATANT_INFO with unknown spec");
            return None;
        };

        let mut stats = [0i64; CombatantStats::COUNT];
        for (i, stat) in stats.iter_mut().enumerate() {
            *stat = line.i64_at(l.first_stat + i).unwrap_or(0);
        }

        let info = CombatantInfo {
            team_id: line.id_at(l.team_id)?,
            stats: CombatantStats::from_values(stats),
            spec,
            talents: list_at(&line, l.talents).iter().filter_map(parse_talent).collect(),
            pvp_talents: list_at(&line, l.pvp_talents)
                .iter()
                .filter_map(ParamValue::as_i64)
                .collect(),
            equipment: list_at(&line, l.equipment).iter().filter_map(parse_item).collect(),
            interesting_auras_json: line
                .param(l.auras)
                .and_then(|p| serde_json::to_string(p).ok())
                .unwrap_or_else(|| "[]".to_string()),
            honor_level: line.i64_at(l.honor_level).unwrap_or(0),
            season: line.i64_at(l.season).unwrap_or(0),
            personal_rating: line.i64_at(l.personal_rating).unwrap_or(0),
            highest_pvp_tier: line.i64_at(l.highest_pvp_tier).unwrap_or(0),
        };

        Some(CombatEvent::UnitInfoSnapshot(Arc::new(CombatantInfoEvent {
            line,
            unit_id,
            info,
        })))
    }

    fn action(&self, line: LogLine, shape: ActionShape) -> Option<CombatAction> {
        if line.len() < BASE_PARAM_COUNT {
            return None;
        }

        if shape.kind == ActionKind::Absorb {
            return self.absorb(line);
        }

        let mut cursor = BASE_PARAM_COUNT;
        let spell = match shape.prefix {
            Prefix::Spell => {
                let spell = spell_at(&line, cursor)?;
                cursor += SPELL_PREFIX_LEN;
                Some(spell)
            }
            Prefix::None | Prefix::Environmental => None,
        };

        let advanced = if shape.advanced {
            let info = self.advanced_at(&line, cursor);
            cursor += self.layout.advanced.len;
            info
        } else {
            None
        };

        let environmental_type = if shape.prefix == Prefix::Environmental {
            let kind = line.str_at(cursor).map(str::to_string);
            cursor += 1;
            kind
        } else {
            None
        };

        let details = match shape.kind {
            _ if shape.extra_spell => ActionDetails::ExtraSpell {
                spell: spell_at(&line, cursor)?,
                aura_type: line.str_at(cursor + SPELL_PREFIX_LEN).map(str::to_string),
            },
            ActionKind::Damage => {
                let d = &self.layout.damage;
                ActionDetails::Damage {
                    amount: line.i64_at(cursor + d.amount).unwrap_or(0),
                    overkill: line.i64_at(cursor + d.overkill).unwrap_or(0),
                    absorbed: line.i64_at(cursor + d.absorbed).unwrap_or(0),
                    critical: line.i64_at(cursor + d.critical) == Some(1),
                    environmental_type,
                }
            }
            ActionKind::Heal => {
                let h = &self.layout.heal;
                ActionDetails::Heal {
                    amount: line.i64_at(cursor + h.amount).unwrap_or(0),
                    overhealing: line.i64_at(cursor + h.overhealing).unwrap_or(0),
                    absorbed: line.i64_at(cursor + h.absorbed).unwrap_or(0),
                    critical: line.i64_at(cursor + h.critical) == Some(1),
                }
            }
            kind if kind.is_aura() => ActionDetails::Aura {
                aura_type: line.str_at(cursor).unwrap_or_default().to_string(),
                amount: line.i64_at(cursor + 1),
            },
            ActionKind::CastFailed => ActionDetails::CastFailed {
                reason: line.str_at(cursor).unwrap_or_default().to_string(),
            },
            ActionKind::ExtraAttacks => ActionDetails::ExtraAttacks {
                amount: line.i64_at(cursor).unwrap_or(0),
            },
            ActionKind::Death => ActionDetails::Death {
                unconscious: line.i64_at(cursor) == Some(1),
            },
            _ => ActionDetails::None,
        };

        Some(build_action(line, shape.kind, spell, advanced, details))
    }

    fn absorb(&self, line: LogLine) -> Option<CombatAction> {
        let mut cursor = BASE_PARAM_COUNT;
        let spell = if line.len() >= self.layout.absorb_spell_prefix_min_len {
            let spell = spell_at(&line, cursor)?;
            cursor += SPELL_PREFIX_LEN;
            Some(spell)
        } else {
            None
        };

        // Shield caster: GUID, name, flags, raid flags, then the shield spell
        if line.len() < cursor + 4 + SPELL_PREFIX_LEN {
            return None;
        }
        let details = ActionDetails::Absorb {
            shield_owner_id: line.guid_at(cursor),
            shield_owner_name: line.str_at(cursor + 1).map(str::to_string),
            shield_owner_flags: line.i64_at(cursor + 2).unwrap_or(0),
            shield_spell: spell_at(&line, cursor + 4)?,
            amount: line.i64_at(cursor + 4 + SPELL_PREFIX_LEN).unwrap_or(0),
        };

        Some(build_action(line, ActionKind::Absorb, spell, None, details))
    }

    fn advanced_at(&self, line: &LogLine, start: usize) -> Option<AdvancedActorInfo> {
        let a = &self.layout.advanced;
        if line.len() < start + a.len {
            return None;
        }
        let int = |offset: usize| line.i64_at(start + offset).unwrap_or(0);
        let float = |offset: usize| line.f64_at(start + offset).unwrap_or(0.0);

        Some(AdvancedActorInfo {
            actor_id: line.guid_at(start + a.actor_id)?,
            owner_id: line.guid_at(start + a.owner_id),
            current_hp: int(a.current_hp),
            max_hp: int(a.max_hp),
            attack_power: int(a.attack_power),
            spell_power: int(a.spell_power),
            armor: int(a.armor),
            absorb: a.absorb.map(int),
            power_type: int(a.power_type),
            current_power: int(a.current_power),
            max_power: int(a.max_power),
            power_cost: int(a.power_cost),
            position_x: float(a.position_x),
            position_y: float(a.position_y),
            ui_map_id: int(a.ui_map_id),
            facing: float(a.facing),
            level: float(a.level),
        })
    }
}

fn build_action(
    line: LogLine,
    kind: ActionKind,
    spell: Option<SpellInfo>,
    advanced: Option<AdvancedActorInfo>,
    details: ActionDetails,
) -> CombatAction {
    CombatAction {
        src_unit_id: line.guid_at(0),
        src_unit_name: line.str_at(1).map(str::to_string),
        src_unit_flags: line.i64_at(2).unwrap_or(0),
        dest_unit_id: line.guid_at(4),
        dest_unit_name: line.str_at(5).map(str::to_string),
        dest_unit_flags: line.i64_at(6).unwrap_or(0),
        kind,
        spell,
        advanced,
        details,
        line,
    }
}

fn spell_at(line: &LogLine, idx: usize) -> Option<SpellInfo> {
    Some(SpellInfo {
        id: line.i64_at(idx)?,
        name: line.str_at(idx + 1).unwrap_or_default().to_string(),
        school: line.i64_at(idx + 2).unwrap_or(0),
    })
}

fn list_at(line: &LogLine, idx: usize) -> &[ParamValue] {
    line.param(idx).and_then(ParamValue::as_list).unwrap_or(&[])
}

fn int_list(value: Option<&ParamValue>) -> Vec<i64> {
    value
        .and_then(ParamValue::as_list)
        .map(|items| items.iter().filter_map(ParamValue::as_i64).collect())
        .unwrap_or_default()
}

/// `(talentId,spellId,rank)`; older logs list bare talent ids.
fn parse_talent(value: &ParamValue) -> Option<Talent> {
    match value {
        ParamValue::List(fields) => Some(Talent {
            id: fields.first()?.as_i64()?,
            spell_id: fields.get(1).and_then(ParamValue::as_i64).unwrap_or(0),
            rank: fields.get(2).and_then(ParamValue::as_i64).unwrap_or(0),
        }),
        other => other.as_i64().map(|id| Talent {
            id,
            ..Default::default()
        }),
    }
}

/// `(itemId,itemLevel,(enchants),(bonusIds),(gems))`
fn parse_item(value: &ParamValue) -> Option<EquippedItem> {
    let fields = value.as_list()?;
    Some(EquippedItem {
        item_id: fields.first()?.as_i64()?,
        item_level: fields.get(1).and_then(ParamValue::as_i64).unwrap_or(0),
        enchants: int_list(fields.get(2)),
        bonus_ids: int_list(fields.get(3)),
        gems: int_list(fields.get(4)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_log::parse_line;

    fn classify(format: LogFormat, raw: &str) -> Option<CombatEvent> {
        let line = parse_line(raw, 2024).unwrap();
        EventClassifier::new(format).classify(line)
    }

    fn action(event: Option<CombatEvent>) -> Arc<CombatAction> {
        match event {
            Some(CombatEvent::Action(a)) => a,
            other => panic!("expected action, got {other:?}"),
        }
    }

    const RETAIL_DAMAGE: &str = r#"5/21 21:30:01.100  SPELL_DAMAGE,Player-60-0A000001,"Arms-Stormrage",0x511,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,12294,"Mortal Strike",0x1,Player-60-0A000001,0000000000000000,95000,100000,2500,300,8000,0,1,50,100,0,-2100.50,1650.25,1505,1.5700,420,12000,11500,-1,1,0,0,300,1,nil,nil,nil"#;

    const CLASSIC_DAMAGE: &str = r#"5/21 21:30:01.100  SPELL_DAMAGE,Player-4395-0A000001,"Arms-Mirage",0x511,0x0,Player-4395-0B000002,"Holy-Mirage",0x548,0x0,12294,"Mortal Strike",0x1,Player-4395-0A000001,0000000000000000,9500,10000,2500,300,8000,1,50,100,0,-2100.50,1650.25,1505,1.5700,70,1200,-1,1,0,0,150,1,nil,nil,nil"#;

    #[test]
    fn test_retail_damage_offsets() {
        let a = action(classify(LogFormat::Retail, RETAIL_DAMAGE));
        assert_eq!(a.kind, ActionKind::Damage);
        assert_eq!(a.src_unit_id.as_deref(), Some("Player-60-0A000001"));
        assert_eq!(a.dest_unit_name.as_deref(), Some("Holy-Tichondrius"));
        assert_eq!(a.dest_unit_flags, 0x548);
        assert_eq!(a.spell_id(), Some(12294));
        assert_eq!(
            a.details,
            ActionDetails::Damage {
                amount: 12000,
                overkill: -1,
                absorbed: 300,
                critical: true,
                environmental_type: None,
            }
        );

        let adv = a.advanced.as_ref().unwrap();
        assert_eq!(adv.actor_id, "Player-60-0A000001");
        assert_eq!(adv.owner_id, None);
        assert_eq!(adv.absorb, Some(0));
        assert_eq!(adv.level, 420.0);
        assert_eq!(adv.position_x, -2100.5);
    }

    #[test]
    fn test_extreme_damage_amount_saturates() {
        let raw = RETAIL_DAMAGE.replace(",12000,11500,", ",-9223372036854775808,11500,");
        let a = action(classify(LogFormat::Retail, &raw));
        assert!(matches!(a.details, ActionDetails::Damage { amount: i64::MIN, .. }));
        assert_eq!(a.effective_amount(), i64::MAX);
    }

    #[test]
    fn test_classic_damage_offsets() {
        let a = action(classify(LogFormat::Classic, CLASSIC_DAMAGE));
        assert_eq!(
            a.details,
            ActionDetails::Damage {
                amount: 1200,
                overkill: -1,
                absorbed: 150,
                critical: true,
                environmental_type: None,
            }
        );
        let adv = a.advanced.as_ref().unwrap();
        assert_eq!(adv.absorb, None);
        assert_eq!(adv.level, 70.0);
    }

    #[test]
    fn test_advanced_block_without_actor() {
        let raw = r#"5/21 21:30:01.100  SWING_DAMAGE,Pet-0-1-2-3-4,"Wolf",0x1111,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,0000000000000000,0000000000000000,0,0,0,0,0,0,-1,0,0,0,0.00,0.00,0,0.0000,0,800,800,-1,1,0,0,0,nil,nil,nil,nil"#;
        let a = action(classify(LogFormat::Retail, raw));
        assert!(!a.is_advanced());
        assert!(matches!(a.details, ActionDetails::Damage { amount: 800, .. }));
    }

    #[test]
    fn test_heal() {
        let raw = r#"5/21 21:30:02.000  SPELL_HEAL,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,2061,"Flash Heal",0x2,Player-60-0B000002,0000000000000000,80000,100000,0,5000,3000,0,0,90,100,10,1.0,2.0,1505,0.5,415,9000,9000,1000,0,1"#;
        let a = action(classify(LogFormat::Retail, raw));
        assert_eq!(
            a.details,
            ActionDetails::Heal {
                amount: 9000,
                overhealing: 1000,
                absorbed: 0,
                critical: true,
            }
        );
        assert_eq!(a.effective_amount(), 8000);
    }

    #[test]
    fn test_absorb_with_and_without_spell() {
        let swing = r#"5/21 21:30:03.000  SPELL_ABSORBED,Player-60-0A000001,"Arms-Stormrage",0x511,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,17,"Power Word: Shield",0x2,1500,2000"#;
        let a = action(classify(LogFormat::Retail, swing));
        assert!(a.spell.is_none());
        match &a.details {
            ActionDetails::Absorb {
                shield_owner_id,
                shield_spell,
                amount,
                ..
            } => {
                assert_eq!(shield_owner_id.as_deref(), Some("Player-60-0B000002"));
                assert_eq!(shield_spell.id, 17);
                assert_eq!(*amount, 1500);
            }
            other => panic!("unexpected details {other:?}"),
        }

        let spell = r#"5/21 21:30:03.000  SPELL_ABSORBED,Player-60-0A000001,"Arms-Stormrage",0x511,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,12294,"Mortal Strike",0x1,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,17,"Power Word: Shield",0x2,2500,4000"#;
        let a = action(classify(LogFormat::Retail, spell));
        assert_eq!(a.spell_id(), Some(12294));
        assert!(matches!(a.details, ActionDetails::Absorb { amount: 2500, .. }));
    }

    #[test]
    fn test_aura_broken_by_spell() {
        let raw = r#"5/21 21:30:03.500  SPELL_AURA_BROKEN_SPELL,Player-60-0A000001,"Arms-Stormrage",0x511,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,118,"Polymorph",0x40,1464,"Slam",0x1,DEBUFF"#;
        let a = action(classify(LogFormat::Retail, raw));
        assert_eq!(a.kind, ActionKind::AuraBroken);
        assert_eq!(a.spell_id(), Some(118));
        match &a.details {
            ActionDetails::ExtraSpell { spell, aura_type } => {
                assert_eq!(spell.id, 1464);
                assert_eq!(spell.name, "Slam");
                assert_eq!(aura_type.as_deref(), Some("DEBUFF"));
            }
            other => panic!("unexpected details {other:?}"),
        }

        // Plain breaks keep the aura type right after the spell
        let plain = r#"5/21 21:30:03.500  SPELL_AURA_BROKEN,Player-60-0A000001,"Arms-Stormrage",0x511,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,118,"Polymorph",0x40,DEBUFF"#;
        let a = action(classify(LogFormat::Retail, plain));
        assert_eq!(
            a.details,
            ActionDetails::Aura {
                aura_type: "DEBUFF".to_string(),
                amount: None,
            }
        );
    }

    #[test]
    fn test_death_flag() {
        let died = "5/21 21:30:04.000  UNIT_DIED,0000000000000000,nil,0x80000000,0x80000000,Player-60-0B000002,\"Holy-Tichondrius\",0x548,0x0,0";
        let a = action(classify(LogFormat::Retail, died));
        assert_eq!(a.kind, ActionKind::Death);
        assert!(a.src_unit_id.is_none());
        assert_eq!(a.details, ActionDetails::Death { unconscious: false });

        let feigned = died.replace(",0x548,0x0,0", ",0x548,0x0,1");
        let a = action(classify(LogFormat::Retail, &feigned));
        assert_eq!(a.details, ActionDetails::Death { unconscious: true });
    }

    #[test]
    fn test_rejects_short_lines() {
        assert!(classify(LogFormat::Retail, "5/21 21:30:04.000  SPELL_DAMAGE,a,b,c").is_none());
        assert!(classify(LogFormat::Retail, "5/21 21:30:04.000  ARENA_MATCH_END,0,1").is_none());
        assert!(classify(LogFormat::Retail, "5/21 21:30:04.000  EMOTE,a,b,c,d,e,f,g,h").is_none());
    }

    #[test]
    fn test_arena_markers() {
        match classify(LogFormat::Retail, "5/21 21:28:22.712  ARENA_MATCH_START,2547,33,3v3,1") {
            Some(CombatEvent::MatchStart(start)) => {
                let info = start.info.unwrap();
                assert_eq!(info.zone_id, 2547);
                assert_eq!(info.bracket, "3v3");
                assert!(info.is_ranked);
            }
            other => panic!("expected start, got {other:?}"),
        }

        match classify(LogFormat::Retail, "5/21 21:31:22.712  ARENA_MATCH_END,1,180,1650,1712") {
            Some(CombatEvent::MatchEnd(end)) => {
                let info = end.info.unwrap();
                assert_eq!(info.winning_team_id, "1");
                assert_eq!(info.match_duration_secs, 180);
                assert_eq!(info.team1_mmr, 1712);
            }
            other => panic!("expected end, got {other:?}"),
        }

        // Retail ignores zone changes; classic ignores arena markers
        assert!(classify(LogFormat::Retail, r#"5/21 21:28:00.000  ZONE_CHANGE,572,"Ruins of Lordaeron",0"#).is_none());
        assert!(classify(LogFormat::Classic, "5/21 21:28:22.712  ARENA_MATCH_START,2547,33,3v3,1").is_none());
    }

    #[test]
    fn test_classic_zone_markers() {
        let start = classify(LogFormat::Classic, r#"5/21 21:28:00.000  ZONE_CHANGE,572,"Ruins of Lordaeron",0"#);
        assert!(matches!(start, Some(CombatEvent::MatchStart(MatchStart { zone_id: 572, info: None, .. }))));

        let end = classify(LogFormat::Classic, r#"5/21 21:35:00.000  ZONE_CHANGE,1519,"Stormwind City",0"#);
        assert!(matches!(end, Some(CombatEvent::MatchEnd(MatchEnd { info: None, .. }))));
    }

    const COMBATANT_INFO: &str = "5/21 21:28:23.000  COMBATANT_INFO,Player-60-0A000001,0,1500,800,30000,400,0,0,0,900,900,900,0,0,700,700,700,0,1200,400,400,200,3500,71,[(112122,384318,1),(112123,384319,2)],(3534,5372,0,0),[(193791,424,(),(8836,9130),()),(193792,424,(6616,0,0),(),(192985,0))],[Player-60-0A000001,1126,Player-60-0B000002,21562],0,0,0,0";

    #[test]
    fn test_combatant_info() {
        match classify(LogFormat::Retail, COMBATANT_INFO) {
            Some(CombatEvent::UnitInfoSnapshot(snapshot)) => {
                assert_eq!(snapshot.unit_id, "Player-60-0A000001");
                let info = &snapshot.info;
                assert_eq!(info.team_id, "0");
                assert_eq!(info.spec, CombatUnitSpec::WarriorArms);
                assert_eq!(info.stats.strength, 1500);
                assert_eq!(info.stats.armor, 3500);
                assert_eq!(info.talents.len(), 2);
                assert_eq!(info.talents[1].rank, 2);
                assert_eq!(info.pvp_talents, vec![3534, 5372, 0, 0]);
                assert_eq!(info.equipment.len(), 2);
                assert_eq!(info.equipment[0].bonus_ids, vec![8836, 9130]);
                assert_eq!(info.equipment[1].gems, vec![192985, 0]);
                assert_eq!(
                    info.interesting_auras_json,
                    r#"["Player-60-0A000001",1126,"Player-60-0B000002",21562]"#
                );
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_combatant_info_unknown_spec_ignored() {
        let raw = COMBATANT_INFO.replace(",3500,71,", ",3500,9999,");
        assert!(classify(LogFormat::Retail, &raw).is_none());
        // Legacy layout has no snapshot support
        assert!(classify(LogFormat::Classic, COMBATANT_INFO).is_none());
    }
}
