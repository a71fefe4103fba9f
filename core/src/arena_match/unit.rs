use std::sync::Arc;

use crate::events::{CombatAction, CombatantInfo};
use crate::game_data::{CombatUnitClass, CombatUnitReaction, CombatUnitSpec, CombatUnitType};

/// Resolve `slot` once. Later evidence never overwrites a resolved value.
fn prove<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}

/// One participant of a match (player or pet) and everything it did.
///
/// Identity attributes start unresolved and are set by the first
/// conclusive piece of evidence. Event lists hold shared handles, so the
/// same action can sit in several units' lists.
#[derive(Debug, Clone)]
pub struct CombatUnit {
    pub id: String,
    name: Option<String>,
    unit_type: Option<CombatUnitType>,
    reaction: Option<CombatUnitReaction>,
    class: Option<CombatUnitClass>,
    spec: Option<CombatUnitSpec>,
    owner_id: Option<String>,
    /// Spell-table evidence, applied at finalization only if no snapshot
    /// resolved the class.
    inferred_class: Option<CombatUnitClass>,
    pub info: Option<CombatantInfo>,

    pub damage_in: Vec<Arc<CombatAction>>,
    pub damage_out: Vec<Arc<CombatAction>>,
    pub heal_in: Vec<Arc<CombatAction>>,
    pub heal_out: Vec<Arc<CombatAction>>,
    pub absorbs_in: Vec<Arc<CombatAction>>,
    pub absorbs_out: Vec<Arc<CombatAction>>,
    pub absorbs_damaged: Vec<Arc<CombatAction>>,
    pub aura_events: Vec<Arc<CombatAction>>,
    pub actions_in: Vec<Arc<CombatAction>>,
    pub actions_out: Vec<Arc<CombatAction>>,
    pub spell_cast_events: Vec<Arc<CombatAction>>,
    pub advanced_actions: Vec<Arc<CombatAction>>,
    pub death_records: Vec<Arc<CombatAction>>,
    pub conscious_death_records: Vec<Arc<CombatAction>>,

    pub start_time: i64,
    pub end_time: i64,
    ended: bool,
}

impl CombatUnit {
    pub fn new(id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            name: None,
            unit_type: None,
            reaction: None,
            class: None,
            spec: None,
            owner_id: None,
            inferred_class: None,
            info: None,
            damage_in: Vec::new(),
            damage_out: Vec::new(),
            heal_in: Vec::new(),
            heal_out: Vec::new(),
            absorbs_in: Vec::new(),
            absorbs_out: Vec::new(),
            absorbs_damaged: Vec::new(),
            aura_events: Vec::new(),
            actions_in: Vec::new(),
            actions_out: Vec::new(),
            spell_cast_events: Vec::new(),
            advanced_actions: Vec::new(),
            death_records: Vec::new(),
            conscious_death_records: Vec::new(),
            start_time: timestamp,
            end_time: timestamp,
            ended: false,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn unit_type(&self) -> CombatUnitType {
        self.unit_type.unwrap_or_default()
    }

    pub fn reaction(&self) -> CombatUnitReaction {
        self.reaction.unwrap_or_default()
    }

    pub fn class(&self) -> CombatUnitClass {
        self.class.unwrap_or_default()
    }

    pub fn spec(&self) -> CombatUnitSpec {
        self.spec.unwrap_or_default()
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn is_player(&self) -> bool {
        self.unit_type == Some(CombatUnitType::Player)
    }

    pub fn has_type_proof(&self) -> bool {
        self.unit_type.is_some()
    }

    pub fn has_reaction_proof(&self) -> bool {
        self.reaction.is_some()
    }

    /// Extend the activity window to `timestamp`.
    pub fn touch(&mut self, timestamp: i64) {
        if self.ended {
            return;
        }
        self.start_time = self.start_time.min(timestamp);
        self.end_time = self.end_time.max(timestamp);
    }

    pub fn prove_name(&mut self, name: &str) {
        prove(&mut self.name, name.to_string());
    }

    /// Prove type and reaction from a unit flag word. Inconclusive bits
    /// leave the proof open.
    pub fn prove_flags(&mut self, flags: i64) {
        if let Some(unit_type) = CombatUnitType::from_flags(flags) {
            prove(&mut self.unit_type, unit_type);
        }
        if let Some(reaction) = CombatUnitReaction::from_flags(flags) {
            prove(&mut self.reaction, reaction);
        }
    }

    pub fn prove_class(&mut self, class: CombatUnitClass) -> bool {
        class != CombatUnitClass::None && prove(&mut self.class, class)
    }

    pub fn prove_spec(&mut self, spec: CombatUnitSpec) -> bool {
        spec != CombatUnitSpec::None && prove(&mut self.spec, spec)
    }

    pub fn prove_owner(&mut self, owner_id: &str) -> bool {
        owner_id != self.id && prove(&mut self.owner_id, owner_id.to_string())
    }

    pub fn infer_class(&mut self, class: CombatUnitClass) {
        if class != CombatUnitClass::None {
            prove(&mut self.inferred_class, class);
        }
    }

    /// Store a snapshot and prove spec and class from it. The first
    /// snapshot of a unit is kept.
    pub fn set_info(&mut self, info: CombatantInfo) {
        if self.info.is_some() {
            return;
        }
        self.prove_spec(info.spec);
        self.prove_class(info.spec.class());
        self.info = Some(info);
    }

    pub fn team_id(&self) -> Option<&str> {
        self.info.as_ref().map(|i| i.team_id.as_str())
    }

    /// Close the activity window and settle the identity proofs.
    pub fn end_activity(&mut self) {
        if let Some(spec) = self.info.as_ref().map(|i| i.spec) {
            self.prove_spec(spec);
            self.prove_class(spec.class());
        }
        if let Some(class) = self.inferred_class {
            self.prove_class(class);
        }
        self.ended = true;
    }

    pub fn total_damage_out(&self) -> i64 {
        -sum_effective(&self.damage_out)
    }

    pub fn total_damage_in(&self) -> i64 {
        -sum_effective(&self.damage_in)
    }

    pub fn total_heal_out(&self) -> i64 {
        sum_effective(&self.heal_out)
    }

    pub fn total_heal_in(&self) -> i64 {
        sum_effective(&self.heal_in)
    }
}

fn sum_effective(actions: &[Arc<CombatAction>]) -> i64 {
    actions.iter().map(|a| a.effective_amount()).sum()
}
