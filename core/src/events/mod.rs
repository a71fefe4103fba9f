pub mod classifier;
pub mod combat_event;
pub mod layout;

pub use classifier::EventClassifier;
pub use combat_event::{
    ActionDetails, ActionKind, AdvancedActorInfo, ArenaMatchEndInfo, ArenaMatchStartInfo,
    CombatAction, CombatEvent, CombatantInfo, CombatantInfoEvent, CombatantStats, EquippedItem,
    MatchEnd, MatchStart, SpellInfo, Talent,
};
pub use layout::FieldLayout;
