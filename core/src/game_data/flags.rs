use serde::{Deserialize, Serialize};

const TYPE_MASK: i64 = 0x0000_FC00;
const TYPE_PLAYER: i64 = 0x0000_0400;
const TYPE_PET: i64 = 0x0000_1000;

const REACTION_MASK: i64 = 0x0000_00F0;
const REACTION_FRIENDLY: i64 = 0x0000_0010;
const REACTION_HOSTILE: i64 = 0x0000_0040;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatUnitType {
    #[default]
    None,
    Player,
    Pet,
}

impl CombatUnitType {
    /// Decode the type bits of a unit flag word. `None` when inconclusive.
    pub fn from_flags(flags: i64) -> Option<Self> {
        match flags & TYPE_MASK {
            TYPE_PLAYER => Some(CombatUnitType::Player),
            TYPE_PET => Some(CombatUnitType::Pet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatUnitReaction {
    #[default]
    Neutral,
    Friendly,
    Hostile,
}

impl CombatUnitReaction {
    /// Decode the reaction bits of a unit flag word. `None` when inconclusive.
    pub fn from_flags(flags: i64) -> Option<Self> {
        match flags & REACTION_MASK {
            REACTION_FRIENDLY => Some(CombatUnitReaction::Friendly),
            REACTION_HOSTILE => Some(CombatUnitReaction::Hostile),
            _ => None,
        }
    }

    pub fn opposes(self, other: Self) -> bool {
        matches!(
            (self, other),
            (CombatUnitReaction::Friendly, CombatUnitReaction::Hostile)
                | (CombatUnitReaction::Hostile, CombatUnitReaction::Friendly)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_flags() {
        // Friendly player in party
        assert_eq!(CombatUnitType::from_flags(0x511), Some(CombatUnitType::Player));
        assert_eq!(
            CombatUnitReaction::from_flags(0x511),
            Some(CombatUnitReaction::Friendly)
        );
        // Hostile player
        assert_eq!(CombatUnitType::from_flags(0x548), Some(CombatUnitType::Player));
        assert_eq!(
            CombatUnitReaction::from_flags(0x548),
            Some(CombatUnitReaction::Hostile)
        );
    }

    #[test]
    fn test_pet_and_npc_flags() {
        assert_eq!(CombatUnitType::from_flags(0x1111), Some(CombatUnitType::Pet));
        // NPC type bit is not a proof
        assert_eq!(CombatUnitType::from_flags(0xa48), None);
        // Neutral reaction is not a proof
        assert_eq!(CombatUnitReaction::from_flags(0x80000000), None);
        assert_eq!(CombatUnitReaction::from_flags(0x2a28), None);
    }

    #[test]
    fn test_opposes() {
        assert!(CombatUnitReaction::Friendly.opposes(CombatUnitReaction::Hostile));
        assert!(!CombatUnitReaction::Friendly.opposes(CombatUnitReaction::Friendly));
        assert!(!CombatUnitReaction::Neutral.opposes(CombatUnitReaction::Hostile));
    }
}
