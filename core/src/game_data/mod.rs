//! Static game tables: unit flag decoding, classes and specializations,
//! arena zones and class-exclusive spells.

mod class;
mod flags;
mod zones;

pub use class::{CombatUnitClass, CombatUnitSpec, class_for_spell};
pub use flags::{CombatUnitReaction, CombatUnitType};
pub use zones::{arena_name, is_arena_preparation, is_arena_zone};
