use phf::phf_map;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatUnitClass {
    #[default]
    None,
    Warrior,
    Hunter,
    Shaman,
    Paladin,
    Warlock,
    Priest,
    Rogue,
    Mage,
    Druid,
    DeathKnight,
    DemonHunter,
    Monk,
    Evoker,
}

/// Playable specializations, keyed by their game id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombatUnitSpec {
    #[default]
    None,
    DeathKnightBlood,
    DeathKnightFrost,
    DeathKnightUnholy,
    DemonHunterHavoc,
    DemonHunterVengeance,
    DruidBalance,
    DruidFeral,
    DruidGuardian,
    DruidRestoration,
    EvokerDevastation,
    EvokerPreservation,
    EvokerAugmentation,
    HunterBeastMastery,
    HunterMarksmanship,
    HunterSurvival,
    MageArcane,
    MageFire,
    MageFrost,
    MonkBrewmaster,
    MonkWindwalker,
    MonkMistweaver,
    PaladinHoly,
    PaladinProtection,
    PaladinRetribution,
    PriestDiscipline,
    PriestHoly,
    PriestShadow,
    RogueAssassination,
    RogueOutlaw,
    RogueSubtlety,
    ShamanElemental,
    ShamanEnhancement,
    ShamanRestoration,
    WarlockAffliction,
    WarlockDemonology,
    WarlockDestruction,
    WarriorArms,
    WarriorFury,
    WarriorProtection,
}

impl CombatUnitSpec {
    /// Map a `COMBATANT_INFO` spec id. `0` is a valid "no spec" value;
    /// anything outside the enumeration is rejected.
    pub fn from_id(id: i64) -> Option<Self> {
        use CombatUnitSpec::*;
        let spec = match id {
            0 => None,
            250 => DeathKnightBlood,
            251 => DeathKnightFrost,
            252 => DeathKnightUnholy,
            577 => DemonHunterHavoc,
            581 => DemonHunterVengeance,
            102 => DruidBalance,
            103 => DruidFeral,
            104 => DruidGuardian,
            105 => DruidRestoration,
            1467 => EvokerDevastation,
            1468 => EvokerPreservation,
            1473 => EvokerAugmentation,
            253 => HunterBeastMastery,
            254 => HunterMarksmanship,
            255 => HunterSurvival,
            62 => MageArcane,
            63 => MageFire,
            64 => MageFrost,
            268 => MonkBrewmaster,
            269 => MonkWindwalker,
            270 => MonkMistweaver,
            65 => PaladinHoly,
            66 => PaladinProtection,
            70 => PaladinRetribution,
            256 => PriestDiscipline,
            257 => PriestHoly,
            258 => PriestShadow,
            259 => RogueAssassination,
            260 => RogueOutlaw,
            261 => RogueSubtlety,
            262 => ShamanElemental,
            263 => ShamanEnhancement,
            264 => ShamanRestoration,
            265 => WarlockAffliction,
            266 => WarlockDemonology,
            267 => WarlockDestruction,
            71 => WarriorArms,
            72 => WarriorFury,
            73 => WarriorProtection,
            _ => return Option::None,
        };
        Some(spec)
    }

    pub fn class(self) -> CombatUnitClass {
        use CombatUnitSpec::*;
        match self {
            None => CombatUnitClass::None,
            DeathKnightBlood | DeathKnightFrost | DeathKnightUnholy => CombatUnitClass::DeathKnight,
            DemonHunterHavoc | DemonHunterVengeance => CombatUnitClass::DemonHunter,
            DruidBalance | DruidFeral | DruidGuardian | DruidRestoration => CombatUnitClass::Druid,
            EvokerDevastation | EvokerPreservation | EvokerAugmentation => CombatUnitClass::Evoker,
            HunterBeastMastery | HunterMarksmanship | HunterSurvival => CombatUnitClass::Hunter,
            MageArcane | MageFire | MageFrost => CombatUnitClass::Mage,
            MonkBrewmaster | MonkWindwalker | MonkMistweaver => CombatUnitClass::Monk,
            PaladinHoly | PaladinProtection | PaladinRetribution => CombatUnitClass::Paladin,
            PriestDiscipline | PriestHoly | PriestShadow => CombatUnitClass::Priest,
            RogueAssassination | RogueOutlaw | RogueSubtlety => CombatUnitClass::Rogue,
            ShamanElemental | ShamanEnhancement | ShamanRestoration => CombatUnitClass::Shaman,
            WarlockAffliction | WarlockDemonology | WarlockDestruction => CombatUnitClass::Warlock,
            WarriorArms | WarriorFury | WarriorProtection => CombatUnitClass::Warrior,
        }
    }
}

/// Spells castable by exactly one class in legacy clients.
/// Used to infer class where no `COMBATANT_INFO` exists.
static SPELL_CLASSES: phf::Map<i64, CombatUnitClass> = phf_map! {
    // Warrior
    12294i64 => CombatUnitClass::Warrior, // Mortal Strike
    23881i64 => CombatUnitClass::Warrior, // Bloodthirst
    23922i64 => CombatUnitClass::Warrior, // Shield Slam
    100i64 => CombatUnitClass::Warrior,   // Charge
    20252i64 => CombatUnitClass::Warrior, // Intercept
    6552i64 => CombatUnitClass::Warrior,  // Pummel
    1715i64 => CombatUnitClass::Warrior,  // Hamstring
    5246i64 => CombatUnitClass::Warrior,  // Intimidating Shout
    // Paladin
    635i64 => CombatUnitClass::Paladin,   // Holy Light
    19750i64 => CombatUnitClass::Paladin, // Flash of Light
    853i64 => CombatUnitClass::Paladin,   // Hammer of Justice
    642i64 => CombatUnitClass::Paladin,   // Divine Shield
    1044i64 => CombatUnitClass::Paladin,  // Blessing of Freedom
    35395i64 => CombatUnitClass::Paladin, // Crusader Strike
    4987i64 => CombatUnitClass::Paladin,  // Cleanse
    // Hunter
    19434i64 => CombatUnitClass::Hunter,  // Aimed Shot
    3044i64 => CombatUnitClass::Hunter,   // Arcane Shot
    2643i64 => CombatUnitClass::Hunter,   // Multi-Shot
    1978i64 => CombatUnitClass::Hunter,   // Serpent Sting
    19503i64 => CombatUnitClass::Hunter,  // Scatter Shot
    1499i64 => CombatUnitClass::Hunter,   // Freezing Trap
    3034i64 => CombatUnitClass::Hunter,   // Viper Sting
    5384i64 => CombatUnitClass::Hunter,   // Feign Death
    // Rogue
    1752i64 => CombatUnitClass::Rogue,    // Sinister Strike
    53i64 => CombatUnitClass::Rogue,      // Backstab
    2098i64 => CombatUnitClass::Rogue,    // Eviscerate
    408i64 => CombatUnitClass::Rogue,     // Kidney Shot
    1833i64 => CombatUnitClass::Rogue,    // Cheap Shot
    2094i64 => CombatUnitClass::Rogue,    // Blind
    1766i64 => CombatUnitClass::Rogue,    // Kick
    31224i64 => CombatUnitClass::Rogue,   // Cloak of Shadows
    1329i64 => CombatUnitClass::Rogue,    // Mutilate
    // Priest
    17i64 => CombatUnitClass::Priest,     // Power Word: Shield
    2061i64 => CombatUnitClass::Priest,   // Flash Heal
    8122i64 => CombatUnitClass::Priest,   // Psychic Scream
    8092i64 => CombatUnitClass::Priest,   // Mind Blast
    589i64 => CombatUnitClass::Priest,    // Shadow Word: Pain
    15407i64 => CombatUnitClass::Priest,  // Mind Flay
    33206i64 => CombatUnitClass::Priest,  // Pain Suppression
    34914i64 => CombatUnitClass::Priest,  // Vampiric Touch
    // Shaman
    403i64 => CombatUnitClass::Shaman,    // Lightning Bolt
    421i64 => CombatUnitClass::Shaman,    // Chain Lightning
    8042i64 => CombatUnitClass::Shaman,   // Earth Shock
    8056i64 => CombatUnitClass::Shaman,   // Frost Shock
    331i64 => CombatUnitClass::Shaman,    // Healing Wave
    1064i64 => CombatUnitClass::Shaman,   // Chain Heal
    8177i64 => CombatUnitClass::Shaman,   // Grounding Totem
    974i64 => CombatUnitClass::Shaman,    // Earth Shield
    // Mage
    116i64 => CombatUnitClass::Mage,      // Frostbolt
    133i64 => CombatUnitClass::Mage,      // Fireball
    118i64 => CombatUnitClass::Mage,      // Polymorph
    122i64 => CombatUnitClass::Mage,      // Frost Nova
    1953i64 => CombatUnitClass::Mage,     // Blink
    2139i64 => CombatUnitClass::Mage,     // Counterspell
    45438i64 => CombatUnitClass::Mage,    // Ice Block
    30455i64 => CombatUnitClass::Mage,    // Ice Lance
    // Warlock
    686i64 => CombatUnitClass::Warlock,   // Shadow Bolt
    5782i64 => CombatUnitClass::Warlock,  // Fear
    172i64 => CombatUnitClass::Warlock,   // Corruption
    348i64 => CombatUnitClass::Warlock,   // Immolate
    5484i64 => CombatUnitClass::Warlock,  // Howl of Terror
    6789i64 => CombatUnitClass::Warlock,  // Death Coil
    30108i64 => CombatUnitClass::Warlock, // Unstable Affliction
    1454i64 => CombatUnitClass::Warlock,  // Life Tap
    // Druid
    5176i64 => CombatUnitClass::Druid,    // Wrath
    8921i64 => CombatUnitClass::Druid,    // Moonfire
    774i64 => CombatUnitClass::Druid,     // Rejuvenation
    8936i64 => CombatUnitClass::Druid,    // Regrowth
    33763i64 => CombatUnitClass::Druid,   // Lifebloom
    33786i64 => CombatUnitClass::Druid,   // Cyclone
    18562i64 => CombatUnitClass::Druid,   // Swiftmend
    33876i64 => CombatUnitClass::Druid,   // Mangle (Cat)
    // Death Knight
    49998i64 => CombatUnitClass::DeathKnight, // Death Strike
    45477i64 => CombatUnitClass::DeathKnight, // Icy Touch
    45462i64 => CombatUnitClass::DeathKnight, // Plague Strike
    49576i64 => CombatUnitClass::DeathKnight, // Death Grip
    47528i64 => CombatUnitClass::DeathKnight, // Mind Freeze
    48707i64 => CombatUnitClass::DeathKnight, // Anti-Magic Shell
};

pub fn class_for_spell(spell_id: i64) -> Option<CombatUnitClass> {
    SPELL_CLASSES.get(&spell_id).copied()
}
