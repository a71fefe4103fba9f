use phf::{phf_map, phf_set};

/// Arena instance ids, legacy and modern.
static ARENA_ZONES: phf::Map<i64, &'static str> = phf_map! {
    559i64 => "Nagrand Arena",
    562i64 => "Blade's Edge Arena",
    572i64 => "Ruins of Lordaeron",
    617i64 => "Dalaran Sewers",
    618i64 => "The Ring of Valor",
    980i64 => "Tol'Viron Arena",
    1134i64 => "The Tiger's Peak",
    1504i64 => "Black Rook Hold Arena",
    1505i64 => "Nagrand Arena",
    1552i64 => "Ashamane's Fall",
    1672i64 => "Blade's Edge Arena",
    1825i64 => "Hook Point",
    1911i64 => "Mugambala",
    2167i64 => "The Robodrome",
    2373i64 => "Empyrean Domain",
    2509i64 => "Maldraxxus Coliseum",
    2547i64 => "Enigma Crucible",
    2563i64 => "Nokhudon Proving Grounds",
    2759i64 => "Cage of Carnage",
};

/// "Arena Preparation" buffs, removed as the gates open.
static ARENA_PREPARATION: phf::Set<i64> = phf_set! {
    32727i64,
    32728i64,
};

pub fn is_arena_zone(zone_id: i64) -> bool {
    ARENA_ZONES.contains_key(&zone_id)
}

pub fn arena_name(zone_id: i64) -> Option<&'static str> {
    ARENA_ZONES.get(&zone_id).copied()
}

pub fn is_arena_preparation(spell_id: i64) -> bool {
    ARENA_PREPARATION.contains(&spell_id)
}
