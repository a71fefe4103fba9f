use super::{CombatResult, Match};

/// Why a built match was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Closed by a double start or a flush instead of an end marker.
    Incomplete,
    MissingStartInfo,
    MissingEndInfo,
    FewerPlayersThanSnapshots { players: usize, snapshots: usize },
    NoPlayerDeath,
    /// Every snapshotted unit died.
    NoSurvivor { dead_players: usize, snapshots: usize },
    UndecidedResult(CombatResult),
}

/// Well-formedness checks. All must hold for the match to be emitted.
pub fn validate(m: &Match) -> Result<(), ValidationFailure> {
    let players = m.units.values().filter(|u| u.is_player()).count();
    let snapshots = m.units.values().filter(|u| u.info.is_some()).count();
    let dead_players = m
        .units
        .values()
        .filter(|u| u.is_player() && !u.death_records.is_empty())
        .count();

    if players < snapshots {
        return Err(ValidationFailure::FewerPlayersThanSnapshots { players, snapshots });
    }
    if dead_players == 0 {
        return Err(ValidationFailure::NoPlayerDeath);
    }
    if m.start_info.is_none() {
        return Err(ValidationFailure::MissingStartInfo);
    }
    if m.end_info.is_none() {
        return Err(ValidationFailure::MissingEndInfo);
    }
    if dead_players >= snapshots {
        return Err(ValidationFailure::NoSurvivor {
            dead_players,
            snapshots,
        });
    }
    if !m.result.is_decided() {
        return Err(ValidationFailure::UndecidedResult(m.result));
    }
    Ok(())
}
