//! Stream-level scenarios: segmentation, recovery and canonical ids.

use std::sync::{Arc, Mutex};

use arenalog_types::LogFormat;

use super::parsing_session::{ArenaLogParser, MatchHandler, ParserOutput};
use crate::arena_match::{CombatResult, MalformedMatch, Match};
use crate::game_data::{CombatUnitClass, CombatUnitReaction, CombatUnitSpec, CombatUnitType};

/// 2v2 retail match: one death, one line without the timestamp separator.
const WELL_FORMED: [&str; 12] = [
    r#"5/21 21:28:22.712  ARENA_MATCH_START,2547,33,2v2,1"#,
    r#"5/21 21:28:23.000  COMBATANT_INFO,Player-60-0A000001,0,1500,800,30000,400,0,0,0,900,900,900,0,0,700,700,700,0,1200,400,400,200,3500,71,[(112122,384318,1)],(3534,5372,0,0),[(193791,424,(),(8836,9130),())],[],0,0,1620,0"#,
    r#"5/21 21:28:23.000  COMBATANT_INFO,Player-60-0A000002,0,1500,800,30000,400,0,0,0,900,900,900,0,0,700,700,700,0,1200,400,400,200,3500,256,[(112122,384318,1)],(3534,5372,0,0),[(193791,424,(),(8836,9130),())],[],0,0,1580,0"#,
    r#"5/21 21:28:23.000  COMBATANT_INFO,Player-60-0B000001,1,1500,800,30000,400,0,0,0,900,900,900,0,0,700,700,700,0,1200,400,400,200,3500,72,[(112122,384318,1)],(3534,5372,0,0),[(193791,424,(),(8836,9130),())],[],0,0,1490,0"#,
    r#"5/21 21:28:23.000  COMBATANT_INFO,Player-60-0B000002,1,1500,800,30000,400,0,0,0,900,900,900,0,0,700,700,700,0,1200,400,400,200,3500,257,[(112122,384318,1)],(3534,5372,0,0),[(193791,424,(),(8836,9130),())],[],0,0,1510,0"#,
    r#"5/21 21:29:00.000  SPELL_AURA_REMOVED,Player-60-0A000001,"Arms-Stormrage",0x511,0x0,Player-60-0A000001,"Arms-Stormrage",0x511,0x0,32727,"Arena Preparation",0x1,BUFF"#,
    r#"5/21 21:29:05.000  SPELL_DAMAGE,Player-60-0A000001,"Arms-Stormrage",0x511,0x0,Player-60-0B000001,"Fury-Tichondrius",0x548,0x0,12294,"Mortal Strike",0x1,Player-60-0A000001,0000000000000000,100000,100000,2500,300,8000,0,1,50,100,0,-2100.50,1650.25,1505,1.5700,420,32000,30000,-1,1,0,0,0,1,nil,nil,nil"#,
    r#"5/21 21:29:10.000 SPELL_DAMAGE,Player-60-0A000001,"Arms-Stormrage",0x511"#,
    r#"5/21 21:29:12.000  SPELL_HEAL,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,2061,"Flash Heal",0x2,Player-60-0B000002,0000000000000000,60000,100000,0,5000,3000,0,0,90,100,10,-2080.00,1640.00,1505,0.5000,418,20000,20000,0,0,nil"#,
    r#"5/21 21:29:20.000  SPELL_DAMAGE,Player-60-0A000002,"Disc-Stormrage",0x512,0x0,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,585,"Smite",0x2,Player-60-0A000002,0000000000000000,90000,100000,0,4000,3000,0,0,80,100,5,-2090.00,1645.00,1505,3.1400,419,85000,85000,5000,2,0,0,0,nil,nil,nil,nil"#,
    r#"5/21 21:29:20.100  UNIT_DIED,0000000000000000,nil,0x80000000,0x80000000,Player-60-0B000002,"Holy-Tichondrius",0x548,0x0,0"#,
    r#"5/21 21:30:22.712  ARENA_MATCH_END,0,120,1500,1480"#,
];

const WELL_FORMED_ID: &str = "1ea0a6d4d88d19b49fa60183d96468e5";

const ARMS: &str = "Player-60-0A000001";
const DISC: &str = "Player-60-0A000002";
const FURY: &str = "Player-60-0B000001";
const HOLY: &str = "Player-60-0B000002";

const LEGACY: [&str; 7] = [
    r#"5/21 21:28:00.000  ZONE_CHANGE,572,"Ruins of Lordaeron",0"#,
    r#"5/21 21:28:30.000  SPELL_AURA_REMOVED,Player-4395-0A000001,"Arms-Mirage",0x511,0x0,Player-4395-0A000001,"Arms-Mirage",0x511,0x0,32727,"Arena Preparation",0x1,BUFF"#,
    r#"5/21 21:28:35.000  SPELL_CAST_SUCCESS,Player-4395-0A000001,"Arms-Mirage",0x511,0x0,Player-4395-0B000001,"Holy-Mirage",0x548,0x0,12294,"Mortal Strike",0x1,Player-4395-0A000001,0000000000000000,9500,10000,2500,0,8000,1,50,100,0,-2100.50,1650.25,1505,1.5700,70"#,
    r#"5/21 21:28:35.000  SPELL_CAST_SUCCESS,Player-4395-0A000001,"Arms-Mirage",0x511,0x0,Player-4395-0B000001,"Holy-Mirage",0x548,0x0,12294,"Mortal Strike",0x1,Player-4395-0A000001,0000000000000000,9500,10000,2500,0,8000,1,50,100,0,-2100.50,1650.25,1505,1.5700,70"#,
    r#"5/21 21:28:40.000  SPELL_DAMAGE,Player-4395-0A000001,"Arms-Mirage",0x511,0x0,Player-4395-0B000001,"Holy-Mirage",0x548,0x0,12294,"Mortal Strike",0x1,Player-4395-0A000001,0000000000000000,9500,10000,2500,0,8000,1,40,100,0,-2100.50,1650.25,1505,1.5700,70,9000,500,1,0,0,0,1,nil,nil,nil"#,
    r#"5/21 21:28:40.100  UNIT_DIED,0000000000000000,nil,0x80000000,0x80000000,Player-4395-0B000001,"Holy-Mirage",0x548,0x0"#,
    r#"5/21 21:28:45.000  ZONE_CHANGE,1519,"Stormwind City",0"#,
];

fn feed(parser: &mut ArenaLogParser, lines: &[&str]) -> Vec<ParserOutput> {
    lines.iter().flat_map(|line| parser.push_line(line)).collect()
}

fn run(format: LogFormat, lines: &[&str]) -> Vec<ParserOutput> {
    let mut parser = ArenaLogParser::with_format(format);
    let mut out = feed(&mut parser, lines);
    out.extend(parser.flush());
    out
}

fn matches(outputs: &[ParserOutput]) -> Vec<&Match> {
    outputs.iter().filter_map(ParserOutput::as_match).collect()
}

fn malformed(outputs: &[ParserOutput]) -> Vec<&MalformedMatch> {
    outputs.iter().filter_map(ParserOutput::as_malformed).collect()
}

#[test]
fn test_single_well_formed_match() {
    let outputs = run(LogFormat::Retail, &WELL_FORMED);
    assert_eq!(outputs.len(), 1);

    let m = matches(&outputs)[0];
    assert_eq!(m.id, WELL_FORMED_ID);
    assert_eq!(m.raw_lines.len(), 12);
    assert_eq!(m.lines_not_parsed, 1);
    assert_eq!(m.result, CombatResult::Win);
    assert_eq!(m.player_team_id.as_deref(), Some("0"));
    assert_eq!(m.player_team_rating, 1500);
    assert!(m.has_advanced_logging);
    assert_eq!(m.version, LogFormat::Retail);

    let start = m.start_info.as_ref().unwrap();
    assert_eq!((start.zone_id, start.bracket.as_str(), start.is_ranked), (2547, "2v2", true));
    let end = m.end_info.as_ref().unwrap();
    assert_eq!((end.team0_mmr, end.team1_mmr, end.match_duration_secs), (1500, 1480, 120));

    assert_eq!(m.units.len(), 4);
    let arms = m.unit(ARMS).unwrap();
    assert_eq!(arms.unit_type(), CombatUnitType::Player);
    assert_eq!(arms.reaction(), CombatUnitReaction::Friendly);
    assert_eq!(arms.spec(), CombatUnitSpec::WarriorArms);
    assert_eq!(arms.class(), CombatUnitClass::Warrior);
    assert_eq!(arms.name(), "Arms-Stormrage");

    let holy = m.unit(HOLY).unwrap();
    assert_eq!(holy.reaction(), CombatUnitReaction::Hostile);
    assert_eq!(holy.death_records.len(), 1);
    assert_eq!(holy.heal_out.len(), 1);
    assert_eq!(holy.aura_events.len(), 0);
    assert_eq!(m.unit(FURY).unwrap().damage_in.len(), 1);
    assert_eq!(m.unit(DISC).unwrap().team_id(), Some("0"));
}

#[test]
fn test_summary_projection() {
    let outputs = run(LogFormat::Retail, &WELL_FORMED);
    let summary = matches(&outputs)[0].summary();

    assert_eq!(summary.arena, Some("Enigma Crucible"));
    assert_eq!(summary.lines, 12);
    let ids: Vec<_> = summary.units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec![ARMS, DISC, FURY, HOLY]);

    let arms = &summary.units[0];
    assert_eq!(arms.damage_out, 32000);
    let holy = &summary.units[3];
    assert_eq!(holy.damage_in, 85000);
    assert_eq!(holy.heal_out, 20000);
    assert_eq!(holy.deaths, 1);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["result"], "Win");
    assert_eq!(json["units"][0]["spec"], "WarriorArms");
}

#[test]
fn test_double_start() {
    let mut lines = WELL_FORMED[..5].to_vec();
    lines.extend(WELL_FORMED);
    let outputs = run(LogFormat::Retail, &lines);

    assert_eq!(outputs.len(), 2);
    let bad = malformed(&outputs);
    assert_eq!(bad.len(), 1);
    assert_eq!(bad[0].raw_lines.len(), 5);
    assert_eq!(bad[0].id, "1dd93b56dd1241c89c9afa18df5daab5");

    let good = matches(&outputs);
    assert_eq!(good.len(), 1);
    assert_eq!(good[0].raw_lines.len(), 12);
    assert_eq!(good[0].id, WELL_FORMED_ID);
}

#[test]
fn test_never_closes() {
    let mut parser = ArenaLogParser::with_format(LogFormat::Retail);
    assert!(feed(&mut parser, &WELL_FORMED[..11]).is_empty());

    let outputs = parser.flush();
    assert_eq!(outputs.len(), 1);
    let bad = outputs[0].as_malformed().unwrap();
    assert_eq!(bad.id, "960f25dca9b84420460be748a4ee92de");
    assert_eq!(bad.raw_lines.len(), 11);
    assert_eq!(bad.lines_not_parsed, 1);

    assert!(parser.flush().is_empty());
    let stats = parser.stats();
    assert_eq!((stats.matches, stats.malformed), (0, 1));
}

#[test]
fn test_two_consecutive_matches() {
    let second_end = "5/21 21:40:22.712  ARENA_MATCH_END,1,95,1600,1650";
    let mut lines = WELL_FORMED.to_vec();
    lines.extend(&WELL_FORMED[..11]);
    lines.push(second_end);

    let outputs = run(LogFormat::Retail, &lines);
    let found = matches(&outputs);
    assert_eq!(found.len(), 2);
    assert_eq!(outputs.len(), 2);

    assert_eq!(found[0].id, WELL_FORMED_ID);
    assert_eq!(found[0].result, CombatResult::Win);
    assert_eq!(found[0].player_team_rating, 1500);

    let end = found[1].end_info.as_ref().unwrap();
    assert_eq!((end.winning_team_id.as_str(), end.team0_mmr, end.team1_mmr), ("1", 1600, 1650));
    assert_eq!(found[1].result, CombatResult::Lose);
    assert_eq!(found[1].player_team_rating, 1600);
    assert_ne!(found[0].id, found[1].id);
}

#[test]
fn test_deterministic_output() {
    let first = run(LogFormat::Retail, &WELL_FORMED);
    let second = run(LogFormat::Retail, &WELL_FORMED);
    assert_eq!(
        matches(&first)[0].summary(),
        matches(&second)[0].summary()
    );
}

#[test]
fn test_noise_outside_matches() {
    let mut lines = vec![
        "11/12/2024 19:02:11.3911  COMBAT_LOG_VERSION,21,ADVANCED_LOG_ENABLED,1,BUILD_VERSION,11.0.5,PROJECT_ID,1",
        r#"5/21 21:28:00.000  ZONE_CHANGE,2547,"Enigma Crucible",0"#,
        "garbage",
    ];
    lines.extend(WELL_FORMED);
    lines.push(WELL_FORMED[7]);

    let mut parser = ArenaLogParser::with_format(LogFormat::Retail);
    let mut outputs = feed(&mut parser, &lines);
    outputs.extend(parser.flush());

    let found = matches(&outputs);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, WELL_FORMED_ID);

    let stats = parser.stats();
    assert_eq!(stats.lines_seen, 16);
    assert_eq!(stats.lines_not_parsed, 5);
    assert_eq!(stats.lines_deduplicated, 0);
}

#[test]
fn test_unvalidated_match_is_malformed() {
    // Same match without the death
    let lines: Vec<_> = WELL_FORMED
        .iter()
        .copied()
        .filter(|l| !l.contains("UNIT_DIED"))
        .collect();
    let outputs = run(LogFormat::Retail, &lines);
    assert_eq!(malformed(&outputs).len(), 1);
    assert!(matches(&outputs).is_empty());
}

#[derive(Clone, Default)]
struct Recorder {
    ended: Arc<Mutex<Vec<String>>>,
    malformed: Arc<Mutex<Vec<String>>>,
}

impl MatchHandler for Recorder {
    fn on_match_ended(&mut self, m: &Match) {
        self.ended.lock().unwrap().push(m.id.clone());
    }

    fn on_match_malformed(&mut self, m: &MalformedMatch) {
        self.malformed.lock().unwrap().push(m.id.clone());
    }
}

#[test]
fn test_handlers_receive_outputs() {
    let recorder = Recorder::default();
    let mut parser = ArenaLogParser::with_format(LogFormat::Retail);
    parser.add_handler(Box::new(recorder.clone()));

    feed(&mut parser, &WELL_FORMED);
    feed(&mut parser, &WELL_FORMED[..3]);
    parser.flush();

    assert_eq!(*recorder.ended.lock().unwrap(), vec![WELL_FORMED_ID.to_string()]);
    assert_eq!(recorder.malformed.lock().unwrap().len(), 1);
}

#[test]
fn test_legacy_match_with_duplicates() {
    let outputs = run(LogFormat::Classic, &LEGACY);
    let found = matches(&outputs);
    assert_eq!(found.len(), 1, "outputs: {outputs:?}");
    let m = found[0];

    // The duplicated cast never reaches the segment
    assert_eq!(m.raw_lines.len(), 6);
    assert_eq!(m.raw_lines.iter().filter(|l| l.contains("SPELL_CAST_SUCCESS")).count(), 1);

    assert_eq!(m.result, CombatResult::Win);
    assert_eq!(m.player_team_id.as_deref(), Some("0"));
    let start = m.start_info.as_ref().unwrap();
    assert_eq!((start.zone_id, start.bracket.as_str(), start.is_ranked), (572, "1v1", false));
    let end = m.end_info.as_ref().unwrap();
    assert_eq!((end.winning_team_id.as_str(), end.match_duration_secs), ("0", 45));

    let arms = m.unit("Player-4395-0A000001").unwrap();
    assert_eq!(arms.class(), CombatUnitClass::Warrior);
    assert_eq!(arms.team_id(), Some("0"));
    assert_eq!(m.unit("Player-4395-0B000001").unwrap().team_id(), Some("1"));
}

#[test]
fn test_legacy_dedup_counts() {
    let mut parser = ArenaLogParser::with_format(LogFormat::Classic);
    feed(&mut parser, &LEGACY);
    assert_eq!(parser.stats().lines_deduplicated, 1);

    // Retail never deduplicates
    let mut parser = ArenaLogParser::with_format(LogFormat::Retail);
    feed(&mut parser, &LEGACY);
    assert_eq!(parser.stats().lines_deduplicated, 0);
}
