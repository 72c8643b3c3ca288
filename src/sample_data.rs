//! Fixed data served for the dummy league, which never touches the network.

use crate::bowlers::{BowlerRecord, ACTIVE_GLYPH, GLYPH_SEPARATOR, INACTIVE_GLYPH};

pub const DUMMY_ROSTER_CSV: &str = "\
League,Date,Opponent,A,A Status,B,B Status,C,C Status,Reserved,Reserved Status
dummy,07/Jan/2099,Dummy Rollers,Dummy Alpha,YES,Dummy Bravo,YES,Dummy Charlie,,Dummy Delta,
dummy,14/Jan/2099,Dummy Strikers,Dummy Bravo,YES,Dummy Alpha,,Dummy Charlie,YES,,
dummy,21/Jan/2099,Dummy Spares,Dummy Charlie,,Dummy Alpha,YES,Dummy Bravo,YES,Dummy Alpha,
";

fn dummy(name: &str, gender: &str, active: bool, handicap: u32, games: u32, score: u32, average: u32) -> BowlerRecord {
    let glyph = if active { ACTIVE_GLYPH } else { INACTIVE_GLYPH };
    BowlerRecord {
        name: format!("{glyph}{GLYPH_SEPARATOR}{name}"),
        gender: gender.to_string(),
        active,
        handicap,
        total_games: games,
        total_score: score,
        average,
    }
}

/// Already in ranking order.
pub fn dummy_bowlers() -> Vec<BowlerRecord> {
    vec![
        dummy("Dummy Alpha", "M", true, 0, 30, 6200, 206),
        dummy("Dummy Bravo", "F", true, 8, 24, 4152, 173),
        dummy("Dummy Charlie", "M", false, 12, 18, 2880, 160),
    ]
}
