use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::bowlers::{collapse_whitespace, row_league, BowlerRecord, ACTIVE_GLYPH, INACTIVE_GLYPH};
use crate::csv_parser::RawRow;
use crate::dates;

/// Cards shown for a league: the soonest upcoming games.
pub const UPCOMING_LIMIT: usize = 3;

pub const CONFIRMED_GLYPH: &str = "✅";
pub const PENDING_GLYPH: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RosterSlot {
    A,
    B,
    C,
    Reserved,
}

impl RosterSlot {
    pub const ALL: [RosterSlot; 4] = [Self::A, Self::B, Self::C, Self::Reserved];

    /// Column holding the bowler's name for this slot.
    pub fn column(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::Reserved => "Reserved",
        }
    }

    fn status_columns(self) -> [&'static str; 2] {
        match self {
            Self::A => ["A Status", "A_Status"],
            Self::B => ["B Status", "B_Status"],
            Self::C => ["C Status", "C_Status"],
            Self::Reserved => ["Reserved Status", "Reserved_Status"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub slot: RosterSlot,
    pub name: String,
    pub status: String,
    pub is_reserve: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSlots {
    #[serde(rename = "A")]
    pub a: RosterEntry,
    #[serde(rename = "B")]
    pub b: RosterEntry,
    #[serde(rename = "C")]
    pub c: RosterEntry,
    #[serde(rename = "Reserved")]
    pub reserved: RosterEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterGame {
    pub league: String,
    pub date: String,
    pub parsed_date: DateTime<Utc>,
    pub opponent: String,
    pub slots: RosterSlots,
    pub bowlers: Vec<RosterEntry>,
}

/// Stats a lineup is ordered by, borrowed from the ranked bowler list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlerStats {
    pub handicap: i64,
    pub average: i64,
    pub total_games: i64,
}

impl BowlerStats {
    /// Stand-in for a roster name with no matching bowler record.
    pub const UNMATCHED: BowlerStats = BowlerStats {
        handicap: -1,
        average: i64::MAX,
        total_games: -1,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupEntry {
    pub name: String,
    pub display_name: String,
    pub slot: RosterSlot,
    pub is_reserve: bool,
    pub status: String,
    pub confirmed: bool,
    pub status_glyph: String,
    pub handicap: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterCard {
    #[serde(flatten)]
    pub game: RosterGame,
    pub display_date: String,
    pub lineup: Vec<LineupEntry>,
}

/// Games for `league` with a parseable date, soonest first.
#[instrument(skip(rows), fields(row_count = rows.len()))]
pub fn build_roster(rows: &[RawRow], league: &str) -> Vec<RosterGame> {
    let target = league.trim().to_lowercase();
    let mut dropped = 0;

    let mut games: Vec<RosterGame> = rows
        .iter()
        .filter(|row| row_league(row) == target)
        .filter_map(|row| {
            let game = to_game(row);
            if game.is_none() {
                dropped += 1;
                debug!("Dropping roster row with unparseable date '{}'", row.text(&["Date"]));
            }
            game
        })
        .collect();

    games.sort_by_key(|game| game.parsed_date);
    debug!(
        "Built {} roster games for league '{}' ({} dropped)",
        games.len(),
        target,
        dropped
    );
    games
}

/// The first `limit` games on or after `today`. `games` must already be date-ordered.
pub fn select_upcoming(games: &[RosterGame], today: DateTime<Utc>, limit: usize) -> Vec<RosterGame> {
    games
        .iter()
        .filter(|game| game.parsed_date >= today)
        .take(limit)
        .cloned()
        .collect()
}

/// Lookup key shared by roster names and bowler records.
pub fn normalize_name(name: &str) -> String {
    let rest = [ACTIVE_GLYPH, INACTIVE_GLYPH]
        .iter()
        .find_map(|glyph| name.strip_prefix(glyph))
        .map(|rest| rest.trim_start())
        .unwrap_or(name);
    let rest = rest.trim_start_matches('\u{00A0}');

    collapse_whitespace(rest).to_lowercase()
}

/// Name-keyed stats; later records with the same name replace earlier ones.
pub fn stats_lookup(records: &[BowlerRecord]) -> HashMap<String, BowlerStats> {
    records
        .iter()
        .filter_map(|record| {
            let key = normalize_name(&record.name);
            if key.is_empty() {
                return None;
            }
            let stats = BowlerStats {
                handicap: record.handicap.into(),
                average: record.average.into(),
                total_games: record.total_games.into(),
            };
            Some((key, stats))
        })
        .collect()
}

pub fn stats_for(lookup: &HashMap<String, BowlerStats>, name: &str) -> BowlerStats {
    lookup
        .get(&normalize_name(name))
        .copied()
        .unwrap_or(BowlerStats::UNMATCHED)
}

/// Regulars before reserves, then higher handicap, lower average, more games.
pub fn order_lineup(entries: &[RosterEntry], lookup: &HashMap<String, BowlerStats>) -> Vec<RosterEntry> {
    let mut ordered = entries.to_vec();
    ordered.sort_by(|a, b| compare_lineup(a, b, lookup));
    ordered
}

fn compare_lineup(a: &RosterEntry, b: &RosterEntry, lookup: &HashMap<String, BowlerStats>) -> Ordering {
    a.is_reserve.cmp(&b.is_reserve).then_with(|| {
        let sa = stats_for(lookup, &a.name);
        let sb = stats_for(lookup, &b.name);
        sb.handicap
            .cmp(&sa.handicap)
            .then_with(|| sa.average.cmp(&sb.average))
            .then_with(|| sb.total_games.cmp(&sa.total_games))
    })
}

pub fn is_confirmed(status: &str) -> bool {
    status.trim().eq_ignore_ascii_case("YES")
}

pub fn status_glyph(status: &str) -> &'static str {
    if is_confirmed(status) {
        CONFIRMED_GLYPH
    } else {
        PENDING_GLYPH
    }
}

/// Upcoming lineup cards for `league`, each lineup ordered against `records`.
#[instrument(skip(rows, records), fields(row_count = rows.len(), bowler_count = records.len()))]
pub fn build_upcoming_cards(
    rows: &[RawRow],
    records: &[BowlerRecord],
    league: &str,
    today: DateTime<Utc>,
    limit: usize,
) -> Vec<RosterCard> {
    let games = build_roster(rows, league);
    let upcoming = select_upcoming(&games, today, limit);
    let lookup = stats_lookup(records);

    debug!(
        "Selected {} upcoming games of {} (today {})",
        upcoming.len(),
        games.len(),
        dates::format_display_date(&today)
    );

    upcoming
        .into_iter()
        .map(|mut game| {
            game.bowlers = order_lineup(&game.bowlers, &lookup);
            let lineup = game
                .bowlers
                .iter()
                .map(|entry| to_lineup_entry(entry, &lookup))
                .collect();
            RosterCard {
                display_date: dates::format_display_date(&game.parsed_date),
                game,
                lineup,
            }
        })
        .collect()
}

fn to_lineup_entry(entry: &RosterEntry, lookup: &HashMap<String, BowlerStats>) -> LineupEntry {
    let handicap = lookup
        .get(&normalize_name(&entry.name))
        .and_then(|stats| u32::try_from(stats.handicap).ok());
    let display_name = if entry.is_reserve {
        format!("{} (Reserve)", entry.name)
    } else {
        entry.name.clone()
    };

    LineupEntry {
        name: entry.name.clone(),
        display_name,
        slot: entry.slot,
        is_reserve: entry.is_reserve,
        status: entry.status.clone(),
        confirmed: is_confirmed(&entry.status),
        status_glyph: status_glyph(&entry.status).to_string(),
        handicap,
    }
}

fn to_game(row: &RawRow) -> Option<RosterGame> {
    let date = row.text(&["Date"]).trim().to_string();
    let parsed_date = dates::parse_short_date(&date)?;

    let [a, b, c, reserved] = RosterSlot::ALL.map(|slot| RosterEntry {
        slot,
        name: collapse_whitespace(row.text(&[slot.column()])),
        status: row.text(&slot.status_columns()).trim().to_string(),
        is_reserve: slot == RosterSlot::Reserved,
    });

    let bowlers = [&a, &b, &c, &reserved]
        .into_iter()
        .filter(|entry| !entry.name.is_empty())
        .cloned()
        .collect();

    Some(RosterGame {
        league: row_league(row),
        date,
        parsed_date,
        opponent: row.text(&["Opponent", "Team"]).trim().to_string(),
        slots: RosterSlots { a, b, c, reserved },
        bowlers,
    })
}
