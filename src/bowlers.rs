use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::csv_parser::RawRow;

pub const ACTIVE_GLYPH: &str = "🟢";
pub const INACTIVE_GLYPH: &str = "🔴";
/// Two non-breaking spaces between the status glyph and the bowler's name.
pub const GLYPH_SEPARATOR: &str = "\u{00A0}\u{00A0}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlerRecord {
    pub name: String,
    pub gender: String,
    pub active: bool,
    pub handicap: u32,
    pub total_games: u32,
    pub total_score: u32,
    pub average: u32,
}

impl BowlerRecord {
    /// Name without the status glyph prefix.
    pub fn plain_name(&self) -> &str {
        self.name
            .split_once(GLYPH_SEPARATOR)
            .map(|(_, rest)| rest)
            .unwrap_or(&self.name)
    }
}

/// Filter `rows` to `league`, normalize them and return them in ranking order.
#[instrument(skip(rows), fields(row_count = rows.len()))]
pub fn rank(rows: &[RawRow], league: &str) -> Vec<BowlerRecord> {
    let target = league.trim().to_lowercase();

    let mut records: Vec<BowlerRecord> = rows
        .iter()
        .filter(|row| row_league(row) == target)
        .map(to_record)
        .collect();

    debug!("Ranking {} bowlers for league '{}'", records.len(), target);
    records.sort_by(compare_bowlers);
    records
}

/// Active bowlers first, then higher average, more games, lower handicap.
pub fn compare_bowlers(a: &BowlerRecord, b: &BowlerRecord) -> Ordering {
    b.active
        .cmp(&a.active)
        .then_with(|| b.average.cmp(&a.average))
        .then_with(|| b.total_games.cmp(&a.total_games))
        .then_with(|| a.handicap.cmp(&b.handicap))
}

pub(crate) fn row_league(row: &RawRow) -> String {
    row.text(&["League"]).trim().to_lowercase()
}

fn to_record(row: &RawRow) -> BowlerRecord {
    let active = row.get("Active") == Some("YES") || row.get("active") == Some("yes");
    let glyph = if active { ACTIVE_GLYPH } else { INACTIVE_GLYPH };
    let name = collapse_whitespace(row.text(&["Bowler"]));

    BowlerRecord {
        name: format!("{glyph}{GLYPH_SEPARATOR}{name}"),
        gender: row.text(&["Gender"]).trim().to_uppercase(),
        active,
        handicap: parse_count(row.text(&["Hdcp", "HDCP"])),
        total_games: parse_count(row.text(&["Total Games"])),
        total_score: parse_count(row.text(&["Total Score"])),
        average: parse_count(row.text(&["Average"])),
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Leading-integer parse: `"200"` and `"200.7"` give 200; anything else gives 0.
///
/// A digit run too large for `u32` also gives 0 rather than saturating.
pub(crate) fn parse_count(text: &str) -> u32 {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    trimmed[..digits_end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_parser;

    const FEED: &str = "\
League,Bowler,Gender,Active,Total Games,Total Score,Average,Hdcp
pinfinity,Carol,F,YES,10,2000,200,0
pinfinity,Bob,M,YES,20,3600,180,10
tampines,Ignored,M,YES,30,6000,200,0
pinfinity,Alice,F,NO,8,1400,175,0
";

    fn record(name: &str, active: bool, average: u32, games: u32, handicap: u32) -> BowlerRecord {
        BowlerRecord {
            name: name.to_string(),
            gender: "M".to_string(),
            active,
            handicap,
            total_games: games,
            total_score: 0,
            average,
        }
    }

    #[test]
    fn test_rank_filters_maps_and_orders() {
        let rows = csv_parser::parse(FEED);
        let ranked = rank(&rows, "pinfinity");

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].name, "🟢\u{00A0}\u{00A0}Carol");
        assert_eq!(ranked[0].gender, "F");
        assert!(ranked[0].active);
        assert_eq!(ranked[0].handicap, 0);
        assert_eq!(ranked[0].total_games, 10);
        assert_eq!(ranked[0].total_score, 2000);
        assert_eq!(ranked[0].average, 200);

        assert_eq!(ranked[1].plain_name(), "Bob");
        assert_eq!(ranked[1].handicap, 10);
        assert_eq!(ranked[1].total_games, 20);

        assert_eq!(ranked[2].name, "🔴\u{00A0}\u{00A0}Alice");
        assert!(!ranked[2].active);
        assert_eq!(ranked[2].average, 175);
    }

    #[test]
    fn test_rank_league_match_is_case_insensitive() {
        let rows = csv_parser::parse(FEED);
        assert_eq!(rank(&rows, " PinFinity ").len(), 3);
        assert_eq!(rank(&rows, "tampines").len(), 1);
    }

    #[test]
    fn test_rank_unknown_league_is_empty() {
        let rows = csv_parser::parse(FEED);
        assert!(rank(&rows, "nowhere").is_empty());
        assert!(rank(&[], "pinfinity").is_empty());
    }

    #[test]
    fn test_active_requires_exact_yes() {
        let rows = vec![
            RawRow::from_pairs([("League", "x"), ("Bowler", "Upper"), ("Active", "YES")]),
            RawRow::from_pairs([("League", "x"), ("Bowler", "Mixed"), ("Active", "Yes")]),
            RawRow::from_pairs([("league", "x"), ("bowler", "Lower"), ("active", "yes")]),
        ];
        let ranked = rank(&rows, "x");

        let active: Vec<_> = ranked.iter().filter(|r| r.active).map(|r| r.plain_name()).collect();
        assert_eq!(active, vec!["Upper", "Lower"]);
    }

    #[test]
    fn test_name_whitespace_is_collapsed() {
        let rows = vec![RawRow::from_pairs([
            ("League", "x"),
            ("Bowler", "  Mary   Ann\t Lee "),
        ])];
        let ranked = rank(&rows, "x");

        assert_eq!(ranked[0].name, "🔴\u{00A0}\u{00A0}Mary Ann Lee");
    }

    #[test]
    fn test_numeric_fields_default_to_zero() {
        let rows = vec![RawRow::from_pairs([
            ("League", "x"),
            ("Bowler", "Z"),
            ("Average", "abc"),
            ("Total Games", "-4"),
            ("HDCP", "12.9"),
        ])];
        let ranked = rank(&rows, "x");

        assert_eq!(ranked[0].average, 0);
        assert_eq!(ranked[0].total_games, 0);
        assert_eq!(ranked[0].total_score, 0);
        assert_eq!(ranked[0].handicap, 12);
    }

    #[test]
    fn test_comparator_tie_breaks() {
        let mut records = vec![
            record("inactive-high", false, 250, 50, 0),
            record("low-avg", true, 150, 40, 0),
            record("high-hdcp", true, 190, 30, 15),
            record("more-games", true, 190, 31, 20),
            record("low-hdcp", true, 190, 30, 5),
        ];
        records.sort_by(compare_bowlers);

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["more-games", "low-hdcp", "high-hdcp", "low-avg", "inactive-high"]
        );
    }

    #[test]
    fn test_full_ties_keep_input_order_and_duplicates() {
        let rows = vec![
            RawRow::from_pairs([("League", "x"), ("Bowler", "Twin"), ("Average", "180")]),
            RawRow::from_pairs([("League", "x"), ("Bowler", "First"), ("Average", "170")]),
            RawRow::from_pairs([("League", "x"), ("Bowler", "Twin"), ("Average", "180")]),
            RawRow::from_pairs([("League", "x"), ("Bowler", "Second"), ("Average", "170")]),
        ];
        let ranked = rank(&rows, "x");

        let names: Vec<_> = ranked.iter().map(|r| r.plain_name()).collect();
        assert_eq!(names, vec!["Twin", "Twin", "First", "Second"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let rows = csv_parser::parse(FEED);
        assert_eq!(rank(&rows, "pinfinity"), rank(&rows, "pinfinity"));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("200"), 200);
        assert_eq!(parse_count(" 200.7 "), 200);
        assert_eq!(parse_count("+5"), 5);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count("99999999999"), 0);
    }
}
