use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use regex::Regex;

/// Singapore, where every league in the feeds bowls.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static SHORT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/([A-Za-z]{3})/(\d{4})$").expect("short date pattern is valid")
});

/// Parse a roster date such as `5/Mar/2024` or `05/mar/2024` into UTC midnight.
///
/// No other shapes are accepted, and impossible calendar days (`31/Feb/2024`) fail.
pub fn parse_short_date(text: &str) -> Option<DateTime<Utc>> {
    let caps = SHORT_DATE.captures(text.trim())?;

    let day: u32 = caps[1].parse().ok()?;
    let month_text = caps[2].to_ascii_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_text)? as u32 + 1;
    let year: i32 = caps[3].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day).map(utc_midnight)
}

/// Today's civil date as observed at `offset`, expressed as UTC midnight.
pub fn today(offset: FixedOffset) -> DateTime<Utc> {
    today_at(Utc::now(), offset)
}

pub fn today_at(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    utc_midnight(now.with_timezone(&offset).date_naive())
}

/// `DD/Mon/YYYY`, e.g. `05/Mar/2024`.
pub fn format_display_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%b/%Y").to_string()
}

/// Build a fixed offset from whole hours east of UTC.
pub fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours.checked_mul(3600)?)
}

fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sgt() -> FixedOffset {
        offset_from_hours(DEFAULT_UTC_OFFSET_HOURS).unwrap()
    }

    #[test]
    fn test_parse_short_date_padded() {
        let parsed = parse_short_date("05/Mar/2024").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_short_date_single_digit_and_case() {
        let parsed = parse_short_date(" 5/mAR/2024 ").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_short_date_rejects_other_shapes() {
        assert!(parse_short_date("2024-03-05").is_none());
        assert!(parse_short_date("05/03/2024").is_none());
        assert!(parse_short_date("05/March/2024").is_none());
        assert!(parse_short_date("05/Mar/24").is_none());
        assert!(parse_short_date("").is_none());
    }

    #[test]
    fn test_parse_short_date_rejects_unknown_month_and_bad_day() {
        assert!(parse_short_date("05/Foo/2024").is_none());
        assert!(parse_short_date("31/Feb/2024").is_none());
        assert!(parse_short_date("00/Jan/2024").is_none());
    }

    #[test]
    fn test_today_uses_fixed_offset() {
        // 17:30 UTC on the 4th is already the 5th in Singapore
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 17, 30, 0).unwrap();
        assert_eq!(
            today_at(now, sgt()),
            Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
        );

        let earlier = Utc.with_ymd_and_hms(2024, 3, 4, 15, 59, 59).unwrap();
        assert_eq!(
            today_at(earlier, sgt()),
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_format_display_date() {
        let date = parse_short_date("5/jan/2099").unwrap();
        assert_eq!(format_display_date(&date), "05/Jan/2099");
    }

    #[test]
    fn test_offset_from_hours_bounds() {
        assert!(offset_from_hours(8).is_some());
        assert!(offset_from_hours(-11).is_some());
        assert!(offset_from_hours(30).is_none());
    }
}
