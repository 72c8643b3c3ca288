use std::env;

use chrono::FixedOffset;

use crate::dates::{self, DEFAULT_UTC_OFFSET_HOURS};
use crate::league_config::{ConfigResolver, DUMMY_LEAGUE, REFRESH_INTERVAL_MS};

const MASTER_WORKBOOK: &str =
    "2PACX-1vQLJDJ0tRftkDJQ8v0DO35q6Kymvp2GmdMwfeP8r6GuHcEAL97EJp1K9qlF8oOLTWvTW-Xg8d0l3UtP";
const BOWLERS_SHEET_GID: &str = "1560652729";

/// CSV export URL of one tab of the published league workbook.
pub fn published_sheet_url(gid: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/e/{MASTER_WORKBOOK}/pub?gid={gid}&single=true&output=csv"
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("LEAGUE_UTC_OFFSET_HOURS must be between -23 and 23, got {0}")]
    InvalidUtcOffset(i32),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub bowlers_sheet_url: String,
    pub roster_sheet_url: Option<String>,
    pub settings_sheet_url: Option<String>,
    pub refresh_interval_ms: u64,
    pub leagues: Vec<String>,
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let utc_offset_hours = env::var("LEAGUE_UTC_OFFSET_HOURS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_UTC_OFFSET_HOURS);
        let utc_offset = dates::offset_from_hours(utc_offset_hours)
            .ok_or(ConfigError::InvalidUtcOffset(utc_offset_hours))?;

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            bowlers_sheet_url: env::var("BOWLERS_SHEET_URL")
                .unwrap_or_else(|_| published_sheet_url(BOWLERS_SHEET_GID)),
            roster_sheet_url: non_empty_var("ROSTER_SHEET_URL"),
            settings_sheet_url: non_empty_var("SETTINGS_SHEET_URL"),
            refresh_interval_ms: env::var("REFRESH_INTERVAL_MS")
                .unwrap_or_else(|_| REFRESH_INTERVAL_MS.to_string())
                .parse()
                .unwrap_or(REFRESH_INTERVAL_MS),
            leagues: parse_leagues(&env::var("LEAGUES").unwrap_or_default()),
            utc_offset,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn resolver(&self) -> ConfigResolver {
        ConfigResolver::new(self.bowlers_sheet_url.clone())
            .with_roster_sheet(self.roster_sheet_url.clone())
            .with_settings_sheet(self.settings_sheet_url.clone())
            .with_refresh_interval(self.refresh_interval_ms)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_leagues(value: &str) -> Vec<String> {
    let leagues: Vec<String> = value
        .split(',')
        .map(|league| league.trim().to_lowercase())
        .filter(|league| !league.is_empty())
        .collect();

    if leagues.is_empty() {
        vec![DUMMY_LEAGUE.to_string()]
    } else {
        leagues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leagues() {
        assert_eq!(parse_leagues(" Tampines, sgcc ,,"), vec!["tampines", "sgcc"]);
        assert_eq!(parse_leagues(""), vec![DUMMY_LEAGUE]);
    }

    #[test]
    fn test_published_sheet_url() {
        let url = published_sheet_url("42");
        assert!(url.starts_with("https://docs.google.com/spreadsheets/d/e/2PACX-"));
        assert!(url.ends_with("/pub?gid=42&single=true&output=csv"));
    }
}
