use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::csv_parser::RawRow;
use crate::fetch_error::FetchError;
use crate::fetcher::SheetFetcher;

pub const DUMMY_LEAGUE: &str = "dummy";
pub const DEFAULT_VIEW: &str = "default";
pub const DUMMY_TITLE: &str = "Pinfinity Dummy";
pub const DUMMY_LOGO: &str = "pinfinity";
pub const REFRESH_INTERVAL_MS: u64 = 300_000;

/// Per-view configuration the dashboard shell reads its title, logo and cadence from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub league: String,
    pub view: String,
    pub title: String,
    pub logo: String,
    pub use_dummy_data: bool,
    pub refresh_interval: u64,
    pub bowlers_sheet_url: String,
    pub roster_sheet_url: Option<String>,
    pub settings_sheet_url: Option<String>,
    pub season: Option<String>,
}

/// One row of the league settings feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueSettings {
    pub league: String,
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "Reserved")]
    pub reserved: String,
    pub season: String,
    pub title: String,
    pub active: bool,
}

impl LeagueSettings {
    pub fn from_row(row: &RawRow) -> Self {
        Self {
            league: cell(row, "League").to_lowercase(),
            a: cell(row, "A"),
            b: cell(row, "B"),
            c: cell(row, "C"),
            reserved: cell(row, "Reserved"),
            season: cell(row, "Season"),
            title: cell(row, "Title"),
            active: is_truthy(row.text(&["Active"])),
        }
    }
}

/// Sheet locations and cadence shared by every resolved view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResolver {
    pub bowlers_sheet_url: String,
    pub roster_sheet_url: Option<String>,
    pub settings_sheet_url: Option<String>,
    pub refresh_interval_ms: u64,
}

impl ConfigResolver {
    pub fn new(bowlers_sheet_url: String) -> Self {
        Self {
            bowlers_sheet_url,
            roster_sheet_url: None,
            settings_sheet_url: None,
            refresh_interval_ms: REFRESH_INTERVAL_MS,
        }
    }

    pub fn with_roster_sheet(mut self, url: Option<String>) -> Self {
        self.roster_sheet_url = url;
        self
    }

    pub fn with_settings_sheet(mut self, url: Option<String>) -> Self {
        self.settings_sheet_url = url;
        self
    }

    pub fn with_refresh_interval(mut self, interval_ms: u64) -> Self {
        self.refresh_interval_ms = interval_ms;
        self
    }

    /// Resolve a view from `?league=..&view=..` without touching the network.
    pub fn resolve_from_query(&self, query: &str) -> AppConfig {
        let (league_param, view_param) = read_query(query);

        let view = if view_param.is_empty() {
            DEFAULT_VIEW.to_string()
        } else {
            view_param
        };

        let (league, title, logo, use_dummy_data) =
            if league_param.is_empty() || league_param == DUMMY_LEAGUE {
                (
                    DUMMY_LEAGUE.to_string(),
                    DUMMY_TITLE.to_string(),
                    DUMMY_LOGO.to_string(),
                    true,
                )
            } else {
                let title = capitalize(&league_param);
                (league_param.clone(), title, league_param, false)
            };

        AppConfig {
            league,
            view,
            title,
            logo,
            use_dummy_data,
            refresh_interval: self.refresh_interval_ms,
            bowlers_sheet_url: self.bowlers_sheet_url.clone(),
            roster_sheet_url: self.roster_sheet_url.clone(),
            settings_sheet_url: self.settings_sheet_url.clone(),
            season: None,
        }
    }

    /// Resolve a view and refine its title from the settings feed when one is configured.
    #[instrument(skip(self, fetcher))]
    pub async fn resolve(
        &self,
        query: &str,
        fetcher: &dyn SheetFetcher,
    ) -> Result<AppConfig, FetchError> {
        let config = self.resolve_from_query(query);
        if config.use_dummy_data {
            return Ok(config);
        }

        let Some(url) = config.settings_sheet_url.as_deref() else {
            debug!("No settings sheet configured, using query config");
            return Ok(config);
        };

        let rows = fetcher.fetch_rows(url).await?;
        Ok(apply_settings(config, &rows))
    }
}

/// Refine `config` with the settings row chosen for its league, if any.
pub fn apply_settings(mut config: AppConfig, rows: &[RawRow]) -> AppConfig {
    let Some(settings) = select_settings(rows, &config.league) else {
        debug!("No settings rows for league '{}'", config.league);
        return config;
    };

    info!(
        "Applying settings for league '{}' (season '{}', active: {})",
        config.league, settings.season, settings.active
    );
    if !settings.title.is_empty() {
        config.title = settings.title;
    }
    if !settings.season.is_empty() {
        config.season = Some(settings.season);
    }
    config
}

/// The first active settings row for `league`, else its first row.
pub fn select_settings(rows: &[RawRow], league: &str) -> Option<LeagueSettings> {
    let matching: Vec<LeagueSettings> = rows
        .iter()
        .map(LeagueSettings::from_row)
        .filter(|settings| settings.league.eq_ignore_ascii_case(league.trim()))
        .collect();

    let index = matching.iter().position(|s| s.active).unwrap_or(0);
    matching.into_iter().nth(index)
}

fn cell(row: &RawRow, header: &str) -> String {
    row.text(&[header]).trim().to_string()
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    ["TRUE", "YES", "1"]
        .iter()
        .any(|accepted| value.eq_ignore_ascii_case(accepted))
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trimmed, lower-cased `league` and `view` values; parameter names match in any case.
fn read_query(query: &str) -> (String, String) {
    let query = query.trim().trim_start_matches('?');
    let Ok(url) = Url::parse(&format!("http://query.local/?{query}")) else {
        return (String::new(), String::new());
    };

    let mut league = None;
    let mut view = None;
    for (key, value) in url.query_pairs() {
        if league.is_none() && key.eq_ignore_ascii_case("league") {
            league = Some(value.trim().to_lowercase());
        } else if view.is_none() && key.eq_ignore_ascii_case("view") {
            view = Some(value.trim().to_lowercase());
        }
    }

    (league.unwrap_or_default(), view.unwrap_or_default())
}
