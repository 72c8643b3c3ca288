use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use league_stats_service::bowlers::{self, BowlerRecord};
use league_stats_service::config::Config;
use league_stats_service::csv_parser::{self, RawRow};
use league_stats_service::dates;
use league_stats_service::fetcher::{HttpSheetFetcher, SheetFetcher};
use league_stats_service::roster::{self, UPCOMING_LIMIT};
use league_stats_service::sample_data;

#[derive(Parser)]
#[command(name = "league-report")]
#[command(about = "Print ranked bowlers and upcoming lineups for a league", long_about = None)]
struct Cli {
    /// League to report on (omit for the dummy league)
    #[arg(long, default_value = "")]
    league: String,

    /// Read bowler stats from a local CSV export instead of the published sheet
    #[arg(long)]
    bowlers_csv: Option<PathBuf>,

    /// Read the roster from a local CSV export instead of the published sheet
    #[arg(long)]
    roster_csv: Option<PathBuf>,

    /// Published roster sheet URL
    #[arg(long, env = "ROSTER_SHEET_URL")]
    roster_url: Option<String>,

    /// Number of upcoming games to show
    #[arg(long, default_value_t = UPCOMING_LIMIT)]
    limit: usize,

    /// Give up on a sheet request after this many seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

async fn load_rows(
    fetcher: &HttpSheetFetcher,
    path: Option<&PathBuf>,
    url: Option<&str>,
) -> Result<Vec<RawRow>, Box<dyn std::error::Error>> {
    match (path, url) {
        (Some(path), _) => Ok(csv_parser::parse(&std::fs::read_to_string(path)?)),
        (None, Some(url)) => Ok(fetcher.fetch_rows(url).await?),
        (None, None) => Ok(Vec::new()),
    }
}

/// Dummy league inputs, with each local export replacing only its own sample.
fn dummy_inputs(
    bowler_rows: Option<Vec<RawRow>>,
    roster_rows: Option<Vec<RawRow>>,
    league: &str,
) -> (Vec<BowlerRecord>, Vec<RawRow>) {
    let records = match bowler_rows {
        Some(rows) => bowlers::rank(&rows, league),
        None => sample_data::dummy_bowlers(),
    };
    let roster_rows =
        roster_rows.unwrap_or_else(|| csv_parser::parse(sample_data::DUMMY_ROSTER_CSV));
    (records, roster_rows)
}

fn print_bowlers(records: &[BowlerRecord]) {
    println!("{:<4} {:<28} {:>3} {:>5} {:>6} {:>7} {:>4}", "#", "Bowler", "Sex", "Hdcp", "Games", "Score", "Avg");
    for (rank, record) in records.iter().enumerate() {
        println!(
            "{:<4} {:<28} {:>3} {:>5} {:>6} {:>7} {:>4}",
            rank + 1,
            record.name,
            record.gender,
            record.handicap,
            record.total_games,
            record.total_score,
            record.average
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let app_config = config
        .resolver()
        .with_roster_sheet(cli.roster_url.clone().or(config.roster_sheet_url.clone()))
        .resolve_from_query(&format!("league={}", cli.league));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()?;
    let fetcher = HttpSheetFetcher::with_client(client);

    let (records, roster_rows) = if app_config.use_dummy_data {
        let bowler_rows = match cli.bowlers_csv.as_ref() {
            Some(path) => Some(load_rows(&fetcher, Some(path), None).await?),
            None => None,
        };
        let roster_rows = match cli.roster_csv.as_ref() {
            Some(path) => Some(load_rows(&fetcher, Some(path), None).await?),
            None => None,
        };
        dummy_inputs(bowler_rows, roster_rows, &app_config.league)
    } else {
        let bowler_rows = load_rows(
            &fetcher,
            cli.bowlers_csv.as_ref(),
            Some(app_config.bowlers_sheet_url.as_str()),
        )
        .await?;
        let roster_rows = load_rows(
            &fetcher,
            cli.roster_csv.as_ref(),
            app_config.roster_sheet_url.as_deref(),
        )
        .await?;
        (bowlers::rank(&bowler_rows, &app_config.league), roster_rows)
    };

    println!("{} ({})\n", app_config.title, app_config.league);
    print_bowlers(&records);

    let today = dates::today(config.utc_offset);
    let cards = roster::build_upcoming_cards(&roster_rows, &records, &app_config.league, today, cli.limit);

    println!("\nUpcoming games from {}:", dates::format_display_date(&today));
    if cards.is_empty() {
        println!("  (none)");
    }
    for card in cards {
        let opponent = if card.game.opponent.is_empty() {
            "TBD"
        } else {
            card.game.opponent.as_str()
        };
        println!("\n  Date: {}  Team: {}", card.display_date, opponent);
        for entry in &card.lineup {
            let handicap = entry
                .handicap
                .map(|h| h.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("    {:<30} H {:<4} {}", entry.display_name, handicap, entry.status_glyph);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = "\
League,Date,Opponent,A,A Status
dummy,01/Feb/2099,Locals,Dummy Bravo,YES
";

    #[test]
    fn test_roster_override_alone_keeps_sample_bowlers() {
        let (records, roster_rows) =
            dummy_inputs(None, Some(csv_parser::parse(ROSTER)), "dummy");

        assert_eq!(records, sample_data::dummy_bowlers());
        assert_eq!(roster_rows.len(), 1);
        assert_eq!(roster_rows[0].get("Opponent"), Some("Locals"));
    }

    #[test]
    fn test_bowlers_override_alone_keeps_sample_roster() {
        let bowler_rows = csv_parser::parse("League,Bowler,Active,Average\ndummy,Zed,YES,150\n");
        let (records, roster_rows) = dummy_inputs(Some(bowler_rows), None, "dummy");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].plain_name(), "Zed");
        assert_eq!(roster_rows, csv_parser::parse(sample_data::DUMMY_ROSTER_CSV));
    }
}
