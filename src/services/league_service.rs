use std::collections::HashSet;
use std::sync::Arc;

use chrono::FixedOffset;
use tracing::{debug, info, instrument, warn};

use crate::bowlers::{self, BowlerRecord};
use crate::csv_parser;
use crate::dates;
use crate::fetch_error::FetchError;
use crate::fetcher::SheetFetcher;
use crate::league_config::{AppConfig, ConfigResolver};
use crate::roster;
use crate::sample_data;
use crate::services::snapshot_store::{
    BowlerSnapshot, DataSource, RosterSnapshot, Snapshot, SnapshotStore,
};

/// Runs fetch cycles for a league and keeps the last good result of each scheduled league.
///
/// Leagues outside the scheduled set are fetched per request and never cached.
#[derive(Clone)]
pub struct LeagueService {
    resolver: ConfigResolver,
    fetcher: Arc<dyn SheetFetcher>,
    store: SnapshotStore,
    utc_offset: FixedOffset,
    scheduled: Arc<HashSet<String>>,
}

impl LeagueService {
    pub fn new(
        resolver: ConfigResolver,
        fetcher: Arc<dyn SheetFetcher>,
        store: SnapshotStore,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            store,
            utc_offset,
            scheduled: Arc::new(HashSet::new()),
        }
    }

    /// Leagues whose snapshots are cached and kept fresh by the refresh scheduler.
    pub fn with_scheduled_leagues(mut self, leagues: &[String]) -> Self {
        self.scheduled = Arc::new(leagues.iter().map(|league| league.to_lowercase()).collect());
        self
    }

    pub fn is_scheduled(&self, league: &str) -> bool {
        self.scheduled.contains(league)
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Resolve a view, falling back to the query-only config if the settings feed fails.
    #[instrument(skip(self))]
    pub async fn config_for(&self, query: &str) -> AppConfig {
        match self.resolver.resolve(query, self.fetcher.as_ref()).await {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load league settings, using query config: {}", e);
                self.resolver.resolve_from_query(query)
            }
        }
    }

    /// Bowlers for the league: the cached snapshot for scheduled leagues, a fresh fetch otherwise.
    pub async fn bowlers(&self, config: &AppConfig) -> Result<BowlerSnapshot, FetchError> {
        if let Some(snapshot) = self.cached_bowlers(&config.league).await {
            return Ok(snapshot);
        }
        self.refresh_bowlers(config).await
    }

    /// Upcoming cards for the league. Cached cards whose date has passed are dropped.
    pub async fn roster(&self, config: &AppConfig) -> Result<RosterSnapshot, FetchError> {
        let Some(mut snapshot) = self.cached_roster(&config.league).await else {
            return self.refresh_roster(config).await;
        };

        let today = dates::today(self.utc_offset);
        snapshot.data.retain(|card| card.game.parsed_date >= today);
        Ok(snapshot)
    }

    async fn cached_bowlers(&self, league: &str) -> Option<BowlerSnapshot> {
        if !self.is_scheduled(league) {
            return None;
        }
        self.store.bowlers(league).await
    }

    async fn cached_roster(&self, league: &str) -> Option<RosterSnapshot> {
        if !self.is_scheduled(league) {
            return None;
        }
        self.store.roster(league).await
    }

    #[instrument(skip(self, config), fields(league = %config.league))]
    pub async fn refresh_bowlers(&self, config: &AppConfig) -> Result<BowlerSnapshot, FetchError> {
        let snapshot = self.load_bowlers(config).await?;
        info!(
            "Loaded {} bowlers from {:?} at {}",
            snapshot.data.len(),
            snapshot.source,
            snapshot.updated_at
        );
        if self.is_scheduled(&config.league) {
            self.store.store_bowlers(&config.league, snapshot.clone()).await;
        }
        Ok(snapshot)
    }

    /// All upcoming cards (not yet limited), ordered soonest first.
    #[instrument(skip(self, config), fields(league = %config.league))]
    pub async fn refresh_roster(&self, config: &AppConfig) -> Result<RosterSnapshot, FetchError> {
        let today = dates::today(self.utc_offset);

        let (rows, records, source) = if config.use_dummy_data {
            (
                csv_parser::parse(sample_data::DUMMY_ROSTER_CSV),
                sample_data::dummy_bowlers(),
                DataSource::Dummy,
            )
        } else {
            let url = config
                .roster_sheet_url
                .as_deref()
                .ok_or(FetchError::MissingUrl("roster sheet"))?;
            let (rows, ranked) =
                tokio::try_join!(self.fetcher.fetch_rows(url), self.load_bowlers(config))?;
            (rows, ranked.data, DataSource::Csv)
        };

        let cards = roster::build_upcoming_cards(&rows, &records, &config.league, today, usize::MAX);
        let snapshot = Snapshot::new(cards, source);
        info!(
            "Loaded {} upcoming roster cards from {:?} at {}",
            snapshot.data.len(),
            snapshot.source,
            snapshot.updated_at
        );
        if self.is_scheduled(&config.league) {
            self.store.store_roster(&config.league, snapshot.clone()).await;
        }
        Ok(snapshot)
    }

    /// Refresh everything configured for `league`; failures leave prior snapshots in place.
    #[instrument(skip(self))]
    pub async fn refresh_league(&self, league: &str) -> Result<(), FetchError> {
        let config = self.config_for(&format!("league={league}")).await;

        self.refresh_bowlers(&config).await?;
        if config.use_dummy_data || config.roster_sheet_url.is_some() {
            self.refresh_roster(&config).await?;
        } else {
            debug!("No roster sheet configured, skipping roster refresh");
        }
        Ok(())
    }

    async fn load_bowlers(&self, config: &AppConfig) -> Result<BowlerSnapshot, FetchError> {
        if config.use_dummy_data {
            return Ok(Snapshot::new(sample_data::dummy_bowlers(), DataSource::Dummy));
        }

        let rows = self.fetcher.fetch_rows(&config.bowlers_sheet_url).await?;
        let ranked: Vec<BowlerRecord> = bowlers::rank(&rows, &config.league);
        if ranked.is_empty() {
            debug!("No bowlers found for league '{}'", config.league);
        }
        Ok(Snapshot::new(ranked, DataSource::Csv))
    }
}
