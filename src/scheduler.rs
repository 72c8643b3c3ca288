use std::time::Duration;

use futures::future::join_all;
use tokio::time;
use tracing::{debug, error, info, instrument};

use crate::services::LeagueService;

#[instrument(skip(service), fields(interval_ms = %interval_ms, leagues = ?leagues))]
pub async fn start_refresh_scheduler(service: LeagueService, leagues: Vec<String>, interval_ms: u64) {
    let mut interval = time::interval(Duration::from_millis(interval_ms.max(1)));

    info!(
        "Refresh scheduler started for {} leagues with {} ms interval",
        leagues.len(),
        interval_ms
    );

    loop {
        interval.tick().await;
        debug!("Scheduler tick - refreshing leagues");

        let refreshed = refresh_all(&service, &leagues).await;
        debug!("Refreshed {}/{} leagues", refreshed, leagues.len());
    }
}

/// Refresh each league concurrently and return how many succeeded.
pub async fn refresh_all(service: &LeagueService, leagues: &[String]) -> usize {
    let results = join_all(leagues.iter().map(|league| async move {
        let result = service.refresh_league(league).await;
        (league, result)
    }))
    .await;

    results
        .into_iter()
        .filter(|(league, result)| match result {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to refresh league '{}', keeping last snapshot: {}", league, e);
                false
            }
        })
        .count()
}
