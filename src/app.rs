use std::sync::Arc;

use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::fetcher::{HttpSheetFetcher, SheetFetcher};
use crate::scheduler;
use crate::services::{LeagueService, SnapshotStore};

/// Running HTTP server plus the background refresh scheduler.
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
    pub refresh_scheduler_handle: JoinHandle<()>,
}

impl Application {
    /// Wire the fetcher, snapshot store, league service, scheduler and router together.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        Self::build_with_fetcher(config, Arc::new(HttpSheetFetcher::new())).await
    }

    pub async fn build_with_fetcher(
        config: Config,
        fetcher: Arc<dyn SheetFetcher>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let league_service = LeagueService::new(
            config.resolver(),
            fetcher,
            SnapshotStore::new(),
            config.utc_offset,
        )
        .with_scheduled_leagues(&config.leagues);

        info!(
            "Refreshing leagues {:?} every {} ms",
            config.leagues, config.refresh_interval_ms
        );
        let refresh_scheduler_handle = {
            let service = league_service.clone();
            let leagues = config.leagues.clone();
            let interval_ms = config.refresh_interval_ms;

            tokio::spawn(async move {
                scheduler::start_refresh_scheduler(service, leagues, interval_ms).await;
            })
        };

        let app = create_router(AppState { league_service }).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

        info!("Application initialized successfully");

        Ok(Self {
            server_handle,
            refresh_scheduler_handle,
        })
    }

    /// Run until the server stops; the scheduler runs alongside indefinitely.
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}
