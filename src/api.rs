use axum::{
    extract::{Query, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::fetch_error::FetchError;
use crate::league_config::AppConfig;
use crate::roster::UPCOMING_LIMIT;
use crate::services::{BowlerSnapshot, LeagueService, RosterSnapshot};

#[derive(Clone)]
pub struct AppState {
    pub league_service: LeagueService,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterParams {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    UPCOMING_LIMIT
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config))
        .route("/bowlers", get(get_bowlers))
        .route("/roster", get(get_roster))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

fn status_for(e: &FetchError) -> StatusCode {
    match e {
        FetchError::MissingUrl(_) => StatusCode::NOT_FOUND,
        FetchError::Request(_) | FetchError::Status { .. } => StatusCode::BAD_GATEWAY,
    }
}

#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state))]
async fn get_config(State(state): State<AppState>, RawQuery(query): RawQuery) -> Json<AppConfig> {
    let config = state
        .league_service
        .config_for(query.as_deref().unwrap_or(""))
        .await;
    info!("Resolved config for league '{}' view '{}'", config.league, config.view);
    Json(config)
}

#[instrument(skip(state))]
async fn get_bowlers(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<BowlerSnapshot>, StatusCode> {
    let config = state
        .league_service
        .resolver()
        .resolve_from_query(query.as_deref().unwrap_or(""));
    debug!("Fetching bowlers for league '{}'", config.league);

    let snapshot = state.league_service.bowlers(&config).await.map_err(|e| {
        error!("Failed to load bowlers for league '{}': {}", config.league, e);
        status_for(&e)
    })?;

    info!(
        "Returning {} bowlers for league '{}' updated at {}",
        snapshot.data.len(),
        config.league,
        snapshot.updated_at
    );
    Ok(Json(snapshot))
}

#[instrument(skip(state))]
async fn get_roster(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    Query(params): Query<RosterParams>,
) -> Result<Json<RosterSnapshot>, StatusCode> {
    let config = state
        .league_service
        .resolver()
        .resolve_from_query(query.as_deref().unwrap_or(""));
    debug!("Fetching roster for league '{}' (limit {})", config.league, params.limit);

    let mut snapshot = state.league_service.roster(&config).await.map_err(|e| {
        error!("Failed to load roster for league '{}': {}", config.league, e);
        status_for(&e)
    })?;
    snapshot.data.truncate(params.limit);

    info!(
        "Returning {} roster cards for league '{}'",
        snapshot.data.len(),
        config.league
    );
    Ok(Json(snapshot))
}
