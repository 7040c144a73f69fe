use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::models::player::{PlayerQuery, RiotId};
use crate::services::stats_service::StatsService;

#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<StatsService>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerParams {
    #[serde(default)]
    pub force_collect: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/valorant/{region}/{game_name}/{tag_line}", get(valorant_handler))
        .route("/tracker/{game_name}/{tag_line}", get(tracker_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Web server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

async fn health_handler() -> &'static str {
    "Bot is running!"
}

async fn valorant_handler(
    State(state): State<AppState>,
    Path((region, game_name, tag_line)): Path<(String, String, String)>,
) -> Result<Json<Value>> {
    let query = PlayerQuery::new(&region, &game_name, &tag_line)?;
    let message = state.stats.player_stats(&query).await?;
    Ok(Json(message.to_json()))
}

async fn tracker_handler(
    State(state): State<AppState>,
    Path((game_name, tag_line)): Path<(String, String)>,
    Query(params): Query<TrackerParams>,
) -> Result<Json<Value>> {
    let id = RiotId::parse_parts(&game_name, &tag_line)?;
    let message = state.stats.tracker_stats(&id, params.force_collect).await?;
    Ok(Json(message.to_json()))
}
