use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::{aggregate_player_stats, summarize};
use crate::models::{PlayerStat, StatsSummary};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub players: Vec<PlayerStat>,
    pub summary: StatsSummary,
    pub average_matches_display: String,
}

/// Player leaderboard over every stored booking.
pub async fn player_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let bookings = state.store.read_all()?;
    let players = aggregate_player_stats(&bookings);
    let summary = summarize(&players);

    Ok(Json(StatsResponse {
        average_matches_display: summary.average_display(),
        players,
        summary,
    }))
}
