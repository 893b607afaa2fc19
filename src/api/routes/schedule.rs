use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{parse_date, ApiError};
use crate::models::TimeSlot;
use crate::schedule::{week_of, WeekGrid};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub courts: Vec<u32>,
    pub slots: Vec<TimeSlot>,
}

/// GET /api/slots
pub async fn slots(State(state): State<AppState>) -> Json<SlotsResponse> {
    Json(SlotsResponse {
        courts: state.schedule.courts.clone(),
        slots: state.schedule.slots.clone(),
    })
}

#[derive(Debug, Deserialize)]
pub struct WeekParams {
    /// Any date in the week; defaults to today
    pub date: Option<String>,
}

/// GET /api/week?date=YYYY-MM-DD
/// Weekly grid containing `date` (today when omitted)
pub async fn week(
    State(state): State<AppState>,
    Query(params): Query<WeekParams>,
) -> Result<Json<WeekGrid>, ApiError> {
    let date = match params.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };

    let days = week_of(date);
    let bookings = state.store.read_range(days[0], days[6])?;

    Ok(Json(WeekGrid::build(date, &state.schedule, &bookings)))
}
