use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{parse_date, ApiError};
use crate::models::{Booking, BookingDraft, BookingId};
use crate::schedule::day_schedule;
use crate::storage::{add_booking, cancel_booking};

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: String,
    pub bookings: Vec<Booking>,
}

/// GET /api/bookings/:date
/// One day's bookings in slot order
pub async fn list_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayResponse>, ApiError> {
    let date = parse_date(&date)?;
    let bookings = state.store.read(date)?;

    Ok(Json(DayResponse {
        date: date.to_string(),
        bookings: day_schedule(&state.schedule, bookings),
    }))
}

/// POST /api/bookings/:date
pub async fn create(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(draft): Json<BookingDraft>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let date = parse_date(&date)?;

    let _guard = state.write_lock.lock().await;
    let booking = add_booking(state.store.as_ref(), &state.schedule, date, &draft)?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// DELETE /api/bookings/:date/:id
pub async fn cancel(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
) -> Result<Json<Booking>, ApiError> {
    let date = parse_date(&date)?;

    let _guard = state.write_lock.lock().await;
    let removed = cancel_booking(state.store.as_ref(), date, &BookingId::from(id))?;

    Ok(Json(removed))
}
