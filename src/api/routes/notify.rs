use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{parse_date, ApiError};
use crate::models::BookingId;
use crate::notify::{compose_confirmation, dispatch, DispatchReport};

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub recipients: Vec<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    /// Booking to confirm; fills in subject and message when they are omitted
    pub date: Option<String>,
    pub booking_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub status: &'static str,
    pub subject: String,
    pub report: DispatchReport,
}

/// POST /api/notify
/// Send to every valid recipient; a booking reference fills in missing text.
pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<NotifyResponse>, ApiError> {
    let (default_subject, default_message) = match (&req.date, &req.booking_id) {
        (Some(date), Some(id)) => {
            let date = parse_date(date)?;
            let id = BookingId::from(id.as_str());
            let booking = state
                .store
                .read(date)?
                .into_iter()
                .find(|b| b.id == id)
                .ok_or_else(|| ApiError::NotFound(format!("booking {}", id)))?;
            compose_confirmation(&booking)
        }
        _ => (String::new(), String::new()),
    };

    let subject = req.subject.unwrap_or(default_subject);
    let message = req.message.unwrap_or(default_message);

    let report = dispatch(Arc::clone(&state.sender), &req.recipients, &subject, &message).await?;

    Ok(Json(NotifyResponse {
        status: "sent",
        subject,
        report,
    }))
}
