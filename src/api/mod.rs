//! REST API endpoints.
//!
//! Axum-based HTTP API for the booking grid, day schedules,
//! player statistics and confirmation emails.

pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::notify::NotifyError;
use crate::schedule::BookingError;
use crate::storage::StorageError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Rejected(e @ BookingError::SlotTaken { .. }) => {
                ApiError::Conflict(e.to_string())
            }
            StorageError::Rejected(e) => ApiError::BadRequest(e.to_string()),
            StorageError::BookingNotFound(id) => ApiError::NotFound(format!("booking {}", id)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::EmptySubject
            | NotifyError::EmptyMessage
            | NotifyError::NoValidRecipients => ApiError::BadRequest(err.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// Parse a `YYYY-MM-DD` path or query value.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("invalid date (expected YYYY-MM-DD): {}", raw)))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        "*" => layer.allow_origin(Any),
        other => match HeaderValue::from_str(other) {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", other);
                layer
            }
        },
    }
}

/// Build the application router.
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .route("/api/health", get(routes::schedule::health))
        .route("/api/slots", get(routes::schedule::slots))
        .route("/api/week", get(routes::schedule::week))
        .route(
            "/api/bookings/:date",
            get(routes::bookings::list_day).post(routes::bookings::create),
        )
        .route("/api/bookings/:date/:id", delete(routes::bookings::cancel))
        .route("/api/stats", get(routes::stats::player_stats))
        .route("/api/notify", post(routes::notify::send))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::notify::DryRunSender;
    use crate::schedule::Schedule;
    use crate::storage::MemoryBookingStore;

    fn app() -> Router {
        let state = AppState::new(
            Arc::new(MemoryBookingStore::new()),
            Schedule::default(),
            Arc::new(DryRunSender),
        );
        build_router(state, "*")
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn singles(court: u32, players: [&str; 2]) -> Value {
        json!({ "court": court, "time_slot": "08:00-09:00", "players": players })
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-06-14").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()
        );
        assert!(matches!(parse_date("14/06/2025"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_storage_error_mapping() {
        let taken = StorageError::Rejected(BookingError::SlotTaken {
            court: 1,
            time_slot: "08:00-09:00".to_string(),
        });
        assert!(matches!(ApiError::from(taken), ApiError::Conflict(_)));

        let unknown = StorageError::Rejected(BookingError::UnknownCourt(7));
        assert!(matches!(ApiError::from(unknown), ApiError::BadRequest(_)));
    }

    #[test]
    fn test_notify_error_mapping() {
        let partial = NotifyError::PartialFailure {
            failed: 1,
            attempted: 3,
        };
        match ApiError::from(partial) {
            ApiError::Upstream(msg) => assert_eq!(msg, "Failed to send 1 out of 3 emails"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            ApiError::from(NotifyError::NoValidRecipients),
            ApiError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = call(&app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_and_list_booking() {
        let app = app();

        let (status, created) = call(
            &app,
            "POST",
            "/api/bookings/2025-06-14",
            Some(singles(1, ["Ann", "Bob"])),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["court"], 1);

        let (status, day) = call(&app, "GET", "/api/bookings/2025-06-14", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(day["date"], "2025-06-14");
        assert_eq!(day["bookings"].as_array().unwrap().len(), 1);
        assert_eq!(day["bookings"][0]["players"], json!(["Ann", "Bob"]));
    }

    #[tokio::test]
    async fn test_conflicting_booking_returns_409() {
        let app = app();
        let uri = "/api/bookings/2025-06-14";
        call(&app, "POST", uri, Some(singles(1, ["Ann", "Bob"]))).await;

        let (status, body) = call(&app, "POST", uri, Some(singles(1, ["Cat", "Dan"]))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_invalid_booking_returns_400() {
        let app = app();
        let (status, _) = call(
            &app,
            "POST",
            "/api/bookings/2025-06-14",
            Some(singles(1, ["Ann", " "])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, "GET", "/api/bookings/june", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cancel_booking() {
        let app = app();
        let (_, created) = call(
            &app,
            "POST",
            "/api/bookings/2025-06-14",
            Some(singles(1, ["Ann", "Bob"])),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/bookings/2025-06-14/{}", id);

        let (status, _) = call(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_week_grid() {
        let app = app();
        call(
            &app,
            "POST",
            "/api/bookings/2025-06-12",
            Some(singles(2, ["Ann", "Bob"])),
        )
        .await;

        let (status, grid) = call(&app, "GET", "/api/week?date=2025-06-14", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(grid["week_start"], "2025-06-09");
        assert_eq!(grid["days"].as_array().unwrap().len(), 7);

        let thursday = grid["days"][3]["cells"].as_array().unwrap();
        let booked: Vec<&Value> = thursday.iter().filter(|c| c["status"] == "booked").collect();
        assert_eq!(booked.len(), 1);
        assert_eq!(booked[0]["court"], 2);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = app();

        let (status, empty) = call(&app, "GET", "/api/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(empty["summary"]["total_players"], 0);
        assert_eq!(empty["average_matches_display"], "0");

        call(
            &app,
            "POST",
            "/api/bookings/2025-06-14",
            Some(singles(1, ["Ann", "Bob"])),
        )
        .await;
        call(
            &app,
            "POST",
            "/api/bookings/2025-06-15",
            Some(json!({
                "court": 3,
                "time_slot": "12:00-14:00",
                "players": ["Ann", "Cat", "", ""]
            })),
        )
        .await;

        let (_, stats) = call(&app, "GET", "/api/stats", None).await;
        assert_eq!(stats["players"][0]["name"], "Ann");
        assert_eq!(stats["players"][0]["total_matches"], 2);
        assert_eq!(stats["players"][0]["total_hours"], 3);
        assert_eq!(stats["players"][0]["last_played"], "2025-06-15");
        assert_eq!(stats["summary"]["total_players"], 3);
        assert_eq!(stats["summary"]["total_matches"], 4);
        assert_eq!(stats["average_matches_display"], "1.3");
    }

    #[tokio::test]
    async fn test_notify_endpoint() {
        let app = app();

        let (status, body) = call(
            &app,
            "POST",
            "/api/notify",
            Some(json!({
                "recipients": ["a@x.com", "foo@bar"],
                "subject": "Court booked",
                "message": "See you\non court"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["report"]["attempted"], 1);
        assert_eq!(body["report"]["skipped"], 1);

        let (status, _) = call(
            &app,
            "POST",
            "/api/notify",
            Some(json!({ "recipients": ["foo@bar"], "subject": "x", "message": "y" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_notify_composes_booking_confirmation() {
        let app = app();
        let (_, created) = call(
            &app,
            "POST",
            "/api/bookings/2025-06-14",
            Some(singles(1, ["Ann", "Bob"])),
        )
        .await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/notify",
            Some(json!({
                "recipients": ["a@x.com"],
                "date": "2025-06-14",
                "booking_id": created["id"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "Court 1 booked for Saturday 14 June 2025");
    }
}
