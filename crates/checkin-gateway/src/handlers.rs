// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles GET /checkin/respond, POST /admin/dispatch, GET /health.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use checkin_core::{Day, HealthStatus, ResponseValue};
use checkin_engine::{DispatchMode, DispatchSummary, RecordError};

use crate::server::GatewayState;

/// Query string for GET /checkin/respond.
#[derive(Debug, Deserialize)]
pub struct RespondQuery {
    /// Signed response token.
    #[serde(default)]
    pub t: Option<String>,
    /// Optional free-text note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Response body for a recorded check-in response.
#[derive(Debug, Serialize)]
pub struct RespondResponse {
    pub status: &'static str,
    pub day: Day,
    pub value: ResponseValue,
}

/// Request body for POST /admin/dispatch.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchRequest {
    /// Maximum items to process. Defaults to the configured batch limit.
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub dry_run: bool,
}

/// Response body for POST /admin/dispatch.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub mode: DispatchMode,
    #[serde(flatten)]
    pub summary: DispatchSummary,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Queue item counts keyed by status.
    pub queue: BTreeMap<String, u64>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// GET /checkin/respond?t=<token>&note=<text>
///
/// Every token failure yields the same opaque 400.
pub async fn get_respond(
    State(state): State<GatewayState>,
    Query(query): Query<RespondQuery>,
) -> Response {
    let Some(token) = query.t.as_deref().filter(|t| !t.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "invalid");
    };

    match state
        .recorder
        .verify_and_record(token, query.note.as_deref())
        .await
    {
        Ok(ack) => (
            StatusCode::OK,
            Json(RespondResponse {
                status: "recorded",
                day: ack.day,
                value: ack.value,
            }),
        )
            .into_response(),
        Err(RecordError::Invalid(_)) => {
            warn!("rejected check-in response token");
            error_response(StatusCode::BAD_REQUEST, "invalid")
        }
        Err(RecordError::Store(e)) => {
            error!(error = %e, "failed to record check-in response");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

/// POST /admin/dispatch
///
/// Runs one dispatch batch and returns its summary.
pub async fn post_dispatch(
    State(state): State<GatewayState>,
    body: Option<Json<DispatchRequest>>,
) -> Response {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let limit = request.limit.unwrap_or(state.batch_limit).max(1);
    let mode = state.dispatcher.mode_for(request.dry_run);

    match state.dispatcher.dispatch_due(limit, mode).await {
        Ok(summary) => (StatusCode::OK, Json(DispatchResponse { mode, summary })).into_response(),
        Err(e) => {
            error!(error = %e, "admin dispatch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "dispatch failed")
        }
    }
}

/// GET /health
///
/// Unauthenticated. Reports store health and queue counts.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let uptime_secs = state.health.start_time.elapsed().as_secs();
    let store_status = state.store.health_check().await;
    let counts = state.store.count_by_status().await;

    let (code, status) = match (&store_status, &counts) {
        (Ok(HealthStatus::Healthy), Ok(_)) => (StatusCode::OK, "ok".to_string()),
        (Ok(HealthStatus::Degraded(reason)), Ok(_)) => {
            (StatusCode::OK, format!("degraded: {reason}"))
        }
        (Ok(HealthStatus::Unhealthy(reason)), _) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy: storage".to_string())
        }
    };

    let queue = counts
        .unwrap_or_default()
        .into_iter()
        .map(|(status, n)| (status.to_string(), n))
        .collect();

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs,
            queue,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_request_defaults() {
        let req: DispatchRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.limit, None);
        assert!(!req.dry_run);

        let req: DispatchRequest =
            serde_json::from_str(r#"{"limit": 5, "dry_run": true}"#).unwrap();
        assert_eq!(req.limit, Some(5));
        assert!(req.dry_run);
    }

    #[test]
    fn dispatch_request_rejects_unknown_fields() {
        assert!(serde_json::from_str::<DispatchRequest>(r#"{"limt": 5}"#).is_err());
    }

    #[test]
    fn dispatch_response_flattens_summary() {
        let resp = DispatchResponse {
            mode: DispatchMode::DryRun,
            summary: DispatchSummary {
                skipped: 2,
                ..DispatchSummary::default()
            },
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["mode"], "dry_run");
        assert_eq!(json["skipped"], 2);
        assert_eq!(json["errors"], serde_json::json!([]));
    }

    #[test]
    fn error_response_serializes() {
        let resp = ErrorResponse {
            error: "invalid".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"error":"invalid"}"#);
    }
}
