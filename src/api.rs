// SPDX-License-Identifier: PMPL-1.0-or-later
//! HTTP API: audit endpoint, team configuration and health check

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::node::from_json_bounded;
use crate::service::{AuditRequest, AuditService};
use crate::store::models::TeamConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: AuditService,
}

/// Build the full router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/api/audit", post(handle_audit))
        .route("/api/teams/:team_id/config", put(handle_save_team_config))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// Run an audit
async fn handle_audit(State(state): State<AppState>, body: Bytes) -> Response {
    let request: AuditRequest = match from_json_bounded(&body, state.service.max_depth()) {
        Ok(request) => request,
        Err(e) => return bad_request(format!("Invalid JSON body: {}", e)),
    };

    match state.service.run(&request).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Validate and store a team's design-system configuration
async fn handle_save_team_config(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    body: Bytes,
) -> Response {
    let config: TeamConfig = match serde_json::from_slice(&body) {
        Ok(config) => config,
        Err(e) => return bad_request(format!("Invalid team config: {}", e)),
    };

    match state.service.store().save(&team_id, config).await {
        Ok(()) => {
            tracing::info!("Saved design system config for team {}", team_id);
            (StatusCode::OK, Json(json!({ "success": true, "teamId": team_id }))).into_response()
        }
        Err(e) => error_response(e),
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn error_response(err: Error) -> Response {
    match err {
        Error::InvalidRequest(message) => bad_request(message),
        Error::InvalidUrl(message) => bad_request(message),
        other => {
            tracing::error!("Audit API error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "message": other.to_string(),
                })),
            )
                .into_response()
        }
    }
}
