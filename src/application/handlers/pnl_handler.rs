use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::services::reconciliation_service::ReconciliationService;
use crate::domain::entities::daily_pnl::PnLSummary;
use crate::domain::errors::SourceError;
use crate::domain::value_objects::history_days::HistoryDays;

/// Shared state for the API handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReconciliationService>,
    /// Window used when a refresh request omits `days`
    pub default_days: HistoryDays,
}

/// Query parameters for the refresh endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshQuery {
    pub address: Option<String>,
    /// Kept as a string so a malformed value yields our own 400 message
    pub days: Option<String>,
}

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Map a venue failure to the status and message shown to the polling client
fn source_error_response(e: &SourceError) -> ApiError {
    if e.is_rate_limited() {
        api_error(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please wait a moment before refreshing again.",
        )
    } else if e.is_timeout() {
        api_error(StatusCode::GATEWAY_TIMEOUT, "Request timeout. Please try again.")
    } else {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to refresh data. Please try again later.",
        )
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/pnl", get(get_pnl_summary))
        .route("/api/refresh", post(trigger_refresh))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "healthy".to_string(),
        message: "Service is running".to_string(),
    })
}

/// P&L summary of the last reconciliation
pub async fn get_pnl_summary(State(state): State<AppState>) -> Json<PnLSummary> {
    Json(state.service.summary().await)
}

/// Refresh trades for an account and rebuild the P&L table
pub async fn trigger_refresh(
    State(state): State<AppState>,
    Query(params): Query<RefreshQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let address = params
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "address parameter is required"))?;

    let days = match params.days.as_deref() {
        None | Some("") => state.default_days,
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .and_then(|d| HistoryDays::new(d).ok())
            .ok_or_else(|| {
                api_error(
                    StatusCode::BAD_REQUEST,
                    "days parameter must be a positive integer",
                )
            })?,
    };

    if let Err(e) = state.service.reconcile(address, days).await {
        error!(
            "Error fetching and reconciling trades for {} (days={}): {}",
            address,
            days.days(),
            e
        );
        return Err(source_error_response(&e));
    }

    Ok(Json(StatusResponse {
        status: "success".to_string(),
        message: "Data refreshed successfully".to_string(),
    }))
}
