//! Health and readiness endpoints.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Current server time
    pub timestamp: DateTime<Utc>,
    /// Service version
    pub version: &'static str,
}

/// Liveness check: the process is up. Does not verify dependencies.
pub(crate) async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness
    pub ready: bool,
    /// Ledger store reachability
    pub store: bool,
    /// Chain gateway configured with a provider
    #[serde(rename = "web3Ready")]
    pub web3_ready: bool,
    /// Contract deployed and callable
    #[serde(rename = "contractReady")]
    pub contract_ready: bool,
}

/// Readiness check: 200 when the store answers. The chain flags are
/// informational; the wallet flows keep working without the chain.
pub(crate) async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let store = state.manager.store().list_events().await.is_ok();
    let web3_ready = state.manager.chain().is_ready().await;
    let contract_ready = state.manager.chain().is_contract_ready().await;

    let status = if store {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ReadinessResponse {
            ready: store,
            store,
            web3_ready,
            contract_ready,
        }),
    )
}
