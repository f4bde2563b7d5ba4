//! Router configuration.
//!
//! Builds the complete Axum router with all endpoints.

use crate::handlers::{events, health, tickets, wallet};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Route order matters for the ticket paths: the literal segments
/// (`stats`, `owner`, `user`, ...) must be registered so they are not
/// captured by the `/:tokenId` parameter.
pub fn build_router(state: AppState) -> Router {
    let ticket_routes = Router::new()
        .route("/mint", post(tickets::mint))
        .route("/checkIn", post(tickets::check_in))
        .route("/stats", get(tickets::get_stats))
        .route("/owner/:address", get(tickets::get_tickets_by_owner))
        .route("/purchase", post(tickets::purchase))
        .route("/user/:walletAddress", get(tickets::get_user_tickets))
        .route("/check-in", post(tickets::wallet_check_in))
        .route("/:tokenId", get(tickets::get_ticket));

    let event_routes = Router::new()
        .route("/", get(events::list_events))
        .route("/", post(events::create_event))
        .route("/:id", get(events::get_event))
        .route("/:id", put(events::update_event))
        .route("/:id", delete(events::delete_event));

    let wallet_routes = Router::new()
        .route("/connect", post(wallet::connect))
        .route("/disconnect", post(wallet::disconnect))
        .route("/status", get(wallet::status))
        .route("/address", get(wallet::address))
        .route("/balance", get(wallet::balance))
        .route("/switch-network", post(wallet::switch_network));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/tickets", ticket_routes)
        .nest("/api/events", event_routes)
        .nest("/api/wallet", wallet_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
