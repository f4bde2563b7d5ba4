//! Event endpoints.
//!
//! Reads serve the seeded catalogue; the mutating verbs are declared but
//! not supported against the demo store, returning 400 with a message
//! instead of a 404 route miss.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use ticketchain_core::Event;

/// GET /api/events
pub(crate) async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.manager.events().await?))
}

/// GET /api/events/:id
pub(crate) async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.manager.event(&id).await?))
}

/// POST /api/events
pub(crate) async fn create_event() -> AppError {
    AppError::bad_request("Event creation not supported in test mode")
}

/// PUT /api/events/:id
pub(crate) async fn update_event(Path(_id): Path<String>) -> AppError {
    AppError::bad_request("Event updates not supported in test mode")
}

/// DELETE /api/events/:id
pub(crate) async fn delete_event(Path(_id): Path<String>) -> AppError {
    AppError::bad_request("Event deletion not supported in test mode")
}
