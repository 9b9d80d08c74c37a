//! Event endpoints.

use crate::error::AppError;
use crate::extractors::{AuthUser, RequireBusiness};
use crate::handlers::MessageResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use vibe_core::{Event, EventDraft, EventId, EventPatch};

/// `GET /events`, soonest first. Public.
///
/// # Errors
///
/// 500 when the store fails.
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.events.list().await?))
}

/// `POST /events`
///
/// # Errors
///
/// 403 for non-business accounts, 400 for invalid fields.
pub async fn create_event(
    State(state): State<AppState>,
    RequireBusiness(business): RequireBusiness,
    WithRejection(Json(draft), _): WithRejection<Json<EventDraft>, AppError>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state.events.create(&business, draft).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events/:id`
///
/// # Errors
///
/// 404 when the event does not exist.
pub async fn get_event(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<EventId>, AppError>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.get(id).await?))
}

/// `PATCH /events/:id`
///
/// # Errors
///
/// 403 for anyone but the owner; 400 when the new capacity is below the
/// spots already claimed.
pub async fn update_event(
    State(state): State<AppState>,
    RequireBusiness(caller): RequireBusiness,
    WithRejection(Path(id), _): WithRejection<Path<EventId>, AppError>,
    WithRejection(Json(patch), _): WithRejection<Json<EventPatch>, AppError>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.events.update(&caller, id, patch).await?))
}

/// `DELETE /events/:id`, removing its reservations with it.
///
/// # Errors
///
/// 403 for anyone but the owner, 404 when the event does not exist.
pub async fn delete_event(
    State(state): State<AppState>,
    RequireBusiness(caller): RequireBusiness,
    WithRejection(Path(id), _): WithRejection<Path<EventId>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    state.events.delete(&caller, id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}
