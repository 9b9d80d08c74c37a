//! Reservation endpoints.
//!
//! The reserving user is always the caller. Request bodies may still carry a
//! `user` field, as older clients send one; it must name the caller.

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
use serde::Deserialize;
use vibe_core::{
    BusinessEventReservations, EventId, Reservation, ReservationCheck, ReservationDetails,
    ReservationId, ReservationStatus, ReservedEvent, User, UserId,
};

/// Body of `POST /reservations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    /// Event to reserve
    pub event: EventId,
    /// Reserving user; defaults to the caller
    #[serde(default)]
    pub user: Option<UserId>,
    /// Ticket count
    pub no_reservations: u32,
}

/// Body of `POST /reservations/check`.
#[derive(Debug, Deserialize)]
pub struct CheckReservationRequest {
    /// Event to check
    pub event: EventId,
    /// User to check; defaults to the caller
    #[serde(default)]
    pub user: Option<UserId>,
}

/// Body of `PATCH /reservations/:id`.
#[derive(Debug, Deserialize)]
pub struct UpdateReservationRequest {
    /// New status
    pub status: ReservationStatus,
}

fn acting_user(caller: &User, requested: Option<UserId>) -> Result<UserId, AppError> {
    match requested {
        Some(user) if user != caller.id => Err(AppError::forbidden(
            "You can only manage your own reservations",
        )),
        _ => Ok(caller.id),
    }
}

/// `POST /reservations`
///
/// # Errors
///
/// 404 when the event is missing; 400 when it is full, the caller already
/// holds a reservation, or the ticket count is zero.
pub async fn create_reservation(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateReservationRequest>, AppError>,
) -> Result<(StatusCode, Json<ReservationDetails>), AppError> {
    let user = acting_user(&caller, request.user)?;
    let details = state
        .reservations
        .create(request.event, user, request.no_reservations)
        .await?;
    Ok((StatusCode::CREATED, Json(details)))
}

/// `POST /reservations/check`
///
/// # Errors
///
/// 403 when asking about another user.
pub async fn check_reservation(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CheckReservationRequest>, AppError>,
) -> Result<Json<ReservationCheck>, AppError> {
    let user = acting_user(&caller, request.user)?;
    Ok(Json(state.reservations.exists(request.event, user).await?))
}

/// `GET /reservations`
///
/// # Errors
///
/// 500 when the store fails.
pub async fn list_reservations(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<ReservationDetails>>, AppError> {
    Ok(Json(state.reservations.list_all().await?))
}

/// `GET /reservations/user`, newest first.
///
/// # Errors
///
/// 500 when the store fails.
pub async fn list_user_reservations(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<ReservedEvent>>, AppError> {
    Ok(Json(state.reservations.list_for_user(caller.id).await?))
}

/// `GET /reservations/business`
///
/// # Errors
///
/// 403 for non-business accounts.
pub async fn list_business_reservations(
    State(state): State<AppState>,
    RequireBusiness(business): RequireBusiness,
) -> Result<Json<Vec<BusinessEventReservations>>, AppError> {
    Ok(Json(state.reservations.list_for_business(business.id).await?))
}

/// `GET /reservations/:id`
///
/// # Errors
///
/// 404 when the reservation does not exist.
pub async fn get_reservation(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<ReservationId>, AppError>,
) -> Result<Json<ReservationDetails>, AppError> {
    Ok(Json(state.reservations.get(id).await?))
}

/// `PATCH /reservations/:id`; only the status can change.
///
/// # Errors
///
/// 404 when missing, 403 for anyone but the holder or the event's owner.
pub async fn update_reservation(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<ReservationId>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateReservationRequest>, AppError>,
) -> Result<Json<Reservation>, AppError> {
    Ok(Json(
        state
            .reservations
            .update_status(&caller, id, request.status)
            .await?,
    ))
}

/// `DELETE /reservations/:id`. Capacity is not returned to the event.
///
/// # Errors
///
/// 404 when missing, 403 for anyone but the holder or the event's owner.
pub async fn delete_reservation(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<ReservationId>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    state.reservations.delete(&caller, id).await?;
    Ok(Json(MessageResponse::new("Reservation deleted successfully")))
}
