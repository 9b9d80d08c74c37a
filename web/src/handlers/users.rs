//! Account endpoints.

use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::handlers::MessageResponse;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::{CookieJar, WithRejection};
use serde::{Deserialize, Serialize};
use vibe_core::{PublicUser, User, UserDraft, UserId, UserPatch};

/// Credentials for `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Plain-text password
    #[serde(default)]
    pub password: String,
}

/// Body returned on login and registration.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The account
    pub user: PublicUser,
    /// Session token, also set as the `jwt` cookie
    pub token: String,
}

/// Body of `GET /users/me`.
#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    /// The account
    pub user: PublicUser,
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let token = state.tokens.issue(user.id, state.clock.now())?;
    let jar = jar.add(state.tokens.session_cookie(token.clone()));
    Ok((
        jar,
        Json(SessionResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// `POST /users/register`
///
/// # Errors
///
/// 400 for invalid fields or an already registered email.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(draft), _): WithRejection<Json<UserDraft>, AppError>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), AppError> {
    let user = state.users.register(draft).await?;
    let (jar, body) = start_session(&state, jar, user)?;
    Ok((StatusCode::CREATED, jar, body))
}

/// `POST /users/login`
///
/// # Errors
///
/// 400 when a credential is missing, 401 when it does not match.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::bad_request("Missing credentials"));
    }
    let user = state.users.login(&request.email, &request.password).await?;
    start_session(&state, jar, user)
}

/// `POST /users/logout`
#[allow(clippy::unused_async)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(crate::auth::removal_cookie()),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// `GET /users/me`
#[allow(clippy::unused_async)]
pub async fn me(AuthUser(user): AuthUser) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse { user: user.into() })
}

/// `GET /users/:id`
///
/// # Errors
///
/// 404 when the user does not exist.
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<UserId>, AppError>,
) -> Result<Json<PublicUser>, AppError> {
    let user = state.users.get(id).await?;
    Ok(Json(user.into()))
}

/// `PATCH /users/:id`
///
/// # Errors
///
/// 403 for anyone but the account holder, 400 for invalid fields.
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<UserId>, AppError>,
    WithRejection(Json(patch), _): WithRejection<Json<UserPatch>, AppError>,
) -> Result<Json<PublicUser>, AppError> {
    let user = state.users.update(&caller, id, patch).await?;
    Ok(Json(user.into()))
}
