//! Custom Axum extractors.
//!
//! - [`AuthUser`]: the authenticated account, from the `jwt` cookie or a
//!   bearer token
//! - [`RequireBusiness`]: as [`AuthUser`], but only for business accounts
//! - [`RequestId`]: the id assigned by [`crate::middleware::request_id_layer`]
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(AuthUser(user): AuthUser, request_id: RequestId) -> String {
//!     tracing::info!(request_id = %request_id.0, user_id = %user.id, "Processing request");
//!     user.name
//! }
//! ```

use crate::auth::{SESSION_COOKIE, TokenKeys};
use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use uuid::Uuid;
use vibe_core::{Role, User, UserService};

/// Pull the session token from the cookie, falling back to the bearer header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

/// The authenticated account.
///
/// Rejects with 401 when no token is present, the token does not verify, or
/// the account it names no longer exists.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenKeys>: FromRef<S>,
    UserService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;
        let user_id = Arc::<TokenKeys>::from_ref(state).verify(&token)?;

        let user = UserService::from_ref(state)
            .get(user_id)
            .await
            .map_err(|err| match err {
                vibe_core::VibeError::NotFound { .. } => {
                    AppError::unauthorized("Account no longer exists")
                }
                other => AppError::from(other),
            })?;

        Ok(Self(user))
    }
}

/// An authenticated business account.
#[derive(Debug, Clone)]
pub struct RequireBusiness(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireBusiness
where
    S: Send + Sync,
    Arc<TokenKeys>: FromRef<S>,
    UserService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Business {
            return Err(AppError::forbidden("Business account required"));
        }
        Ok(Self(user))
    }
}

/// Request id for log correlation.
///
/// Reads the id stored by the request-id middleware, or generates one when the
/// middleware is not installed.
#[derive(Debug, Clone, Copy)]
pub struct RequestId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .extensions
            .get::<Self>()
            .map_or_else(Uuid::new_v4, |id| id.0);
        Ok(Self(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn headers(name: header::HeaderName, value: &str) -> HeaderMap {
        let req = Request::builder().header(name, value).body(()).expect("Valid request");
        req.into_parts().0.headers
    }

    #[test]
    fn test_token_from_cookie() {
        let headers = headers(header::COOKIE, "theme=dark; jwt=abc.def.ghi");
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_token_from_bearer_header() {
        let headers = headers(header::AUTHORIZATION, "Bearer abc.def.ghi");
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_no_token() {
        let headers = headers(header::AUTHORIZATION, "Basic Zm9vOmJhcg==");
        assert_eq!(session_token(&headers), None);
    }

    #[tokio::test]
    async fn test_request_id_generated_when_missing() {
        let req = Request::builder().body(()).expect("Valid request");
        let (mut parts, _) = req.into_parts();
        let id = RequestId::from_request_parts(&mut parts, &()).await.expect("Should extract");
        assert_ne!(id.0, Uuid::nil());
    }
}
