//! JWT session tokens and the `jwt` cookie that carries them.
//!
//! Tokens are HS256 with the user id in `sub`. The same token is returned in
//! the login/registration body and set as an `HttpOnly` cookie, so browser
//! clients and API clients (`Authorization: Bearer`) both work.

use crate::error::AppError;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;
use vibe_core::UserId;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jwt";

/// Default token lifetime: three days.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenKeys {
    /// Keys derived from a shared secret.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `user` valid from `now`.
    ///
    /// # Errors
    ///
    /// Returns a 500 error if signing fails.
    pub fn issue(&self, user: UserId, now: DateTime<Utc>) -> Result<String, AppError> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp().saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "failed to sign session token");
            AppError::internal("Could not create session")
        })
    }

    /// Verify a token and return the user id it was issued for.
    ///
    /// # Errors
    ///
    /// Returns 401 for a malformed, forged or expired token.
    pub fn verify(&self, token: &str) -> Result<UserId, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                AppError::unauthorized("Invalid or expired token")
            })?;
        Uuid::parse_str(&data.claims.sub)
            .map(UserId::from_uuid)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))
    }

    /// Cookie carrying `token`.
    #[must_use]
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(max_age))
            .build()
    }
}

/// Cookie that clears the session: empty value, already expired.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}
