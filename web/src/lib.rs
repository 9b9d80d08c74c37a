//! Axum HTTP surface for Vibe.
//!
//! Handlers are thin: extract, call a `vibe-core` service, map the result.
//! Every domain failure becomes an [`AppError`] with a JSON body
//! `{"code": ..., "message": ...}`.
//!
//! # Request Flow
//!
//! 1. **Request id** assigned and attached to the tracing span
//! 2. **Authenticate** from the `jwt` cookie or a bearer token
//! 3. **Extract** path and JSON body
//! 4. **Call** the service
//! 5. **Map** the result to a status and JSON body
//!
//! # Example
//!
//! ```ignore
//! use vibe_web::{AppState, router, cors_layer};
//!
//! let app = router(state).layer(cors_layer("http://localhost:5173")?);
//! axum::serve(listener, app).await?;
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use auth::{DEFAULT_TOKEN_TTL, SESSION_COOKIE, TokenKeys};
pub use error::AppError;
pub use extractors::{AuthUser, RequestId, RequireBusiness};
pub use middleware::{
    HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL, REQUEST_ID_HEADER, request_id_layer,
};
pub use router::{cors_layer, router};
pub use state::AppState;
