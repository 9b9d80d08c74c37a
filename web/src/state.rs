//! Application state shared across all HTTP handlers.

use crate::auth::TokenKeys;
use axum::extract::FromRef;
use std::sync::Arc;
use vibe_core::{Clock, EventRepository, EventService, ReservationService, UserService};

/// Services and auth configuration behind every route.
///
/// Cheap to clone: every field is an `Arc` or wraps one.
#[derive(Clone)]
pub struct AppState {
    /// Reservation use cases
    pub reservations: ReservationService,
    /// Event use cases
    pub events: EventService,
    /// User use cases
    pub users: UserService,
    /// Token signing and verification
    pub tokens: Arc<TokenKeys>,
    /// Store handle used by the readiness probe
    pub store: Arc<dyn EventRepository>,
    /// Clock used to stamp tokens
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Bundle the services.
    #[must_use]
    pub fn new(
        reservations: ReservationService,
        events: EventService,
        users: UserService,
        tokens: TokenKeys,
        store: Arc<dyn EventRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reservations,
            events,
            users,
            tokens: Arc::new(tokens),
            store,
            clock,
        }
    }
}

impl FromRef<AppState> for Arc<TokenKeys> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.tokens)
    }
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}
