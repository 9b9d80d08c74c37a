//! Route table and HTTP layers.

use crate::handlers::{events, health, reservations, users};
use crate::middleware::request_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, Method, header, header::InvalidHeaderValue},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// All routes under `/api`, with tracing and request ids.
pub fn router(state: AppState) -> Router {
    let users = Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route("/me", get(users::me))
        .route("/:id", get(users::get_user).patch(users::update_user));

    let events = Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/:id",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        );

    let reservations = Router::new()
        .route(
            "/",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route("/check", post(reservations::check_reservation))
        .route("/user", get(reservations::list_user_reservations))
        .route("/business", get(reservations::list_business_reservations))
        .route(
            "/:id",
            get(reservations::get_reservation)
                .patch(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        );

    let api = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/users", users)
        .nest("/events", events)
        .nest("/reservations", reservations);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}

/// CORS for the browser client at `origin`, cookies allowed.
///
/// # Errors
///
/// Returns an error when `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
