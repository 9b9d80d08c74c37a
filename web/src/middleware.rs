//! Request-id middleware.
//!
//! Every request gets an id: the client's `x-request-id` when it is a UUID,
//! otherwise a fresh v4. The id is stored in request extensions as
//! [`RequestId`], recorded on an `http_request` span, and echoed back on the
//! response. Request counts and latency are recorded as
//! [`HTTP_REQUESTS_TOTAL`] and [`HTTP_REQUEST_DURATION_SECONDS`].
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use vibe_web::middleware::request_id_layer;
//!
//! let app = Router::new()
//!     .route("/api/events", get(list_events))
//!     .layer(request_id_layer());
//! ```

use crate::extractors::RequestId;
use axum::{extract::Request, http::HeaderValue, response::Response};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Completed requests, labelled by `method` and `status`.
pub const HTTP_REQUESTS_TOTAL: &str = "vibe_http_requests_total";
/// Request latency, labelled by `method`.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vibe_http_request_duration_seconds";

/// Layer that assigns and propagates request ids.
#[must_use]
pub const fn request_id_layer() -> RequestIdLayer {
    RequestIdLayer
}

/// Layer for request-id tracking.
#[derive(Clone, Debug)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdMiddleware { inner }
    }
}

/// Middleware service for request-id tracking.
#[derive(Clone, Debug)]
pub struct RequestIdMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for RequestIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        req.extensions_mut().insert(RequestId(request_id));

        let span = tracing::info_span!(
            "http_request",
            request_id = %request_id,
            method = %req.method(),
            uri = %req.uri(),
        );

        let method = req.method().to_string();
        let start = Instant::now();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, "method" => method.clone())
                .record(start.elapsed().as_secs_f64());
            metrics::counter!(
                HTTP_REQUESTS_TOTAL,
                "method" => method,
                "status" => response.status().as_u16().to_string()
            )
            .increment(1);

            if let Ok(header_value) = HeaderValue::from_str(&request_id.to_string()) {
                response
                    .headers_mut()
                    .insert(REQUEST_ID_HEADER, header_value);
            }

            Ok(response)
        })
    }
}
