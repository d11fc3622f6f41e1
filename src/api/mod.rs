//! API module
//!
//! HTTP request handlers and the router tying them to paths, static file
//! serving and middleware.

pub mod health;
pub mod images;

use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::Next,
    response::Response,
    routing::{delete, get, get_service, post},
    Router,
};
use std::time::Instant;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

/// Build the application router
///
/// `/uploads` serves stored images and any path not matched by a route is
/// looked up in the static assets directory.
pub fn router(state: AppState) -> Router {
    let index = ServeFile::new(state.public_dir.join("index.html"));
    let uploads = ServeDir::new(&state.upload_dir);
    let assets = ServeDir::new(&state.public_dir);
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        .route("/", get_service(index))
        .route("/health", get(health::health_check))
        .route("/upload-image", post(images::upload_image))
        .route("/images", get(images::list_images))
        .route("/images/:filename", delete(images::delete_image))
        .nest_service(images::UPLOADS_URL_PREFIX, uploads)
        .fallback_service(assets)
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(body_limit)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()) // Allow the capture page to be hosted elsewhere
        .with_state(state)
}
