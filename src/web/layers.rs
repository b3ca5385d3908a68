use std::time::Instant;

use tracing::Instrument;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::storage::Storage;

use super::AppState;

/// Holds every request until the schema is ready.
pub async fn ensure_initialized<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.bootstrap.is_ready() {
        if let Err(err) = state.bootstrap.ensure_ready().await {
            log::error!("Rejecting {} {}: {}", request.method(), request.uri(), err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server initialization failed",
            )
                .into_response();
        }
    }
    next.run(request).await
}

/// Runs the request inside a `request` span, so handler logs carry the method
/// and path, then logs the outcome.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let span = tracing::info_span!("request", %method, %path);
    let started = Instant::now();

    let response = next.run(request).instrument(span).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
