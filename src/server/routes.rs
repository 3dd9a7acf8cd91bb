//! Liveness routes.

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

/// Body returned for every liveness request.
pub const LIVENESS_BODY: &str = "Mika is alive and sparkling! ✨";

/// Router answering every path and method with the liveness message.
pub fn create_router() -> Router {
    Router::new().fallback(liveness)
}

async fn liveness() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        LIVENESS_BODY,
    )
}
