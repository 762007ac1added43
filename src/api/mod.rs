//! Status API under `/api`.
//!
//! Read-only JSON views of the current config snapshot. Every response
//! carries `Cache-Control: no-cache, no-store, must-revalidate`.

pub mod handlers;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_api_router() -> Router<AppState> {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/version", get(version))
        .route("/size_limit", get(size_limit))
        .route("/cors/status", get(cors_status))
        .route("/smartgit/status", get(smartgit_status))
        .route("/shell/status", get(shell_status))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
}
