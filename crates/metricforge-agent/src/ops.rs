//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/metrics` : pull exposition in Prometheus text format

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Every request re-renders from live registry state; no caching.
pub async fn metrics(axum::extract::State(state): axum::extract::State<AppState>) -> Response {
    let body = state.registry().render_exposition();

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
