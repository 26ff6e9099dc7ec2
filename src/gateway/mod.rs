//! HTTP gateway (Axum) for trademark searches.
//!
//! This module is primarily used by the `markwatch` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::search_handler;
pub use state::HandlerState;

use crate::constants::MARKWATCH_STATUS_HEADER;
use crate::registry::RegistryApi;

pub fn create_router_with_state<R>(state: HandlerState<R>) -> Router
where
    R: RegistryApi + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/v1/search", post(search_handler::<R>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(MARKWATCH_STATUS_HEADER, HeaderValue::from_static("healthy"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}
