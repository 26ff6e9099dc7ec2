use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::constants::MARKWATCH_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{SearchBody, SearchResponse};
use crate::gateway::state::HandlerState;
use crate::registry::RegistryApi;
use crate::search::SearchRequest;

#[instrument(skip(state, request), fields(request_id = tracing::field::Empty))]
pub async fn search_handler<R>(
    State(state): State<HandlerState<R>>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    R: RegistryApi + 'static,
{
    let request_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("request_id", tracing::field::display(&request_id));

    let body: SearchBody = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    debug!(
        nice_class = ?body.nice_class,
        has_logo = body.user_logo_b64.is_some(),
        "Processing search request"
    );

    let outcome = state.engine.search(SearchRequest::from(body)).await?;
    info!(
        results = outcome.results().len(),
        no_match = outcome.is_no_match(),
        "Search completed"
    );

    Ok(make_response(SearchResponse::from_outcome(request_id, outcome)))
}

pub fn make_response(response: SearchResponse) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        MARKWATCH_STATUS_HEADER,
        HeaderValue::from_static(response.status()),
    );
    (StatusCode::OK, headers, Json(response)).into_response()
}
