use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::constants::MARKWATCH_STATUS_HEADER;
use crate::search::SearchError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Search(#[from] SearchError),
}

impl GatewayError {
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::Search(e) => e.kind(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Search(e) => match e {
                SearchError::EmptyQuery | SearchError::InvalidRequest { .. } => {
                    StatusCode::BAD_REQUEST
                }
                SearchError::Auth(_) | SearchError::Registry(_) => StatusCode::BAD_GATEWAY,
                SearchError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
            },
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub error: ErrorBody,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(kind = self.kind(), error = %self, "Search failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(MARKWATCH_STATUS_HEADER, HeaderValue::from_static("error"));

        let body = Json(ErrorResponse {
            status: "error",
            error: ErrorBody {
                kind: self.kind(),
                message: self.to_string(),
            },
        });

        (status, headers, body).into_response()
    }
}
