use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::engine::engine::EngineError;
use crate::engine::speech_client::SpeechError;

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    /// An upstream service (narrator, voice) failed.
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::BadGateway(msg) => {
                tracing::warn!(error = %msg, "Upstream service failed");
                (StatusCode::BAD_GATEWAY, "The narrator is unavailable, try again").into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::EmptyInput => ApiError::BadRequest(e.to_string()),
            EngineError::Narrator(_) => ApiError::BadGateway(e.to_string()),
            EngineError::UnsupportedSave(_) => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<SpeechError> for ApiError {
    fn from(e: SpeechError) -> Self {
        match e {
            SpeechError::EmptyText => ApiError::BadRequest(e.to_string()),
            SpeechError::RequestFailed(_) => ApiError::BadGateway(e.to_string()),
        }
    }
}
