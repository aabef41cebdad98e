use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores de la API. Cada variante fija el código HTTP y el mensaje `{error}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MissingInput(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    NotFound(String),

    /// El servicio ML respondió con un estado distinto de 2xx.
    #[error("{message}")]
    Upstream { message: String, detail: String },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingInput(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingInput(_) | AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Upstream { message, detail } => json!({ "error": message, "detail": detail }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
