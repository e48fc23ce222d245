use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Answered with a JSON body.
    #[error("Producto no encontrado")]
    EntryNotFound,
    /// Answered with a plain-text body.
    #[error("Producto no encontrado")]
    EntryNotFoundText,
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EntryNotFound | ApiError::EntryNotFoundText => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, ApiError::EntryNotFoundText) {
            return (self.status(), self.to_string()).into_response();
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
