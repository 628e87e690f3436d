use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("invalid credentials")]
    Auth,

    #[error("no reservation in session")]
    MissingDraft,

    #[error("room {room_id} is not available")]
    Unavailable { room_id: i64 },

    #[error("reservation {reservation_id} persisted without a room restriction")]
    Orphaned { reservation_id: i64 },

    #[error("session error: {0}")]
    Session(String),
}

impl AppError {
    /// Text shown to the visitor in a flash message. Never leaks internals.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Parse(msg) => msg.clone(),
            AppError::NotFound(what) => format!("Unable to find {what}"),
            AppError::Query(_) => "can't query database".to_string(),
            AppError::Persistence(_) => "can't insert reservation into database!".to_string(),
            AppError::Auth => "invalid login credentials".to_string(),
            AppError::MissingDraft => "can't get reservation from session".to_string(),
            AppError::Unavailable { .. } => {
                "Sorry, that room is no longer available for those dates".to_string()
            }
            AppError::Orphaned { .. } => "can't insert room restriction!".to_string(),
            AppError::Session(_) => "internal server error".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Parse(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Auth => StatusCode::UNAUTHORIZED,
            AppError::MissingDraft | AppError::Unavailable { .. } => StatusCode::CONFLICT,
            AppError::Query(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Persistence(_) | AppError::Orphaned { .. } | AppError::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Query(_) | StoreError::Timeout(_) => AppError::Query(e.to_string()),
            StoreError::NotFound { entity, id } => AppError::NotFound(format!("{entity} {id}")),
            StoreError::Persistence(msg) => AppError::Persistence(msg),
            StoreError::Auth => AppError::Auth,
            StoreError::Unavailable { room_id } => AppError::Unavailable { room_id },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), axum::Json(body)).into_response()
    }
}
