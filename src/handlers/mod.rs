pub mod admin;
pub mod health;
pub mod pages;
pub mod reservation;
pub mod user;

use axum::response::{IntoResponse, Redirect, Response};

use crate::errors::AppError;
use crate::session::Session;

/// Turns a recoverable error into a flash message plus a redirect.
pub(crate) fn redirect_with_error(session: &Session, err: AppError, to: &str) -> Response {
    match &err {
        AppError::Query(_) | AppError::Persistence(_) | AppError::Session(_) => {
            tracing::warn!(error = %err, redirect = to, "request failed");
        }
        // already logged where it happened
        AppError::Orphaned { .. } => {}
        _ => tracing::debug!(error = %err, redirect = to, "request rejected"),
    }
    session.put_error(err.user_message());
    Redirect::to(to).into_response()
}
