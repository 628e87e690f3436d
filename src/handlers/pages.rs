use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use super::redirect_with_error;
use crate::errors::AppError;
use crate::render::{public, TemplateData};
use crate::services::booking::parse_id;
use crate::session::Session;
use crate::state::AppState;

// GET /
pub async fn home(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let mut td = TemplateData::from_session(&session);
    let rooms = match state.store.all_rooms().await {
        Ok(rooms) => rooms,
        Err(e) => {
            let err = AppError::from(e);
            tracing::warn!(error = %err, "failed to list rooms");
            td.error.get_or_insert_with(|| err.user_message());
            Vec::new()
        }
    };
    public::home(&td, &rooms).into_response()
}

// GET /rooms/:id
pub async fn room(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let room = match parse_id(&id) {
        Ok(id) => state.store.get_room(id).await.map_err(AppError::from),
        Err(e) => Err(e),
    };
    match room {
        Ok(room) => public::room_page(&TemplateData::from_session(&session), &room).into_response(),
        Err(e) => redirect_with_error(&session, e, "/"),
    }
}
