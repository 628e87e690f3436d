use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use super::redirect_with_error;
use crate::errors::AppError;
use crate::forms::{self, FieldErrors};
use crate::render::{public, TemplateData};
use crate::services::booking::{parse_date_range, parse_id, DetailsOutcome};
use crate::session::Session;
use crate::state::AppState;

// GET /search_availability
pub async fn search_page(session: Session) -> Html<String> {
    public::search_page(&TemplateData::from_session(&session))
}

#[derive(Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

// POST /search_availability
pub async fn post_search(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<SearchForm>,
) -> Response {
    let rooms = match state.booking.search(&session, &form.start, &form.end).await {
        Ok(rooms) => rooms,
        Err(e @ AppError::Parse(_)) => return redirect_with_error(&session, e, "/search_availability"),
        Err(e) => return redirect_with_error(&session, e, "/"),
    };

    if rooms.is_empty() {
        session.put_error("No availability");
        return Redirect::to("/search_availability").into_response();
    }

    let Some(draft) = session.draft() else {
        return redirect_with_error(&session, AppError::MissingDraft, "/");
    };
    public::choose_room(&TemplateData::from_session(&session), &rooms, &draft).into_response()
}

#[derive(Deserialize)]
pub struct AvailabilityJsonForm {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub room_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AvailabilityJsonResponse {
    pub ok: bool,
    pub message: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
}

// POST /search_availability-json
pub async fn availability_json(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AvailabilityJsonForm>,
) -> Json<AvailabilityJsonResponse> {
    let mut resp = AvailabilityJsonResponse {
        ok: false,
        message: String::new(),
        room_id: form.room_id.clone(),
        start_date: form.start.clone(),
        end_date: form.end.clone(),
    };

    let parsed = parse_date_range(&form.start, &form.end)
        .and_then(|(start, end)| Ok((start, end, parse_id(&form.room_id)?)));
    let (start, end, room_id) = match parsed {
        Ok(v) => v,
        Err(e) => {
            resp.message = e.user_message();
            return Json(resp);
        }
    };

    match state.booking.room_available(start, end, room_id).await {
        Ok(available) => {
            resp.ok = available;
            if !available {
                resp.message = "No availability".to_string();
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, room_id, "availability check failed");
            resp.message = "Error querying database".to_string();
        }
    }
    Json(resp)
}

// GET /choose_room/:id
pub async fn choose_room(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let room_id = match parse_id(&id) {
        Ok(id) => id,
        Err(_) => {
            return redirect_with_error(
                &session,
                AppError::Parse("Unable to get room ID from URL".to_string()),
                "/",
            )
        }
    };

    match state.booking.choose_room(&session, room_id).await {
        Ok(_) => Redirect::to("/make_reservation").into_response(),
        Err(e) => redirect_with_error(&session, e, "/"),
    }
}

#[derive(Deserialize)]
pub struct BookRoomQuery {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub s: String,
    #[serde(default)]
    pub e: String,
}

// GET /book_room?id=&s=&e=
pub async fn book_room(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(q): Query<BookRoomQuery>,
) -> Response {
    match state.booking.book_room(&session, &q.id, &q.s, &q.e).await {
        Ok(_) => Redirect::to("/make_reservation").into_response(),
        Err(e) => redirect_with_error(&session, e, "/"),
    }
}

// GET /make_reservation
pub async fn make_reservation(State(state): State<Arc<AppState>>, session: Session) -> Response {
    match state.booking.details_draft(&session) {
        Ok(draft) => public::reservation_form(
            &TemplateData::from_session(&session),
            &draft,
            &draft.guest,
            &FieldErrors::default(),
        )
        .into_response(),
        Err(e) => redirect_with_error(&session, e, "/"),
    }
}

// POST /make_reservation
pub async fn post_reservation(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(values): Form<HashMap<String, String>>,
) -> Response {
    let form = forms::Form::new(values);
    match state.booking.submit_details(&session, form).await {
        Ok(DetailsOutcome::Committed { .. }) => Redirect::to("/reservation_summary").into_response(),
        Ok(DetailsOutcome::Invalid { draft, form }) => public::reservation_form(
            &TemplateData::from_session(&session),
            &draft,
            &draft.guest,
            &form.errors,
        )
        .into_response(),
        Err(e @ AppError::Unavailable { .. }) => {
            session.clear_draft();
            redirect_with_error(&session, e, "/search_availability")
        }
        Err(e) => redirect_with_error(&session, e, "/"),
    }
}

// GET /reservation_summary
pub async fn summary(State(state): State<Arc<AppState>>, session: Session) -> Response {
    match state.booking.summary(&session) {
        Ok(draft) => public::summary(&TemplateData::from_session(&session), &draft).into_response(),
        Err(e) => redirect_with_error(&session, e, "/"),
    }
}
