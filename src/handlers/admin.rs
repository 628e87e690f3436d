use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::redirect_with_error;
use crate::errors::AppError;
use crate::forms::{self, FieldErrors};
use crate::models::{GuestDetails, Reservation, ReservationFilter};
use crate::render::{admin, TemplateData};
use crate::services::booking::{guest_from_form, parse_id, validate_guest};
use crate::services::calendar::{apply_block_changes, diff_blocks, load_calendar, MonthView};
use crate::services::integrity::check_integrity;
use crate::session::Session;
use crate::state::AppState;

/// Route layer for `/admin/*`: anonymous visitors go to the login page.
pub async fn require_auth(session: Session, req: Request, next: Next) -> Response {
    if !session.is_authenticated() {
        session.put_error("Log in first!");
        return Redirect::to("/user/login").into_response();
    }
    next.run(req).await
}

/// Optional calendar month carried by admin links that started on the
/// calendar (`src = cal`).
#[derive(Deserialize, Default)]
pub struct MonthQuery {
    pub y: Option<String>,
    pub m: Option<String>,
}

impl MonthQuery {
    fn month(&self) -> Option<(i32, u32)> {
        let y = self.y.as_deref()?.trim().parse().ok()?;
        let m = self.m.as_deref()?.trim().parse().ok()?;
        MonthView::new(y, m).map(|v| (v.year(), v.month()))
    }
}

fn normalize_src(src: &str) -> &'static str {
    match src {
        "new" => "new",
        "cal" => "cal",
        _ => "all",
    }
}

/// Where an admin action started from: a reservation list or the calendar.
fn back_to(src: &str, month: Option<(i32, u32)>) -> String {
    match (src, month) {
        ("cal", Some((y, m))) => format!("/admin/reservations_calendar?y={y}&m={m}"),
        ("cal", None) => "/admin/reservations_calendar".to_string(),
        (src, _) => format!("/admin/reservations_{src}"),
    }
}

// GET /admin/dashboard
pub async fn dashboard(State(state): State<Arc<AppState>>, session: Session) -> Response {
    let counts = async {
        let new = state.store.list_reservations(ReservationFilter::Unprocessed).await?;
        let all = state.store.list_reservations(ReservationFilter::All).await?;
        let report = check_integrity(state.store.as_ref()).await?;
        Ok::<_, crate::store::StoreError>((new.len(), all.len(), report))
    };

    match counts.await {
        Ok((new, all, report)) => {
            admin::dashboard(&TemplateData::from_session(&session), new, all, &report).into_response()
        }
        Err(e) => redirect_with_error(&session, e.into(), "/"),
    }
}

async fn list(
    state: &AppState,
    session: &Session,
    filter: ReservationFilter,
    title: &str,
    src: &str,
) -> Response {
    match state.store.list_reservations(filter).await {
        Ok(reservations) => {
            admin::reservation_list(&TemplateData::from_session(session), title, src, &reservations)
                .into_response()
        }
        Err(e) => redirect_with_error(session, e.into(), "/admin/dashboard"),
    }
}

// GET /admin/reservations_new
pub async fn reservations_new(State(state): State<Arc<AppState>>, session: Session) -> Response {
    list(&state, &session, ReservationFilter::Unprocessed, "New Reservations", "new").await
}

// GET /admin/reservations_all
pub async fn reservations_all(State(state): State<Arc<AppState>>, session: Session) -> Response {
    list(&state, &session, ReservationFilter::All, "All Reservations", "all").await
}

async fn load_reservation(state: &AppState, id: &str) -> Result<Reservation, AppError> {
    let id = parse_id(id)?;
    Ok(state.store.get_reservation(id).await?)
}

// GET /admin/reservations/:src/:id
pub async fn show_reservation(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(q): Query<MonthQuery>,
) -> Response {
    let src = normalize_src(&src);
    match load_reservation(&state, &id).await {
        Ok(res) => {
            let values = GuestDetails {
                first_name: res.first_name.clone(),
                last_name: res.last_name.clone(),
                email: res.email.clone(),
                phone: res.phone.clone(),
            };
            admin::reservation_show(
                &TemplateData::from_session(&session),
                &res,
                src,
                q.month(),
                &values,
                &FieldErrors::default(),
            )
            .into_response()
        }
        Err(e) => redirect_with_error(&session, e, &back_to(src, q.month())),
    }
}

// POST /admin/reservations/:src/:id
pub async fn update_reservation(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(q): Query<MonthQuery>,
    Form(values): Form<HashMap<String, String>>,
) -> Response {
    let src = normalize_src(&src);
    let back = back_to(src, q.month());

    let res = match load_reservation(&state, &id).await {
        Ok(res) => res,
        Err(e) => return redirect_with_error(&session, e, &back),
    };

    let mut form = forms::Form::new(values);
    let guest = guest_from_form(&form);
    if !validate_guest(&mut form) {
        return admin::reservation_show(
            &TemplateData::from_session(&session),
            &res,
            src,
            q.month(),
            &guest,
            &form.errors,
        )
        .into_response();
    }

    match state.store.update_reservation(res.id, &guest).await {
        Ok(()) => {
            tracing::info!(reservation_id = res.id, "reservation updated");
            session.put_flash("Changes saved!");
            Redirect::to(&back).into_response()
        }
        Err(e) => redirect_with_error(&session, e.into(), &back),
    }
}

// GET /admin/process_reservation/:src/:id
pub async fn process_reservation(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(q): Query<MonthQuery>,
) -> Response {
    let back = back_to(normalize_src(&src), q.month());
    let result = match parse_id(&id) {
        Ok(id) => state.store.mark_processed(id).await.map_err(AppError::from),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            session.put_flash("Processed reservation!");
            Redirect::to(&back).into_response()
        }
        Err(e) => redirect_with_error(&session, e, &back),
    }
}

// GET /admin/delete_reservation/:src/:id
pub async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path((src, id)): Path<(String, String)>,
    Query(q): Query<MonthQuery>,
) -> Response {
    let back = back_to(normalize_src(&src), q.month());
    let result = match parse_id(&id) {
        Ok(id) => state.store.delete_reservation(id).await.map_err(AppError::from),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => {
            session.put_flash("Reservation has been deleted!");
            Redirect::to(&back).into_response()
        }
        Err(e) => redirect_with_error(&session, e, &back),
    }
}

// GET /admin/reservations_calendar?y=&m=
pub async fn calendar(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(q): Query<MonthQuery>,
) -> Response {
    let view = match MonthView::from_query(q.y.as_deref(), q.m.as_deref()) {
        Ok(view) => view,
        Err(e) => return redirect_with_error(&session, e, "/admin/dashboard"),
    };

    match load_calendar(state.store.as_ref(), &view).await {
        Ok(rooms) => {
            let maps = rooms
                .iter()
                .map(|cal| (cal.room.id, cal.block_map()))
                .filter(|(_, map)| !map.is_empty())
                .collect();
            session.put_block_maps((view.year(), view.month()), maps);
            admin::calendar(&TemplateData::from_session(&session), &view, &rooms).into_response()
        }
        Err(e) => redirect_with_error(&session, e.into(), "/admin/dashboard"),
    }
}

// POST /admin/reservations_calendar
pub async fn post_calendar(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(values): Form<HashMap<String, String>>,
) -> Response {
    let form = forms::Form::new(values);
    let view = match MonthView::from_query(Some(form.get("y")), Some(form.get("m"))) {
        Ok(view) => view,
        Err(e) => return redirect_with_error(&session, e, "/admin/reservations_calendar"),
    };
    let back = back_to("cal", Some((view.year(), view.month())));

    // Another window may have rendered a different month since this form was
    // shown; diffing against those blocks would delete them.
    let Some(shown) = session.block_maps_for((view.year(), view.month())) else {
        tracing::warn!(
            year = view.year(),
            month = view.month(),
            "calendar save for a month that is not the one last shown"
        );
        session.put_error(
            "The calendar was opened for another month since this page was loaded. \
             Review it and save again.",
        );
        return Redirect::to(&back).into_response();
    };

    let changes = match diff_blocks(&shown, &form) {
        Ok(changes) => changes,
        Err(e) => return redirect_with_error(&session, e, &back),
    };

    match apply_block_changes(state.store.as_ref(), &changes).await {
        Ok(outcome) => {
            tracing::info!(
                removed = outcome.removed,
                added = outcome.added,
                skipped = outcome.skipped.len(),
                "calendar blocks saved"
            );
            if !outcome.skipped.is_empty() {
                session.put_warning("Some nights were already taken and were not blocked");
            }
            session.put_flash("Changes saved!");
            Redirect::to(&back).into_response()
        }
        Err(e) => redirect_with_error(&session, e.into(), &back),
    }
}
