use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;

use crate::errors::AppError;
use crate::forms::{self, FieldErrors};
use crate::render::{public, TemplateData};
use crate::session::Session;
use crate::state::AppState;

// GET /user/login
pub async fn login_page(session: Session) -> Html<String> {
    public::login(&TemplateData::from_session(&session), "", &FieldErrors::default())
}

// POST /user/login
pub async fn post_login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(values): Form<HashMap<String, String>>,
) -> Response {
    let mut form = forms::Form::new(values);
    form.required(&["email", "password"]);
    form.is_email("email");
    if !form.valid() {
        return public::login(
            &TemplateData::from_session(&session),
            form.get("email"),
            &form.errors,
        )
        .into_response();
    }

    let email = form.get("email").trim();
    match state.store.authenticate(email, form.get("password")).await {
        Ok(user_id) => {
            session.login(user_id);
            session.put_flash("Successfully logged in");
            tracing::info!(user_id, "user logged in");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            let err = AppError::from(e);
            if !matches!(err, AppError::Auth) {
                tracing::warn!(error = %err, "login failed");
            }
            session.put_error(err.user_message());
            Redirect::to("/user/login").into_response()
        }
    }
}

// GET /user/logout
pub async fn logout(session: Session) -> Redirect {
    session.logout();
    session.put_flash("You have been logged out");
    Redirect::to("/")
}
