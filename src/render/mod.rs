//! In-code HTML pages. Every interpolated value goes through [`escape`].

pub mod admin;
pub mod public;

use axum::response::Html;

use crate::forms::FieldErrors;
use crate::session::Session;

/// Values every page shows: the one-shot messages and the login state.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    pub flash: Option<String>,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub is_authenticated: bool,
}

impl TemplateData {
    /// Pops the one-shot messages, so they show exactly once.
    pub fn from_session(session: &Session) -> Self {
        Self {
            flash: session.pop_flash(),
            error: session.pop_error(),
            warning: session.pop_warning(),
            is_authenticated: session.is_authenticated(),
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn alert(class: &str, msg: &Option<String>) -> String {
    match msg {
        Some(m) => format!(r#"<div class="alert alert-{class}">{}</div>"#, escape(m)),
        None => String::new(),
    }
}

pub(crate) fn layout(title: &str, td: &TemplateData, body: &str) -> Html<String> {
    let account = if td.is_authenticated {
        r#"<a href="/admin/dashboard">Admin</a> <a href="/user/logout">Logout</a>"#
    } else {
        r#"<a href="/user/login">Login</a>"#
    };
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>
<nav><a href="/">Home</a> <a href="/rooms/1">General's Quarters</a> <a href="/rooms/2">Major's Suite</a> <a href="/search_availability">Book Now</a> {account}</nav>
{flash}{warning}{error}
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        flash = alert("success", &td.flash),
        warning = alert("warning", &td.warning),
        error = alert("danger", &td.error),
    ))
}

/// Text input with its first validation error, if any.
pub(crate) fn input(label: &str, name: &str, kind: &str, value: &str, errors: &FieldErrors) -> String {
    let error = errors
        .get(name)
        .map(|e| format!(r#"<span class="field-error">{}</span>"#, escape(e)))
        .unwrap_or_default();
    let class = if errors.get(name).is_some() { " is-invalid" } else { "" };
    format!(
        r#"<label for="{name}">{label}</label>
<input type="{kind}" id="{name}" name="{name}" value="{value}" class="form-control{class}">{error}"#,
        label = escape(label),
        value = escape(value),
    )
}
