use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use tokio::task::JoinHandle;

use super::{Session, SessionData, SessionStore};

pub const COOKIE_NAME: &str = "bookings_session";

/// Session store plus the cookie settings the middleware applies.
#[derive(Clone)]
pub struct SessionManager {
    pub store: Arc<dyn SessionStore>,
    pub lifetime: chrono::Duration,
    pub secure: bool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, lifetime: chrono::Duration, secure: bool) -> Self {
        Self {
            store,
            lifetime,
            secure,
        }
    }

    fn cookie_header(&self, token: &str) -> String {
        let mut cookie = format!(
            "{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.lifetime.num_seconds()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn new_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Loads the session named by the cookie (or starts a fresh one), runs the
/// handler, then writes the session back with a renewed expiry.
pub async fn session_middleware(
    State(manager): State<SessionManager>,
    mut req: Request,
    next: Next,
) -> Response {
    let existing = match cookie_token(req.headers()) {
        Some(token) => match manager.store.load(&token).await {
            Ok(Some(data)) => Some((token, data)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load session, starting a new one");
                None
            }
        },
        None => None,
    };

    let had_session = existing.is_some();
    let (mut token, data) = existing.unwrap_or_else(|| (new_token(), SessionData::default()));

    let session = Session::new(data);
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    let (data, dirty, renew) = session.finish();
    if !had_session && !dirty {
        return response;
    }

    if renew {
        if had_session {
            if let Err(e) = manager.store.delete(&token).await {
                tracing::warn!(error = %e, "failed to delete session during renewal");
            }
        }
        token = new_token();
    }

    if !had_session && data.is_empty() {
        return response;
    }

    let expires_at = Utc::now().naive_utc() + manager.lifetime;
    if let Err(e) = manager.store.save(&token, &data, expires_at).await {
        tracing::error!(error = %e, "failed to save session");
        return response;
    }

    match HeaderValue::from_str(&manager.cookie_header(&token)) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "invalid session cookie header"),
    }

    response
}

/// Periodically drops expired sessions from the store.
pub fn spawn_purge_task(store: Arc<dyn SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::debug!(purged = n, "expired sessions removed"),
                Err(e) => tracing::warn!(error = %e, "session purge failed"),
            }
        }
    })
}
