use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use rusqlite::Connection;

use super::SessionData;
use crate::db::queries;
use crate::store::StoreError;

/// Server-side session persistence keyed by the opaque cookie token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns `None` for unknown or expired tokens.
    async fn load(&self, token: &str) -> Result<Option<SessionData>, StoreError>;

    async fn save(
        &self,
        token: &str,
        data: &SessionData,
        expires_at: NaiveDateTime,
    ) -> Result<(), StoreError>;

    async fn delete(&self, token: &str) -> Result<(), StoreError>;

    /// Removes expired sessions, returning how many were dropped.
    async fn purge_expired(&self) -> Result<usize, StoreError>;
}

pub struct SqliteSessionStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StoreError> {
        let conn = self
            .db
            .lock()
            .map_err(|_| StoreError::Query("database lock poisoned".to_string()))?;
        f(&conn).map_err(StoreError::query)
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self, token: &str) -> Result<Option<SessionData>, StoreError> {
        let now = Utc::now().naive_utc();
        let raw = self.with_conn(|conn| queries::get_session(conn, token, now))?;
        Ok(raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable session data");
                None
            }
        }))
    }

    async fn save(
        &self,
        token: &str,
        data: &SessionData,
        expires_at: NaiveDateTime,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(data).map_err(StoreError::persistence)?;
        self.with_conn(|conn| queries::save_session(conn, token, &json, expires_at))
    }

    async fn delete(&self, token: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| queries::delete_session(conn, token))
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now().naive_utc();
        self.with_conn(|conn| queries::expire_old_sessions(conn, now))
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, (SessionData, NaiveDateTime)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, token: &str) -> Result<Option<SessionData>, StoreError> {
        let now = Utc::now().naive_utc();
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(sessions
            .get(token)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(data, _)| data.clone()))
    }

    async fn save(
        &self,
        token: &str,
        data: &SessionData,
        expires_at: NaiveDateTime,
    ) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.to_string(), (data.clone(), expires_at));
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), StoreError> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now().naive_utc();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, (_, expires_at)| *expires_at > now);
        Ok(before - sessions.len())
    }
}
