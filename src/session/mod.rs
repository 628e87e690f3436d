pub mod middleware;
pub mod store;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::ReservationDraft;

pub use middleware::{session_middleware, spawn_purge_task, SessionManager, COOKIE_NAME};
pub use store::{MemorySessionStore, SessionStore, SqliteSessionStore};

/// Day -> owner-block restriction id for one room, as shown on the calendar.
pub type BlockMap = BTreeMap<NaiveDate, i64>;

/// Everything the server keeps for one browser session. Serialized as JSON
/// into the session store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionData {
    #[serde(default)]
    pub reservation: Option<ReservationDraft>,
    #[serde(default)]
    pub flash: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub block_maps: HashMap<i64, BlockMap>,
    /// `(year, month)` the stashed block maps were rendered for.
    #[serde(default)]
    pub block_month: Option<(i32, u32)>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        *self == SessionData::default()
    }
}

struct SessionState {
    data: SessionData,
    dirty: bool,
    renew: bool,
}

/// Per-request handle to the session. Cloned into the request extensions by
/// [`session_middleware`]; handlers take it as an extractor.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                data,
                dirty: false,
                renew: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<R>(&self, f: impl FnOnce(&SessionData) -> R) -> R {
        f(&self.lock().data)
    }

    fn write<R>(&self, f: impl FnOnce(&mut SessionData) -> R) -> R {
        let mut state = self.lock();
        state.dirty = true;
        f(&mut state.data)
    }

    // ── Reservation draft ──

    pub fn put_draft(&self, draft: ReservationDraft) {
        self.write(|d| d.reservation = Some(draft));
    }

    pub fn draft(&self) -> Option<ReservationDraft> {
        self.read(|d| d.reservation.clone())
    }

    pub fn clear_draft(&self) {
        self.write(|d| d.reservation = None);
    }

    // ── One-shot messages ──

    pub fn put_flash(&self, msg: impl Into<String>) {
        let msg = msg.into();
        self.write(|d| d.flash = Some(msg));
    }

    pub fn put_error(&self, msg: impl Into<String>) {
        let msg = msg.into();
        self.write(|d| d.error = Some(msg));
    }

    pub fn put_warning(&self, msg: impl Into<String>) {
        let msg = msg.into();
        self.write(|d| d.warning = Some(msg));
    }

    pub fn pop_flash(&self) -> Option<String> {
        self.write(|d| d.flash.take())
    }

    pub fn pop_error(&self) -> Option<String> {
        self.write(|d| d.error.take())
    }

    pub fn pop_warning(&self) -> Option<String> {
        self.write(|d| d.warning.take())
    }

    // ── Authentication ──

    pub fn user_id(&self) -> Option<i64> {
        self.read(|d| d.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }

    /// Stores the user and asks the middleware to issue a fresh token.
    pub fn login(&self, user_id: i64) {
        let mut state = self.lock();
        state.data.user_id = Some(user_id);
        state.dirty = true;
        state.renew = true;
    }

    /// Drops all session data and issues a fresh token.
    pub fn logout(&self) {
        let mut state = self.lock();
        state.data = SessionData::default();
        state.dirty = true;
        state.renew = true;
    }

    // ── Calendar block maps ──

    /// Replaces the stash with the block maps of the month just rendered.
    pub fn put_block_maps(&self, month: (i32, u32), maps: HashMap<i64, BlockMap>) {
        self.write(|d| {
            d.block_maps = maps;
            d.block_month = Some(month);
        });
    }

    /// Block maps stashed by the last calendar render, keyed by room. `None`
    /// when the last render was a different month, or there was none.
    pub fn block_maps_for(&self, month: (i32, u32)) -> Option<HashMap<i64, BlockMap>> {
        self.read(|d| {
            (d.block_month == Some(month)).then(|| d.block_maps.clone())
        })
    }

    /// Snapshot of the data plus the dirty and renew flags, consumed by the
    /// middleware once the handler has run.
    pub(crate) fn finish(&self) -> (SessionData, bool, bool) {
        let state = self.lock();
        (state.data.clone(), state.dirty, state.renew)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Session("session layer is not installed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_messages_pop_once() {
        let session = Session::new(SessionData::default());
        session.put_flash("saved");
        session.put_error("failed");
        assert_eq!(session.pop_flash().as_deref(), Some("saved"));
        assert_eq!(session.pop_flash(), None);
        assert_eq!(session.pop_error().as_deref(), Some("failed"));
        assert_eq!(session.pop_warning(), None);
    }

    #[test]
    fn test_clear_draft_empties_slot() {
        let session = Session::new(SessionData::default());
        assert!(session.draft().is_none());
        session.put_draft(ReservationDraft::new(d("2050-01-01"), d("2050-01-02")));
        session.clear_draft();
        assert!(session.draft().is_none());
    }

    #[test]
    fn test_block_maps_belong_to_one_month() {
        let session = Session::new(SessionData::default());
        assert!(session.block_maps_for((2050, 1)).is_none());

        let mut january = BlockMap::new();
        january.insert(d("2050-01-05"), 11);
        session.put_block_maps((2050, 1), HashMap::from([(1, january)]));

        let mut february = BlockMap::new();
        february.insert(d("2050-02-07"), 12);
        session.put_block_maps((2050, 2), HashMap::from([(2, february)]));

        assert!(session.block_maps_for((2050, 1)).is_none());
        let maps = session.block_maps_for((2050, 2)).unwrap();
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[&2][&d("2050-02-07")], 12);
    }

    #[test]
    fn test_reads_do_not_mark_dirty() {
        let session = Session::new(SessionData::default());
        let _ = session.draft();
        let _ = session.user_id();
        let (_, dirty, renew) = session.finish();
        assert!(!dirty);
        assert!(!renew);
    }

    #[test]
    fn test_login_and_logout_renew_token() {
        let session = Session::new(SessionData::default());
        session.login(7);
        assert!(session.is_authenticated());
        let (_, _, renew) = session.finish();
        assert!(renew);

        session.put_draft(ReservationDraft::new(d("2050-01-01"), d("2050-01-02")));
        session.logout();
        let (data, dirty, renew) = session.finish();
        assert!(data.is_empty());
        assert!(dirty && renew);
    }

    #[test]
    fn test_session_data_json_with_block_maps() {
        let mut data = SessionData::default();
        let mut map = BlockMap::new();
        map.insert(d("2050-03-10"), 42);
        data.block_maps.insert(1, map);
        data.block_month = Some((2050, 3));
        data.reservation = Some(ReservationDraft::new(d("2050-01-01"), d("2050-01-02")));

        let json = serde_json::to_string(&data).unwrap();
        let back: SessionData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_missing_fields_default() {
        let data: SessionData = serde_json::from_str("{}").unwrap();
        assert!(data.is_empty());
    }
}
