pub mod memory;
pub mod sqlite;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{
    GuestDetails, NewReservation, NewRestriction, NewUser, Reservation, ReservationFilter, Room,
    RoomRestriction,
};

pub use memory::{FaultPlan, MemoryStore};
pub use sqlite::SqliteStore;

/// Fixed per-query timeout applied by the relational store.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("invalid credentials")]
    Auth,

    #[error("room {room_id} is not available for the requested dates")]
    Unavailable { room_id: i64 },
}

impl StoreError {
    pub fn query(e: impl std::fmt::Display) -> Self {
        StoreError::Query(e.to_string())
    }

    pub fn persistence(e: impl std::fmt::Display) -> Self {
        StoreError::Persistence(e.to_string())
    }
}

/// Room, reservation, and restriction persistence plus the overlap queries.
///
/// Every date range is half-open: `[start, end)` where `end` is the checkout
/// day. Admin mutations (`mark_processed`, `delete_reservation`,
/// `delete_owner_block`) succeed as no-ops when the target is already in the
/// requested state or gone.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn search_available_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Room>, StoreError>;

    async fn is_room_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        room_id: i64,
    ) -> Result<bool, StoreError>;

    async fn get_room(&self, id: i64) -> Result<Room, StoreError>;

    async fn all_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// Inserts the reservation row only. Does not check availability.
    async fn create_reservation(&self, res: &NewReservation) -> Result<i64, StoreError>;

    async fn create_room_restriction(&self, r: &NewRestriction) -> Result<i64, StoreError>;

    /// Re-checks availability, then inserts the reservation and its
    /// restriction as one atomic unit. Fails with `Unavailable` on conflict.
    async fn commit_reservation(&self, res: &NewReservation) -> Result<i64, StoreError>;

    async fn get_reservation(&self, id: i64) -> Result<Reservation, StoreError>;

    /// Joined with the room name, ordered by start date descending.
    async fn list_reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, StoreError>;

    async fn update_reservation(&self, id: i64, guest: &GuestDetails) -> Result<(), StoreError>;

    async fn mark_processed(&self, id: i64) -> Result<(), StoreError>;

    async fn delete_reservation(&self, id: i64) -> Result<(), StoreError>;

    async fn restrictions_for_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RoomRestriction>, StoreError>;

    async fn all_restrictions(&self) -> Result<Vec<RoomRestriction>, StoreError>;

    async fn delete_owner_block(&self, id: i64) -> Result<(), StoreError>;

    async fn orphaned_reservations(&self) -> Result<Vec<Reservation>, StoreError>;

    async fn create_user(&self, user: &NewUser) -> Result<i64, StoreError>;

    async fn user_exists(&self, email: &str) -> Result<bool, StoreError>;

    /// Same error for an unknown email and a wrong password.
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, StoreError>;
}
