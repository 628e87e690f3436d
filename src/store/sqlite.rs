use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};

use super::{AvailabilityStore, StoreError};
use crate::db::queries;
use crate::models::{
    GuestDetails, NewReservation, NewRestriction, NewUser, Reservation, ReservationFilter,
    RestrictionKind, Room, RoomRestriction,
};
use crate::services::auth::verify_login;

/// SQLite-backed store. Each call runs on the blocking pool under a fixed
/// timeout; a call that exceeds it surfaces as `StoreError::Timeout`. A call
/// that only gets the connection after its deadline is dropped unrun.
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
    timeout: Duration,
}

impl SqliteStore {
    pub fn new(db: Arc<Mutex<Connection>>, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let timeout = self.timeout;
        let deadline = Instant::now() + timeout;
        let task = tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|_| StoreError::Query("database lock poisoned".to_string()))?;
            // The caller has already been told this call timed out; running it
            // now would write behind its back.
            if Instant::now() >= deadline {
                return Err(StoreError::Timeout(timeout));
            }
            f(&mut conn)
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(StoreError::query(join_err)),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl AvailabilityStore for SqliteStore {
    async fn search_available_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Room>, StoreError> {
        self.run(move |conn| {
            queries::search_available_rooms(conn, start, end).map_err(StoreError::query)
        })
        .await
    }

    async fn is_room_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        room_id: i64,
    ) -> Result<bool, StoreError> {
        self.run(move |conn| {
            let count = queries::count_overlapping_restrictions(conn, room_id, start, end)
                .map_err(StoreError::query)?;
            Ok(count == 0)
        })
        .await
    }

    async fn get_room(&self, id: i64) -> Result<Room, StoreError> {
        self.run(move |conn| {
            queries::get_room(conn, id)
                .map_err(StoreError::query)?
                .ok_or(StoreError::NotFound { entity: "room", id })
        })
        .await
    }

    async fn all_rooms(&self) -> Result<Vec<Room>, StoreError> {
        self.run(|conn| queries::all_rooms(conn).map_err(StoreError::query))
            .await
    }

    async fn create_reservation(&self, res: &NewReservation) -> Result<i64, StoreError> {
        let res = res.clone();
        self.run(move |conn| {
            queries::insert_reservation(conn, &res).map_err(StoreError::persistence)
        })
        .await
    }

    async fn create_room_restriction(&self, r: &NewRestriction) -> Result<i64, StoreError> {
        let r = r.clone();
        self.run(move |conn| {
            queries::insert_room_restriction(conn, &r).map_err(StoreError::persistence)
        })
        .await
    }

    async fn commit_reservation(&self, res: &NewReservation) -> Result<i64, StoreError> {
        let res = res.clone();
        self.run(move |conn| {
            // IMMEDIATE takes the write lock up front so the overlap check and
            // both inserts see no interleaved writer.
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(StoreError::persistence)?;

            let conflicts =
                queries::count_overlapping_restrictions(&tx, res.room_id, res.start_date, res.end_date)
                    .map_err(StoreError::query)?;
            if conflicts > 0 {
                return Err(StoreError::Unavailable { room_id: res.room_id });
            }

            let reservation_id =
                queries::insert_reservation(&tx, &res).map_err(StoreError::persistence)?;
            queries::insert_room_restriction(
                &tx,
                &NewRestriction {
                    room_id: res.room_id,
                    reservation_id: Some(reservation_id),
                    kind: RestrictionKind::Reservation,
                    start_date: res.start_date,
                    end_date: res.end_date,
                },
            )
            .map_err(StoreError::persistence)?;

            tx.commit().map_err(StoreError::persistence)?;
            Ok(reservation_id)
        })
        .await
    }

    async fn get_reservation(&self, id: i64) -> Result<Reservation, StoreError> {
        self.run(move |conn| {
            queries::get_reservation(conn, id)
                .map_err(StoreError::query)?
                .ok_or(StoreError::NotFound { entity: "reservation", id })
        })
        .await
    }

    async fn list_reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, StoreError> {
        self.run(move |conn| queries::list_reservations(conn, filter).map_err(StoreError::query))
            .await
    }

    async fn update_reservation(&self, id: i64, guest: &GuestDetails) -> Result<(), StoreError> {
        let guest = guest.clone();
        self.run(move |conn| {
            let updated =
                queries::update_reservation(conn, id, &guest).map_err(StoreError::persistence)?;
            if updated == 0 {
                return Err(StoreError::NotFound { entity: "reservation", id });
            }
            Ok(())
        })
        .await
    }

    async fn mark_processed(&self, id: i64) -> Result<(), StoreError> {
        self.run(move |conn| {
            queries::mark_processed(conn, id).map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn delete_reservation(&self, id: i64) -> Result<(), StoreError> {
        self.run(move |conn| {
            let tx = conn.transaction().map_err(StoreError::persistence)?;
            queries::delete_reservation(&tx, id).map_err(StoreError::persistence)?;
            tx.commit().map_err(StoreError::persistence)
        })
        .await
    }

    async fn restrictions_for_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RoomRestriction>, StoreError> {
        self.run(move |conn| {
            queries::restrictions_for_room(conn, room_id, start, end).map_err(StoreError::query)
        })
        .await
    }

    async fn all_restrictions(&self) -> Result<Vec<RoomRestriction>, StoreError> {
        self.run(|conn| queries::all_restrictions(conn).map_err(StoreError::query))
            .await
    }

    async fn delete_owner_block(&self, id: i64) -> Result<(), StoreError> {
        self.run(move |conn| {
            queries::delete_owner_block(conn, id).map_err(StoreError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn orphaned_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        self.run(|conn| queries::orphaned_reservations(conn).map_err(StoreError::query))
            .await
    }

    async fn create_user(&self, user: &NewUser) -> Result<i64, StoreError> {
        let user = user.clone();
        self.run(move |conn| queries::insert_user(conn, &user).map_err(StoreError::persistence))
            .await
    }

    async fn user_exists(&self, email: &str) -> Result<bool, StoreError> {
        let email = email.to_string();
        self.run(move |conn| {
            let user = queries::get_user_by_email(conn, &email).map_err(StoreError::query)?;
            Ok(user.is_some())
        })
        .await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, StoreError> {
        let email = email.to_string();
        let user = self
            .run(move |conn| queries::get_user_by_email(conn, &email).map_err(StoreError::query))
            .await?;

        let password = password.to_string();
        let (user_id, hash) = match user {
            Some(user) => (Some(user.id), Some(user.password_hash)),
            None => (None, None),
        };
        let matches = tokio::task::spawn_blocking(move || verify_login(&password, hash.as_deref()))
            .await
            .map_err(StoreError::query)?;

        match user_id {
            Some(id) if matches => Ok(id),
            _ => Err(StoreError::Auth),
        }
    }
}
