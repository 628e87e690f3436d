use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{AvailabilityStore, StoreError};
use crate::models::{
    overlaps, GuestDetails, NewReservation, NewRestriction, NewUser, Reservation,
    ReservationFilter, RestrictionKind, Room, RoomRestriction, User,
};
use crate::services::auth::verify_login;

/// Failures the in-memory store injects on demand, so callers can exercise
/// their error paths without a broken database.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    pub fail_queries: bool,
    pub fail_reservation_for_room: Option<i64>,
    pub fail_restriction_for_room: Option<i64>,
}

#[derive(Default)]
struct Inner {
    rooms: BTreeMap<i64, Room>,
    reservations: BTreeMap<i64, Reservation>,
    restrictions: BTreeMap<i64, RoomRestriction>,
    users: BTreeMap<i64, User>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn room_is_free(&self, room_id: i64, start: NaiveDate, end: NaiveDate) -> bool {
        !self.restrictions.values().any(|r| {
            r.room_id == room_id && overlaps(start, end, r.start_date, r.end_date)
        })
    }

    fn insert_reservation(&mut self, res: &NewReservation) -> Result<i64, StoreError> {
        if res.start_date >= res.end_date {
            return Err(StoreError::Persistence(
                "start date must be before end date".to_string(),
            ));
        }
        let room_name = self
            .rooms
            .get(&res.room_id)
            .map(|r| r.name.clone())
            .ok_or_else(|| StoreError::Persistence(format!("unknown room {}", res.room_id)))?;

        let id = self.next_id();
        let now = Utc::now().naive_utc();
        self.reservations.insert(
            id,
            Reservation {
                id,
                room_id: res.room_id,
                room_name,
                first_name: res.first_name.clone(),
                last_name: res.last_name.clone(),
                email: res.email.clone(),
                phone: res.phone.clone(),
                start_date: res.start_date,
                end_date: res.end_date,
                processed: false,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    fn insert_restriction(&mut self, r: &NewRestriction) -> Result<i64, StoreError> {
        if !self.rooms.contains_key(&r.room_id) {
            return Err(StoreError::Persistence(format!("unknown room {}", r.room_id)));
        }
        let id = self.next_id();
        let now = Utc::now().naive_utc();
        self.restrictions.insert(
            id,
            RoomRestriction {
                id,
                room_id: r.room_id,
                reservation_id: r.reservation_id,
                kind: r.kind,
                start_date: r.start_date,
                end_date: r.end_date,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }
}

/// In-memory stand-in for the relational store. Holds the same invariants
/// and overlap semantics; one lock guards all state.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    faults: FaultPlan,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_faults(FaultPlan::default())
    }

    /// Seeded with the same two rooms as the SQL migrations.
    pub fn with_faults(faults: FaultPlan) -> Self {
        let now = Utc::now().naive_utc();
        let mut inner = Inner::default();
        for name in ["General's Quarters", "Major's Suite"] {
            let id = inner.next_id();
            inner.rooms.insert(
                id,
                Room {
                    id,
                    name: name.to_string(),
                    created_at: now,
                    updated_at: now,
                },
            );
        }
        Self {
            inner: Mutex::new(inner),
            faults,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_queries(&self) -> Result<(), StoreError> {
        if self.faults.fail_queries {
            return Err(StoreError::Query("injected query failure".to_string()));
        }
        Ok(())
    }

    fn check_reservation_fault(&self, room_id: i64) -> Result<(), StoreError> {
        if self.faults.fail_reservation_for_room == Some(room_id) {
            return Err(StoreError::Persistence(
                "injected reservation insert failure".to_string(),
            ));
        }
        Ok(())
    }

    fn check_restriction_fault(&self, room_id: i64) -> Result<(), StoreError> {
        if self.faults.fail_restriction_for_room == Some(room_id) {
            return Err(StoreError::Persistence(
                "injected restriction insert failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn search_available_rooms(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Room>, StoreError> {
        self.check_queries()?;
        let inner = self.lock();
        Ok(inner
            .rooms
            .values()
            .filter(|room| inner.room_is_free(room.id, start, end))
            .cloned()
            .collect())
    }

    async fn is_room_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        room_id: i64,
    ) -> Result<bool, StoreError> {
        self.check_queries()?;
        Ok(self.lock().room_is_free(room_id, start, end))
    }

    async fn get_room(&self, id: i64) -> Result<Room, StoreError> {
        self.check_queries()?;
        self.lock()
            .rooms
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "room", id })
    }

    async fn all_rooms(&self) -> Result<Vec<Room>, StoreError> {
        self.check_queries()?;
        Ok(self.lock().rooms.values().cloned().collect())
    }

    async fn create_reservation(&self, res: &NewReservation) -> Result<i64, StoreError> {
        self.check_reservation_fault(res.room_id)?;
        self.lock().insert_reservation(res)
    }

    async fn create_room_restriction(&self, r: &NewRestriction) -> Result<i64, StoreError> {
        self.check_restriction_fault(r.room_id)?;
        self.lock().insert_restriction(r)
    }

    async fn commit_reservation(&self, res: &NewReservation) -> Result<i64, StoreError> {
        self.check_reservation_fault(res.room_id)?;
        self.check_restriction_fault(res.room_id)?;

        let mut inner = self.lock();
        if !inner.room_is_free(res.room_id, res.start_date, res.end_date) {
            return Err(StoreError::Unavailable { room_id: res.room_id });
        }
        let reservation_id = inner.insert_reservation(res)?;
        inner.insert_restriction(&NewRestriction {
            room_id: res.room_id,
            reservation_id: Some(reservation_id),
            kind: RestrictionKind::Reservation,
            start_date: res.start_date,
            end_date: res.end_date,
        })?;
        Ok(reservation_id)
    }

    async fn get_reservation(&self, id: i64) -> Result<Reservation, StoreError> {
        self.check_queries()?;
        self.lock()
            .reservations
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "reservation", id })
    }

    async fn list_reservations(
        &self,
        filter: ReservationFilter,
    ) -> Result<Vec<Reservation>, StoreError> {
        self.check_queries()?;
        let mut list: Vec<Reservation> = self
            .lock()
            .reservations
            .values()
            .filter(|r| filter == ReservationFilter::All || !r.processed)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    async fn update_reservation(&self, id: i64, guest: &GuestDetails) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let res = inner
            .reservations
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "reservation", id })?;
        res.first_name = guest.first_name.clone();
        res.last_name = guest.last_name.clone();
        res.email = guest.email.clone();
        res.phone = guest.phone.clone();
        res.updated_at = Utc::now().naive_utc();
        Ok(())
    }

    async fn mark_processed(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(res) = inner.reservations.get_mut(&id) {
            if !res.processed {
                res.processed = true;
                res.updated_at = Utc::now().naive_utc();
            }
        }
        Ok(())
    }

    async fn delete_reservation(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.reservations.remove(&id);
        inner.restrictions.retain(|_, r| r.reservation_id != Some(id));
        Ok(())
    }

    async fn restrictions_for_room(
        &self,
        room_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RoomRestriction>, StoreError> {
        self.check_queries()?;
        let mut list: Vec<RoomRestriction> = self
            .lock()
            .restrictions
            .values()
            .filter(|r| r.room_id == room_id && overlaps(start, end, r.start_date, r.end_date))
            .cloned()
            .collect();
        list.sort_by_key(|r| r.start_date);
        Ok(list)
    }

    async fn all_restrictions(&self) -> Result<Vec<RoomRestriction>, StoreError> {
        self.check_queries()?;
        Ok(self.lock().restrictions.values().cloned().collect())
    }

    async fn delete_owner_block(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner
            .restrictions
            .get(&id)
            .is_some_and(|r| r.reservation_id.is_none())
        {
            inner.restrictions.remove(&id);
        }
        Ok(())
    }

    async fn orphaned_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        self.check_queries()?;
        let inner = self.lock();
        Ok(inner
            .reservations
            .values()
            .filter(|res| {
                !inner
                    .restrictions
                    .values()
                    .any(|r| r.reservation_id == Some(res.id))
            })
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: &NewUser) -> Result<i64, StoreError> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Persistence(format!(
                "user {} already exists",
                user.email
            )));
        }
        let id = inner.next_id();
        let now = Utc::now().naive_utc();
        inner.users.insert(
            id,
            User {
                id,
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
                access_level: user.access_level,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn user_exists(&self, email: &str) -> Result<bool, StoreError> {
        self.check_queries()?;
        Ok(self.lock().users.values().any(|u| u.email == email))
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, StoreError> {
        self.check_queries()?;
        let user = self
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned();

        let matches = verify_login(password, user.as_ref().map(|u| u.password_hash.as_str()));
        match user {
            Some(user) if matches => Ok(user.id),
            _ => Err(StoreError::Auth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_reservation(room_id: i64, start: &str, end: &str) -> NewReservation {
        NewReservation {
            room_id,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: String::new(),
            start_date: d(start),
            end_date: d(end),
        }
    }

    #[tokio::test]
    async fn test_search_is_set_difference() {
        let store = MemoryStore::new();
        store
            .commit_reservation(&new_reservation(1, "2050-01-01", "2050-01-02"))
            .await
            .unwrap();

        let rooms = store
            .search_available_rooms(d("2050-01-01"), d("2050-01-02"))
            .await
            .unwrap();
        assert_eq!(rooms.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn test_two_step_insert_does_not_check_availability() {
        let store = MemoryStore::new();
        for _ in 0..2 {
            let res = new_reservation(1, "2050-01-01", "2050-01-03");
            let id = store.create_reservation(&res).await.unwrap();
            store
                .create_room_restriction(&NewRestriction {
                    room_id: 1,
                    reservation_id: Some(id),
                    kind: RestrictionKind::Reservation,
                    start_date: res.start_date,
                    end_date: res.end_date,
                })
                .await
                .unwrap();
        }
        let all = store.all_restrictions().await.unwrap();
        assert_eq!(crate::models::find_overlaps(&all).len(), 1);
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let store = MemoryStore::with_faults(FaultPlan {
            fail_queries: true,
            fail_reservation_for_room: None,
            fail_restriction_for_room: Some(2),
        });
        assert!(matches!(
            store.search_available_rooms(d("2050-01-01"), d("2050-01-02")).await,
            Err(StoreError::Query(_))
        ));

        let id = store
            .create_reservation(&new_reservation(2, "2050-01-01", "2050-01-02"))
            .await
            .unwrap();
        let err = store
            .create_room_restriction(&NewRestriction {
                room_id: 2,
                reservation_id: Some(id),
                kind: RestrictionKind::Reservation,
                start_date: d("2050-01-01"),
                end_date: d("2050-01-02"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_delete_owner_block_ignores_reservation_rows() {
        let store = MemoryStore::new();
        store
            .commit_reservation(&new_reservation(1, "2050-01-01", "2050-01-02"))
            .await
            .unwrap();
        let linked = store.all_restrictions().await.unwrap()[0].id;
        store.delete_owner_block(linked).await.unwrap();
        assert_eq!(store.all_restrictions().await.unwrap().len(), 1);

        let block = store
            .create_room_restriction(&NewRestriction::owner_block(1, d("2050-01-10")))
            .await
            .unwrap();
        store.delete_owner_block(block).await.unwrap();
        assert_eq!(store.all_restrictions().await.unwrap().len(), 1);
    }
}
