use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub id: i64,
    pub room_id: i64,
    pub room_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub processed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationFilter {
    All,
    Unprocessed,
}

/// Guest-supplied fields, as posted by the reservation form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GuestDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl GuestDetails {
    pub fn trimmed(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

/// Progress of a draft through the booking flow. An absent draft is the
/// empty state; a summarized draft is removed from the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DraftStage {
    SearchedDates,
    RoomChosen,
    DetailsEntered,
    Committed,
}

/// Session-held, unpersisted reservation. Replaced wholesale on every step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationDraft {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: Option<i64>,
    #[serde(default)]
    pub room_name: String,
    #[serde(default)]
    pub guest: GuestDetails,
    pub stage: DraftStage,
}

impl ReservationDraft {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            room_id: None,
            room_name: String::new(),
            guest: GuestDetails::default(),
            stage: DraftStage::SearchedDates,
        }
    }

    pub fn with_room(self, room_id: i64, room_name: String) -> Self {
        Self {
            room_id: Some(room_id),
            room_name,
            stage: DraftStage::RoomChosen,
            ..self
        }
    }

    pub fn with_guest(self, guest: GuestDetails) -> Self {
        Self { guest, ..self }
    }

    pub fn with_stage(self, stage: DraftStage) -> Self {
        Self { stage, ..self }
    }

    pub fn to_new_reservation(&self) -> Option<NewReservation> {
        let room_id = self.room_id?;
        Some(NewReservation {
            room_id,
            first_name: self.guest.first_name.clone(),
            last_name: self.guest.last_name.clone(),
            email: self.guest.email.clone(),
            phone: self.guest.phone.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub room_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_new_draft_has_no_room() {
        let draft = ReservationDraft::new(d("2050-01-01"), d("2050-01-03"));
        assert_eq!(draft.stage, DraftStage::SearchedDates);
        assert!(draft.to_new_reservation().is_none());
    }

    #[test]
    fn test_draft_with_room_and_guest_converts() {
        let draft = ReservationDraft::new(d("2050-01-01"), d("2050-01-03"))
            .with_room(2, "Major's Suite".to_string())
            .with_guest(GuestDetails {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: String::new(),
            });
        assert_eq!(draft.stage, DraftStage::RoomChosen);

        let res = draft.to_new_reservation().unwrap();
        assert_eq!(res.room_id, 2);
        assert_eq!(res.first_name, "Ada");
        assert_eq!(res.start_date, d("2050-01-01"));
        assert_eq!(res.end_date, d("2050-01-03"));
    }

    #[test]
    fn test_stage_ordering_follows_flow() {
        assert!(DraftStage::SearchedDates < DraftStage::RoomChosen);
        assert!(DraftStage::RoomChosen < DraftStage::DetailsEntered);
        assert!(DraftStage::DetailsEntered < DraftStage::Committed);
    }

    #[test]
    fn test_draft_survives_json() {
        let draft = ReservationDraft::new(d("2050-01-01"), d("2050-01-03")).with_room(1, "A".into());
        let json = serde_json::to_string(&draft).unwrap();
        assert!(json.contains("\"stage\":\"room_chosen\""));
        let back: ReservationDraft = serde_json::from_str(&json).unwrap();
        assert_eq!(back, draft);
    }
}
