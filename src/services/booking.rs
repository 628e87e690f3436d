use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::AppError;
use crate::forms::Form;
use crate::models::{
    is_storable_date, DraftStage, GuestDetails, MailData, NewReservation, NewRestriction,
    ReservationDraft, RestrictionKind, Room, DATE_FORMAT,
};
use crate::services::mail::MailQueue;
use crate::session::Session;
use crate::store::AvailabilityStore;

pub const MIN_FIRST_NAME_LEN: usize = 3;

/// How a confirmed draft is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Availability re-check and both inserts as one atomic unit.
    Transactional,
    /// Availability check, then reservation insert, then restriction insert,
    /// each a separate round trip. Concurrent bookings can both succeed.
    TwoStep,
}

impl CommitMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transactional" => Some(CommitMode::Transactional),
            "two-step" | "two_step" | "twostep" => Some(CommitMode::TwoStep),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitMode::Transactional => "transactional",
            CommitMode::TwoStep => "two-step",
        }
    }
}

pub fn parse_date(value: &str, which: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .ok()
        .filter(|date| is_storable_date(*date))
        .ok_or_else(|| AppError::Parse(format!("can't parse {which} date")))
}

/// Parses a `YYYY-MM-DD` pair; the end must fall strictly after the start.
pub fn parse_date_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = parse_date(start, "start")?;
    let end = parse_date(end, "end")?;
    if end <= start {
        return Err(AppError::Parse(
            "end date must be after start date".to_string(),
        ));
    }
    Ok((start, end))
}

pub fn parse_id(value: &str) -> Result<i64, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Parse("invalid id".to_string()))
}

/// Field rules shared by the public reservation form and the admin edit form.
pub fn validate_guest(form: &mut Form) -> bool {
    form.required(&["first_name", "last_name", "email"]);
    form.min_length("first_name", MIN_FIRST_NAME_LEN);
    form.is_email("email");
    form.valid()
}

pub fn guest_from_form(form: &Form) -> GuestDetails {
    GuestDetails {
        first_name: form.get("first_name").to_string(),
        last_name: form.get("last_name").to_string(),
        email: form.get("email").to_string(),
        phone: form.get("phone").to_string(),
    }
    .trimmed()
}

pub enum DetailsOutcome {
    /// Validation failed; nothing was written.
    Invalid { draft: ReservationDraft, form: Form },
    Committed {
        reservation_id: i64,
        draft: ReservationDraft,
    },
}

/// Drives a visitor's draft from date search to committed reservation.
pub struct BookingWorkflow {
    store: Arc<dyn AvailabilityStore>,
    mail: MailQueue,
    mode: CommitMode,
    mail_from: String,
    owner_email: String,
}

impl BookingWorkflow {
    pub fn new(
        store: Arc<dyn AvailabilityStore>,
        mail: MailQueue,
        mode: CommitMode,
        mail_from: String,
        owner_email: String,
    ) -> Self {
        Self {
            store,
            mail,
            mode,
            mail_from,
            owner_email,
        }
    }

    pub fn mode(&self) -> CommitMode {
        self.mode
    }

    /// Returns the free rooms. A non-empty result starts a fresh draft for
    /// the searched dates; an empty one leaves the session untouched.
    pub async fn search(
        &self,
        session: &Session,
        start: &str,
        end: &str,
    ) -> Result<Vec<Room>, AppError> {
        let (start, end) = parse_date_range(start, end)?;
        let rooms = self.store.search_available_rooms(start, end).await?;
        if !rooms.is_empty() {
            session.put_draft(ReservationDraft::new(start, end));
        }
        Ok(rooms)
    }

    pub async fn room_available(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        room_id: i64,
    ) -> Result<bool, AppError> {
        Ok(self.store.is_room_available(start, end, room_id).await?)
    }

    pub async fn choose_room(
        &self,
        session: &Session,
        room_id: i64,
    ) -> Result<ReservationDraft, AppError> {
        let draft = session.draft().ok_or(AppError::MissingDraft)?;
        let room = self.store.get_room(room_id).await?;
        let draft = draft.with_room(room.id, room.name);
        session.put_draft(draft.clone());
        Ok(draft)
    }

    /// Shortcut from a room page: builds a draft with dates and room set.
    pub async fn book_room(
        &self,
        session: &Session,
        room_id: &str,
        start: &str,
        end: &str,
    ) -> Result<ReservationDraft, AppError> {
        let room_id = parse_id(room_id)?;
        let (start, end) = parse_date_range(start, end)?;
        let room = self.store.get_room(room_id).await?;
        let draft = ReservationDraft::new(start, end).with_room(room.id, room.name);
        session.put_draft(draft.clone());
        Ok(draft)
    }

    /// The draft the details form works on: a room must be chosen and the
    /// draft must not be committed yet.
    pub fn details_draft(&self, session: &Session) -> Result<ReservationDraft, AppError> {
        session
            .draft()
            .filter(|d| d.room_id.is_some() && d.stage < DraftStage::Committed)
            .ok_or(AppError::MissingDraft)
    }

    pub async fn submit_details(
        &self,
        session: &Session,
        mut form: Form,
    ) -> Result<DetailsOutcome, AppError> {
        let draft = self
            .details_draft(session)?
            .with_guest(guest_from_form(&form));

        if !validate_guest(&mut form) {
            return Ok(DetailsOutcome::Invalid { draft, form });
        }

        let draft = draft.with_stage(DraftStage::DetailsEntered);
        session.put_draft(draft.clone());

        let reservation_id = self.commit(&draft).await?;

        let draft = draft.with_stage(DraftStage::Committed);
        session.put_draft(draft.clone());
        self.notify(&draft);

        Ok(DetailsOutcome::Committed {
            reservation_id,
            draft,
        })
    }

    pub async fn commit(&self, draft: &ReservationDraft) -> Result<i64, AppError> {
        let res = draft.to_new_reservation().ok_or(AppError::MissingDraft)?;
        match self.mode {
            CommitMode::Transactional => {
                let id = self.store.commit_reservation(&res).await?;
                tracing::info!(reservation_id = id, room_id = res.room_id, "reservation committed");
                Ok(id)
            }
            CommitMode::TwoStep => self.commit_two_step(&res).await,
        }
    }

    async fn commit_two_step(&self, res: &NewReservation) -> Result<i64, AppError> {
        if !self
            .store
            .is_room_available(res.start_date, res.end_date, res.room_id)
            .await?
        {
            return Err(AppError::Unavailable {
                room_id: res.room_id,
            });
        }

        let reservation_id = self.store.create_reservation(res).await?;

        let restriction = NewRestriction {
            room_id: res.room_id,
            reservation_id: Some(reservation_id),
            kind: RestrictionKind::Reservation,
            start_date: res.start_date,
            end_date: res.end_date,
        };
        if let Err(e) = self.store.create_room_restriction(&restriction).await {
            tracing::error!(
                reservation_id,
                room_id = res.room_id,
                start_date = %res.start_date,
                end_date = %res.end_date,
                error = %e,
                "orphaned reservation: room restriction insert failed"
            );
            return Err(AppError::Orphaned { reservation_id });
        }

        tracing::info!(reservation_id, room_id = res.room_id, "reservation committed (two-step)");
        Ok(reservation_id)
    }

    /// Queues the guest confirmation and the owner notification.
    fn notify(&self, draft: &ReservationDraft) {
        let start = draft.start_date.format(DATE_FORMAT);
        let end = draft.end_date.format(DATE_FORMAT);

        self.mail.enqueue(MailData {
            to: draft.guest.email.clone(),
            from: self.mail_from.clone(),
            subject: "Reservation confirmation".to_string(),
            content: format!(
                "<strong>Reservation confirmation</strong><br>Dear {}, this is a confirmation \
                 for your reservation from {start} to {end} for the {} room.",
                draft.guest.first_name, draft.room_name
            ),
            template: Some("basic.html".to_string()),
        });

        self.mail.enqueue(MailData {
            to: self.owner_email.clone(),
            from: self.mail_from.clone(),
            subject: "New reservation".to_string(),
            content: format!(
                "<strong>New reservation</strong><br>A reservation has been made from \
                 {start} to {end} for the {} room.",
                draft.room_name
            ),
            template: None,
        });
    }

    /// Reads and clears a committed draft. Anything else is a missing draft.
    pub fn summary(&self, session: &Session) -> Result<ReservationDraft, AppError> {
        match session.draft() {
            Some(draft) if draft.stage == DraftStage::Committed => {
                session.clear_draft();
                Ok(draft)
            }
            _ => Err(AppError::MissingDraft),
        }
    }
}
