use chrono::{Datelike, NaiveDate};

pub mod mail;
pub mod reservation;
pub mod restriction;
pub mod room;
pub mod user;

pub use mail::MailData;
pub use reservation::{
    DraftStage, GuestDetails, NewReservation, Reservation, ReservationDraft, ReservationFilter,
};
pub use restriction::{find_overlaps, overlaps, NewRestriction, RestrictionKind, RoomRestriction};
pub use room::Room;
pub use user::{NewUser, User};

/// Textual date format used by forms, query strings, and the database.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format used for `created_at` / `updated_at` columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Dates are stored as `YYYY-MM-DD` text and compared as strings, which only
/// orders correctly for four-digit years.
pub fn is_storable_date(date: NaiveDate) -> bool {
    (1..=9999).contains(&date.year())
}
