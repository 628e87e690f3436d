use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Why a span of nights is blocked on a room. Stored as `restriction_id`
/// referencing the `restrictions` lookup table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RestrictionKind {
    Reservation,
    OwnerBlock,
}

impl RestrictionKind {
    pub fn as_id(&self) -> i64 {
        match self {
            RestrictionKind::Reservation => 1,
            RestrictionKind::OwnerBlock => 2,
        }
    }

    pub fn from_id(id: i64) -> Self {
        match id {
            1 => RestrictionKind::Reservation,
            _ => RestrictionKind::OwnerBlock,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomRestriction {
    pub id: i64,
    pub room_id: i64,
    pub reservation_id: Option<i64>,
    pub kind: RestrictionKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRestriction {
    pub room_id: i64,
    pub reservation_id: Option<i64>,
    pub kind: RestrictionKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewRestriction {
    /// A manual block covering the single night starting at `date`.
    pub fn owner_block(room_id: i64, date: NaiveDate) -> Self {
        Self {
            room_id,
            reservation_id: None,
            kind: RestrictionKind::OwnerBlock,
            start_date: date,
            end_date: date.succ_opt().unwrap_or(date),
        }
    }
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// conflict iff `a_start < b_end && a_end > b_start`.
pub fn overlaps(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start < b_end && a_end > b_start
}

/// Returns every pair of restriction ids on the same room whose spans overlap.
pub fn find_overlaps(restrictions: &[RoomRestriction]) -> Vec<(i64, i64)> {
    let mut sorted: Vec<&RoomRestriction> = restrictions.iter().collect();
    sorted.sort_by_key(|r| (r.room_id, r.start_date, r.id));

    let mut pairs = Vec::new();
    for (i, a) in sorted.iter().enumerate() {
        for b in &sorted[i + 1..] {
            if b.room_id != a.room_id || b.start_date >= a.end_date {
                break;
            }
            if overlaps(a.start_date, a.end_date, b.start_date, b.end_date) {
                pairs.push((a.id, b.id));
            }
        }
    }
    pairs
}
