use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Months, NaiveDate, Utc};

use crate::errors::AppError;
use crate::forms::Form;
use crate::models::{is_storable_date, NewRestriction, Room, RoomRestriction, DATE_FORMAT};
use crate::session::BlockMap;
use crate::store::{AvailabilityStore, StoreError};

/// One calendar month, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    first: NaiveDate,
}

impl MonthView {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .filter(|first| is_storable_date(*first))
            .map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    /// Reads the optional `y` / `m` query parameters. Missing values mean the
    /// current month; malformed ones are a parse error.
    pub fn from_query(year: Option<&str>, month: Option<&str>) -> Result<Self, AppError> {
        let (year, month) = match (year.filter(|s| !s.is_empty()), month.filter(|s| !s.is_empty())) {
            (None, None) => return Ok(Self::current()),
            (Some(y), Some(m)) => (y, m),
            _ => return Err(AppError::Parse("both year and month are required".to_string())),
        };
        let year: i32 = year
            .trim()
            .parse()
            .map_err(|_| AppError::Parse("invalid calendar year".to_string()))?;
        let month: u32 = month
            .trim()
            .parse()
            .map_err(|_| AppError::Parse("invalid calendar month".to_string()))?;
        Self::new(year, month).ok_or_else(|| AppError::Parse("invalid calendar month".to_string()))
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first.pred_opt().unwrap_or(self.first)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day();
        self.first.iter_days().take_while(move |d| *d <= last)
    }

    pub fn next(&self) -> Self {
        Self {
            first: self
                .first
                .checked_add_months(Months::new(1))
                .filter(|d| is_storable_date(*d))
                .unwrap_or(self.first),
        }
    }

    pub fn prev(&self) -> Self {
        Self {
            first: self
                .first
                .checked_sub_months(Months::new(1))
                .filter(|d| is_storable_date(*d))
                .unwrap_or(self.first),
        }
    }

    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

/// Occupancy of one room for one month. Every day of the month has an entry
/// in both maps; zero means free.
#[derive(Debug, Clone)]
pub struct RoomCalendar {
    pub room: Room,
    pub reservations: BTreeMap<NaiveDate, i64>,
    pub blocks: BTreeMap<NaiveDate, i64>,
}

impl RoomCalendar {
    /// Non-zero block entries, as stashed in the session for the save diff.
    pub fn block_map(&self) -> BlockMap {
        self.blocks
            .iter()
            .filter(|(_, id)| **id > 0)
            .map(|(d, id)| (*d, *id))
            .collect()
    }
}

pub fn build_room_calendar(
    room: Room,
    view: &MonthView,
    restrictions: &[RoomRestriction],
) -> RoomCalendar {
    let mut reservations: BTreeMap<NaiveDate, i64> = view.days().map(|d| (d, 0)).collect();
    let mut blocks: BTreeMap<NaiveDate, i64> = view.days().map(|d| (d, 0)).collect();

    for r in restrictions.iter().filter(|r| r.room_id == room.id) {
        match r.reservation_id {
            Some(reservation_id) => {
                // inclusive of the checkout day
                for day in r.start_date.iter_days().take_while(|d| *d <= r.end_date) {
                    if let Some(slot) = reservations.get_mut(&day) {
                        *slot = reservation_id;
                    }
                }
            }
            None => {
                if let Some(slot) = blocks.get_mut(&r.start_date) {
                    *slot = r.id;
                }
            }
        }
    }

    RoomCalendar {
        room,
        reservations,
        blocks,
    }
}

pub async fn load_calendar(
    store: &dyn AvailabilityStore,
    view: &MonthView,
) -> Result<Vec<RoomCalendar>, StoreError> {
    let window_end = view.next().first_day();
    let mut calendars = Vec::new();
    for room in store.all_rooms().await? {
        let restrictions = store
            .restrictions_for_room(room.id, view.first_day(), window_end)
            .await?;
        calendars.push(build_room_calendar(room, view, &restrictions));
    }
    Ok(calendars)
}

#[derive(Debug, Default, PartialEq)]
pub struct BlockChanges {
    /// Restriction ids of owner blocks the operator unchecked.
    pub remove: Vec<i64>,
    /// (room id, night) pairs newly checked.
    pub add: Vec<(i64, NaiveDate)>,
}

impl BlockChanges {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Compares the block maps shown to the operator with the posted form.
/// A shown block whose `remove_block_<room>_<date>` box is absent is removed;
/// every `add_block_<room>_<date>` box present is added.
pub fn diff_blocks(
    shown: &HashMap<i64, BlockMap>,
    form: &Form,
) -> Result<BlockChanges, AppError> {
    let mut changes = BlockChanges::default();

    for (room_id, map) in shown {
        for (day, restriction_id) in map {
            if *restriction_id <= 0 {
                continue;
            }
            let field = format!("remove_block_{room_id}_{}", day.format(DATE_FORMAT));
            if !form.has(&field) {
                changes.remove.push(*restriction_id);
            }
        }
    }

    for key in form.keys() {
        let Some(rest) = key.strip_prefix("add_block_") else {
            continue;
        };
        if !form.has(key) {
            continue;
        }
        let (room_id, day) = rest
            .split_once('_')
            .ok_or_else(|| AppError::Parse(format!("malformed block field {key}")))?;
        let room_id: i64 = room_id
            .parse()
            .map_err(|_| AppError::Parse(format!("malformed block field {key}")))?;
        let day = NaiveDate::parse_from_str(day, DATE_FORMAT)
            .ok()
            .filter(|d| is_storable_date(*d))
            .ok_or_else(|| AppError::Parse(format!("malformed block field {key}")))?;
        changes.add.push((room_id, day));
    }

    changes.remove.sort_unstable();
    changes.add.sort_unstable();
    Ok(changes)
}

#[derive(Debug, Default, PartialEq)]
pub struct BlockOutcome {
    pub removed: usize,
    pub added: usize,
    /// Requested nights that were already taken and left alone.
    pub skipped: Vec<(i64, NaiveDate)>,
}

/// Applies a diff. A new block on a night that is already restricted is
/// skipped rather than stacked on top.
pub async fn apply_block_changes(
    store: &dyn AvailabilityStore,
    changes: &BlockChanges,
) -> Result<BlockOutcome, StoreError> {
    let mut outcome = BlockOutcome::default();

    for id in &changes.remove {
        store.delete_owner_block(*id).await?;
        outcome.removed += 1;
    }

    for (room_id, day) in &changes.add {
        let block = NewRestriction::owner_block(*room_id, *day);
        if !store
            .is_room_available(block.start_date, block.end_date, *room_id)
            .await?
        {
            tracing::warn!(room_id, date = %day, "night already restricted, block skipped");
            outcome.skipped.push((*room_id, *day));
            continue;
        }
        store.create_room_restriction(&block).await?;
        outcome.added += 1;
    }

    Ok(outcome)
}
