use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{
    GuestDetails, NewReservation, NewRestriction, NewUser, Reservation, ReservationFilter,
    RestrictionKind, Room, RoomRestriction, User, DATE_FORMAT, TIMESTAMP_FORMAT,
};

// ── Column helpers ──

fn date_param(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn timestamp_param(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn now_param() -> String {
    timestamp_param(Utc::now().naive_utc())
}

fn date_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ── Rooms ──

const ROOM_COLUMNS: &str = "r.id, r.room_name, r.created_at, r.updated_at";

fn parse_room_row(row: &Row) -> rusqlite::Result<Room> {
    Ok(Room {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: timestamp_column(row, 2)?,
        updated_at: timestamp_column(row, 3)?,
    })
}

pub fn all_rooms(conn: &Connection) -> rusqlite::Result<Vec<Room>> {
    let mut stmt = conn.prepare(&format!("SELECT {ROOM_COLUMNS} FROM rooms r ORDER BY r.id"))?;
    let rows = stmt.query_map([], parse_room_row)?;
    rows.collect()
}

pub fn get_room(conn: &Connection, id: i64) -> rusqlite::Result<Option<Room>> {
    conn.query_row(
        &format!("SELECT {ROOM_COLUMNS} FROM rooms r WHERE r.id = ?1"),
        params![id],
        parse_room_row,
    )
    .optional()
}

/// All rooms minus the rooms holding a restriction that overlaps `[start, end)`.
pub fn search_available_rooms(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> rusqlite::Result<Vec<Room>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ROOM_COLUMNS} FROM rooms r
         WHERE r.id NOT IN (
             SELECT rr.room_id FROM room_restrictions rr
             WHERE ?1 < rr.end_date AND ?2 > rr.start_date
         )
         ORDER BY r.id"
    ))?;
    let rows = stmt.query_map(params![date_param(start), date_param(end)], parse_room_row)?;
    rows.collect()
}

pub fn count_overlapping_restrictions(
    conn: &Connection,
    room_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(id) FROM room_restrictions
         WHERE room_id = ?1 AND ?2 < end_date AND ?3 > start_date",
        params![room_id, date_param(start), date_param(end)],
        |row| row.get(0),
    )
}

// ── Reservations ──

const RESERVATION_COLUMNS: &str = "res.id, res.room_id, COALESCE(rm.room_name, ''), res.first_name, res.last_name, \
     res.email, res.phone, res.start_date, res.end_date, res.processed, res.created_at, res.updated_at";

fn parse_reservation_row(row: &Row) -> rusqlite::Result<Reservation> {
    Ok(Reservation {
        id: row.get(0)?,
        room_id: row.get(1)?,
        room_name: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        start_date: date_column(row, 7)?,
        end_date: date_column(row, 8)?,
        processed: row.get::<_, i32>(9)? != 0,
        created_at: timestamp_column(row, 10)?,
        updated_at: timestamp_column(row, 11)?,
    })
}

pub fn insert_reservation(conn: &Connection, res: &NewReservation) -> rusqlite::Result<i64> {
    let now = now_param();
    conn.execute(
        "INSERT INTO reservations (first_name, last_name, email, phone, start_date, end_date, room_id, processed, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
        params![
            res.first_name,
            res.last_name,
            res.email,
            res.phone,
            date_param(res.start_date),
            date_param(res.end_date),
            res.room_id,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_reservation(conn: &Connection, id: i64) -> rusqlite::Result<Option<Reservation>> {
    conn.query_row(
        &format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations res
             LEFT JOIN rooms rm ON res.room_id = rm.id
             WHERE res.id = ?1"
        ),
        params![id],
        parse_reservation_row,
    )
    .optional()
}

pub fn list_reservations(
    conn: &Connection,
    filter: ReservationFilter,
) -> rusqlite::Result<Vec<Reservation>> {
    let where_clause = match filter {
        ReservationFilter::All => "",
        ReservationFilter::Unprocessed => "WHERE res.processed = 0",
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations res
         LEFT JOIN rooms rm ON res.room_id = rm.id
         {where_clause}
         ORDER BY res.start_date DESC, res.id DESC"
    ))?;
    let rows = stmt.query_map([], parse_reservation_row)?;
    rows.collect()
}

pub fn update_reservation(
    conn: &Connection,
    id: i64,
    guest: &GuestDetails,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE reservations SET first_name = ?1, last_name = ?2, email = ?3, phone = ?4, updated_at = ?5
         WHERE id = ?6",
        params![
            guest.first_name,
            guest.last_name,
            guest.email,
            guest.phone,
            now_param(),
            id
        ],
    )
}

/// Only touches rows not yet processed, so a repeated call changes nothing.
pub fn mark_processed(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE reservations SET processed = 1, updated_at = ?1 WHERE id = ?2 AND processed = 0",
        params![now_param(), id],
    )
}

pub fn delete_reservation(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM room_restrictions WHERE reservation_id = ?1",
        params![id],
    )?;
    conn.execute("DELETE FROM reservations WHERE id = ?1", params![id])
}

pub fn orphaned_reservations(conn: &Connection) -> rusqlite::Result<Vec<Reservation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations res
         LEFT JOIN rooms rm ON res.room_id = rm.id
         WHERE NOT EXISTS (
             SELECT 1 FROM room_restrictions rr WHERE rr.reservation_id = res.id
         )
         ORDER BY res.id"
    ))?;
    let rows = stmt.query_map([], parse_reservation_row)?;
    rows.collect()
}

// ── Room restrictions ──

const RESTRICTION_COLUMNS: &str =
    "id, room_id, reservation_id, restriction_id, start_date, end_date, created_at, updated_at";

fn parse_restriction_row(row: &Row) -> rusqlite::Result<RoomRestriction> {
    Ok(RoomRestriction {
        id: row.get(0)?,
        room_id: row.get(1)?,
        reservation_id: row.get(2)?,
        kind: RestrictionKind::from_id(row.get(3)?),
        start_date: date_column(row, 4)?,
        end_date: date_column(row, 5)?,
        created_at: timestamp_column(row, 6)?,
        updated_at: timestamp_column(row, 7)?,
    })
}

pub fn insert_room_restriction(conn: &Connection, r: &NewRestriction) -> rusqlite::Result<i64> {
    let now = now_param();
    conn.execute(
        "INSERT INTO room_restrictions (start_date, end_date, room_id, reservation_id, restriction_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            date_param(r.start_date),
            date_param(r.end_date),
            r.room_id,
            r.reservation_id,
            r.kind.as_id(),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Restrictions on `room_id` touching any night in `[start, end)`.
pub fn restrictions_for_room(
    conn: &Connection,
    room_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> rusqlite::Result<Vec<RoomRestriction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESTRICTION_COLUMNS} FROM room_restrictions
         WHERE room_id = ?1 AND ?2 < end_date AND ?3 > start_date
         ORDER BY start_date"
    ))?;
    let rows = stmt.query_map(
        params![room_id, date_param(start), date_param(end)],
        parse_restriction_row,
    )?;
    rows.collect()
}

pub fn all_restrictions(conn: &Connection) -> rusqlite::Result<Vec<RoomRestriction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESTRICTION_COLUMNS} FROM room_restrictions ORDER BY room_id, start_date"
    ))?;
    let rows = stmt.query_map([], parse_restriction_row)?;
    rows.collect()
}

/// Deletes a manual block. Restrictions linked to a reservation are left alone.
pub fn delete_owner_block(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM room_restrictions WHERE id = ?1 AND reservation_id IS NULL",
        params![id],
    )
}

// ── Users ──

pub fn insert_user(conn: &Connection, user: &NewUser) -> rusqlite::Result<i64> {
    let now = now_param();
    conn.execute(
        "INSERT INTO users (first_name, last_name, email, password_hash, access_level, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            user.first_name,
            user.last_name,
            user.email,
            user.password_hash,
            user.access_level,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, first_name, last_name, email, password_hash, access_level, created_at, updated_at
         FROM users WHERE email = ?1",
        params![email],
        |row| {
            Ok(User {
                id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                email: row.get(3)?,
                password_hash: row.get(4)?,
                access_level: row.get(5)?,
                created_at: timestamp_column(row, 6)?,
                updated_at: timestamp_column(row, 7)?,
            })
        },
    )
    .optional()
}

// ── Sessions ──

pub fn get_session(
    conn: &Connection,
    token: &str,
    now: NaiveDateTime,
) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT data FROM sessions WHERE token = ?1 AND expires_at > ?2",
        params![token, timestamp_param(now)],
        |row| row.get(0),
    )
    .optional()
}

pub fn save_session(
    conn: &Connection,
    token: &str,
    data: &str,
    expires_at: NaiveDateTime,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO sessions (token, data, expires_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(token) DO UPDATE SET data = excluded.data, expires_at = excluded.expires_at",
        params![token, data, timestamp_param(expires_at)],
    )?;
    Ok(())
}

pub fn delete_session(conn: &Connection, token: &str) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

pub fn expire_old_sessions(conn: &Connection, now: NaiveDateTime) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        params![timestamp_param(now)],
    )
}
