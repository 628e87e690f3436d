use axum::response::Html;

use super::{escape, input, layout, TemplateData};
use crate::forms::FieldErrors;
use crate::models::{GuestDetails, Reservation, DATE_FORMAT};
use crate::services::calendar::{MonthView, RoomCalendar};
use crate::services::integrity::IntegrityReport;

fn admin_nav() -> &'static str {
    r#"<nav class="admin"><a href="/admin/dashboard">Dashboard</a> <a href="/admin/reservations_new">New Reservations</a> <a href="/admin/reservations_all">All Reservations</a> <a href="/admin/reservations_calendar">Reservation Calendar</a></nav>"#
}

pub fn dashboard(
    td: &TemplateData,
    new_count: usize,
    total_count: usize,
    report: &IntegrityReport,
) -> Html<String> {
    let integrity = if report.is_clean() {
        "<p>No inconsistencies found.</p>".to_string()
    } else {
        let orphans: String = report
            .orphans
            .iter()
            .map(|r| {
                format!(
                    r#"<li>Reservation <a href="/admin/reservations/all/{id}">{id}</a> (room {room}, {start} to {end}) has no room restriction</li>"#,
                    id = r.id,
                    room = r.room_id,
                    start = r.start_date.format(DATE_FORMAT),
                    end = r.end_date.format(DATE_FORMAT),
                )
            })
            .collect();
        let overlaps: String = report
            .overlaps
            .iter()
            .map(|(a, b)| format!("<li>Restrictions {a} and {b} overlap</li>"))
            .collect();
        format!(r#"<ul class="integrity">{orphans}{overlaps}</ul>"#)
    };

    layout(
        "Admin Dashboard",
        td,
        &format!(
            r#"{nav}
<h1>Dashboard</h1>
<p>New reservations: {new_count}</p>
<p>All reservations: {total_count}</p>
<h2>Integrity</h2>
{integrity}"#,
            nav = admin_nav(),
        ),
    )
}

/// `src` is `new` or `all`, and is carried into the detail links.
pub fn reservation_list(
    td: &TemplateData,
    title: &str,
    src: &str,
    reservations: &[Reservation],
) -> Html<String> {
    let rows: String = reservations
        .iter()
        .map(|r| {
            format!(
                r#"<tr><td>{id}</td><td><a href="/admin/reservations/{src}/{id}">{last}</a></td><td>{room}</td><td>{start}</td><td>{end}</td><td>{status}</td></tr>"#,
                id = r.id,
                src = escape(src),
                last = escape(&r.last_name),
                room = escape(&r.room_name),
                start = r.start_date.format(DATE_FORMAT),
                end = r.end_date.format(DATE_FORMAT),
                status = if r.processed { "processed" } else { "new" },
            )
        })
        .collect();

    layout(
        title,
        td,
        &format!(
            r#"{nav}
<h1>{title}</h1>
<table class="reservations">
<thead><tr><th>ID</th><th>Last Name</th><th>Room</th><th>Arrival</th><th>Departure</th><th>Status</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#,
            nav = admin_nav(),
            title = escape(title),
        ),
    )
}

/// Detail and edit form. `back` holds the `y`/`m` of the calendar month
/// when `src` is `cal`.
pub fn reservation_show(
    td: &TemplateData,
    res: &Reservation,
    src: &str,
    back: Option<(i32, u32)>,
    values: &GuestDetails,
    errors: &FieldErrors,
) -> Html<String> {
    let query = back
        .map(|(y, m)| format!("?y={y}&amp;m={m}"))
        .unwrap_or_default();
    let src = escape(src);
    let process = if res.processed {
        String::new()
    } else {
        format!(
            r#"<a class="btn" href="/admin/process_reservation/{src}/{id}{query}">Mark as Processed</a>"#,
            id = res.id
        )
    };

    layout(
        "Reservation",
        td,
        &format!(
            r#"{nav}
<h1>Reservation {id}</h1>
<p>Room: {room}<br>Arrival: {start}<br>Departure: {end}</p>
<form method="post" action="/admin/reservations/{src}/{id}{query}" novalidate>
{first}
{last}
{email}
{phone}
<button type="submit">Save</button>
</form>
{process}
<a class="btn btn-danger" href="/admin/delete_reservation/{src}/{id}{query}">Delete</a>"#,
            nav = admin_nav(),
            id = res.id,
            room = escape(&res.room_name),
            start = res.start_date.format(DATE_FORMAT),
            end = res.end_date.format(DATE_FORMAT),
            first = input("First Name", "first_name", "text", &values.first_name, errors),
            last = input("Last Name", "last_name", "text", &values.last_name, errors),
            email = input("Email", "email", "email", &values.email, errors),
            phone = input("Phone", "phone", "text", &values.phone, errors),
        ),
    )
}

/// One table per room. Reserved days link to the reservation; owner blocks
/// are checkboxes named `remove_block_<room>_<date>` (checked) or
/// `add_block_<room>_<date>` (unchecked).
pub fn calendar(td: &TemplateData, view: &MonthView, rooms: &[RoomCalendar]) -> Html<String> {
    let prev = view.prev();
    let next = view.next();

    let header: String = view.days().map(|d| format!("<th>{}</th>", d.format("%d"))).collect();

    let tables: String = rooms
        .iter()
        .map(|cal| {
            let cells: String = view
                .days()
                .map(|day| {
                    let date = day.format(DATE_FORMAT);
                    let room_id = cal.room.id;
                    let reservation = cal.reservations.get(&day).copied().unwrap_or(0);
                    let block = cal.blocks.get(&day).copied().unwrap_or(0);
                    if reservation > 0 {
                        format!(
                            r#"<td class="reserved"><a href="/admin/reservations/cal/{reservation}?y={y}&amp;m={m}">R</a></td>"#,
                            y = view.year(),
                            m = view.month(),
                        )
                    } else if block > 0 {
                        format!(
                            r#"<td><input type="checkbox" name="remove_block_{room_id}_{date}" value="{block}" checked></td>"#
                        )
                    } else {
                        format!(
                            r#"<td><input type="checkbox" name="add_block_{room_id}_{date}" value="1"></td>"#
                        )
                    }
                })
                .collect();
            format!(
                r#"<h2>{name}</h2>
<table class="calendar"><tr>{header}</tr><tr>{cells}</tr></table>"#,
                name = escape(&cal.room.name),
            )
        })
        .collect();

    layout(
        "Reservation Calendar",
        td,
        &format!(
            r#"{nav}
<h1>{title}</h1>
<p><a href="/admin/reservations_calendar?y={py}&amp;m={pm}">&lt;&lt;</a> <a href="/admin/reservations_calendar?y={ny}&amp;m={nm}">&gt;&gt;</a></p>
<form method="post" action="/admin/reservations_calendar">
<input type="hidden" name="y" value="{y}">
<input type="hidden" name="m" value="{m}">
{tables}
<button type="submit">Save Changes</button>
</form>"#,
            nav = admin_nav(),
            title = view.title(),
            py = prev.year(),
            pm = prev.month(),
            ny = next.year(),
            nm = next.month(),
            y = view.year(),
            m = view.month(),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RestrictionKind, Room, RoomRestriction};
    use crate::services::calendar::build_room_calendar;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_calendar_checkbox_names() {
        let now = Utc::now().naive_utc();
        let d = |s: &str| NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap();
        let room = Room {
            id: 1,
            name: "General's Quarters".to_string(),
            created_at: now,
            updated_at: now,
        };
        let view = MonthView::new(2050, 1).unwrap();
        let restrictions = vec![
            RoomRestriction {
                id: 5,
                room_id: 1,
                reservation_id: None,
                kind: RestrictionKind::OwnerBlock,
                start_date: d("2050-01-04"),
                end_date: d("2050-01-05"),
                created_at: now,
                updated_at: now,
            },
            RoomRestriction {
                id: 6,
                room_id: 1,
                reservation_id: Some(9),
                kind: RestrictionKind::Reservation,
                start_date: d("2050-01-10"),
                end_date: d("2050-01-11"),
                created_at: now,
                updated_at: now,
            },
        ];
        let cal = build_room_calendar(room, &view, &restrictions);
        let Html(page) = calendar(&TemplateData::default(), &view, &[cal]);

        assert!(page.contains(r#"name="remove_block_1_2050-01-04" value="5" checked"#));
        assert!(page.contains(r#"name="add_block_1_2050-01-05""#));
        assert!(page.contains("/admin/reservations/cal/9?y=2050&amp;m=1"));
        assert!(page.contains("y=2049&amp;m=12"));
        assert!(page.contains("January 2050"));
    }
}
