use axum::response::Html;

use super::{escape, input, layout, TemplateData};
use crate::forms::FieldErrors;
use crate::models::{GuestDetails, ReservationDraft, Room, DATE_FORMAT};

pub fn home(td: &TemplateData, rooms: &[Room]) -> Html<String> {
    let items: String = rooms
        .iter()
        .map(|r| format!(r#"<li><a href="/rooms/{}">{}</a></li>"#, r.id, escape(&r.name)))
        .collect();
    layout(
        "Home",
        td,
        &format!(
            r#"<h1>Welcome to Fort Smythe Bed and Breakfast</h1>
<ul class="rooms">{items}</ul>
<a class="btn" href="/search_availability">Make Reservation Now</a>"#
        ),
    )
}

/// Room detail page with an inline availability check against the JSON
/// endpoint.
pub fn room_page(td: &TemplateData, room: &Room) -> Html<String> {
    layout(
        &room.name,
        td,
        &format!(
            r#"<h1>{name}</h1>
<form id="check-availability" method="post" action="/search_availability-json">
<input type="hidden" name="room_id" value="{id}">
<label for="start">Arrival</label><input type="date" id="start" name="start">
<label for="end">Departure</label><input type="date" id="end" name="end">
<button type="submit">Check Availability</button>
</form>
<p>Available rooms can be booked via <code>/book_room?id={id}&amp;s=YYYY-MM-DD&amp;e=YYYY-MM-DD</code>.</p>"#,
            name = escape(&room.name),
            id = room.id,
        ),
    )
}

pub fn search_page(td: &TemplateData) -> Html<String> {
    layout(
        "Search for Availability",
        td,
        r#"<h1>Search for Availability</h1>
<form method="post" action="/search_availability">
<label for="start">Starting Date</label><input type="date" id="start" name="start" required>
<label for="end">Ending Date</label><input type="date" id="end" name="end" required>
<button type="submit">Search Availability</button>
</form>"#,
    )
}

pub fn choose_room(td: &TemplateData, rooms: &[Room], draft: &ReservationDraft) -> Html<String> {
    let items: String = rooms
        .iter()
        .map(|r| {
            format!(
                r#"<li><a href="/choose_room/{}">{}</a></li>"#,
                r.id,
                escape(&r.name)
            )
        })
        .collect();
    layout(
        "Choose a Room",
        td,
        &format!(
            r#"<h1>Choose a Room</h1>
<p>Available from {start} to {end}:</p>
<ul class="rooms">{items}</ul>"#,
            start = draft.start_date.format(DATE_FORMAT),
            end = draft.end_date.format(DATE_FORMAT),
        ),
    )
}

/// The guest details form. On a failed submission `values` holds what was
/// posted and `errors` the per-field messages.
pub fn reservation_form(
    td: &TemplateData,
    draft: &ReservationDraft,
    values: &GuestDetails,
    errors: &FieldErrors,
) -> Html<String> {
    layout(
        "Make Reservation",
        td,
        &format!(
            r#"<h1>Make Reservation</h1>
<p>Room: {room}<br>Arrival: {start}<br>Departure: {end}</p>
<form method="post" action="/make_reservation" novalidate>
{first}
{last}
{email}
{phone}
<button type="submit">Make Reservation</button>
</form>"#,
            room = escape(&draft.room_name),
            start = draft.start_date.format(DATE_FORMAT),
            end = draft.end_date.format(DATE_FORMAT),
            first = input("First Name", "first_name", "text", &values.first_name, errors),
            last = input("Last Name", "last_name", "text", &values.last_name, errors),
            email = input("Email", "email", "email", &values.email, errors),
            phone = input("Phone", "phone", "text", &values.phone, errors),
        ),
    )
}

pub fn summary(td: &TemplateData, draft: &ReservationDraft) -> Html<String> {
    layout(
        "Reservation Summary",
        td,
        &format!(
            r#"<h1>Reservation Summary</h1>
<table class="summary">
<tr><td>Name:</td><td>{first} {last}</td></tr>
<tr><td>Room:</td><td>{room}</td></tr>
<tr><td>Arrival:</td><td>{start}</td></tr>
<tr><td>Departure:</td><td>{end}</td></tr>
<tr><td>Email:</td><td>{email}</td></tr>
<tr><td>Phone:</td><td>{phone}</td></tr>
</table>"#,
            first = escape(&draft.guest.first_name),
            last = escape(&draft.guest.last_name),
            room = escape(&draft.room_name),
            start = draft.start_date.format(DATE_FORMAT),
            end = draft.end_date.format(DATE_FORMAT),
            email = escape(&draft.guest.email),
            phone = escape(&draft.guest.phone),
        ),
    )
}

pub fn login(td: &TemplateData, email: &str, errors: &FieldErrors) -> Html<String> {
    layout(
        "Login",
        td,
        &format!(
            r#"<h1>Login</h1>
<form method="post" action="/user/login" novalidate>
{email}
{password}
<button type="submit">Login</button>
</form>"#,
            email = input("Email", "email", "email", email, errors),
            password = input("Password", "password", "password", "", errors),
        ),
    )
}
