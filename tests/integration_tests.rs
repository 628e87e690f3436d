use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use tokio::sync::mpsc;
use tower::ServiceExt;

use bookings::config::AppConfig;
use bookings::db;
use bookings::models::{
    find_overlaps, MailData, NewRestriction, NewUser, ReservationFilter, RestrictionKind,
};
use bookings::routes::build_router;
use bookings::services::auth::hash_password;
use bookings::services::mail::MailQueue;
use bookings::session::{MemorySessionStore, SqliteSessionStore};
use bookings::state::AppState;
use bookings::store::{AvailabilityStore, FaultPlan, MemoryStore, SqliteStore};

// ── Helpers ──

struct TestApp {
    app: Router,
    store: Arc<dyn AvailabilityStore>,
    mail_rx: mpsc::Receiver<MailData>,
}

fn test_app() -> TestApp {
    let conn = Arc::new(Mutex::new(db::init_db(":memory:").unwrap()));
    let store: Arc<dyn AvailabilityStore> =
        Arc::new(SqliteStore::new(Arc::clone(&conn), Duration::from_secs(2)));
    let sessions = Arc::new(SqliteSessionStore::new(conn));
    let (mail, mail_rx) = MailQueue::new(32);

    let state = AppState::new(AppConfig::default(), Arc::clone(&store), sessions, mail);
    TestApp {
        app: build_router(state),
        store,
        mail_rx,
    }
}

/// Router over an in-memory store whose every query fails.
fn failing_app() -> Router {
    let store: Arc<dyn AvailabilityStore> = Arc::new(MemoryStore::with_faults(FaultPlan {
        fail_queries: true,
        ..FaultPlan::default()
    }));
    let (mail, _) = MailQueue::new(4);
    let state = AppState::new(
        AppConfig::default(),
        store,
        Arc::new(MemorySessionStore::new()),
        mail,
    );
    build_router(state)
}

async fn seed_admin(store: &dyn AvailabilityStore) {
    store
        .create_user(&NewUser {
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: hash_password("secret").unwrap(),
            access_level: 3,
        })
        .await
        .unwrap();
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    set_cookie: Option<String>,
    body: String,
}

/// A browser stand-in: carries the session cookie between requests.
struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    fn new(app: &Router) -> Self {
        Self {
            app: app.clone(),
            cookie: None,
        }
    }

    async fn send(&mut self, mut req: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            req.headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }
        let res = self.app.clone().oneshot(req).await.unwrap();

        let status = res.status();
        let location = res
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_string());
        if let Some(sc) = &set_cookie {
            self.cookie = sc.split(';').next().map(str::to_string);
        }
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            set_cookie,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }

    async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&mut self, uri: &str, body: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn search(&mut self, start: &str, end: &str) -> TestResponse {
        self.post_form("/search_availability", &format!("start={start}&end={end}"))
            .await
    }

    async fn book(&mut self, room_id: i64, start: &str, end: &str, first_name: &str) -> TestResponse {
        let res = self
            .get(&format!("/book_room?id={room_id}&s={start}&e={end}"))
            .await;
        assert_eq!(res.location.as_deref(), Some("/make_reservation"));
        self.post_form(
            "/make_reservation",
            &format!("first_name={first_name}&last_name=Smith&email=guest%40example.com&phone=555-0100"),
        )
        .await
    }

    async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form(
            "/user/login",
            &format!("email={}&password={password}", email.replace('@', "%40")),
        )
        .await
    }
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ── Public pages ──

#[tokio::test]
async fn test_health() {
    let t = test_app();
    let res = Client::new(&t.app).get("/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "ok");
}

#[tokio::test]
async fn test_home_and_room_pages() {
    let t = test_app();
    let mut client = Client::new(&t.app);

    let res = client.get("/").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("General&#39;s Quarters"));
    assert!(res.body.contains("Major&#39;s Suite"));

    let res = client.get("/rooms/2").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("search_availability-json"));

    let res = client.get("/rooms/42").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/"));
    let res = client.get("/").await;
    assert!(res.body.contains("Unable to find room 42"));
}

// ── Booking flow ──

#[tokio::test]
async fn test_search_on_empty_database_returns_all_rooms() {
    let t = test_app();
    let res = Client::new(&t.app).search("2050-01-01", "2050-01-02").await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"href="/choose_room/1""#));
    assert!(res.body.contains(r#"href="/choose_room/2""#));
}

#[tokio::test]
async fn test_full_booking_flow_excludes_booked_room() {
    let mut t = test_app();
    let mut guest = Client::new(&t.app);

    let res = guest.search("2050-01-01", "2050-01-02").await;
    assert_eq!(res.status, StatusCode::OK);
    let cookie = res.set_cookie.expect("session cookie");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    let res = guest.get("/choose_room/1").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/make_reservation"));

    let res = guest.get("/make_reservation").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("General&#39;s Quarters"));

    let res = guest
        .post_form(
            "/make_reservation",
            "first_name=Alice&last_name=Smith&email=alice%40example.com&phone=555-0100",
        )
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/reservation_summary"));

    let res = guest.get("/reservation_summary").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Alice Smith"));
    assert!(res.body.contains("2050-01-01"));

    // the summary clears the draft
    let res = guest.get("/reservation_summary").await;
    assert_eq!(res.location.as_deref(), Some("/"));

    let all = t.store.list_reservations(ReservationFilter::All).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].first_name, "Alice");
    assert_eq!(all[0].room_name, "General's Quarters");
    let restrictions = t.store.all_restrictions().await.unwrap();
    assert_eq!(restrictions.len(), 1);
    assert_eq!(restrictions[0].reservation_id, Some(all[0].id));

    let guest_mail = t.mail_rx.recv().await.unwrap();
    assert_eq!(guest_mail.to, "alice@example.com");
    let owner_mail = t.mail_rx.recv().await.unwrap();
    assert_eq!(owner_mail.to, "owner@localhost");

    let res = Client::new(&t.app).search("2050-01-01", "2050-01-02").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(!res.body.contains(r#"href="/choose_room/1""#));
    assert!(res.body.contains(r#"href="/choose_room/2""#));
}

#[tokio::test]
async fn test_short_first_name_rerenders_form_without_writes() {
    let t = test_app();
    let mut guest = Client::new(&t.app);

    guest.search("2050-01-01", "2050-01-02").await;
    guest.get("/choose_room/1").await;
    let res = guest
        .post_form(
            "/make_reservation",
            "first_name=J&last_name=Smith&email=j%40example.com&phone=",
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("This field must be at least 3 characters long"));
    assert!(res.body.contains(r#"name="last_name" value="Smith""#));
    assert!(t.store.list_reservations(ReservationFilter::All).await.unwrap().is_empty());
    assert!(t.store.all_restrictions().await.unwrap().is_empty());

    // the draft survives, so a corrected submission goes through
    let res = guest
        .post_form(
            "/make_reservation",
            "first_name=Jo%C3%A3o&last_name=Smith&email=j%40example.com&phone=",
        )
        .await;
    assert_eq!(res.location.as_deref(), Some("/reservation_summary"));
}

#[tokio::test]
async fn test_summary_without_draft_redirects_home_with_error() {
    let t = test_app();
    let mut guest = Client::new(&t.app);

    let res = guest.get("/reservation_summary").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/"));

    let res = guest.get("/").await;
    assert!(res.body.contains("can&#39;t get reservation from session"));

    // popped exactly once
    let res = guest.get("/").await;
    assert!(!res.body.contains("can&#39;t get reservation from session"));
}

#[tokio::test]
async fn test_bad_dates_redirect_back_to_search() {
    let t = test_app();
    let mut guest = Client::new(&t.app);

    let res = guest.search("01/01/2050", "2050-01-02").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/search_availability"));
    let res = guest.get("/search_availability").await;
    assert!(res.body.contains("can&#39;t parse start date"));

    let res = guest.search("2050-01-05", "2050-01-02").await;
    assert_eq!(res.location.as_deref(), Some("/search_availability"));
}

#[tokio::test]
async fn test_no_availability_flash() {
    let t = test_app();
    for room in [1, 2] {
        let res = Client::new(&t.app)
            .book(room, "2050-02-01", "2050-02-05", "Alice")
            .await;
        assert_eq!(res.location.as_deref(), Some("/reservation_summary"));
    }

    let mut guest = Client::new(&t.app);
    let res = guest.search("2050-02-03", "2050-02-04").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/search_availability"));
    let res = guest.get("/search_availability").await;
    assert!(res.body.contains("No availability"));

    // checkout day is free again
    let res = guest.search("2050-02-05", "2050-02-06").await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_database_failure_differs_from_no_availability() {
    let app = failing_app();
    let mut guest = Client::new(&app);

    let res = guest.search("2050-01-01", "2050-01-02").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/"));
    let res = guest.get("/search_availability").await;
    assert!(res.body.contains("can&#39;t query database"));
    assert!(!res.body.contains("No availability"));

    let res = guest
        .post_form(
            "/search_availability-json",
            "start=2050-01-01&end=2050-01-02&room_id=1",
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["message"], "Error querying database");
}

#[tokio::test]
async fn test_choose_room_without_search_redirects_home() {
    let t = test_app();
    let mut guest = Client::new(&t.app);

    let res = guest.get("/choose_room/1").await;
    assert_eq!(res.location.as_deref(), Some("/"));

    let res = guest.get("/make_reservation").await;
    assert_eq!(res.location.as_deref(), Some("/"));

    let res = guest.get("/choose_room/abc").await;
    assert_eq!(res.location.as_deref(), Some("/"));
    let res = guest.get("/").await;
    assert!(res.body.contains("Unable to get room ID from URL"));
}

#[tokio::test]
async fn test_availability_json() {
    let t = test_app();
    let mut guest = Client::new(&t.app);

    let res = guest
        .post_form(
            "/search_availability-json",
            "start=2050-03-01&end=2050-03-03&room_id=1",
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["room_id"], "1");
    assert_eq!(json["start_date"], "2050-03-01");

    Client::new(&t.app)
        .book(1, "2050-03-02", "2050-03-04", "Alice")
        .await;

    let res = guest
        .post_form(
            "/search_availability-json",
            "start=2050-03-01&end=2050-03-03&room_id=1",
        )
        .await;
    let json: serde_json::Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(json["ok"], false);

    let res = guest
        .post_form("/search_availability-json", "start=bad&end=2050-03-03&room_id=1")
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["message"], "can't parse start date");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_for_same_room_book_once() {
    let t = test_app();

    let mut guests = Vec::new();
    for _ in 0..6 {
        let mut guest = Client::new(&t.app);
        let res = guest.get("/book_room?id=1&s=2050-04-01&e=2050-04-04").await;
        assert_eq!(res.location.as_deref(), Some("/make_reservation"));
        guests.push(guest);
    }

    let handles: Vec<_> = guests
        .into_iter()
        .map(|mut guest| {
            tokio::spawn(async move {
                guest
                    .post_form(
                        "/make_reservation",
                        "first_name=Alice&last_name=Smith&email=a%40example.com&phone=",
                    )
                    .await
                    .location
            })
        })
        .collect();

    let mut committed = 0;
    for handle in handles {
        if handle.await.unwrap().as_deref() == Some("/reservation_summary") {
            committed += 1;
        }
    }
    assert_eq!(committed, 1);

    let restrictions = t.store.all_restrictions().await.unwrap();
    assert!(find_overlaps(&restrictions).is_empty());
    assert_eq!(t.store.list_reservations(ReservationFilter::All).await.unwrap().len(), 1);
}

// ── Auth ──

#[tokio::test]
async fn test_admin_requires_login() {
    let t = test_app();
    let mut visitor = Client::new(&t.app);

    for uri in [
        "/admin/dashboard",
        "/admin/reservations_new",
        "/admin/reservations_calendar",
        "/admin/delete_reservation/all/1",
    ] {
        let res = visitor.get(uri).await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(res.location.as_deref(), Some("/user/login"), "{uri}");
    }
    let res = visitor.get("/user/login").await;
    assert!(res.body.contains("Log in first!"));
}

#[tokio::test]
async fn test_login_and_logout() {
    let t = test_app();
    seed_admin(t.store.as_ref()).await;
    let mut admin = Client::new(&t.app);

    let res = admin.login("admin@example.com", "wrong").await;
    assert_eq!(res.location.as_deref(), Some("/user/login"));
    let res = admin.get("/user/login").await;
    assert!(res.body.contains("invalid login credentials"));

    let res = admin.login("nobody@example.com", "secret").await;
    assert_eq!(res.location.as_deref(), Some("/user/login"));
    let res = admin.get("/user/login").await;
    assert!(res.body.contains("invalid login credentials"));

    let res = admin.login("not-an-email", "secret").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Invalid email address"));

    let before = admin.cookie.clone();
    let res = admin.login("admin@example.com", "secret").await;
    assert_eq!(res.location.as_deref(), Some("/"));
    assert_ne!(admin.cookie, before, "token is renewed on login");

    let res = admin.get("/admin/dashboard").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("No inconsistencies found."));

    let res = admin.get("/user/logout").await;
    assert_eq!(res.location.as_deref(), Some("/"));
    let res = admin.get("/admin/dashboard").await;
    assert_eq!(res.location.as_deref(), Some("/user/login"));
}

// ── Admin ──

async fn logged_in_admin(t: &TestApp) -> Client {
    seed_admin(t.store.as_ref()).await;
    let mut admin = Client::new(&t.app);
    let res = admin.login("admin@example.com", "secret").await;
    assert_eq!(res.location.as_deref(), Some("/"));
    admin
}

#[tokio::test]
async fn test_admin_lists_update_process_delete() {
    let t = test_app();
    Client::new(&t.app)
        .book(2, "2050-06-10", "2050-06-12", "Alice")
        .await;
    let id = t.store.list_reservations(ReservationFilter::All).await.unwrap()[0].id;

    let mut admin = logged_in_admin(&t).await;

    let res = admin.get("/admin/reservations_new").await;
    assert!(res.body.contains(&format!("/admin/reservations/new/{id}")));

    let res = admin.get(&format!("/admin/reservations/new/{id}")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains(r#"value="Alice""#));

    // invalid edit re-renders with errors
    let res = admin
        .post_form(
            &format!("/admin/reservations/new/{id}"),
            "first_name=Al&last_name=Smith&email=alice%40example.com&phone=",
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("at least 3 characters"));

    let res = admin
        .post_form(
            &format!("/admin/reservations/new/{id}"),
            "first_name=Alicia&last_name=Smith&email=alicia%40example.com&phone=1",
        )
        .await;
    assert_eq!(res.location.as_deref(), Some("/admin/reservations_new"));
    assert_eq!(t.store.get_reservation(id).await.unwrap().first_name, "Alicia");

    for _ in 0..2 {
        let res = admin
            .get(&format!("/admin/process_reservation/new/{id}"))
            .await;
        assert_eq!(res.location.as_deref(), Some("/admin/reservations_new"));
    }
    assert!(t.store.get_reservation(id).await.unwrap().processed);
    let res = admin.get("/admin/reservations_new").await;
    assert!(!res.body.contains(&format!("/admin/reservations/new/{id}")));

    for _ in 0..2 {
        let res = admin
            .get(&format!("/admin/delete_reservation/cal/{id}?y=2050&m=6"))
            .await;
        assert_eq!(
            res.location.as_deref(),
            Some("/admin/reservations_calendar?y=2050&m=6")
        );
    }
    assert!(t.store.list_reservations(ReservationFilter::All).await.unwrap().is_empty());
    assert!(t.store.all_restrictions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_update_missing_reservation() {
    let t = test_app();
    let mut admin = logged_in_admin(&t).await;

    let res = admin.get("/admin/reservations/all/999").await;
    assert_eq!(res.location.as_deref(), Some("/admin/reservations_all"));
    let res = admin.get("/admin/reservations_all").await;
    assert!(res.body.contains("Unable to find reservation 999"));
}

#[tokio::test]
async fn test_calendar_adds_and_removes_owner_blocks() {
    let t = test_app();
    Client::new(&t.app)
        .book(1, "2050-01-10", "2050-01-12", "Alice")
        .await;
    let mut admin = logged_in_admin(&t).await;

    let res = admin.get("/admin/reservations_calendar?y=2050&m=1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("January 2050"));
    assert!(res.body.contains(r#"name="add_block_1_2050-01-05""#));
    assert!(res.body.contains("/admin/reservations/cal/"));

    let res = admin
        .post_form(
            "/admin/reservations_calendar",
            "y=2050&m=1&add_block_1_2050-01-05=1&add_block_2_2050-01-20=1",
        )
        .await;
    assert_eq!(
        res.location.as_deref(),
        Some("/admin/reservations_calendar?y=2050&m=1")
    );

    let blocks: Vec<_> = t
        .store
        .all_restrictions()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.kind == RestrictionKind::OwnerBlock)
        .collect();
    assert_eq!(blocks.len(), 2);
    let block = blocks.iter().find(|r| r.room_id == 1).unwrap();
    assert_eq!(block.start_date, d("2050-01-05"));
    assert_eq!(block.end_date, d("2050-01-06"));

    // the block makes the night unavailable to guests
    assert!(!t
        .store
        .is_room_available(d("2050-01-05"), d("2050-01-06"), 1)
        .await
        .unwrap());

    let res = admin.get("/admin/reservations_calendar?y=2050&m=1").await;
    assert!(res.body.contains(r#"name="remove_block_1_2050-01-05""#));

    // keep room 2's block checked, uncheck room 1's
    let res = admin
        .post_form(
            "/admin/reservations_calendar",
            "y=2050&m=1&remove_block_2_2050-01-20=1",
        )
        .await;
    assert_eq!(
        res.location.as_deref(),
        Some("/admin/reservations_calendar?y=2050&m=1")
    );

    let remaining: Vec<_> = t
        .store
        .all_restrictions()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.kind == RestrictionKind::OwnerBlock)
        .collect();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].room_id, 2);
}

#[tokio::test]
async fn test_saving_an_older_month_keeps_blocks_of_the_newer_one() {
    let t = test_app();
    t.store
        .create_room_restriction(&NewRestriction::owner_block(1, d("2050-02-07")))
        .await
        .unwrap();
    let mut admin = logged_in_admin(&t).await;

    // January in one window, then February in another
    admin.get("/admin/reservations_calendar?y=2050&m=1").await;
    let res = admin.get("/admin/reservations_calendar?y=2050&m=2").await;
    assert!(res.body.contains(r#"name="remove_block_1_2050-02-07""#));

    // the January window is saved last
    let res = admin
        .post_form(
            "/admin/reservations_calendar",
            "y=2050&m=1&add_block_2_2050-01-15=1",
        )
        .await;
    assert_eq!(
        res.location.as_deref(),
        Some("/admin/reservations_calendar?y=2050&m=1")
    );
    let res = admin.get("/admin/reservations_calendar?y=2050&m=1").await;
    assert!(res.body.contains("opened for another month"));

    let blocks = t.store.all_restrictions().await.unwrap();
    assert_eq!(blocks.len(), 1, "nothing added or removed");
    assert_eq!(blocks[0].start_date, d("2050-02-07"));

    // after re-rendering January the save goes through
    let res = admin
        .post_form(
            "/admin/reservations_calendar",
            "y=2050&m=1&add_block_2_2050-01-15=1",
        )
        .await;
    assert_eq!(
        res.location.as_deref(),
        Some("/admin/reservations_calendar?y=2050&m=1")
    );
    assert_eq!(t.store.all_restrictions().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_calendar_rejects_bad_month() {
    let t = test_app();
    let mut admin = logged_in_admin(&t).await;

    let res = admin.get("/admin/reservations_calendar?y=2050&m=13").await;
    assert_eq!(res.location.as_deref(), Some("/admin/dashboard"));
    let res = admin.get("/admin/dashboard").await;
    assert!(res.body.contains("invalid calendar month"));
}
