use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::session::session_middleware;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .route("/dashboard", get(handlers::admin::dashboard))
        .route("/reservations_new", get(handlers::admin::reservations_new))
        .route("/reservations_all", get(handlers::admin::reservations_all))
        .route(
            "/reservations_calendar",
            get(handlers::admin::calendar).post(handlers::admin::post_calendar),
        )
        .route(
            "/process_reservation/:src/:id",
            get(handlers::admin::process_reservation),
        )
        .route(
            "/delete_reservation/:src/:id",
            get(handlers::admin::delete_reservation),
        )
        .route(
            "/reservations/:src/:id",
            get(handlers::admin::show_reservation).post(handlers::admin::update_reservation),
        )
        .route_layer(middleware::from_fn(handlers::admin::require_auth));

    Router::new()
        .route("/", get(handlers::pages::home))
        .route("/rooms/:id", get(handlers::pages::room))
        .route("/health", get(handlers::health::health))
        .route(
            "/search_availability",
            get(handlers::reservation::search_page).post(handlers::reservation::post_search),
        )
        .route(
            "/search_availability-json",
            axum::routing::post(handlers::reservation::availability_json),
        )
        .route("/choose_room/:id", get(handlers::reservation::choose_room))
        .route("/book_room", get(handlers::reservation::book_room))
        .route(
            "/make_reservation",
            get(handlers::reservation::make_reservation)
                .post(handlers::reservation::post_reservation),
        )
        .route("/reservation_summary", get(handlers::reservation::summary))
        .route(
            "/user/login",
            get(handlers::user::login_page).post(handlers::user::post_login),
        )
        .route("/user/logout", get(handlers::user::logout))
        .nest("/admin", admin)
        .layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
