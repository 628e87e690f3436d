use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use bookings::config::{AppConfig, StoreBackend};
use bookings::db;
use bookings::models::NewUser;
use bookings::routes::build_router;
use bookings::services::auth::hash_password;
use bookings::services::integrity::{check_integrity, log_report};
use bookings::services::mail::{spawn_mail_worker, HttpMailer, LogMailer, MailQueue, Mailer};
use bookings::session::{spawn_purge_task, MemorySessionStore, SessionStore, SqliteSessionStore};
use bookings::state::AppState;
use bookings::store::{AvailabilityStore, MemoryStore, SqliteStore};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let (store, sessions): (Arc<dyn AvailabilityStore>, Arc<dyn SessionStore>) =
        match config.store_backend {
            StoreBackend::Sqlite => {
                let conn = Arc::new(Mutex::new(db::init_db(&config.database_url)?));
                tracing::info!(database = %config.database_url, "using sqlite store");
                (
                    Arc::new(SqliteStore::new(Arc::clone(&conn), config.query_timeout)),
                    Arc::new(SqliteSessionStore::new(conn)),
                )
            }
            StoreBackend::Memory => {
                tracing::info!("using in-memory store; data is lost on exit");
                (
                    Arc::new(MemoryStore::new()),
                    Arc::new(MemorySessionStore::new()),
                )
            }
        };
    tracing::info!(commit_mode = config.commit_mode.as_str(), "booking workflow configured");

    seed_admin(store.as_ref(), &config).await?;

    match check_integrity(store.as_ref()).await {
        Ok(report) => log_report(&report),
        Err(e) => tracing::warn!(error = %e, "integrity check failed"),
    }

    let mailer: Arc<dyn Mailer> = if config.mail_relay_url.is_empty() {
        tracing::info!("no MAIL_RELAY_URL set, mail will be logged");
        Arc::new(LogMailer)
    } else {
        tracing::info!(relay = %config.mail_relay_url, "mail relay configured");
        Arc::new(HttpMailer::new(config.mail_relay_url.clone()))
    };
    let (mail, mail_rx) = MailQueue::new(config.mail_queue_capacity);
    spawn_mail_worker(mail_rx, mailer);

    spawn_purge_task(Arc::clone(&sessions), SESSION_PURGE_INTERVAL);

    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config, store, sessions, mail);
    let app = build_router(state);

    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Creates the admin account from ADMIN_EMAIL / ADMIN_PASSWORD unless it
/// already exists.
async fn seed_admin(store: &dyn AvailabilityStore, config: &AppConfig) -> anyhow::Result<()> {
    if config.admin_email.is_empty() || config.admin_password.is_empty() {
        return Ok(());
    }
    if store.user_exists(&config.admin_email).await? {
        return Ok(());
    }

    let password_hash = hash_password(&config.admin_password)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {e}"))?;
    store
        .create_user(&NewUser {
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email: config.admin_email.clone(),
            password_hash,
            access_level: 3,
        })
        .await
        .context("failed to seed admin user")?;

    tracing::info!(email = %config.admin_email, "admin user created");
    Ok(())
}
