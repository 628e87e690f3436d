use std::env;
use std::time::Duration;

use crate::services::booking::CommitMode;
use crate::store::DEFAULT_QUERY_TIMEOUT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(StoreBackend::Sqlite),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Memory => "memory",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub in_production: bool,
    pub store_backend: StoreBackend,
    pub commit_mode: CommitMode,
    pub query_timeout: Duration,
    pub session_lifetime: chrono::Duration,
    pub mail_queue_capacity: usize,
    pub mail_relay_url: String,
    pub mail_from: String,
    pub owner_email: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unknown or unparsable values
    /// fall back to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let store_backend = match lookup("STORE_BACKEND") {
            Some(v) => StoreBackend::parse(&v).unwrap_or_else(|| {
                tracing::warn!(value = %v, "unknown STORE_BACKEND, using sqlite");
                StoreBackend::Sqlite
            }),
            None => StoreBackend::Sqlite,
        };
        let commit_mode = match lookup("COMMIT_MODE") {
            Some(v) => CommitMode::parse(&v).unwrap_or_else(|| {
                tracing::warn!(value = %v, "unknown COMMIT_MODE, using transactional");
                CommitMode::Transactional
            }),
            None => CommitMode::Transactional,
        };

        Self {
            port: lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(8080),
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "bookings.db".to_string()),
            in_production: lookup("IN_PRODUCTION")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
                .unwrap_or(false),
            store_backend,
            commit_mode,
            query_timeout: lookup("QUERY_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_QUERY_TIMEOUT),
            session_lifetime: chrono::Duration::hours(
                lookup("SESSION_LIFETIME_HOURS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(24),
            ),
            mail_queue_capacity: lookup("MAIL_QUEUE_CAPACITY")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(100),
            mail_relay_url: lookup("MAIL_RELAY_URL").unwrap_or_default(),
            mail_from: lookup("MAIL_FROM").unwrap_or_else(|| "bookings@localhost".to_string()),
            owner_email: lookup("OWNER_EMAIL").unwrap_or_else(|| "owner@localhost".to_string()),
            admin_email: lookup("ADMIN_EMAIL").unwrap_or_default(),
            admin_password: lookup("ADMIN_PASSWORD").unwrap_or_default(),
        }
    }
}
