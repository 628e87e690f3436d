use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::booking::BookingWorkflow;
use crate::services::mail::MailQueue;
use crate::session::{SessionManager, SessionStore};
use crate::store::AvailabilityStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn AvailabilityStore>,
    pub sessions: SessionManager,
    pub booking: BookingWorkflow,
}

impl AppState {
    /// Wires the workflow and session manager from the config and the chosen
    /// backends.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn AvailabilityStore>,
        session_store: Arc<dyn SessionStore>,
        mail: MailQueue,
    ) -> Arc<Self> {
        let booking = BookingWorkflow::new(
            Arc::clone(&store),
            mail,
            config.commit_mode,
            config.mail_from.clone(),
            config.owner_email.clone(),
        );
        let sessions =
            SessionManager::new(session_store, config.session_lifetime, config.in_production);

        Arc::new(Self {
            config,
            store,
            sessions,
            booking,
        })
    }
}
