pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::MailData;

pub use http::HttpMailer;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, msg: &MailData) -> anyhow::Result<()>;
}

/// Writes each message to the log instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, msg: &MailData) -> anyhow::Result<()> {
        tracing::info!(
            to = %msg.to,
            from = %msg.from,
            subject = %msg.subject,
            template = msg.template.as_deref().unwrap_or("none"),
            "mail delivered to log"
        );
        Ok(())
    }
}

/// Producer side of the bounded mail queue. Enqueueing never waits: when the
/// queue is full the new message is dropped and a warning logged.
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::Sender<MailData>,
}

impl MailQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MailData>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Returns whether the message was accepted.
    pub fn enqueue(&self, msg: MailData) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(msg)) => {
                tracing::warn!(to = %msg.to, subject = %msg.subject, "mail queue full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(msg)) => {
                tracing::warn!(to = %msg.to, subject = %msg.subject, "mail worker stopped, dropping message");
                false
            }
        }
    }
}

/// Single consumer. Delivery failures are logged and otherwise ignored.
pub fn spawn_mail_worker(
    mut rx: mpsc::Receiver<MailData>,
    mailer: Arc<dyn Mailer>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = mailer.send(&msg).await {
                tracing::error!(error = %e, to = %msg.to, subject = %msg.subject, "failed to deliver mail");
            }
        }
        tracing::info!("mail worker shut down");
    })
}
