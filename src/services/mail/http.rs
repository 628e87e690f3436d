use anyhow::Context;
use async_trait::async_trait;

use super::Mailer;
use crate::models::MailData;

/// Hands each message to an HTTP mail relay as a JSON POST.
pub struct HttpMailer {
    url: String,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, msg: &MailData) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(msg)
            .send()
            .await
            .context("failed to reach mail relay")?
            .error_for_status()
            .context("mail relay returned error")?;

        Ok(())
    }
}
