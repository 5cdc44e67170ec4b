//! Email delivery through the Resend HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{Email, MailError, Mailer};

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
}

/// Mailer posting to `{api_base}/emails`.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: Client,
    api_base: String,
    api_key: String,
}

impl ResendMailer {
    pub fn new(api_base: &str, api_key: &str, timeout: Duration) -> Result<Self, MailError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let response = self
            .client
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &email.from,
                to: &email.to,
                subject: &email.subject,
                text: &email.text,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(recipients = email.to.len(), "Contact email sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailError::Status {
            status: status.as_u16(),
            body,
        })
    }
}
