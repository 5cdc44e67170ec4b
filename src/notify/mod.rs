//! Outbound contact notifications.
//!
//! Email is optional: when the sender, recipients or API key are missing no
//! notifier is built and submissions are accepted without it.

pub mod resend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::EmailConfig;

pub use resend::ResendMailer;

/// Subject line of contact notifications.
pub const CONTACT_SUBJECT: &str = "New website contact";

/// Errors raised while sending email.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// An email message to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
}

/// Something that can deliver an [`Email`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Turns contact submissions into emails.
#[derive(Clone)]
pub struct ContactNotifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    to: Vec<String>,
}

impl ContactNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
            to,
        }
    }

    /// Build a notifier backed by the email API, if email is fully configured.
    pub fn from_config(config: &EmailConfig, timeout: Duration) -> Option<Self> {
        let (Some(api_key), Some(from)) = (config.api_key.as_deref(), config.from.as_deref()) else {
            tracing::info!("Contact email not configured");
            return None;
        };
        if config.to.is_empty() {
            tracing::info!("Contact email has no recipients");
            return None;
        }

        match ResendMailer::new(&config.api_base, api_key, timeout) {
            Ok(mailer) => Some(Self::new(Arc::new(mailer), from, config.to.clone())),
            Err(e) => {
                tracing::warn!(error = %e, "Email client unusable, notifications disabled");
                None
            }
        }
    }

    /// The email sent for a contact payload.
    pub fn contact_email(&self, payload: &Value) -> Email {
        Email {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: CONTACT_SUBJECT.to_string(),
            text: serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string()),
        }
    }

    pub async fn notify_contact(&self, payload: &Value) -> Result<(), MailError> {
        self.mailer.send(&self.contact_email(payload)).await
    }
}
