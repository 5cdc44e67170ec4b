//! Contact form endpoints.
//!
//! # Data Flow
//! ```text
//! POST /api/contact
//!     → rate limiter (429 + Retry-After when exhausted)
//!     → JSON parse (400 on failure)
//!     → honeypot (silent success for bots)
//!     → email notification (optional, logged on failure)
//!     → durable record (optional, logged on failure)
//!
//! POST /api/form-autosave
//!     → JSON parse (400 on failure)
//!     → durable draft record (optional, logged on failure)
//! ```

pub mod handlers;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

pub use handlers::{autosave_form, submit_contact};

/// Hidden form field real users never fill.
pub const HONEYPOT_FIELD: &str = "company";

/// Selector recorded when an autosave names none.
pub const DEFAULT_SELECTOR: &str = "#contact-form";

/// Contact submissions are kept for 30 days.
pub const CONTACT_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 30);

/// Form drafts are kept for 7 days.
pub const AUTOSAVE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// True when the honeypot field holds anything but whitespace.
pub fn honeypot_tripped(payload: &Value) -> bool {
    match payload.get(HONEYPOT_FIELD) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(other) => !other.to_string().trim().is_empty(),
    }
}

/// JavaScript-style truthiness of a JSON value.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A normalized autosave draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub selector: String,
    pub data: Value,
    pub failed_submit: bool,
}

impl Draft {
    /// Normalize a raw autosave body, defaulting anything malformed.
    pub fn from_value(body: &Value) -> Self {
        let selector = body
            .get("selector")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SELECTOR)
            .to_string();
        let data = match body.get("data") {
            Some(v @ (Value::Object(_) | Value::Array(_))) => v.clone(),
            _ => Value::Object(Map::new()),
        };
        let failed_submit = body.get("failedSubmit").is_some_and(truthy);

        Self {
            selector,
            data,
            failed_submit,
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
