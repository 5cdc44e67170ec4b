//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the site server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Rate limiter housekeeping.
    pub rate_limit: RateLimitConfig,

    /// Locale routing.
    pub locale: LocaleConfig,

    /// Optional durable key-value store.
    pub store: StoreConfig,

    /// Optional contact notification email.
    pub email: EmailConfig,

    /// Pre-rendered pages.
    pub pages: PagesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

impl SiteConfig {
    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Overlay values from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(addr) = var("BIND_ADDRESS") {
            self.listener.bind_address = addr;
        }
        if let Some(url) = var("KV_REST_API_URL") {
            self.store.rest_url = Some(url);
        }
        if let Some(token) = var("KV_REST_API_TOKEN") {
            self.store.rest_token = Some(token);
        }
        if let Some(key) = var("RESEND_API_KEY") {
            self.email.api_key = Some(key);
        }
        if let Some(from) = var("CONTACT_FROM") {
            self.email.from = Some(from);
        }
        if let Some(to) = var("CONTACT_TO") {
            self.email.to = split_recipients(&to);
        }
    }
}

fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Timeout for a single call to the durable store or the email API.
    pub outbound_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            outbound_secs: 5,
        }
    }
}

/// Rate limiter housekeeping. The policy itself (5 per 600s) is fixed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// How often expired in-memory windows are swept, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
        }
    }
}

/// Locale routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Name of the preference cookie.
    pub cookie_name: String,

    /// Paths never redirected to a locale.
    ///
    /// An entry ending in `*` matches any path starting with the text before
    /// it. Other entries match whole leading segments: `/health` covers
    /// `/health` and `/health/live` but not `/healthy-pc`.
    pub bypass_prefixes: Vec<String>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            cookie_name: "lang".to_string(),
            bypass_prefixes: ["/_next*", "/api*", "/favicon*", "/assets", "/health"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Durable key-value store reached over its REST interface.
///
/// The store is used only when both values are present.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    pub rest_url: Option<String>,
    pub rest_token: Option<String>,
}

impl StoreConfig {
    /// Endpoint and token, when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.rest_url.as_deref(), self.rest_token.as_deref()) {
            (Some(url), Some(token)) => Some((url, token)),
            _ => None,
        }
    }
}

/// Contact notification email settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub to: Vec<String>,

    /// Base URL of the email API.
    pub api_base: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from: None,
            to: Vec::new(),
            api_base: "https://api.resend.com".to_string(),
        }
    }
}

impl EmailConfig {
    /// Email is sent only when key, sender and at least one recipient are set.
    pub fn is_complete(&self) -> bool {
        self.api_key.is_some() && self.from.is_some() && !self.to.is_empty()
    }
}

/// Pre-rendered page tree served behind the locale middleware.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Directory holding `/{locale}/...` pages and assets.
    pub root: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            root: "public".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}
