//! Locale resolution for incoming paths.
//!
//! # Order
//! 1. Legacy `/rs` paths are rewritten to `/sr` (permanent)
//! 2. Asset, API and file paths bypass resolution
//! 3. Paths already under a supported locale pass through, refreshing the cookie
//! 4. Everything else is redirected under cookie → Accept-Language → `en`

use axum::http::StatusCode;

use super::accept_language::negotiate;
use super::Locale;
use crate::config::LocaleConfig;

/// What to do with a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not a content request; serve untouched.
    Bypass,
    /// Already localized; serve and persist the locale.
    Localized(Locale),
    /// Redirect to the locale-prefixed path and persist the locale.
    Redirect { location: String, locale: Locale },
    /// Permanent redirect of a legacy path.
    Legacy { location: String },
}

impl Resolution {
    /// Redirect target, when a redirect is needed.
    pub fn target_path(&self) -> Option<&str> {
        match self {
            Resolution::Redirect { location, .. } | Resolution::Legacy { location } => {
                Some(location)
            }
            Resolution::Bypass | Resolution::Localized(_) => None,
        }
    }

    /// Locale to write into the preference cookie.
    pub fn locale_to_persist(&self) -> Option<Locale> {
        match self {
            Resolution::Localized(locale) | Resolution::Redirect { locale, .. } => Some(*locale),
            Resolution::Bypass | Resolution::Legacy { .. } => None,
        }
    }

    /// Redirect status, when a redirect is needed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Resolution::Redirect { .. } => Some(StatusCode::TEMPORARY_REDIRECT),
            Resolution::Legacy { .. } => Some(StatusCode::PERMANENT_REDIRECT),
            Resolution::Bypass | Resolution::Localized(_) => None,
        }
    }
}

/// Computes the canonical locale-prefixed path for a request.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    bypass_prefixes: Vec<String>,
}

impl LocaleResolver {
    pub fn new(bypass_prefixes: Vec<String>) -> Self {
        Self { bypass_prefixes }
    }

    pub fn from_config(config: &LocaleConfig) -> Self {
        Self::new(config.bypass_prefixes.clone())
    }

    pub fn resolve(
        &self,
        path: &str,
        cookie: Option<&str>,
        accept_language: Option<&str>,
    ) -> Resolution {
        if let Some(location) = legacy_rewrite(path) {
            return Resolution::Legacy { location };
        }

        if self.is_bypassed(path) {
            return Resolution::Bypass;
        }

        if let Some(locale) = leading_locale(path) {
            return Resolution::Localized(locale);
        }

        let locale = preferred_locale(cookie, accept_language);
        let location = if path == "/" {
            format!("/{}", locale)
        } else {
            format!("/{}{}", locale, path)
        };
        Resolution::Redirect { location, locale }
    }

    fn is_bypassed(&self, path: &str) -> bool {
        self.bypass_prefixes.iter().any(|p| bypass_matches(p, path)) || has_extension(path)
    }
}

/// `/api*` is a raw prefix; `/health` matches whole segments only.
fn bypass_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => path
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
    }
}

/// Cookie preference, then Accept-Language, then the default.
pub fn preferred_locale(cookie: Option<&str>, accept_language: Option<&str>) -> Locale {
    cookie
        .and_then(Locale::from_alias)
        .or_else(|| accept_language.and_then(negotiate))
        .unwrap_or_default()
}

/// `/rs` → `/sr`, `/rs/x` → `/sr/x`. Only the leading segment is touched.
pub fn legacy_rewrite(path: &str) -> Option<String> {
    if path == "/rs" {
        return Some("/sr".to_string());
    }
    path.strip_prefix("/rs/").map(|rest| format!("/sr/{}", rest))
}

fn leading_locale(path: &str) -> Option<Locale> {
    let segment = path.strip_prefix('/')?.split('/').next()?;
    Locale::from_code(segment)
}

/// True when the last path segment ends in `.ext` (alphanumeric extension).
fn has_extension(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or(path);
    match last.rsplit_once('.') {
        Some((_, ext)) => !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}
