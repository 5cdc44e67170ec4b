//! Locale-prefixed routing.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, `lang` cookie, Accept-Language)
//!     → middleware.rs (extract inputs, apply decision)
//!     → resolver.rs (legacy /rs rule, bypass, already-localized, selection)
//!     → accept_language.rs (header negotiation)
//!     → cookie.rs (persist the chosen locale)
//! ```
//!
//! # Design Decisions
//! - Supported set is closed: en, hu, sr (`rs` is a legacy alias of `sr`)
//! - A path that already carries a locale is never rewritten passively
//! - Nothing here can fail; unparseable input falls through to the default

pub mod accept_language;
pub mod cookie;
pub mod middleware;
pub mod resolver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use middleware::{locale_middleware, switch_locale, LocaleState};
pub use resolver::{LocaleResolver, Resolution};

/// A supported site language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Hu,
    Sr,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Hu, Locale::Sr];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Hu => "hu",
            Locale::Sr => "sr",
        }
    }

    /// Exact match against a canonical code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == code)
    }

    /// Like [`Locale::from_code`], also accepting legacy aliases.
    pub fn from_alias(code: &str) -> Option<Self> {
        match code {
            "rs" => Some(Locale::Sr),
            other => Self::from_code(other),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale '{0}'")]
pub struct UnsupportedLocale(pub String);

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_alias(s).ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}
