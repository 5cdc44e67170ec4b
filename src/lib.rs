//! Multilingual site server library.

pub mod config;
pub mod contact;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod locale;
pub mod notify;
pub mod observability;
pub mod quoting;
pub mod security;
pub mod store;

pub use config::SiteConfig;
pub use http::SiteServer;
pub use lifecycle::Shutdown;
