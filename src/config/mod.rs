//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults when absent)
//!     → environment overlay (store and email credentials)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → consumed once at startup to build the server state
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    EmailConfig, ListenerConfig, LocaleConfig, LogFormat, ObservabilityConfig, PagesConfig,
    RateLimitConfig, SecurityConfig, SiteConfig, StoreConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
