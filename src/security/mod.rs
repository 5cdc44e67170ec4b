//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Form submission:
//!     → rate_limit.rs (ClientKey → fixed-window check)
//!     → handler (only when allowed)
//! ```
//!
//! # Design Decisions
//! - One deliberate rejection: 429 with `Retry-After`
//! - Fail open: a broken counter store never blocks a request
//! - Request body size capped by the router's body limit layer

pub mod rate_limit;

pub use rate_limit::{ClientKey, RateDecision, RateLimiter, MAX_REQUESTS, WINDOW};
