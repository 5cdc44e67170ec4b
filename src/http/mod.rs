//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout, body limit)
//!     → locale middleware (redirect or pass through)
//!     → API handlers (contact, autosave, quote, locale switch, health)
//!       or ServeDir for pre-rendered pages
//!     → Send to client
//! ```

pub mod quote;
pub mod server;

pub use server::{AppState, SiteServer};
