//! Repair quote calculator.

pub mod engine;
pub mod types;

pub use engine::{price_of, quote, CURRENCY};
pub use types::{Quote, QuoteLine, QuoteRequest, Service, SsdSize};
