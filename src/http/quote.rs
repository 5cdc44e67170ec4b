//! `POST /api/quote`.

use axum::{body::Bytes, Json};

use crate::error::ApiError;
use crate::quoting::{self, Quote, QuoteRequest};

pub async fn create_quote(body: Bytes) -> Result<Json<Quote>, ApiError> {
    let request: QuoteRequest = serde_json::from_slice(&body).map_err(|_| ApiError::BadJson)?;
    Ok(Json(quoting::quote(&request)))
}
