//! Contact and autosave handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use serde_json::{json, Value};

use super::{honeypot_tripped, unix_millis, Draft, AUTOSAVE_TTL, CONTACT_TTL};
use crate::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::ClientKey;

/// `POST /api/contact`.
pub async fn submit_contact(
    State(state): State<AppState>,
    client: ClientKey,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let decision = state.limiter.check(client.as_str()).await;
    if !decision.allowed {
        metrics::record_contact("rate_limited");
        return Err(ApiError::RateLimited {
            retry_after_secs: state.limiter.window().as_secs(),
        });
    }

    let payload: Value = serde_json::from_slice(&body).map_err(|_| {
        metrics::record_contact("bad_json");
        ApiError::BadJson
    })?;

    if honeypot_tripped(&payload) {
        tracing::info!(client = %client.as_str(), "Honeypot filled, dropping submission");
        metrics::record_contact("honeypot");
        return Ok(Json(json!({ "ok": true, "hp": true })));
    }

    if let Some(notifier) = &state.notifier {
        if let Err(e) = notifier.notify_contact(&payload).await {
            tracing::warn!(error = %e, "Contact email send failed");
        }
    }

    if let Some(records) = &state.records {
        let ts = unix_millis();
        let key = format!("contact:{}", ts);
        let fields = [("ts", ts.to_string()), ("data", payload.to_string())];
        if let Err(e) = records.put_hash(&key, &fields, CONTACT_TTL).await {
            tracing::warn!(error = %e, key = %key, "Contact record store failed");
            metrics::record_store_error("contact");
        }
    }

    metrics::record_contact("accepted");
    Ok(Json(json!({ "ok": true, "remaining": decision.remaining })))
}

/// `POST /api/form-autosave`.
pub async fn autosave_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let raw: Value = serde_json::from_slice(&body).map_err(|_| ApiError::BadJson)?;
    // A bare `null` carries no fields to default from.
    if raw.is_null() {
        return Err(ApiError::BadJson);
    }
    let draft = Draft::from_value(&raw);

    if let Some(records) = &state.records {
        let ts = unix_millis();
        let key = format!("autosave:{}:{}", draft.selector, ts);
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let fields = [
            ("selector", draft.selector.clone()),
            ("data", draft.data.to_string()),
            ("failedSubmit", draft.failed_submit.to_string()),
            ("ts", ts.to_string()),
            ("ua", user_agent),
        ];
        if let Err(e) = records.put_hash(&key, &fields, AUTOSAVE_TTL).await {
            tracing::warn!(error = %e, key = %key, "Autosave store failed");
            metrics::record_store_error("autosave");
        }
    }

    Ok(Json(json!({ "ok": true })))
}
