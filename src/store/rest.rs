//! Durable store reached over a Redis-compatible REST interface.
//!
//! Commands are posted as JSON arrays to `{endpoint}/multi-exec`, which runs
//! them inside a single MULTI/EXEC transaction and answers with one
//! `{"result": ..}` or `{"error": ..}` object per command.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{KvStore, StoreBackend, StoreError};

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for the durable store.
#[derive(Debug, Clone)]
pub struct RestKvStore {
    client: Client,
    endpoint: String,
    token: String,
}

impl RestKvStore {
    /// Create a client for `endpoint`, authenticating with `token`.
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> Result<Self, StoreError> {
        let url = Url::parse(endpoint)?;
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(StoreError::UnsupportedEndpoint(endpoint.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: url.as_str().trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run `commands` atomically and return one result per command.
    async fn transaction(&self, commands: Vec<Vec<String>>) -> Result<Vec<Value>, StoreError> {
        let expected = commands.len();
        let response = self
            .client
            .post(format!("{}/multi-exec", self.endpoint))
            .bearer_auth(&self.token)
            .json(&commands)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status(status.as_u16()));
        }

        let replies: Vec<CommandReply> = response.json().await?;
        if replies.len() != expected {
            return Err(StoreError::UnexpectedReply(format!(
                "expected {} replies, got {}",
                expected,
                replies.len()
            )));
        }

        replies
            .into_iter()
            .map(|reply| match (reply.error, reply.result) {
                (Some(err), _) => Err(StoreError::Command(err)),
                (None, result) => Ok(result.unwrap_or(Value::Null)),
            })
            .collect()
    }
}

fn command<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn as_count(value: &Value) -> Result<u64, StoreError> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| StoreError::UnexpectedReply(value.to_string()))
}

#[async_trait]
impl KvStore for RestKvStore {
    async fn increment_window(&self, key: &str, window: Duration) -> Result<u64, StoreError> {
        let secs = window.as_secs().to_string();
        // NX: the expiry is only set when the window opens, keeping it fixed.
        let results = self
            .transaction(vec![
                command(["INCR", key]),
                command(["EXPIRE", key, &secs, "NX"]),
            ])
            .await?;

        as_count(&results[0])
    }

    async fn put_hash(
        &self,
        key: &str,
        fields: &[(&str, String)],
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut hset = Vec::with_capacity(2 + fields.len() * 2);
        hset.push("HSET".to_string());
        hset.push(key.to_string());
        for (field, value) in fields {
            hset.push(field.to_string());
            hset.push(value.clone());
        }

        let secs = ttl.as_secs().to_string();
        self.transaction(vec![hset, command(["EXPIRE", key, &secs])])
            .await?;
        Ok(())
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Durable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_normalized() {
        let store =
            RestKvStore::new("https://kv.example.com/", "t", Duration::from_secs(1)).unwrap();
        assert_eq!(store.endpoint(), "https://kv.example.com");
    }

    #[test]
    fn test_rejects_relative_endpoint() {
        assert!(matches!(
            RestKvStore::new("kv.example.com", "t", Duration::from_secs(1)),
            Err(StoreError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            RestKvStore::new("ftp://kv.example.com", "t", Duration::from_secs(1)),
            Err(StoreError::UnsupportedEndpoint(_))
        ));
    }

    #[test]
    fn test_as_count() {
        assert_eq!(as_count(&json!(3)).unwrap(), 3);
        assert_eq!(as_count(&json!("4")).unwrap(), 4);
        assert!(as_count(&json!(null)).is_err());
        assert!(as_count(&json!(-1)).is_err());
    }

    #[test]
    fn test_reply_shapes() {
        let replies: Vec<CommandReply> =
            serde_json::from_value(json!([{"result": 1}, {"error": "ERR wrong type"}])).unwrap();
        assert_eq!(replies[0].result, Some(json!(1)));
        assert_eq!(replies[1].error.as_deref(), Some("ERR wrong type"));
    }
}
