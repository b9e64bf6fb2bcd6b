//! HTTP client for the REST remote.

use super::RemoteError;
use crate::queue::{ActionHandler, QueueError, QueuedAction};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Remote endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`. Empty disables the remote.
    #[serde(default)]
    pub url: String,
    /// Anonymous or service key sent as `apikey` and bearer token
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between attempts; grows with the square of the attempt
    #[serde(default = "default_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            request_timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_backoff_ms(),
        }
    }
}

impl RemoteConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// Inserts rows through the REST interface
pub struct RemoteClient {
    client: Client,
    config: RemoteConfig,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        if !config.is_configured() {
            return Err(RemoteError::NotConfigured);
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Endpoint for inserting into `table`
    pub fn table_url(&self, table: &str) -> Result<String, RemoteError> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(RemoteError::InvalidTable(table.to_string()));
        }
        Ok(format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            table
        ))
    }

    /// Check the REST root answers
    pub async fn health_check(&self) -> Result<(), RemoteError> {
        let url = format!("{}/rest/v1/", self.config.url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(RemoteError::from_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(RemoteError::Unavailable)
        }
    }

    /// Insert `row` into `table`, retrying transport failures and rate limits
    pub async fn insert(&self, table: &str, row: &Value) -> Result<(), RemoteError> {
        let url = self.table_url(table)?;
        let mut last_error = RemoteError::Unavailable;

        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                let delay = self.config.retry_backoff_ms * (attempt as u64).pow(2);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let sent = self
                .client
                .post(&url)
                .header("apikey", &self.config.api_key)
                .bearer_auth(&self.config.api_key)
                .header("Prefer", "return=minimal")
                .json(row)
                .send()
                .await;

            match sent {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if let Some(secs) = response
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                    {
                        tokio::time::sleep(Duration::from_secs(secs)).await;
                    }
                    tracing::debug!(table, attempt, "Remote rate limited");
                    last_error = RemoteError::RateLimited;
                }
                Ok(response) => {
                    let status = response.status();
                    let message = response.text().await.unwrap_or_default();
                    return Err(RemoteError::ApiError {
                        status: status.as_u16(),
                        message,
                    });
                }
                Err(e) => {
                    tracing::debug!(table, attempt, error = %e, "Remote request failed");
                    last_error = RemoteError::from_transport(e);
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl ActionHandler for RemoteClient {
    async fn handle(&self, action: &QueuedAction) -> Result<(), QueueError> {
        self.insert(&action.kind, &action.payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Captured {
        requests: Mutex<Vec<(String, HeaderMap, Value)>>,
        // statuses to answer with, in order; 201 once exhausted
        script: Mutex<Vec<u16>>,
    }

    async fn insert_row(
        State(captured): State<Arc<Captured>>,
        Path(table): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> axum::http::StatusCode {
        captured
            .requests
            .lock()
            .unwrap()
            .push((table, headers, body));
        let mut script = captured.script.lock().unwrap();
        let code = if script.is_empty() { 201 } else { script.remove(0) };
        axum::http::StatusCode::from_u16(code).unwrap()
    }

    async fn spawn_remote(script: Vec<u16>) -> (String, Arc<Captured>) {
        let captured = Arc::new(Captured {
            script: Mutex::new(script),
            ..Default::default()
        });
        let app = Router::new()
            .route("/rest/v1/:table", post(insert_row))
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    fn config(url: &str) -> RemoteConfig {
        RemoteConfig {
            url: url.to_string(),
            api_key: "anon-key".to_string(),
            retry_backoff_ms: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_unconfigured_remote_is_rejected() {
        assert!(matches!(
            RemoteClient::new(RemoteConfig::default()),
            Err(RemoteError::NotConfigured)
        ));
    }

    #[test]
    fn test_table_url() {
        let client = RemoteClient::new(config("https://demo.supabase.co/")).unwrap();
        assert_eq!(
            client.table_url("affirmations").unwrap(),
            "https://demo.supabase.co/rest/v1/affirmations"
        );
        assert!(matches!(
            client.table_url("../auth"),
            Err(RemoteError::InvalidTable(_))
        ));
    }

    #[tokio::test]
    async fn test_insert_sends_key_headers() {
        let (url, captured) = spawn_remote(vec![]).await;
        let client = RemoteClient::new(config(&url)).unwrap();

        client
            .insert("affirmations", &json!({ "text": "I am calm" }))
            .await
            .unwrap();

        let requests = captured.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (table, headers, body) = &requests[0];
        assert_eq!(table, "affirmations");
        assert_eq!(headers["apikey"], "anon-key");
        assert_eq!(headers["authorization"], "Bearer anon-key");
        assert_eq!(body["text"], "I am calm");
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let (url, captured) = spawn_remote(vec![429, 429]).await;
        let client = RemoteClient::new(config(&url)).unwrap();
        client.insert("logs", &json!({})).await.unwrap();
        assert_eq!(captured.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, captured) = spawn_remote(vec![400]).await;
        let client = RemoteClient::new(config(&url)).unwrap();
        let err = client.insert("logs", &json!({})).await.unwrap_err();
        assert!(matches!(err, RemoteError::ApiError { status: 400, .. }));
        assert_eq!(captured.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_flush_through_remote() {
        use crate::queue::OfflineQueue;
        use crate::storage::LocalStore;

        let (url, captured) = spawn_remote(vec![201, 409]).await;
        let client = RemoteClient::new(config(&url)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let queue = OfflineQueue::new(Arc::new(LocalStore::new(dir.path(), "q")));
        queue.enqueue("affirmations", json!({ "n": 1 })).unwrap();
        queue.enqueue("affirmations", json!({ "n": 2 })).unwrap();

        let summary = queue.flush(&client).await;
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.remaining, 1);
        assert_eq!(queue.list()[0].payload["n"], 2);
        assert_eq!(captured.requests.lock().unwrap().len(), 2);
    }
}
