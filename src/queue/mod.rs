//! Offline Action Queue
//!
//! Actions taken while the remote is unreachable are buffered in the local
//! key/value store and replayed later, one at a time, through an
//! `ActionHandler`. Failed actions stay queued in their original order.

mod offline;

pub use offline::{FlushSummary, OfflineQueue, QUEUE_KEY};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// An action waiting to be sent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedAction {
    /// Client-side id, stable across flush attempts
    pub local_id: String,
    /// What to do with the payload; for the REST remote, the target table
    pub kind: String,
    pub payload: Value,
    pub queued_at: DateTime<Utc>,
}

impl QueuedAction {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            kind: kind.into(),
            payload,
            queued_at: Utc::now(),
        }
    }
}

/// Delivers queued actions
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(&self, action: &QueuedAction) -> Result<(), QueueError>;
}

/// Errors that can occur while queueing or delivering actions
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Action kind cannot be empty")]
    EmptyKind,

    #[error("Failed to persist queue: {0}")]
    Persist(String),

    #[error("Handler failed: {0}")]
    Handler(String),

    #[error("Remote error: {0}")]
    Remote(#[from] crate::remote::RemoteError),
}
