//! Persisted queue and its sequential flush.

use super::{ActionHandler, QueueError, QueuedAction};
use crate::storage::LocalStore;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// `LocalStore` key holding the queued actions
pub const QUEUE_KEY: &str = "queue";

/// Outcome of one flush
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct FlushSummary {
    /// Actions delivered and removed
    pub processed: usize,
    /// Actions still queued afterwards
    pub remaining: usize,
}

/// Queue of actions persisted in a `LocalStore`
pub struct OfflineQueue {
    local: Arc<LocalStore>,
    // guards read-modify-write of the persisted array
    edit: Mutex<()>,
    // one flush at a time
    flush: tokio::sync::Mutex<()>,
}

impl OfflineQueue {
    pub fn new(local: Arc<LocalStore>) -> Self {
        Self {
            local,
            edit: Mutex::new(()),
            flush: tokio::sync::Mutex::new(()),
        }
    }

    fn edit_guard(&self) -> MutexGuard<'_, ()> {
        match self.edit.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Queued actions, oldest first
    pub fn list(&self) -> Vec<QueuedAction> {
        self.local.get(QUEUE_KEY)
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    /// Append an action to the end of the queue
    pub fn enqueue(&self, kind: &str, payload: Value) -> Result<QueuedAction, QueueError> {
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(QueueError::EmptyKind);
        }
        let action = QueuedAction::new(kind, payload);

        let _guard = self.edit_guard();
        let mut queue = self.list();
        queue.push(action.clone());
        if !self.local.set(QUEUE_KEY, &queue) {
            return Err(QueueError::Persist(format!(
                "could not write {}",
                self.local.path().display()
            )));
        }
        tracing::debug!(local_id = %action.local_id, kind = %action.kind, "Action queued");
        Ok(action)
    }

    /// Deliver every queued action through `handler`, strictly one after another.
    ///
    /// Delivered actions are removed; failed ones stay in their original order.
    /// Actions enqueued while the flush runs are kept for the next one.
    pub async fn flush(&self, handler: &dyn ActionHandler) -> FlushSummary {
        let _flight = self.flush.lock().await;

        let pending = self.list();
        if pending.is_empty() {
            return FlushSummary::default();
        }

        let mut delivered = HashSet::new();
        for action in &pending {
            match handler.handle(action).await {
                Ok(()) => {
                    delivered.insert(action.local_id.clone());
                }
                Err(e) => {
                    tracing::warn!(
                        local_id = %action.local_id,
                        kind = %action.kind,
                        error = %e,
                        "Queued action failed, keeping it"
                    );
                }
            }
        }

        let remaining = {
            let _guard = self.edit_guard();
            let kept: Vec<QueuedAction> = self
                .list()
                .into_iter()
                .filter(|a| !delivered.contains(&a.local_id))
                .collect();
            if !delivered.is_empty() && !self.local.set(QUEUE_KEY, &kept) {
                tracing::error!(
                    delivered = delivered.len(),
                    "Could not persist queue after flush; delivered actions may be sent again"
                );
            }
            kept.len()
        };

        tracing::info!(processed = delivered.len(), remaining, "Queue flushed");
        FlushSummary {
            processed: delivered.len(),
            remaining,
        }
    }
}
