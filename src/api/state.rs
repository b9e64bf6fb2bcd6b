//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::Config;
use crate::import::{CsvImporter, MappingStore};
use crate::ledger::Ledger;
use crate::queue::OfflineQueue;
use crate::remote::RemoteClient;
use crate::storage::{LocalStore, StorageResult};
use std::sync::Arc;
use std::time::Instant;

/// `LocalStore` namespace for saved CSV column mappings
pub const MAPPINGS_NAMESPACE: &str = "import";
/// `LocalStore` namespace for the offline action queue
pub const QUEUE_NAMESPACE: &str = "affirmations";

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Finance store plus rollover and net worth rules
    pub ledger: Arc<Ledger>,
    /// CSV preview/commit with remembered mappings
    pub importer: Arc<CsvImporter>,
    /// Actions waiting for the remote
    pub queue: Arc<OfflineQueue>,
    /// Remote used to flush the queue, if configured
    pub remote: Option<Arc<RemoteClient>>,
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        ledger: Arc<Ledger>,
        importer: Arc<CsvImporter>,
        queue: Arc<OfflineQueue>,
        config: Config,
    ) -> Self {
        Self {
            ledger,
            importer,
            queue,
            remote: None,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Attach a remote for queue flushes
    pub fn with_remote(mut self, remote: Arc<RemoteClient>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Open every store under the configured data directory
    pub fn open(config: Config) -> StorageResult<Self> {
        let data_dir = config.storage.data_path();
        let local_dir = config.storage.local_path();

        let ledger = Arc::new(Ledger::open(&data_dir, config.ledger_options())?);
        let importer = Arc::new(build_importer(&config, &local_dir));
        let queue = Arc::new(OfflineQueue::new(Arc::new(LocalStore::new(
            &local_dir,
            QUEUE_NAMESPACE,
        ))));

        let remote = if config.remote.is_configured() {
            match RemoteClient::new(config.remote.clone()) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::warn!(error = %e, "Remote disabled");
                    None
                }
            }
        } else {
            None
        };

        let mut state = Self::new(ledger, importer, queue, config);
        state.remote = remote;
        Ok(state)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }
}

/// Importer configured from the `[import]` section
pub fn build_importer(config: &Config, local_dir: &std::path::Path) -> CsvImporter {
    let mappings = MappingStore::new(Arc::new(LocalStore::new(local_dir, MAPPINGS_NAMESPACE)));
    CsvImporter::new(mappings)
        .with_date_order(config.import.date_order)
        .with_default_category(&config.import.default_category)
}
