//! # Fintrack
//!
//! Local-first personal finance tracking: budgets that carry unspent money
//! into the next month, a monthly net worth history, bank CSV import with
//! column and date-format inference, and an offline queue that replays
//! actions to a remote once it is reachable.
//!
//! ## Modules
//!
//! - [`storage`]: Domain types, SQLite finance store and JSON key/value store
//! - [`ledger`]: Rollover engine, net worth history, sparkline and dashboard
//! - [`import`]: CSV format detection, mapping inference and import
//! - [`queue`]: Persisted offline action queue
//! - [`remote`]: REST client that delivers queued actions
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fintrack::ledger::{Ledger, LedgerOptions};
//! use fintrack::storage::{NewTransaction, TransactionKind};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = Ledger::open(Path::new("./fintrack_data"), LedgerOptions::default())?;
//!
//!     // Budget 300 for groceries this month
//!     let month = ledger.clock().current_month();
//!     ledger.set_budget(month, "Groceries", 300.0).await?;
//!
//!     // Record spending; rollovers are kept in step automatically
//!     let today = ledger.clock().today();
//!     ledger
//!         .add_transaction(NewTransaction::new(
//!             today,
//!             "Corner Shop",
//!             42.10,
//!             TransactionKind::Expense,
//!             "Groceries",
//!         ))
//!         .await?;
//!
//!     let summary = ledger.dashboard().await?;
//!     println!("Spent {} this month", summary.expenses);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod import;
pub mod ledger;
pub mod queue;
pub mod remote;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    Budget, FinanceStore, Goal, Holding, HoldingKind, LocalStore, NetWorthSnapshot,
    NewTransaction, Rollover, Settings, StorageError, StorageResult, Transaction,
    TransactionKind, YearMonth,
};

pub use ledger::{
    BudgetStatus, CatchUpReport, Clock, DashboardSummary, FixedClock, Ledger, LedgerOptions,
    NetWorthSummary, SettingsUpdate, SparklineLayout, SystemClock, Theme,
};

pub use import::{ColumnMapping, CsvImporter, DateOrderSetting, ImportError, ImportPreview};

pub use queue::{ActionHandler, FlushSummary, OfflineQueue, QueueError, QueuedAction};

pub use remote::{RemoteClient, RemoteConfig, RemoteError};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
