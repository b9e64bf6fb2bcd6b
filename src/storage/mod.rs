//! Fintrack Storage
//!
//! This module provides persistence for the tracker:
//!
//! - **types**: Records (Transaction, Budget, Rollover, Goal, Holding, NetWorthSnapshot, Settings)
//! - **month**: `YearMonth` calendar arithmetic used as the key for monthly records
//! - **store**: SQLite-backed `FinanceStore` with one table per record kind
//! - **local**: JSON key/value `LocalStore` for small client-side state
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use fintrack::storage::{Budget, FinanceStore, NewTransaction, TransactionKind, YearMonth};
//! use chrono::NaiveDate;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = FinanceStore::open(std::path::Path::new("./data"))?;
//!
//!     let month: YearMonth = "2024-01".parse()?;
//!     store.upsert_budget(&Budget::new(month, "Dining", 150.0))?;
//!
//!     let date = NaiveDate::from_ymd_opt(2024, 1, 12).unwrap();
//!     store.insert_transaction(NewTransaction::new(
//!         date, "Coffee Shop", 4.5, TransactionKind::Expense, "Dining",
//!     ))?;
//!
//!     let spent = store.spent_by_category(month)?;
//!     println!("Dining: {:?}", spent.get("Dining"));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod local;
pub mod month;
pub mod store;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use local::LocalStore;
pub use month::{MonthRange, YearMonth};
pub use store::{
    FinanceStore, SETTING_CATEGORIES, SETTING_CURRENCY, SETTING_ROLLOVER_ENABLED,
    SETTING_ROLLOVER_LAST_PROCESSED,
};
pub use types::{
    month_category_id, round_cents, Budget, Goal, Holding, HoldingKind, NetWorthSnapshot,
    NewTransaction, Rollover, Settings, Transaction, TransactionKind,
};
