//! Fintrack Ledger
//!
//! Derived finance data and the rules that keep it consistent:
//!
//! - **clock**: source of "today" (system or fixed for tests)
//! - **rollover**: monthly carry-forward of unspent budget
//! - **networth**: monthly net worth snapshots over a trailing window
//! - **sparkline**: chart layout and SVG rendering of the snapshot history
//! - **dashboard**: budget status and month summary
//! - **service**: `Ledger`, the façade the API and CLI go through

pub mod clock;
pub mod dashboard;
pub mod networth;
pub mod rollover;
pub mod service;
pub mod sparkline;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard::{budget_status, BudgetStatus, DashboardSummary, RECENT_TRANSACTIONS};
pub use networth::{current_net_worth, NetWorthSummary, DEFAULT_HISTORY_MONTHS};
pub use rollover::{carry_forward, recompute_month, recompute_range};
pub use service::{normalize_currency, CatchUpReport, Ledger, LedgerOptions, SettingsUpdate};
pub use sparkline::{format_money, ChartPoint, LabelBox, SparklineLayout, Theme};
