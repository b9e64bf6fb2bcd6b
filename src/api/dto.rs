//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Domain types that already serialize cleanly (transactions, budgets,
//! the dashboard summary, import previews) are returned as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::import::ColumnMapping;
use crate::storage::{NewTransaction, TransactionKind, YearMonth};

// ============================================
// COMMON
// ============================================

/// `?month=YYYY-MM` filter
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    #[serde(default)]
    pub month: Option<YearMonth>,
}

/// List wrapper with a count
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize> {
    pub total: usize,
    pub items: Vec<T>,
}

impl<T: Serialize> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

// ============================================
// TRANSACTION DTOs
// ============================================

/// New transaction request
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub date: NaiveDate,
    pub payee: String,
    /// Positive amount; direction comes from `kind`
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
}

impl From<CreateTransactionRequest> for NewTransaction {
    fn from(req: CreateTransactionRequest) -> Self {
        NewTransaction::new(req.date, req.payee, req.amount, req.kind, req.category)
    }
}

// ============================================
// BUDGET DTOs
// ============================================

/// Budget upsert request, keyed by month and category
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    pub month: YearMonth,
    pub category: String,
    pub amount: f64,
}

/// Recompute request; without `from`, runs the catch-up instead
#[derive(Debug, Default, Deserialize)]
pub struct RecomputeRequest {
    #[serde(default)]
    pub from: Option<YearMonth>,
}

#[derive(Debug, Serialize)]
pub struct RecomputeResponse {
    pub months_processed: usize,
    pub last_processed: Option<YearMonth>,
}

// ============================================
// GOAL DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub name: String,
    pub target: f64,
    #[serde(default)]
    pub due: Option<NaiveDate>,
}

/// Progress to add; negative values withdraw
#[derive(Debug, Deserialize)]
pub struct GoalProgressRequest {
    pub amount: f64,
}

// ============================================
// HOLDING DTOs
// ============================================

/// Asset, liability or investment
#[derive(Debug, Deserialize)]
pub struct CreateHoldingRequest {
    pub name: String,
    pub value: f64,
}

// ============================================
// NET WORTH DTOs
// ============================================

/// Sparkline size in pixels
#[derive(Debug, Deserialize)]
pub struct SparklineQuery {
    #[serde(default = "default_sparkline_width")]
    pub width: f64,
    #[serde(default = "default_sparkline_height")]
    pub height: f64,
}

fn default_sparkline_width() -> f64 {
    320.0
}

fn default_sparkline_height() -> f64 {
    96.0
}

#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    /// Months filled in
    pub filled: usize,
}

// ============================================
// IMPORT DTOs
// ============================================

/// CSV text plus an optional explicit mapping
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub csv: String,
    #[serde(default)]
    pub mapping: Option<ColumnMapping>,
}

// ============================================
// QUEUE DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy", "degraded", or "unhealthy"
    pub status: String,
    /// Finance store status
    pub storage: String,
    /// "configured" or "disabled"
    pub remote: String,
    /// Actions waiting in the offline queue
    pub queued_actions: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
