//! Core data types for the finance store
//!
//! This module defines the records kept by the tracker:
//! - `Transaction`: a dated income, expense or transfer
//! - `Budget` and `Rollover`: monthly envelope amounts per category
//! - `Goal`: a savings target with progress
//! - `Holding`: an asset, liability or investment line
//! - `NetWorthSnapshot`: one net worth value per month
//! - `Settings`: categories, currency and rollover preferences

use crate::storage::month::YearMonth;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Round to whole cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Direction of money movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "transfer" => Ok(TransactionKind::Transfer),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

/// A recorded transaction. Immutable once stored; only deletion is supported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub payee: String,
    /// Always positive; direction comes from `kind`
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
}

/// Transaction fields before an id is assigned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub payee: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
}

impl NewTransaction {
    pub fn new(
        date: NaiveDate,
        payee: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date,
            payee: payee.into(),
            amount,
            kind,
            category: category.into(),
        }
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }

    /// Check amount and text fields before insertion
    pub fn validate(&self) -> Result<(), String> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err("Amount must be a positive number".to_string());
        }
        if self.payee.trim().is_empty() {
            return Err("Payee cannot be empty".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("Category cannot be empty".to_string());
        }
        Ok(())
    }

    pub(crate) fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            date: self.date,
            payee: self.payee.trim().to_string(),
            amount: round_cents(self.amount),
            kind: self.kind,
            category: self.category.trim().to_string(),
        }
    }
}

impl Transaction {
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}

/// Composite key shared by budgets and rollovers
pub fn month_category_id(month: YearMonth, category: &str) -> String {
    format!("{}-{}", month, category)
}

/// Planned spending for one category in one month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    /// `<YYYY-MM>-<category>`
    pub id: String,
    pub month: YearMonth,
    pub category: String,
    pub amount: f64,
}

impl Budget {
    pub fn new(month: YearMonth, category: impl Into<String>, amount: f64) -> Self {
        let category = category.into();
        Self {
            id: month_category_id(month, &category),
            month,
            category,
            amount: round_cents(amount),
        }
    }
}

/// Unspent budget carried into `ym` from the month before. Derived, never user-entered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rollover {
    /// `<YYYY-MM>-<category>`
    pub id: String,
    pub ym: YearMonth,
    pub category: String,
    pub amount: f64,
}

impl Rollover {
    pub fn new(ym: YearMonth, category: impl Into<String>, amount: f64) -> Self {
        let category = category.into();
        Self {
            id: month_category_id(ym, &category),
            ym,
            category,
            amount,
        }
    }
}

/// A savings goal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target: f64,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub progress: f64,
}

impl Goal {
    /// Fraction of target reached, clamped to 0..=1
    pub fn completion(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.progress / self.target).clamp(0.0, 1.0)
    }
}

/// Which list a holding belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HoldingKind {
    Asset,
    Liability,
    Investment,
}

impl HoldingKind {
    pub fn all() -> &'static [HoldingKind] {
        &[
            HoldingKind::Asset,
            HoldingKind::Liability,
            HoldingKind::Investment,
        ]
    }

    /// Backing table name
    pub(crate) fn table(&self) -> &'static str {
        match self {
            HoldingKind::Asset => "assets",
            HoldingKind::Liability => "liabilities",
            HoldingKind::Investment => "investments",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HoldingKind::Asset => "Asset",
            HoldingKind::Liability => "Liability",
            HoldingKind::Investment => "Investment",
        }
    }
}

impl std::str::FromStr for HoldingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asset" | "assets" => Ok(HoldingKind::Asset),
            "liability" | "liabilities" => Ok(HoldingKind::Liability),
            "investment" | "investments" => Ok(HoldingKind::Investment),
            other => Err(format!("unknown holding kind: {}", other)),
        }
    }
}

/// A named value on one of the asset, liability or investment lists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub id: String,
    pub name: String,
    pub value: f64,
}

/// Net worth recorded for one month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetWorthSnapshot {
    /// Same as `ym` in string form
    pub id: String,
    pub ym: YearMonth,
    pub net_worth: f64,
}

impl NetWorthSnapshot {
    pub fn new(ym: YearMonth, net_worth: f64) -> Self {
        Self {
            id: ym.to_string(),
            ym,
            net_worth: round_cents(net_worth),
        }
    }
}

/// User preferences persisted as individual key/value rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    pub categories: Vec<String>,
    pub currency: String,
    pub rollover_enabled: bool,
}

impl Settings {
    pub fn default_categories() -> Vec<String> {
        [
            "Housing",
            "Groceries",
            "Dining",
            "Transport",
            "Utilities",
            "Health",
            "Entertainment",
            "Shopping",
            "Savings",
            "Other",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            categories: Self::default_categories(),
            currency: "USD".to_string(),
            rollover_enabled: true,
        }
    }
}
