//! Month summaries shown on the dashboard and budget tabs.

use crate::storage::{round_cents, FinanceStore, StorageResult, Transaction, YearMonth};
use serde::Serialize;
use std::collections::HashMap;

/// Number of transactions listed on the dashboard
pub const RECENT_TRANSACTIONS: usize = 5;

/// One envelope's standing for a month
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BudgetStatus {
    pub category: String,
    pub budgeted: f64,
    /// Carried in from the previous month
    pub rollover: f64,
    pub spent: f64,
    pub available: f64,
    /// Spent as a percentage of budget plus rollover
    pub percent_used: f64,
}

impl BudgetStatus {
    pub fn is_overspent(&self) -> bool {
        self.available < 0.0
    }
}

/// Budget status for every budgeted category in `month`.
/// With `include_rollover` off, incoming rollovers count as zero.
pub fn budget_status(
    store: &FinanceStore,
    month: YearMonth,
    include_rollover: bool,
) -> StorageResult<Vec<BudgetStatus>> {
    let budgets = store.budgets_for_month(month)?;
    let spent = store.spent_by_category(month)?;
    let incoming: HashMap<String, f64> = if include_rollover {
        store
            .rollovers_for_month(month)?
            .into_iter()
            .map(|r| (r.category, r.amount))
            .collect()
    } else {
        HashMap::new()
    };

    Ok(budgets
        .into_iter()
        .map(|budget| {
            let rollover = incoming.get(&budget.category).copied().unwrap_or(0.0);
            let used = round_cents(spent.get(&budget.category).copied().unwrap_or(0.0));
            let envelope = budget.amount + rollover;
            let percent_used = if envelope > 0.0 {
                round_cents(used / envelope * 100.0)
            } else if used > 0.0 {
                100.0
            } else {
                0.0
            };
            BudgetStatus {
                category: budget.category,
                budgeted: budget.amount,
                rollover,
                spent: used,
                available: round_cents(envelope - used),
                percent_used,
            }
        })
        .collect())
}

/// Dashboard tab contents
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    pub month: YearMonth,
    pub currency: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub net_worth: f64,
    pub budgets: Vec<BudgetStatus>,
    pub recent_transactions: Vec<Transaction>,
}

impl DashboardSummary {
    pub fn build(
        store: &FinanceStore,
        month: YearMonth,
        currency: &str,
        net_worth: f64,
        include_rollover: bool,
    ) -> StorageResult<Self> {
        let (income, expenses) = store.month_totals(month)?;
        let mut recent = store.list_transactions(None)?;
        recent.truncate(RECENT_TRANSACTIONS);

        Ok(Self {
            month,
            currency: currency.to_string(),
            income: round_cents(income),
            expenses: round_cents(expenses),
            net: round_cents(income - expenses),
            net_worth,
            budgets: budget_status(store, month, include_rollover)?,
            recent_transactions: recent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Budget, NewTransaction, Rollover, TransactionKind};
    use chrono::NaiveDate;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn seeded() -> FinanceStore {
        let mut store = FinanceStore::open_in_memory().unwrap();
        let mar = ym("2024-03");
        store.upsert_budget(&Budget::new(mar, "Dining", 100.0)).unwrap();
        store.upsert_budget(&Budget::new(mar, "Groceries", 50.0)).unwrap();
        store
            .replace_rollovers(mar, &[Rollover::new(mar, "Dining", 25.0)])
            .unwrap();
        for (day, payee, amount, kind, category) in [
            (2, "Bistro", 75.0, TransactionKind::Expense, "Dining"),
            (4, "Market", 80.0, TransactionKind::Expense, "Groceries"),
            (5, "Employer", 2000.0, TransactionKind::Income, "Salary"),
            (6, "Savings", 300.0, TransactionKind::Transfer, "Savings"),
        ] {
            store
                .insert_transaction(NewTransaction::new(
                    NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                    payee,
                    amount,
                    kind,
                    category,
                ))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_budget_status_includes_rollover() {
        let store = seeded();
        let status = budget_status(&store, ym("2024-03"), true).unwrap();
        let dining = status.iter().find(|s| s.category == "Dining").unwrap();
        assert_eq!(dining.rollover, 25.0);
        assert_eq!(dining.available, 50.0);
        assert_eq!(dining.percent_used, 60.0);

        let groceries = status.iter().find(|s| s.category == "Groceries").unwrap();
        assert!(groceries.is_overspent());
        assert_eq!(groceries.available, -30.0);
    }

    #[test]
    fn test_budget_status_without_rollover() {
        let store = seeded();
        let status = budget_status(&store, ym("2024-03"), false).unwrap();
        let dining = status.iter().find(|s| s.category == "Dining").unwrap();
        assert_eq!(dining.rollover, 0.0);
        assert_eq!(dining.available, 25.0);
    }

    #[test]
    fn test_dashboard_totals_ignore_transfers() {
        let store = seeded();
        let summary = DashboardSummary::build(&store, ym("2024-03"), "USD", 1234.0, true).unwrap();
        assert_eq!(summary.income, 2000.0);
        assert_eq!(summary.expenses, 155.0);
        assert_eq!(summary.net, 1845.0);
        assert_eq!(summary.recent_transactions.len(), 4);
        assert_eq!(summary.recent_transactions[0].payee, "Savings");
    }
}
