//! Ledger service
//!
//! `Ledger` owns the finance store and a clock and is the single entry point
//! the API and CLI use for anything that must keep derived data consistent.
//! Mutations of transactions and budgets propagate rollovers forward, the
//! dashboard runs the startup catch-up and refreshes the net worth snapshot.
//!
//! The SQLite connection sits behind a synchronous mutex that is only held for
//! the duration of a store call. Rollover processing additionally takes an
//! async mutex so that concurrent catch-ups collapse into a single run: the
//! second caller waits for the first and then finds no gap.

use crate::ledger::clock::{Clock, SystemClock};
use crate::ledger::dashboard::{self, BudgetStatus, DashboardSummary};
use crate::ledger::networth::{self, NetWorthSummary, DEFAULT_HISTORY_MONTHS};
use crate::ledger::rollover;
use crate::ledger::sparkline::{SparklineLayout, Theme};
use crate::storage::{
    round_cents, Budget, FinanceStore, Goal, Holding, HoldingKind, NetWorthSnapshot,
    NewTransaction, Rollover, Settings, StorageError, StorageResult, Transaction, YearMonth,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Tunables for a `Ledger`
#[derive(Debug, Clone)]
pub struct LedgerOptions {
    /// Settings used for keys never written to the store
    pub defaults: Settings,
    /// Months of net worth history to keep
    pub history_months: usize,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            defaults: Settings::default(),
            history_months: DEFAULT_HISTORY_MONTHS,
        }
    }
}

/// Outcome of a rollover catch-up run
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatchUpReport {
    pub enabled: bool,
    /// First month processed, if any
    pub from: Option<YearMonth>,
    /// Last complete month
    pub through: YearMonth,
    pub months_processed: usize,
}

/// Partial settings update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub rollover_enabled: Option<bool>,
}

/// Finance store plus the rules that keep derived records in step
pub struct Ledger {
    store: Mutex<FinanceStore>,
    clock: Arc<dyn Clock>,
    options: LedgerOptions,
    catch_up: tokio::sync::Mutex<()>,
}

impl Ledger {
    pub fn new(store: FinanceStore, clock: Arc<dyn Clock>, options: LedgerOptions) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
            options,
            catch_up: tokio::sync::Mutex::new(()),
        }
    }

    /// Open the on-disk store under `data_dir` using the system clock
    pub fn open(data_dir: &Path, options: LedgerOptions) -> StorageResult<Self> {
        let store = FinanceStore::open(data_dir)?;
        Ok(Self::new(store, Arc::new(SystemClock), options))
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn options(&self) -> &LedgerOptions {
        &self.options
    }

    fn store(&self) -> StorageResult<MutexGuard<'_, FinanceStore>> {
        self.store
            .lock()
            .map_err(|_| StorageError::Lock("finance store mutex poisoned".to_string()))
    }

    /// Cheap query used by readiness checks
    pub fn ping(&self) -> StorageResult<u64> {
        self.store()?.transaction_count()
    }

    // ============================================
    // ROLLOVERS
    // ============================================

    /// Replay rollover computation for every complete month not yet processed.
    ///
    /// Safe to call any number of times: once caught up, it does nothing.
    pub async fn ensure_rollover_processing(&self) -> StorageResult<CatchUpReport> {
        let _flight = self.catch_up.lock().await;
        let through = self.clock.previous_month();

        let mut store = self.store()?;
        if !self.rollover_enabled(&store)? {
            return Ok(CatchUpReport {
                enabled: false,
                from: None,
                through,
                months_processed: 0,
            });
        }

        let report = match rollover::pending_start(&store)? {
            Some(from) if from <= through => {
                let months_processed = rollover::recompute_range(&mut store, from, through)?;
                CatchUpReport {
                    enabled: true,
                    from: Some(from),
                    through,
                    months_processed,
                }
            }
            Some(_) => CatchUpReport {
                enabled: true,
                from: None,
                through,
                months_processed: 0,
            },
            None => {
                // nothing budgeted yet; start counting from here
                store.set_setting(crate::storage::SETTING_ROLLOVER_LAST_PROCESSED, &through)?;
                CatchUpReport {
                    enabled: true,
                    from: None,
                    through,
                    months_processed: 0,
                }
            }
        };

        if report.months_processed > 0 {
            tracing::info!(
                from = ?report.from.map(|m| m.to_string()),
                through = %through,
                months = report.months_processed,
                "Rollover catch-up complete"
            );
        }
        Ok(report)
    }

    /// Recompute rollovers from `month` forward through the last complete month.
    ///
    /// Starts earlier than `month` when an unprocessed gap precedes it.
    /// Returns the number of months processed.
    pub async fn recompute_rollovers_from(&self, month: YearMonth) -> StorageResult<usize> {
        let _flight = self.catch_up.lock().await;
        let through = self.clock.previous_month();

        let mut store = self.store()?;
        if !self.rollover_enabled(&store)? {
            rollover::mark_stale_from(&mut store, month)?;
            return Ok(0);
        }
        let start = match rollover::pending_start(&store)? {
            Some(pending) => pending.min(month),
            None => month,
        };
        if start > through {
            return Ok(0);
        }
        rollover::recompute_range(&mut store, start, through)
    }

    fn rollover_enabled(&self, store: &FinanceStore) -> StorageResult<bool> {
        Ok(store
            .get_setting(crate::storage::SETTING_ROLLOVER_ENABLED)?
            .unwrap_or(self.options.defaults.rollover_enabled))
    }

    /// Rollovers carried into `month`, or all of them
    pub fn rollovers(&self, month: Option<YearMonth>) -> StorageResult<Vec<Rollover>> {
        let store = self.store()?;
        match month {
            Some(m) => store.rollovers_for_month(m),
            None => store.list_rollovers(),
        }
    }

    pub fn last_processed_month(&self) -> StorageResult<Option<YearMonth>> {
        rollover::last_processed(&*self.store()?)
    }

    // ============================================
    // TRANSACTIONS
    // ============================================

    pub async fn add_transaction(&self, new: NewTransaction) -> StorageResult<Transaction> {
        let tx = self.store()?.insert_transaction(new)?;
        tracing::debug!(id = %tx.id, date = %tx.date, kind = %tx.kind, "Transaction added");
        self.recompute_rollovers_from(tx.month()).await?;
        Ok(tx)
    }

    pub async fn delete_transaction(&self, id: &str) -> StorageResult<Transaction> {
        let tx = self.store()?.delete_transaction(id)?;
        tracing::debug!(id = %tx.id, "Transaction deleted");
        self.recompute_rollovers_from(tx.month()).await?;
        Ok(tx)
    }

    /// Insert a batch atomically, then propagate from the earliest month touched
    pub async fn import_transactions(
        &self,
        rows: Vec<NewTransaction>,
    ) -> StorageResult<Vec<Transaction>> {
        let earliest = rows.iter().map(NewTransaction::month).min();
        let inserted = self.store()?.insert_transactions(rows)?;
        if let Some(month) = earliest {
            self.recompute_rollovers_from(month).await?;
        }
        tracing::info!(count = inserted.len(), "Imported transactions");
        Ok(inserted)
    }

    pub fn transactions(&self, month: Option<YearMonth>) -> StorageResult<Vec<Transaction>> {
        self.store()?.list_transactions(month)
    }

    // ============================================
    // BUDGETS
    // ============================================

    pub async fn set_budget(
        &self,
        month: YearMonth,
        category: &str,
        amount: f64,
    ) -> StorageResult<Budget> {
        let budget = Budget::new(month, category.trim(), amount);
        self.store()?.upsert_budget(&budget)?;
        self.recompute_rollovers_from(month).await?;
        Ok(budget)
    }

    pub async fn delete_budget(&self, id: &str) -> StorageResult<Budget> {
        let budget = self.store()?.delete_budget(id)?;
        self.recompute_rollovers_from(budget.month).await?;
        Ok(budget)
    }

    pub fn budgets(&self, month: Option<YearMonth>) -> StorageResult<Vec<Budget>> {
        let store = self.store()?;
        match month {
            Some(m) => store.budgets_for_month(m),
            None => store.list_budgets(),
        }
    }

    pub fn budget_status(&self, month: YearMonth) -> StorageResult<Vec<BudgetStatus>> {
        let store = self.store()?;
        let enabled = self.rollover_enabled(&store)?;
        dashboard::budget_status(&store, month, enabled)
    }

    // ============================================
    // GOALS
    // ============================================

    pub fn add_goal(&self, name: &str, target: f64, due: Option<NaiveDate>) -> StorageResult<Goal> {
        self.store()?.insert_goal(name, target, due)
    }

    /// Add `amount` to a goal's progress (negative amounts withdraw, floored at zero)
    pub fn add_goal_progress(&self, id: &str, amount: f64) -> StorageResult<Goal> {
        if !amount.is_finite() {
            return Err(StorageError::Validation(
                "Progress amount must be a finite number".to_string(),
            ));
        }
        let mut store = self.store()?;
        let goal = store
            .get_goal(id)?
            .ok_or_else(|| StorageError::not_found("Goal", id))?;
        store.set_goal_progress(id, round_cents((goal.progress + amount).max(0.0)))
    }

    pub fn reset_goal(&self, id: &str) -> StorageResult<Goal> {
        self.store()?.set_goal_progress(id, 0.0)
    }

    pub fn delete_goal(&self, id: &str) -> StorageResult<()> {
        self.store()?.delete_goal(id)
    }

    pub fn goals(&self) -> StorageResult<Vec<Goal>> {
        self.store()?.list_goals()
    }

    // ============================================
    // HOLDINGS
    // ============================================

    pub fn add_holding(&self, kind: HoldingKind, name: &str, value: f64) -> StorageResult<Holding> {
        self.store()?.insert_holding(kind, name, round_cents(value))
    }

    pub fn delete_holding(&self, kind: HoldingKind, id: &str) -> StorageResult<()> {
        self.store()?.delete_holding(kind, id)
    }

    pub fn holdings(&self, kind: HoldingKind) -> StorageResult<Vec<Holding>> {
        self.store()?.list_holdings(kind)
    }

    // ============================================
    // NET WORTH
    // ============================================

    pub fn net_worth(&self) -> StorageResult<f64> {
        networth::current_net_worth(&*self.store()?)
    }

    /// Record this month's net worth, replacing any earlier value for the month
    pub fn ensure_current_month_snapshot(&self) -> StorageResult<NetWorthSnapshot> {
        let month = self.clock.current_month();
        networth::record_snapshot(&mut *self.store()?, month, self.options.history_months)
    }

    /// Snapshots ascending by month
    pub fn history(&self) -> StorageResult<Vec<NetWorthSnapshot>> {
        self.store()?.list_snapshots()
    }

    pub fn rebuild_history(&self) -> StorageResult<usize> {
        let month = self.clock.current_month();
        networth::rebuild_history(&mut *self.store()?, month, self.options.history_months)
    }

    pub fn net_worth_summary(&self) -> StorageResult<NetWorthSummary> {
        Ok(NetWorthSummary::from_snapshots(self.history()?))
    }

    /// Render the snapshot history as an SVG sparkline
    pub fn sparkline_svg(&self, width: f64, height: f64, theme: &Theme) -> StorageResult<String> {
        let currency = self.settings()?.currency;
        let layout = SparklineLayout::compute(&self.history()?, width, height, &currency);
        Ok(layout.render_svg(theme))
    }

    // ============================================
    // SETTINGS
    // ============================================

    pub fn settings(&self) -> StorageResult<Settings> {
        self.store()?.load_settings(&self.options.defaults)
    }

    /// Apply a partial update. Turning rollover back on resumes catch-up from
    /// the last processed month, which edits made while it was off have
    /// already pulled back.
    pub async fn update_settings(&self, update: SettingsUpdate) -> StorageResult<Settings> {
        let (settings, resumed) = {
            let mut store = self.store()?;
            let mut settings = store.load_settings(&self.options.defaults)?;
            let was_enabled = settings.rollover_enabled;

            if let Some(categories) = update.categories {
                settings.categories = normalize_categories(categories)?;
            }
            if let Some(currency) = update.currency {
                settings.currency = normalize_currency(&currency)?;
            }
            if let Some(enabled) = update.rollover_enabled {
                settings.rollover_enabled = enabled;
            }
            store.save_settings(&settings)?;
            (settings.clone(), !was_enabled && settings.rollover_enabled)
        };

        tracing::info!(
            currency = %settings.currency,
            categories = settings.categories.len(),
            rollover_enabled = settings.rollover_enabled,
            "Settings updated"
        );
        if resumed {
            self.ensure_rollover_processing().await?;
        }
        Ok(settings)
    }

    // ============================================
    // DASHBOARD
    // ============================================

    /// Catch up rollovers, refresh this month's snapshot and summarize the month
    pub async fn dashboard(&self) -> StorageResult<DashboardSummary> {
        self.ensure_rollover_processing().await?;
        let snapshot = self.ensure_current_month_snapshot()?;

        let store = self.store()?;
        let settings = store.load_settings(&self.options.defaults)?;
        DashboardSummary::build(
            &store,
            self.clock.current_month(),
            &settings.currency,
            snapshot.net_worth,
            settings.rollover_enabled,
        )
    }
}

fn normalize_categories(categories: Vec<String>) -> StorageResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(categories.len());
    for category in categories {
        let category = category.trim();
        if !category.is_empty() && !out.iter().any(|c| c.eq_ignore_ascii_case(category)) {
            out.push(category.to_string());
        }
    }
    if out.is_empty() {
        return Err(StorageError::Validation(
            "At least one category is required".to_string(),
        ));
    }
    Ok(out)
}

/// Upper-cased 3-letter ISO currency code
pub fn normalize_currency(currency: &str) -> StorageResult<String> {
    let code = currency.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(StorageError::Validation(format!(
            "Currency must be a 3-letter ISO code, got '{}'",
            currency
        )));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::clock::FixedClock;
    use crate::storage::TransactionKind;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_at(today: NaiveDate) -> (Ledger, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(today));
        let store = FinanceStore::open_in_memory().unwrap();
        let ledger = Ledger::new(store, clock.clone(), LedgerOptions::default());
        (ledger, clock)
    }

    fn expense(d: NaiveDate, amount: f64, category: &str) -> NewTransaction {
        NewTransaction::new(d, "Shop", amount, TransactionKind::Expense, category)
    }

    fn carried(ledger: &Ledger, month: &str, category: &str) -> Option<f64> {
        ledger
            .rollovers(Some(ym(month)))
            .unwrap()
            .into_iter()
            .find(|r| r.category == category)
            .map(|r| r.amount)
    }

    #[tokio::test]
    async fn test_catch_up_after_inactivity() {
        let (ledger, clock) = ledger_at(date(2024, 2, 10));
        for month in ["2024-01", "2024-02", "2024-03", "2024-04", "2024-05"] {
            ledger.set_budget(ym(month), "Dining", 100.0).await.unwrap();
        }
        assert_eq!(carried(&ledger, "2024-02", "Dining"), Some(100.0));
        assert_eq!(ledger.last_processed_month().unwrap(), Some(ym("2024-01")));

        // four months pass without the app being opened
        clock.set(date(2024, 6, 1));
        let report = ledger.ensure_rollover_processing().await.unwrap();
        assert_eq!(report.from, Some(ym("2024-02")));
        assert_eq!(report.months_processed, 4);
        assert_eq!(carried(&ledger, "2024-06", "Dining"), Some(500.0));
        assert_eq!(ledger.last_processed_month().unwrap(), Some(ym("2024-05")));

        let again = ledger.ensure_rollover_processing().await.unwrap();
        assert_eq!(again.months_processed, 0);
    }

    #[tokio::test]
    async fn test_concurrent_catch_up_runs_once() {
        let (ledger, clock) = ledger_at(date(2024, 1, 5));
        ledger.set_budget(ym("2023-09"), "Dining", 50.0).await.unwrap();
        clock.set(date(2024, 5, 5));

        let ledger = Arc::new(ledger);
        let (a, b) = tokio::join!(
            ledger.ensure_rollover_processing(),
            ledger.ensure_rollover_processing()
        );
        let total = a.unwrap().months_processed + b.unwrap().months_processed;
        assert_eq!(total, 4);
        assert_eq!(ledger.last_processed_month().unwrap(), Some(ym("2024-04")));
    }

    #[tokio::test]
    async fn test_mutation_leaves_earlier_months_unchanged() {
        let (ledger, _clock) = ledger_at(date(2024, 4, 15));
        for month in ["2024-01", "2024-02", "2024-03"] {
            ledger.set_budget(ym(month), "Dining", 100.0).await.unwrap();
        }
        ledger
            .add_transaction(expense(date(2024, 1, 8), 40.0, "Dining"))
            .await
            .unwrap();
        let before = carried(&ledger, "2024-02", "Dining");
        assert_eq!(before, Some(60.0));

        ledger
            .add_transaction(expense(date(2024, 2, 8), 150.0, "Dining"))
            .await
            .unwrap();
        assert_eq!(carried(&ledger, "2024-02", "Dining"), before);
        // 100 + 60 - 150 = 10 into March, 100 + 10 into April
        assert_eq!(carried(&ledger, "2024-03", "Dining"), Some(10.0));
        assert_eq!(carried(&ledger, "2024-04", "Dining"), Some(110.0));
    }

    #[tokio::test]
    async fn test_delete_transaction_restores_carry() {
        let (ledger, _clock) = ledger_at(date(2024, 3, 1));
        ledger.set_budget(ym("2024-02"), "Groceries", 200.0).await.unwrap();
        let tx = ledger
            .add_transaction(expense(date(2024, 2, 3), 250.0, "Groceries"))
            .await
            .unwrap();
        assert_eq!(carried(&ledger, "2024-03", "Groceries"), None);

        ledger.delete_transaction(&tx.id).await.unwrap();
        assert_eq!(carried(&ledger, "2024-03", "Groceries"), Some(200.0));
    }

    #[tokio::test]
    async fn test_rollover_disabled() {
        let (ledger, _clock) = ledger_at(date(2024, 3, 1));
        ledger
            .update_settings(SettingsUpdate {
                rollover_enabled: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        ledger.set_budget(ym("2024-02"), "Dining", 80.0).await.unwrap();

        let report = ledger.ensure_rollover_processing().await.unwrap();
        assert!(!report.enabled);
        assert!(ledger.rollovers(None).unwrap().is_empty());

        // re-enabling resumes catch-up
        ledger
            .update_settings(SettingsUpdate {
                rollover_enabled: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(carried(&ledger, "2024-03", "Dining"), Some(80.0));
        let status = ledger.budget_status(ym("2024-03")).unwrap();
        assert!(status.is_empty());
    }

    #[tokio::test]
    async fn test_edits_while_disabled_replayed_on_enable() {
        let (ledger, _clock) = ledger_at(date(2024, 4, 10));
        for month in ["2024-01", "2024-02", "2024-03"] {
            ledger.set_budget(ym(month), "Dining", 100.0).await.unwrap();
        }
        assert_eq!(carried(&ledger, "2024-04", "Dining"), Some(300.0));

        let disable = SettingsUpdate {
            rollover_enabled: Some(false),
            ..Default::default()
        };
        ledger.update_settings(disable).await.unwrap();
        ledger
            .add_transaction(expense(date(2024, 1, 15), 100.0, "Dining"))
            .await
            .unwrap();
        // carries are frozen while disabled
        assert_eq!(carried(&ledger, "2024-04", "Dining"), Some(300.0));

        let enable = SettingsUpdate {
            rollover_enabled: Some(true),
            ..Default::default()
        };
        ledger.update_settings(enable).await.unwrap();
        ledger.dashboard().await.unwrap();

        assert_eq!(carried(&ledger, "2024-02", "Dining"), None);
        assert_eq!(carried(&ledger, "2024-03", "Dining"), Some(100.0));
        assert_eq!(carried(&ledger, "2024-04", "Dining"), Some(200.0));
        assert_eq!(ledger.last_processed_month().unwrap(), Some(ym("2024-03")));
    }

    #[tokio::test]
    async fn test_snapshot_twice_in_a_month() {
        let (ledger, _clock) = ledger_at(date(2024, 6, 20));
        ledger.add_holding(HoldingKind::Asset, "Checking", 5000.0).unwrap();
        ledger.add_holding(HoldingKind::Liability, "Loan", 1200.0).unwrap();
        ledger.add_holding(HoldingKind::Investment, "Index fund", 900.0).unwrap();

        ledger.ensure_current_month_snapshot().unwrap();
        let snapshot = ledger.ensure_current_month_snapshot().unwrap();

        assert_eq!(snapshot.net_worth, 3800.0);
        let history = ledger.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, "2024-06");
    }

    #[tokio::test]
    async fn test_dashboard_runs_catch_up_and_snapshot() {
        let (ledger, clock) = ledger_at(date(2024, 1, 20));
        ledger.set_budget(ym("2024-01"), "Dining", 120.0).await.unwrap();
        ledger.set_budget(ym("2024-02"), "Dining", 120.0).await.unwrap();
        ledger.add_holding(HoldingKind::Asset, "Cash", 300.0).unwrap();

        clock.set(date(2024, 2, 2));
        let summary = ledger.dashboard().await.unwrap();
        assert_eq!(summary.month, ym("2024-02"));
        assert_eq!(summary.net_worth, 300.0);
        assert_eq!(summary.budgets[0].rollover, 120.0);
        assert_eq!(summary.budgets[0].available, 240.0);
        assert_eq!(ledger.history().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_propagates_from_earliest_month() {
        let (ledger, _clock) = ledger_at(date(2024, 4, 1));
        for month in ["2024-01", "2024-02", "2024-03"] {
            ledger.set_budget(ym(month), "Dining", 50.0).await.unwrap();
        }
        ledger
            .import_transactions(vec![
                expense(date(2024, 3, 2), 10.0, "Dining"),
                expense(date(2024, 1, 2), 50.0, "Dining"),
            ])
            .await
            .unwrap();
        assert_eq!(carried(&ledger, "2024-02", "Dining"), None);
        assert_eq!(carried(&ledger, "2024-03", "Dining"), Some(50.0));
        assert_eq!(carried(&ledger, "2024-04", "Dining"), Some(90.0));
    }

    #[tokio::test]
    async fn test_goal_progress_and_reset() {
        let (ledger, _clock) = ledger_at(date(2024, 6, 1));
        let goal = ledger.add_goal("Vacation", 1500.0, Some(date(2024, 12, 1))).unwrap();
        ledger.add_goal_progress(&goal.id, 200.0).unwrap();
        let updated = ledger.add_goal_progress(&goal.id, 100.5).unwrap();
        assert_eq!(updated.progress, 300.5);

        let withdrawn = ledger.add_goal_progress(&goal.id, -1000.0).unwrap();
        assert_eq!(withdrawn.progress, 0.0);

        ledger.add_goal_progress(&goal.id, 50.0).unwrap();
        assert_eq!(ledger.reset_goal(&goal.id).unwrap().progress, 0.0);
        assert!(ledger.add_goal_progress("missing", 1.0).is_err());
    }

    #[tokio::test]
    async fn test_settings_validation() {
        let (ledger, _clock) = ledger_at(date(2024, 6, 1));
        let updated = ledger
            .update_settings(SettingsUpdate {
                categories: Some(vec![" Rent ".into(), "rent".into(), "Food".into()]),
                currency: Some("eur".into()),
                rollover_enabled: None,
            })
            .await
            .unwrap();
        assert_eq!(updated.categories, vec!["Rent", "Food"]);
        assert_eq!(updated.currency, "EUR");

        let bad = ledger
            .update_settings(SettingsUpdate {
                currency: Some("euro".into()),
                ..Default::default()
            })
            .await;
        assert!(matches!(bad, Err(StorageError::Validation(_))));
    }
}
