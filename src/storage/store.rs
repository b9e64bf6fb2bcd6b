//! Finance Store - SQLite-backed object stores
//!
//! One table per record kind (transactions, budgets, rollovers, goals,
//! assets, liabilities, investments, nw_snapshots) plus a key/value
//! `settings` table whose values are JSON-encoded.
//!
//! The store is synchronous; callers that share it across tasks wrap it in a
//! mutex and hold the lock only for the duration of a call.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::month::YearMonth;
use crate::storage::types::{
    month_category_id, Budget, Goal, Holding, HoldingKind, NetWorthSnapshot, NewTransaction,
    Rollover, Settings, Transaction, TransactionKind,
};
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Settings keys
pub const SETTING_CATEGORIES: &str = "categories";
pub const SETTING_CURRENCY: &str = "currency";
pub const SETTING_ROLLOVER_ENABLED: &str = "rollover_enabled";
pub const SETTING_ROLLOVER_LAST_PROCESSED: &str = "rollover_last_processed";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS transactions (
        id TEXT PRIMARY KEY,
        date TEXT NOT NULL,
        payee TEXT NOT NULL,
        amount REAL NOT NULL,
        kind TEXT NOT NULL,
        category TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS budgets (
        id TEXT PRIMARY KEY,
        month TEXT NOT NULL,
        category TEXT NOT NULL,
        amount REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_budgets_month ON budgets(month);

    CREATE TABLE IF NOT EXISTS rollovers (
        id TEXT PRIMARY KEY,
        ym TEXT NOT NULL,
        category TEXT NOT NULL,
        amount REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_rollovers_ym ON rollovers(ym);

    CREATE TABLE IF NOT EXISTS goals (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        target REAL NOT NULL,
        due TEXT,
        progress REAL NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS assets (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        value REAL NOT NULL
    );
    CREATE TABLE IF NOT EXISTS liabilities (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        value REAL NOT NULL
    );
    CREATE TABLE IF NOT EXISTS investments (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        value REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS nw_snapshots (
        id TEXT PRIMARY KEY,
        ym TEXT NOT NULL,
        net_worth REAL NOT NULL
    );

    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

impl ToSql for YearMonth {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for YearMonth {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: StorageError| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        payee: row.get(2)?,
        amount: row.get(3)?,
        kind: row.get(4)?,
        category: row.get(5)?,
    })
}

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        month: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
    })
}

fn rollover_from_row(row: &Row<'_>) -> rusqlite::Result<Rollover> {
    Ok(Rollover {
        id: row.get(0)?,
        ym: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
    })
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        name: row.get(1)?,
        target: row.get(2)?,
        due: row.get(3)?,
        progress: row.get(4)?,
    })
}

fn holding_from_row(row: &Row<'_>) -> rusqlite::Result<Holding> {
    Ok(Holding {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
    })
}

fn snapshot_from_row(row: &Row<'_>) -> rusqlite::Result<NetWorthSnapshot> {
    Ok(NetWorthSnapshot {
        id: row.get(0)?,
        ym: row.get(1)?,
        net_worth: row.get(2)?,
    })
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// SQLite-backed store for every finance record kind
pub struct FinanceStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl FinanceStore {
    /// Create or open the database under `data_dir`
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let path = data_dir.join("fintrack.db");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        let store = Self {
            conn,
            path: Some(path),
        };
        store.init_schema()?;
        tracing::debug!(path = ?store.path, "Opened finance store");
        Ok(store)
    }

    /// Create a throwaway in-memory store
    pub fn open_in_memory() -> StorageResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> StorageResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn init_schema(&self) -> StorageResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Database file path (`None` for in-memory stores)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ============================================
    // TRANSACTIONS
    // ============================================

    pub fn insert_transaction(&mut self, new: NewTransaction) -> StorageResult<Transaction> {
        new.validate().map_err(StorageError::Validation)?;
        let tx = new.into_transaction(new_id());
        self.conn.execute(
            "INSERT INTO transactions (id, date, payee, amount, kind, category)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![tx.id, tx.date, tx.payee, tx.amount, tx.kind, tx.category],
        )?;
        Ok(tx)
    }

    /// Insert many transactions atomically
    pub fn insert_transactions(
        &mut self,
        rows: Vec<NewTransaction>,
    ) -> StorageResult<Vec<Transaction>> {
        for row in &rows {
            row.validate().map_err(StorageError::Validation)?;
        }

        let db_tx = self.conn.transaction()?;
        let mut inserted = Vec::with_capacity(rows.len());
        {
            let mut stmt = db_tx.prepare_cached(
                "INSERT INTO transactions (id, date, payee, amount, kind, category)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for row in rows {
                let tx = row.into_transaction(new_id());
                stmt.execute(params![tx.id, tx.date, tx.payee, tx.amount, tx.kind, tx.category])?;
                inserted.push(tx);
            }
        }
        db_tx.commit()?;
        Ok(inserted)
    }

    pub fn get_transaction(&self, id: &str) -> StorageResult<Option<Transaction>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, date, payee, amount, kind, category FROM transactions WHERE id = ?",
                params![id],
                transaction_from_row,
            )
            .optional()?)
    }

    /// Delete a transaction, returning the removed row
    pub fn delete_transaction(&mut self, id: &str) -> StorageResult<Transaction> {
        let tx = self
            .get_transaction(id)?
            .ok_or_else(|| StorageError::not_found("Transaction", id))?;
        self.conn
            .execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(tx)
    }

    /// Transactions newest first, optionally limited to one month
    pub fn list_transactions(&self, month: Option<YearMonth>) -> StorageResult<Vec<Transaction>> {
        let (from, to) = match month {
            Some(m) => (m.first_day().to_string(), m.last_day().to_string()),
            None => ("0000-01-01".to_string(), "9999-12-31".to_string()),
        };
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, date, payee, amount, kind, category FROM transactions
             WHERE date >= ? AND date <= ?
             ORDER BY date DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![from, to], transaction_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Sum of expense amounts per category for a month
    pub fn spent_by_category(&self, month: YearMonth) -> StorageResult<HashMap<String, f64>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT category, SUM(amount) FROM transactions
             WHERE kind = 'expense' AND date >= ? AND date <= ?
             GROUP BY category",
        )?;
        let rows = stmt.query_map(params![month.first_day(), month.last_day()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;
        Ok(rows.collect::<Result<HashMap<_, _>, _>>()?)
    }

    /// Total income and total expense for a month
    pub fn month_totals(&self, month: YearMonth) -> StorageResult<(f64, f64)> {
        let totals = self.conn.query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount END), 0)
             FROM transactions WHERE date >= ? AND date <= ?",
            params![month.first_day(), month.last_day()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(totals)
    }

    pub fn transaction_count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ============================================
    // BUDGETS
    // ============================================

    /// Insert or replace the budget row for (month, category)
    pub fn upsert_budget(&mut self, budget: &Budget) -> StorageResult<()> {
        if !budget.amount.is_finite() || budget.amount < 0.0 {
            return Err(StorageError::Validation(
                "Budget amount must be zero or positive".to_string(),
            ));
        }
        if budget.category.trim().is_empty() {
            return Err(StorageError::Validation(
                "Budget category cannot be empty".to_string(),
            ));
        }
        self.conn.execute(
            "INSERT OR REPLACE INTO budgets (id, month, category, amount) VALUES (?, ?, ?, ?)",
            params![
                month_category_id(budget.month, &budget.category),
                budget.month,
                budget.category,
                budget.amount
            ],
        )?;
        Ok(())
    }

    pub fn get_budget(&self, id: &str) -> StorageResult<Option<Budget>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, month, category, amount FROM budgets WHERE id = ?",
                params![id],
                budget_from_row,
            )
            .optional()?)
    }

    pub fn delete_budget(&mut self, id: &str) -> StorageResult<Budget> {
        let budget = self
            .get_budget(id)?
            .ok_or_else(|| StorageError::not_found("Budget", id))?;
        self.conn
            .execute("DELETE FROM budgets WHERE id = ?", params![id])?;
        Ok(budget)
    }

    pub fn budgets_for_month(&self, month: YearMonth) -> StorageResult<Vec<Budget>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, month, category, amount FROM budgets WHERE month = ? ORDER BY category",
        )?;
        let rows = stmt.query_map(params![month], budget_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_budgets(&self) -> StorageResult<Vec<Budget>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, month, category, amount FROM budgets ORDER BY month, category",
        )?;
        let rows = stmt.query_map([], budget_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Earliest month with any budget row
    pub fn earliest_budget_month(&self) -> StorageResult<Option<YearMonth>> {
        Ok(self
            .conn
            .query_row("SELECT MIN(month) FROM budgets", [], |row| {
                row.get::<_, Option<YearMonth>>(0)
            })?)
    }

    // ============================================
    // ROLLOVERS
    // ============================================

    pub fn rollovers_for_month(&self, ym: YearMonth) -> StorageResult<Vec<Rollover>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, ym, category, amount FROM rollovers WHERE ym = ? ORDER BY category",
        )?;
        let rows = stmt.query_map(params![ym], rollover_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_rollovers(&self) -> StorageResult<Vec<Rollover>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, ym, category, amount FROM rollovers ORDER BY ym, category",
        )?;
        let rows = stmt.query_map([], rollover_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Make `rollovers` the complete rollover set for `ym`.
    /// Entries for `ym` not in `rollovers` are removed.
    pub fn replace_rollovers(&mut self, ym: YearMonth, rollovers: &[Rollover]) -> StorageResult<()> {
        let db_tx = self.conn.transaction()?;
        db_tx.execute("DELETE FROM rollovers WHERE ym = ?", params![ym])?;
        {
            let mut stmt = db_tx.prepare_cached(
                "INSERT OR REPLACE INTO rollovers (id, ym, category, amount) VALUES (?, ?, ?, ?)",
            )?;
            for rollover in rollovers {
                stmt.execute(params![
                    month_category_id(ym, &rollover.category),
                    ym,
                    rollover.category,
                    rollover.amount
                ])?;
            }
        }
        db_tx.commit()?;
        Ok(())
    }

    // ============================================
    // GOALS
    // ============================================

    pub fn insert_goal(
        &mut self,
        name: &str,
        target: f64,
        due: Option<NaiveDate>,
    ) -> StorageResult<Goal> {
        if name.trim().is_empty() {
            return Err(StorageError::Validation("Goal name cannot be empty".to_string()));
        }
        if !target.is_finite() || target <= 0.0 {
            return Err(StorageError::Validation(
                "Goal target must be a positive number".to_string(),
            ));
        }
        let goal = Goal {
            id: new_id(),
            name: name.trim().to_string(),
            target,
            due,
            progress: 0.0,
        };
        self.conn.execute(
            "INSERT INTO goals (id, name, target, due, progress) VALUES (?, ?, ?, ?, ?)",
            params![goal.id, goal.name, goal.target, goal.due, goal.progress],
        )?;
        Ok(goal)
    }

    pub fn get_goal(&self, id: &str) -> StorageResult<Option<Goal>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, target, due, progress FROM goals WHERE id = ?",
                params![id],
                goal_from_row,
            )
            .optional()?)
    }

    pub fn set_goal_progress(&mut self, id: &str, progress: f64) -> StorageResult<Goal> {
        let changed = self.conn.execute(
            "UPDATE goals SET progress = ? WHERE id = ?",
            params![progress, id],
        )?;
        if changed == 0 {
            return Err(StorageError::not_found("Goal", id));
        }
        self.get_goal(id)?
            .ok_or_else(|| StorageError::not_found("Goal", id))
    }

    pub fn delete_goal(&mut self, id: &str) -> StorageResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(StorageError::not_found("Goal", id));
        }
        Ok(())
    }

    pub fn list_goals(&self) -> StorageResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, target, due, progress FROM goals ORDER BY due IS NULL, due, name",
        )?;
        let rows = stmt.query_map([], goal_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ============================================
    // ASSETS / LIABILITIES / INVESTMENTS
    // ============================================

    pub fn insert_holding(
        &mut self,
        kind: HoldingKind,
        name: &str,
        value: f64,
    ) -> StorageResult<Holding> {
        if name.trim().is_empty() {
            return Err(StorageError::Validation(format!(
                "{} name cannot be empty",
                kind.label()
            )));
        }
        if !value.is_finite() {
            return Err(StorageError::Validation(format!(
                "{} value must be a finite number",
                kind.label()
            )));
        }
        let holding = Holding {
            id: new_id(),
            name: name.trim().to_string(),
            value,
        };
        let sql = format!(
            "INSERT INTO {} (id, name, value) VALUES (?, ?, ?)",
            kind.table()
        );
        self.conn
            .execute(&sql, params![holding.id, holding.name, holding.value])?;
        Ok(holding)
    }

    pub fn delete_holding(&mut self, kind: HoldingKind, id: &str) -> StorageResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", kind.table());
        if self.conn.execute(&sql, params![id])? == 0 {
            return Err(StorageError::not_found(kind.label(), id));
        }
        Ok(())
    }

    pub fn list_holdings(&self, kind: HoldingKind) -> StorageResult<Vec<Holding>> {
        let sql = format!("SELECT id, name, value FROM {} ORDER BY name", kind.table());
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt.query_map([], holding_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn holding_total(&self, kind: HoldingKind) -> StorageResult<f64> {
        let sql = format!("SELECT COALESCE(SUM(value), 0) FROM {}", kind.table());
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    // ============================================
    // NET WORTH SNAPSHOTS
    // ============================================

    /// Insert or replace the snapshot for its month
    pub fn upsert_snapshot(&mut self, snapshot: &NetWorthSnapshot) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO nw_snapshots (id, ym, net_worth) VALUES (?, ?, ?)",
            params![snapshot.ym.to_string(), snapshot.ym, snapshot.net_worth],
        )?;
        Ok(())
    }

    /// Snapshots ascending by month
    pub fn list_snapshots(&self) -> StorageResult<Vec<NetWorthSnapshot>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT id, ym, net_worth FROM nw_snapshots ORDER BY ym")?;
        let rows = stmt.query_map([], snapshot_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_snapshot(&mut self, id: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM nw_snapshots WHERE id = ?", params![id])?;
        Ok(())
    }

    // ============================================
    // SETTINGS
    // ============================================

    /// Read a JSON-encoded setting; `None` when unset
    pub fn get_setting<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_setting<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, raw],
        )?;
        Ok(())
    }

    /// Assemble `Settings`, falling back to `defaults` for unset keys
    pub fn load_settings(&self, defaults: &Settings) -> StorageResult<Settings> {
        Ok(Settings {
            categories: self
                .get_setting(SETTING_CATEGORIES)?
                .unwrap_or_else(|| defaults.categories.clone()),
            currency: self
                .get_setting(SETTING_CURRENCY)?
                .unwrap_or_else(|| defaults.currency.clone()),
            rollover_enabled: self
                .get_setting(SETTING_ROLLOVER_ENABLED)?
                .unwrap_or(defaults.rollover_enabled),
        })
    }

    pub fn save_settings(&mut self, settings: &Settings) -> StorageResult<()> {
        self.set_setting(SETTING_CATEGORIES, &settings.categories)?;
        self.set_setting(SETTING_CURRENCY, &settings.currency)?;
        self.set_setting(SETTING_ROLLOVER_ENABLED, &settings.rollover_enabled)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(d: NaiveDate, amount: f64, category: &str) -> NewTransaction {
        NewTransaction::new(d, "Shop", amount, TransactionKind::Expense, category)
    }

    #[test]
    fn test_open_creates_database_file() {
        let dir = tempdir().unwrap();
        let store = FinanceStore::open(dir.path()).unwrap();
        assert!(store.path().unwrap().exists());
    }

    #[test]
    fn test_transactions_persist_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let mut store = FinanceStore::open(dir.path()).unwrap();
            store
                .insert_transaction(expense(date(2024, 1, 3), 12.5, "Dining"))
                .unwrap();
        }
        let store = FinanceStore::open(dir.path()).unwrap();
        let all = store.list_transactions(None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, 12.5);
        assert_eq!(all[0].kind, TransactionKind::Expense);
    }

    #[test]
    fn test_spent_by_category_counts_only_expenses_in_month() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        store
            .insert_transaction(expense(date(2024, 1, 3), 10.0, "Dining"))
            .unwrap();
        store
            .insert_transaction(expense(date(2024, 1, 31), 5.25, "Dining"))
            .unwrap();
        store
            .insert_transaction(expense(date(2024, 2, 1), 99.0, "Dining"))
            .unwrap();
        store
            .insert_transaction(NewTransaction::new(
                date(2024, 1, 10),
                "Refund",
                50.0,
                TransactionKind::Income,
                "Dining",
            ))
            .unwrap();

        let spent = store.spent_by_category(ym("2024-01")).unwrap();
        assert_eq!(spent.get("Dining").copied(), Some(15.25));

        let (income, expenses) = store.month_totals(ym("2024-01")).unwrap();
        assert_eq!(income, 50.0);
        assert_eq!(expenses, 15.25);
    }

    #[test]
    fn test_delete_transaction_returns_row() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        let tx = store
            .insert_transaction(expense(date(2024, 3, 3), 8.0, "Transport"))
            .unwrap();
        let removed = store.delete_transaction(&tx.id).unwrap();
        assert_eq!(removed.id, tx.id);
        assert!(matches!(
            store.delete_transaction(&tx.id),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_budget_upsert_is_keyed_by_month_and_category() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        store
            .upsert_budget(&Budget::new(ym("2024-01"), "Dining", 100.0))
            .unwrap();
        store
            .upsert_budget(&Budget::new(ym("2024-01"), "Dining", 150.0))
            .unwrap();
        store
            .upsert_budget(&Budget::new(ym("2023-11"), "Dining", 80.0))
            .unwrap();

        let jan = store.budgets_for_month(ym("2024-01")).unwrap();
        assert_eq!(jan.len(), 1);
        assert_eq!(jan[0].amount, 150.0);
        assert_eq!(store.earliest_budget_month().unwrap(), Some(ym("2023-11")));
    }

    #[test]
    fn test_replace_rollovers_removes_stale_entries() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        let feb = ym("2024-02");
        store
            .replace_rollovers(
                feb,
                &[Rollover::new(feb, "Dining", 20.0), Rollover::new(feb, "Health", 5.0)],
            )
            .unwrap();
        store
            .replace_rollovers(feb, &[Rollover::new(feb, "Dining", 25.0)])
            .unwrap();

        let rollovers = store.rollovers_for_month(feb).unwrap();
        assert_eq!(rollovers.len(), 1);
        assert_eq!(rollovers[0].id, "2024-02-Dining");
        assert_eq!(rollovers[0].amount, 25.0);
    }

    #[test]
    fn test_holdings_totals() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        store.insert_holding(HoldingKind::Asset, "Checking", 1200.0).unwrap();
        store.insert_holding(HoldingKind::Asset, "Car", 8000.0).unwrap();
        let loan = store
            .insert_holding(HoldingKind::Liability, "Car loan", 3000.0)
            .unwrap();

        assert_eq!(store.holding_total(HoldingKind::Asset).unwrap(), 9200.0);
        assert_eq!(store.holding_total(HoldingKind::Liability).unwrap(), 3000.0);

        store.delete_holding(HoldingKind::Liability, &loan.id).unwrap();
        assert_eq!(store.holding_total(HoldingKind::Liability).unwrap(), 0.0);
    }

    #[test]
    fn test_goal_progress_updates() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        let goal = store.insert_goal("Emergency fund", 1000.0, None).unwrap();
        let updated = store.set_goal_progress(&goal.id, 250.0).unwrap();
        assert_eq!(updated.progress, 250.0);
        assert!(store.set_goal_progress("missing", 1.0).is_err());
    }

    #[test]
    fn test_settings_fall_back_to_defaults() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        let defaults = Settings::default();
        assert_eq!(store.load_settings(&defaults).unwrap(), defaults);

        store.set_setting(SETTING_CURRENCY, "EUR").unwrap();
        let loaded = store.load_settings(&defaults).unwrap();
        assert_eq!(loaded.currency, "EUR");
        assert!(loaded.rollover_enabled);

        store
            .set_setting(SETTING_ROLLOVER_LAST_PROCESSED, &ym("2024-04"))
            .unwrap();
        let marker: Option<YearMonth> = store.get_setting(SETTING_ROLLOVER_LAST_PROCESSED).unwrap();
        assert_eq!(marker, Some(ym("2024-04")));
    }
}
