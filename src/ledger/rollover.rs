//! Budget rollover ledger
//!
//! Unspent budget in a category carries into the same category next month:
//!
//! ```text
//! carry(m+1, c) = max(0, budget(m, c) + rollover(m, c) - spent(m, c))
//! ```
//!
//! Only categories with a budget row in `m` produce a carry, and only positive
//! carries are stored. Because each month's carry depends on the month before,
//! a change in month `m` is propagated forward month by month up to the last
//! complete month.

use crate::storage::{
    round_cents, Budget, FinanceStore, Rollover, StorageResult, YearMonth,
    SETTING_ROLLOVER_LAST_PROCESSED,
};
use std::collections::HashMap;

/// Compute the rollover set carried into `next` from one month's figures
pub fn carry_forward(
    budgets: &[Budget],
    incoming: &HashMap<String, f64>,
    spent: &HashMap<String, f64>,
    next: YearMonth,
) -> Vec<Rollover> {
    budgets
        .iter()
        .filter_map(|budget| {
            let carried_in = incoming.get(&budget.category).copied().unwrap_or(0.0);
            let used = spent.get(&budget.category).copied().unwrap_or(0.0);
            let carry = round_cents((budget.amount + carried_in - used).max(0.0));
            (carry > 0.0).then(|| Rollover::new(next, budget.category.clone(), carry))
        })
        .collect()
}

/// Recompute the rollovers carried out of `month` into the following month
pub fn recompute_month(store: &mut FinanceStore, month: YearMonth) -> StorageResult<Vec<Rollover>> {
    let budgets = store.budgets_for_month(month)?;
    let incoming: HashMap<String, f64> = store
        .rollovers_for_month(month)?
        .into_iter()
        .map(|r| (r.category, r.amount))
        .collect();
    let spent = store.spent_by_category(month)?;

    let next = month.succ();
    let carries = carry_forward(&budgets, &incoming, &spent, next);
    store.replace_rollovers(next, &carries)?;

    tracing::debug!(
        month = %month,
        categories = budgets.len(),
        carried = carries.len(),
        "Recomputed rollovers"
    );
    Ok(carries)
}

/// Recompute every month from `from` through `through` in order, recording
/// each month as processed once its carry has been written. A failure stops
/// the walk with the marker on the last month that completed.
///
/// Returns the number of months processed.
pub fn recompute_range(
    store: &mut FinanceStore,
    from: YearMonth,
    through: YearMonth,
) -> StorageResult<usize> {
    let mut processed = 0;
    for month in from.through(through) {
        if let Err(e) = recompute_month(store, month) {
            tracing::error!(month = %month, error = %e, "Rollover recompute failed");
            return Err(e);
        }
        store.set_setting(SETTING_ROLLOVER_LAST_PROCESSED, &month)?;
        processed += 1;
    }
    Ok(processed)
}

/// Pull the marker back so the next catch-up replays from `month` onwards.
///
/// Used for edits made while rollover is switched off; with no marker the
/// catch-up already starts at the earliest budgeted month.
pub fn mark_stale_from(store: &mut FinanceStore, month: YearMonth) -> StorageResult<()> {
    if let Some(last) = last_processed(store)? {
        if last >= month {
            store.set_setting(SETTING_ROLLOVER_LAST_PROCESSED, &month.pred())?;
            tracing::debug!(month = %month, "Rollovers marked stale");
        }
    }
    Ok(())
}

/// Last month whose carry has been written, if any
pub fn last_processed(store: &FinanceStore) -> StorageResult<Option<YearMonth>> {
    store.get_setting(SETTING_ROLLOVER_LAST_PROCESSED)
}

/// First month that still needs processing: the month after the marker, or the
/// earliest budgeted month when nothing was ever processed.
pub fn pending_start(store: &FinanceStore) -> StorageResult<Option<YearMonth>> {
    match last_processed(store)? {
        Some(month) => Ok(Some(month.succ())),
        None => store.earliest_budget_month(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NewTransaction, TransactionKind};
    use chrono::NaiveDate;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn spend(store: &mut FinanceStore, month: &str, amount: f64, category: &str) {
        let m = ym(month);
        let date = NaiveDate::from_ymd_opt(m.year(), m.month(), 10).unwrap();
        store
            .insert_transaction(NewTransaction::new(
                date,
                "Store",
                amount,
                TransactionKind::Expense,
                category,
            ))
            .unwrap();
    }

    fn amount_for(rollovers: &[Rollover], category: &str) -> Option<f64> {
        rollovers
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.amount)
    }

    #[test]
    fn test_carry_forward_formula() {
        let jan = ym("2024-01");
        let budgets = vec![
            Budget::new(jan, "Dining", 100.0),
            Budget::new(jan, "Groceries", 300.0),
            Budget::new(jan, "Fun", 50.0),
        ];
        let incoming = HashMap::from([("Dining".to_string(), 20.0)]);
        let spent = HashMap::from([
            ("Dining".to_string(), 70.554),
            ("Groceries".to_string(), 300.0),
            ("Fun".to_string(), 80.0),
        ]);

        let carries = carry_forward(&budgets, &incoming, &spent, jan.succ());

        // 100 + 20 - 70.554 = 49.446 -> 49.45 (rounded to cents)
        assert_eq!(amount_for(&carries, "Dining"), Some(49.45));
        // zero and negative carries are absent, not stored as zero
        assert_eq!(amount_for(&carries, "Groceries"), None);
        assert_eq!(amount_for(&carries, "Fun"), None);
        assert!(carries.iter().all(|r| r.ym == ym("2024-02")));
    }

    #[test]
    fn test_carry_chains_across_months() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        for month in ["2024-01", "2024-02", "2024-03"] {
            store.upsert_budget(&Budget::new(ym(month), "Dining", 100.0)).unwrap();
        }
        spend(&mut store, "2024-01", 60.0, "Dining");
        spend(&mut store, "2024-02", 90.0, "Dining");
        spend(&mut store, "2024-03", 200.0, "Dining");

        let processed = recompute_range(&mut store, ym("2024-01"), ym("2024-03")).unwrap();
        assert_eq!(processed, 3);

        // Feb gets 40, Mar gets 100 + 40 - 90 = 50, Apr gets nothing
        assert_eq!(amount_for(&store.rollovers_for_month(ym("2024-02")).unwrap(), "Dining"), Some(40.0));
        assert_eq!(amount_for(&store.rollovers_for_month(ym("2024-03")).unwrap(), "Dining"), Some(50.0));
        assert!(store.rollovers_for_month(ym("2024-04")).unwrap().is_empty());
        assert_eq!(last_processed(&store).unwrap(), Some(ym("2024-03")));
    }

    #[test]
    fn test_recompute_from_month_leaves_earlier_months_alone() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        for month in ["2024-01", "2024-02", "2024-03"] {
            store.upsert_budget(&Budget::new(ym(month), "Dining", 100.0)).unwrap();
        }
        spend(&mut store, "2024-01", 30.0, "Dining");
        recompute_range(&mut store, ym("2024-01"), ym("2024-03")).unwrap();
        let before: Vec<Rollover> = store
            .list_rollovers()
            .unwrap()
            .into_iter()
            .filter(|r| r.ym <= ym("2024-02"))
            .collect();

        // a change in February only affects what flows out of February
        spend(&mut store, "2024-02", 180.0, "Dining");
        recompute_range(&mut store, ym("2024-02"), ym("2024-03")).unwrap();

        let after: Vec<Rollover> = store
            .list_rollovers()
            .unwrap()
            .into_iter()
            .filter(|r| r.ym <= ym("2024-02"))
            .collect();
        assert_eq!(before, after);
        // 100 + 70 - 180 < 0, so March has no rollover
        assert!(store.rollovers_for_month(ym("2024-03")).unwrap().is_empty());
    }

    #[test]
    fn test_deleted_budget_drops_next_month_rollover() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        let jan = ym("2024-01");
        store.upsert_budget(&Budget::new(jan, "Health", 40.0)).unwrap();
        recompute_month(&mut store, jan).unwrap();
        assert_eq!(store.rollovers_for_month(jan.succ()).unwrap().len(), 1);

        store.delete_budget("2024-01-Health").unwrap();
        recompute_month(&mut store, jan).unwrap();
        assert!(store.rollovers_for_month(jan.succ()).unwrap().is_empty());
    }

    #[test]
    fn test_pending_start() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        assert_eq!(pending_start(&store).unwrap(), None);

        store.upsert_budget(&Budget::new(ym("2023-10"), "Dining", 10.0)).unwrap();
        assert_eq!(pending_start(&store).unwrap(), Some(ym("2023-10")));

        store
            .set_setting(SETTING_ROLLOVER_LAST_PROCESSED, &ym("2023-12"))
            .unwrap();
        assert_eq!(pending_start(&store).unwrap(), Some(ym("2024-01")));
    }

    #[test]
    fn test_mark_stale_only_moves_marker_back() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        mark_stale_from(&mut store, ym("2024-02")).unwrap();
        assert_eq!(last_processed(&store).unwrap(), None);

        store
            .set_setting(SETTING_ROLLOVER_LAST_PROCESSED, &ym("2024-03"))
            .unwrap();
        mark_stale_from(&mut store, ym("2024-05")).unwrap();
        assert_eq!(last_processed(&store).unwrap(), Some(ym("2024-03")));

        mark_stale_from(&mut store, ym("2024-01")).unwrap();
        assert_eq!(last_processed(&store).unwrap(), Some(ym("2023-12")));
        assert_eq!(pending_start(&store).unwrap(), Some(ym("2024-01")));
    }

    #[test]
    fn test_failed_month_stops_walk_and_resumes() {
        let mut store = FinanceStore::open_in_memory().unwrap();
        for month in ["2024-01", "2024-02", "2024-03", "2024-04"] {
            store.upsert_budget(&Budget::new(ym(month), "Dining", 100.0)).unwrap();
        }
        // writing March's carry (out of February) fails
        store
            .execute_batch(
                "CREATE TRIGGER fail_march BEFORE INSERT ON rollovers
                 WHEN NEW.ym = '2024-03'
                 BEGIN SELECT RAISE(ABORT, 'disk I/O error'); END;",
            )
            .unwrap();

        let result = recompute_range(&mut store, ym("2024-01"), ym("2024-04"));
        assert!(result.is_err());
        assert_eq!(last_processed(&store).unwrap(), Some(ym("2024-01")));
        assert_eq!(amount_for(&store.rollovers_for_month(ym("2024-02")).unwrap(), "Dining"), Some(100.0));
        assert!(store.rollovers_for_month(ym("2024-04")).unwrap().is_empty());

        store.execute_batch("DROP TRIGGER fail_march;").unwrap();
        let from = pending_start(&store).unwrap().unwrap();
        assert_eq!(from, ym("2024-02"));
        let processed = recompute_range(&mut store, from, ym("2024-04")).unwrap();
        assert_eq!(processed, 3);
        assert_eq!(last_processed(&store).unwrap(), Some(ym("2024-04")));
        assert_eq!(amount_for(&store.rollovers_for_month(ym("2024-05")).unwrap(), "Dining"), Some(400.0));
    }
}
