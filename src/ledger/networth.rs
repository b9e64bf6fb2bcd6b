//! Net worth history
//!
//! One snapshot per month, replaced (never appended) for the current month and
//! trimmed to a trailing window of the latest months.

use crate::storage::{
    round_cents, FinanceStore, HoldingKind, NetWorthSnapshot, StorageResult, YearMonth,
};
use serde::Serialize;

/// Default number of months kept in the history
pub const DEFAULT_HISTORY_MONTHS: usize = 12;

/// Total assets minus total liabilities, right now
pub fn current_net_worth(store: &FinanceStore) -> StorageResult<f64> {
    let assets = store.holding_total(HoldingKind::Asset)?;
    let liabilities = store.holding_total(HoldingKind::Liability)?;
    Ok(round_cents(assets - liabilities))
}

/// Delete all but the `keep` chronologically latest snapshots.
/// Returns the number removed.
pub fn prune_snapshots(store: &mut FinanceStore, keep: usize) -> StorageResult<usize> {
    let mut snapshots = store.list_snapshots()?;
    if snapshots.len() <= keep {
        return Ok(0);
    }
    // newest first, by month rather than insertion order
    snapshots.sort_by(|a, b| b.ym.cmp(&a.ym));
    let stale = snapshots.split_off(keep);
    for snapshot in &stale {
        store.delete_snapshot(&snapshot.id)?;
    }
    Ok(stale.len())
}

/// Upsert `month`'s snapshot with the current net worth, then prune
pub fn record_snapshot(
    store: &mut FinanceStore,
    month: YearMonth,
    keep: usize,
) -> StorageResult<NetWorthSnapshot> {
    let snapshot = NetWorthSnapshot::new(month, current_net_worth(store)?);
    store.upsert_snapshot(&snapshot)?;
    let pruned = prune_snapshots(store, keep)?;
    tracing::debug!(
        month = %month,
        net_worth = snapshot.net_worth,
        pruned,
        "Recorded net worth snapshot"
    );
    Ok(snapshot)
}

/// Fill months of the trailing window that have no snapshot with the current
/// net worth and refresh the current month. Recorded months are left as they
/// are, since holdings are not versioned and their past values are unknown.
///
/// Returns the number of months filled in.
pub fn rebuild_history(
    store: &mut FinanceStore,
    current: YearMonth,
    keep: usize,
) -> StorageResult<usize> {
    let value = current_net_worth(store)?;
    let recorded: Vec<YearMonth> = store.list_snapshots()?.into_iter().map(|s| s.ym).collect();

    let window_start = current.offset(-(keep.saturating_sub(1) as i32));
    let mut filled = 0;
    for month in window_start.through(current.pred()) {
        if !recorded.contains(&month) {
            store.upsert_snapshot(&NetWorthSnapshot::new(month, value))?;
            filled += 1;
        }
    }
    store.upsert_snapshot(&NetWorthSnapshot::new(current, value))?;
    prune_snapshots(store, keep)?;

    tracing::info!(filled, net_worth = value, "Rebuilt net worth history");
    Ok(filled)
}

/// Aggregate view over the snapshot history
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NetWorthSummary {
    pub snapshots: Vec<NetWorthSnapshot>,
    pub current: f64,
    pub highest: f64,
    pub lowest: f64,
    /// Latest minus earliest snapshot
    pub change: f64,
}

impl NetWorthSummary {
    pub fn empty() -> Self {
        Self {
            snapshots: Vec::new(),
            current: 0.0,
            highest: 0.0,
            lowest: 0.0,
            change: 0.0,
        }
    }

    /// Build from snapshots in ascending month order
    pub fn from_snapshots(snapshots: Vec<NetWorthSnapshot>) -> Self {
        let (Some(first), Some(last)) = (snapshots.first(), snapshots.last()) else {
            return Self::empty();
        };
        let current = last.net_worth;
        let change = round_cents(last.net_worth - first.net_worth);
        let highest = snapshots
            .iter()
            .map(|s| s.net_worth)
            .fold(f64::NEG_INFINITY, f64::max);
        let lowest = snapshots
            .iter()
            .map(|s| s.net_worth)
            .fold(f64::INFINITY, f64::min);

        Self {
            snapshots,
            current,
            highest,
            lowest,
            change,
        }
    }
}
