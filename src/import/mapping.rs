//! Column mapping
//!
//! Guesses which CSV column feeds which transaction field from the header
//! names, and remembers mappings the user confirmed so the next export from
//! the same bank maps without guessing.

use crate::storage::LocalStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// `LocalStore` key holding confirmed mappings
pub const MAPPINGS_KEY: &str = "csv_mappings";

/// Column index for each transaction field, `None` when unmapped
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMapping {
    #[serde(default)]
    pub date: Option<usize>,
    #[serde(default)]
    pub amount: Option<usize>,
    #[serde(default)]
    pub payee: Option<usize>,
    #[serde(default, rename = "type")]
    pub kind: Option<usize>,
    #[serde(default)]
    pub category: Option<usize>,
}

impl ColumnMapping {
    /// Date and amount are required to build any row
    pub fn is_usable(&self) -> bool {
        self.date.is_some() && self.amount.is_some()
    }

    /// Every mapped index points inside a row of `width` columns
    pub fn fits(&self, width: usize) -> bool {
        [self.date, self.amount, self.payee, self.kind, self.category]
            .iter()
            .flatten()
            .all(|&idx| idx < width)
    }

    /// Widest row index this mapping reads
    pub fn max_index(&self) -> Option<usize> {
        [self.date, self.amount, self.payee, self.kind, self.category]
            .into_iter()
            .flatten()
            .max()
    }
}

const DATE_KEYS: &[&str] = &["date"];
const AMOUNT_KEYS: &[&str] = &["amount", "value", "total"];
const CATEGORY_KEYS: &[&str] = &["category"];
const TYPE_KEYS: &[&str] = &["type", "direction", "status"];
const PAYEE_KEYS: &[&str] = &["payee", "name", "description", "merchant"];

/// Guess a mapping from header names.
///
/// Fields claim columns in the order date, amount, category, type, payee;
/// each takes the first unclaimed column whose lower-cased name contains one
/// of its keywords.
pub fn infer_mapping<S: AsRef<str>>(headers: &[S]) -> ColumnMapping {
    let lowered: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect();
    let mut claimed = vec![false; lowered.len()];

    let mut claim = |keys: &[&str]| -> Option<usize> {
        let idx = lowered
            .iter()
            .enumerate()
            .position(|(i, h)| !claimed[i] && keys.iter().any(|k| h.contains(k)))?;
        claimed[idx] = true;
        Some(idx)
    };

    let date = claim(DATE_KEYS);
    let amount = claim(AMOUNT_KEYS);
    let category = claim(CATEGORY_KEYS);
    let kind = claim(TYPE_KEYS);
    let payee = claim(PAYEE_KEYS);

    ColumnMapping {
        date,
        amount,
        payee,
        kind,
        category,
    }
}

/// Lower-cased, trimmed headers joined with `|`
pub fn header_signature<S: AsRef<str>>(headers: &[S]) -> String {
    headers
        .iter()
        .map(|h| h.as_ref().trim().to_lowercase())
        .collect::<Vec<_>>()
        .join("|")
}

/// Confirmed mappings keyed by header signature
pub struct MappingStore {
    local: Arc<LocalStore>,
}

impl MappingStore {
    pub fn new(local: Arc<LocalStore>) -> Self {
        Self { local }
    }

    fn all(&self) -> HashMap<String, ColumnMapping> {
        self.local.get(MAPPINGS_KEY)
    }

    /// Saved mapping for these headers, if one still fits them
    pub fn get<S: AsRef<str>>(&self, headers: &[S]) -> Option<ColumnMapping> {
        self.all()
            .remove(&header_signature(headers))
            .filter(|m| m.fits(headers.len()))
    }

    /// Remember `mapping` for these headers. Returns `false` when it could not
    /// be written.
    pub fn save<S: AsRef<str>>(&self, headers: &[S], mapping: ColumnMapping) -> bool {
        let mut all = self.all();
        all.insert(header_signature(headers), mapping);
        self.local.set(MAPPINGS_KEY, &all)
    }

    pub fn forget<S: AsRef<str>>(&self, headers: &[S]) -> bool {
        let mut all = self.all();
        if all.remove(&header_signature(headers)).is_none() {
            return true;
        }
        self.local.set(MAPPINGS_KEY, &all)
    }
}
