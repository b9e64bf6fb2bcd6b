//! CSV Import
//!
//! Turns a bank export into transactions: sniff the delimiter, map columns,
//! decide the date order, then parse every row, counting the ones that cannot
//! be used. `preview` is side-effect free; `commit` writes the rows through the
//! ledger so rollovers are propagated, and remembers the mapping.

use super::format::{
    detect_delimiter, infer_date_order, infer_kind, parse_amount, parse_date, DateOrder,
    DateOrderSetting,
};
use super::mapping::{infer_mapping, ColumnMapping, MappingStore};
use super::ImportError;
use crate::ledger::Ledger;
use crate::storage::{round_cents, NewTransaction};
use serde::Serialize;

const MAX_ERRORS: usize = 100;

/// Where a mapping came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    Inferred,
    Saved,
    Provided,
}

/// Rows left out of an import, by reason
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SkipCounts {
    pub missing_field: usize,
    pub invalid_date: usize,
    pub invalid_amount: usize,
    pub unknown_type: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.missing_field + self.invalid_date + self.invalid_amount + self.unknown_type
    }
}

/// Everything known about a file before it is imported
#[derive(Debug, Clone, Serialize)]
pub struct ImportPreview {
    pub headers: Vec<String>,
    pub delimiter: char,
    pub mapping: ColumnMapping,
    pub mapping_source: MappingSource,
    pub date_order: DateOrder,
    pub rows: Vec<NewTransaction>,
    pub skipped: SkipCounts,
    /// Per-line reasons, capped
    pub errors: Vec<String>,
}

impl ImportPreview {
    /// True once at least one row is ready to import
    pub fn can_import(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Result of a committed import
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: SkipCounts,
    pub mapping_saved: bool,
}

/// CSV importer with remembered column mappings
pub struct CsvImporter {
    mappings: MappingStore,
    date_order: DateOrderSetting,
    default_category: String,
    default_payee: String,
}

impl CsvImporter {
    pub fn new(mappings: MappingStore) -> Self {
        Self {
            mappings,
            date_order: DateOrderSetting::Auto,
            default_category: "Other".to_string(),
            default_payee: "Unknown".to_string(),
        }
    }

    /// Set how ties in date-order sampling are broken
    pub fn with_date_order(mut self, date_order: DateOrderSetting) -> Self {
        self.date_order = date_order;
        self
    }

    /// Category for rows with no category column or an empty cell
    pub fn with_default_category(mut self, category: &str) -> Self {
        self.default_category = category.to_string();
        self
    }

    pub fn mappings(&self) -> &MappingStore {
        &self.mappings
    }

    /// Parse `text` without writing anything.
    ///
    /// `mapping` overrides both saved and inferred mappings.
    pub fn preview(
        &self,
        text: &str,
        currency: &str,
        mapping: Option<ColumnMapping>,
    ) -> Result<ImportPreview, ImportError> {
        if text.trim().is_empty() {
            return Err(ImportError::Empty);
        }

        let delimiter = detect_delimiter(text);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::Empty);
        }

        let (mapping, mapping_source) = match mapping {
            Some(m) => (m, MappingSource::Provided),
            None => match self.mappings.get(headers.as_slice()) {
                Some(m) => (m, MappingSource::Saved),
                None => (infer_mapping(headers.as_slice()), MappingSource::Inferred),
            },
        };
        let date_col = mapping.date.ok_or(ImportError::MissingColumn("date"))?;
        let amount_col = mapping.amount.ok_or(ImportError::MissingColumn("amount"))?;
        if !mapping.fits(headers.len()) {
            return Err(ImportError::InvalidMapping(format!(
                "mapping refers to a column beyond the {} in the header",
                headers.len()
            )));
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            records.push(record);
        }
        if records.is_empty() {
            return Err(ImportError::Empty);
        }

        let date_order = infer_date_order(records.iter().filter_map(|r| r.get(date_col)))
            .unwrap_or_else(|| self.date_order.fallback(currency));

        let mut rows = Vec::with_capacity(records.len());
        let mut skipped = SkipCounts::default();
        let mut errors = Vec::new();
        let required = mapping.max_index().unwrap_or(0);

        for record in &records {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let mut skip = |reason: &str, counter: &mut usize| {
                *counter += 1;
                if errors.len() < MAX_ERRORS {
                    errors.push(format!("Line {}: {}", line, reason));
                }
            };

            if record.len() <= required {
                skip("missing mapped column", &mut skipped.missing_field);
                continue;
            }
            let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).filter(|s| !s.is_empty());

            let Some(date) = record.get(date_col).and_then(|s| parse_date(s, date_order)) else {
                skip("invalid date", &mut skipped.invalid_date);
                continue;
            };
            let amount = match record.get(amount_col).and_then(parse_amount) {
                Some(a) if a != 0.0 => a,
                _ => {
                    skip("invalid or zero amount", &mut skipped.invalid_amount);
                    continue;
                }
            };
            let Some(kind) = infer_kind(cell(mapping.kind), amount) else {
                skip("unknown transaction type", &mut skipped.unknown_type);
                continue;
            };

            let payee = cell(mapping.payee).unwrap_or(self.default_payee.as_str());
            let category = cell(mapping.category).unwrap_or(self.default_category.as_str());
            rows.push(NewTransaction::new(
                date,
                payee,
                round_cents(amount.abs()),
                kind,
                category,
            ));
        }

        if skipped.total() > MAX_ERRORS {
            errors.push(format!("... and {} more", skipped.total() - MAX_ERRORS));
        }

        tracing::debug!(
            delimiter = %(delimiter as char),
            mapping = ?mapping_source,
            date_order = date_order.label(),
            valid = rows.len(),
            skipped = skipped.total(),
            "Previewed CSV import"
        );

        Ok(ImportPreview {
            headers,
            delimiter: delimiter as char,
            mapping,
            mapping_source,
            date_order,
            rows,
            skipped,
            errors,
        })
    }

    /// Import every valid row in one store transaction and remember the mapping
    pub async fn commit(
        &self,
        ledger: &Ledger,
        text: &str,
        mapping: Option<ColumnMapping>,
    ) -> Result<ImportSummary, ImportError> {
        let currency = ledger.settings()?.currency;
        let preview = self.preview(text, &currency, mapping)?;
        if !preview.can_import() {
            return Err(ImportError::NoValidRows(preview.skipped.total()));
        }

        let inserted = ledger.import_transactions(preview.rows).await?;
        let mapping_saved = self.mappings.save(preview.headers.as_slice(), preview.mapping);

        tracing::info!(
            imported = inserted.len(),
            skipped = preview.skipped.total(),
            "CSV import committed"
        );
        Ok(ImportSummary {
            imported: inserted.len(),
            skipped: preview.skipped,
            mapping_saved,
        })
    }
}
