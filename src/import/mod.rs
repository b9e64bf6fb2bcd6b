//! CSV Import
//!
//! Bank exports come in many shapes. This module provides:
//! - **format**: delimiter, date-order, amount and direction inference
//! - **mapping**: header-based column mapping and remembered mappings
//! - **csv_import**: `CsvImporter` preview and commit

mod csv_import;
pub mod format;
pub mod mapping;

pub use csv_import::{CsvImporter, ImportPreview, ImportSummary, MappingSource, SkipCounts};
pub use format::{
    detect_delimiter, infer_date_order, infer_kind, parse_amount, parse_date, DateOrder,
    DateOrderSetting, DATE_SAMPLE_LIMIT,
};
pub use mapping::{header_signature, infer_mapping, ColumnMapping, MappingStore, MAPPINGS_KEY};

use crate::storage::StorageError;

/// Errors that can occur while importing a CSV file
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("The file is empty or has no data rows")]
    Empty,

    #[error("No column mapped to {0}")]
    MissingColumn(&'static str),

    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    #[error("No valid rows to import ({0} skipped)")]
    NoValidRows(usize),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
