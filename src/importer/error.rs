// ==========================================
// Manifest Registry - Import Error Types
// ==========================================
// thiserror derive. Configuration and file-format errors
// abort immediately; row-validation failures are collected
// and reported together; a persistence failure carries the
// count already committed.
// ==========================================

use crate::repository::RepositoryError;
use serde::Serialize;
use thiserror::Error;

/// One rejected row of a previewed file.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// Physical 1-based row number in the source sheet.
    pub row: usize,
    pub message: String,
}

impl std::fmt::Display for RowFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

/// Import pipeline error type
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== configuration errors =====
    #[error("invalid column label '{0}' (letters A-Z only)")]
    InvalidColumnLabel(String),

    #[error("unrecognized file format '{0}' (supported: .xls, .xlsx)")]
    UnrecognizedFormat(String),

    #[error("import template '{0}' not found")]
    TemplateNotFound(String),

    #[error("no registry partition exists; create a year before importing")]
    MissingPartition,

    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    #[error("invalid manual fields: {0}")]
    InvalidManualFields(String),

    // ===== file errors =====
    #[error("workbook open failed: {0}")]
    SheetOpen(String),

    #[error("workbook parse failed: {0}")]
    SheetParse(String),

    // ===== aggregation errors =====
    #[error("{} row(s) failed validation; fix the source file or template and retry", .failures.len())]
    RowsRejected { failures: Vec<RowFailure> },

    #[error("no data found from row {start_row} onwards")]
    NoDataFound { start_row: u32 },

    // ===== staging errors =====
    #[error("no staged batch for this session (preview expired or never ran)")]
    SessionExpired,

    // ===== persistence errors =====
    #[error("entry insert failed after {created} entries were committed: {message}")]
    PersistFailed { created: usize, message: String },

    // ===== pass-through =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias
pub type ImportPipelineResult<T> = Result<T, ImportError>;
