// ==========================================
// Manifest Registry - Import Template
// ==========================================
// A reusable import profile: declared file format, 1-based
// starting data row, and the field -> column-label mapping.
// Read-only during an import run.
// ==========================================

use crate::domain::types::{EntryField, SheetFormat};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTemplate {
    pub id: Option<i64>,
    pub name: String,
    pub sheet_format: SheetFormat,
    /// 1-based physical row of the first data row.
    pub start_row: u32,
    /// Logical field -> spreadsheet column label ("A", "AA", ...).
    /// Manual fields are never present here.
    pub mapping: BTreeMap<EntryField, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportTemplate {
    /// Build a new template, enforcing the mapping invariants.
    ///
    /// # Errors
    /// - a manual field appears as a mapping key
    /// - the starting row is 0 (rows are 1-based)
    /// - the mapping is empty
    pub fn new(
        name: &str,
        sheet_format: SheetFormat,
        start_row: u32,
        mapping: BTreeMap<EntryField, String>,
    ) -> Result<Self, String> {
        Self::validate(start_row, &mapping)?;
        let now = Utc::now();
        Ok(Self {
            id: None,
            name: name.trim().to_string(),
            sheet_format,
            start_row,
            mapping,
            created_at: now,
            updated_at: now,
        })
    }

    /// Invariant check, also applied when a persisted template is loaded.
    pub fn validate(start_row: u32, mapping: &BTreeMap<EntryField, String>) -> Result<(), String> {
        if start_row == 0 {
            return Err("start row is 1-based and must be >= 1".to_string());
        }
        if mapping.is_empty() {
            return Err("template mapping is empty".to_string());
        }
        for field in mapping.keys() {
            if field.is_manual() {
                return Err(format!(
                    "field '{}' is supplied manually per batch and cannot be mapped to a column",
                    field
                ));
            }
        }
        Ok(())
    }
}
