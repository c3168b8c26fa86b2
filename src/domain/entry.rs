// ==========================================
// Manifest Registry - Entry Domain Model
// ==========================================
// One cargo line-item of a customs manifest. Rows flow
// through the pipeline as StagedRow (transformed, not yet
// persisted) and become ManifestEntry at commit, when the
// per-partition ordinal is assigned.
// ==========================================

use crate::domain::types::OperationType;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// ManifestEntry - persisted registry row
// ==========================================
// Ordinal is unique and strictly increasing within a
// partition, assigned only at commit time, never reassigned.
// container_model is always recomputed from container code +
// type code and is not independently editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: i64,
    pub partition_id: i64,
    pub ordinal: i64,

    // ===== batch-level (manual) fields =====
    pub manifest_number: String,
    pub permit_number: String,
    pub operation_request: String,
    pub registration_date: Option<NaiveDate>,
    pub ship_name: String,
    pub flag_name: String,

    // ===== spreadsheet-mapped fields =====
    pub position_number: Option<i32>,
    pub container_code: String,
    pub package_count: Option<i32>,
    pub gross_weight: Option<Decimal>,
    pub cargo_description: String,
    pub operation_type: Option<OperationType>,
    pub summary_number: String,
    pub container_type_code: String,
    pub shipping_line: String,

    // ===== derived =====
    pub container_model: String,

    // ===== reference links =====
    pub container_type_id: Option<i64>,
    pub ship_id: Option<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// StagedRow - transformed, not yet persisted
// ==========================================
// Lives only between preview and confirm, inside the
// staging store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedRow {
    /// Physical 1-based row number in the source sheet.
    pub row_number: usize,

    pub manifest_number: String,
    pub permit_number: String,
    pub operation_request: String,
    pub registration_date: Option<NaiveDate>,
    pub ship_name: String,
    pub flag_name: String,

    pub position_number: Option<i32>,
    pub container_code: String,
    pub package_count: Option<i32>,
    pub gross_weight: Option<Decimal>,
    pub cargo_description: String,
    pub operation_type: Option<OperationType>,
    pub summary_number: String,
    pub container_type_code: String,
    pub shipping_line: String,
}

impl StagedRow {
    /// The derived composite container-model key for this row.
    pub fn container_model(&self) -> String {
        derive_container_model(&self.container_code, &self.container_type_code)
    }
}

// ==========================================
// ManualFields - per-batch operator input
// ==========================================
// One manifest document covers many cargo lines, so these
// are batch-level, never per-row, and always win over any
// stale column mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualFields {
    pub manifest_number: String,
    pub permit_number: String,
    pub operation_request: String,
    pub registration_date: Option<NaiveDate>,
    pub ship_name: String,
    pub flag_name: String,
}

/// Raw manual-fields payload as received from the operator,
/// registration date still unparsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualFieldsInput {
    pub manifest_number: String,
    #[serde(default)]
    pub permit_number: String,
    #[serde(default)]
    pub operation_request: String,
    #[serde(default)]
    pub registration_date: String,
    #[serde(default)]
    pub ship_name: String,
    #[serde(default)]
    pub flag_name: String,
}

impl ManualFieldsInput {
    /// Validate and parse into typed manual fields.
    ///
    /// Manifest number is required and non-empty. The registration
    /// date accepts ISO `YYYY-MM-DD` as well as the `DD.MM.YYYY` and
    /// `DD/MM/YYYY` forms the registry has historically received.
    pub fn parse(&self) -> Result<ManualFields, String> {
        let manifest_number = self.manifest_number.trim().to_string();
        if manifest_number.is_empty() {
            return Err("manifest number is required".to_string());
        }

        let registration_date = match self.registration_date.trim() {
            "" => None,
            raw => Some(parse_registration_date(raw)?),
        };

        Ok(ManualFields {
            manifest_number,
            permit_number: self.permit_number.trim().to_string(),
            operation_request: self.operation_request.trim().to_string(),
            registration_date,
            ship_name: self.ship_name.trim().to_string(),
            flag_name: self.flag_name.trim().to_string(),
        })
    }
}

/// Parse a registration date, ISO first.
pub fn parse_registration_date(raw: &str) -> Result<NaiveDate, String> {
    let value = raw.trim();
    for fmt in ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(date);
        }
    }
    Err(format!(
        "malformed registration date '{}' (expected YYYY-MM-DD)",
        value
    ))
}

/// Derive the composite container-model key.
///
/// First four characters of the container code (the whole code if
/// shorter) concatenated with the container-type code; empty when
/// either part is missing.
pub fn derive_container_model(container_code: &str, container_type_code: &str) -> String {
    if container_code.is_empty() || container_type_code.is_empty() {
        return String::new();
    }
    let prefix: String = container_code.chars().take(4).collect();
    format!("{}{}", prefix, container_type_code)
}
