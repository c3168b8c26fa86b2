// ==========================================
// Manifest Registry - Preview Aggregator
// ==========================================
// Phase 1 of the two-phase protocol: run the row transformer
// over every data row, collecting successes in file order and
// failures per row. One failed row rejects the whole file; an
// empty result is reported distinctly as "no data found".
// ==========================================

use crate::domain::{ManualFields, StagedRow};
use crate::importer::error::{ImportError, RowFailure};
use crate::importer::sheet::SheetData;
use crate::importer::transform::{transform_row, ResolvedMapping};
use serde::Serialize;

/// One previewed row, rendered serialization-safe: dates as ISO
/// strings, decimals as strings.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewRow {
    pub row_number: usize,
    pub manifest_number: String,
    pub permit_number: String,
    pub operation_request: String,
    pub registration_date: Option<String>,
    pub ship_name: String,
    pub flag_name: String,
    pub position_number: Option<i32>,
    pub container_code: String,
    pub package_count: Option<i32>,
    pub gross_weight: Option<String>,
    pub cargo_description: String,
    pub operation_type: Option<String>,
    pub summary_number: String,
    pub container_type_code: String,
    pub shipping_line: String,
    pub container_model: String,
}

impl From<&StagedRow> for PreviewRow {
    fn from(row: &StagedRow) -> Self {
        Self {
            row_number: row.row_number,
            manifest_number: row.manifest_number.clone(),
            permit_number: row.permit_number.clone(),
            operation_request: row.operation_request.clone(),
            registration_date: row.registration_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ship_name: row.ship_name.clone(),
            flag_name: row.flag_name.clone(),
            position_number: row.position_number,
            container_code: row.container_code.clone(),
            package_count: row.package_count,
            gross_weight: row.gross_weight.map(|w| w.to_string()),
            cargo_description: row.cargo_description.clone(),
            operation_type: row.operation_type.map(|o| o.code().to_string()),
            summary_number: row.summary_number.clone(),
            container_type_code: row.container_type_code.clone(),
            shipping_line: row.shipping_line.clone(),
            container_model: row.container_model(),
        }
    }
}

/// Result of a successful preview, ready for operator review.
#[derive(Debug, Clone, Serialize)]
pub struct ImportPreview {
    /// Session handle the staged batch is claimable under.
    pub session: String,
    pub partition_year: i32,
    pub total_rows: usize,
    pub rows: Vec<PreviewRow>,
}

/// Transform every data row, aggregating failures instead of
/// aborting at the first one.
///
/// # Errors
/// - `RowsRejected` when at least one row failed (all failures listed)
/// - `NoDataFound` when the sheet holds nothing at or after the
///   starting row
pub fn build_staged_rows(
    sheet: &SheetData,
    mapping: &ResolvedMapping,
    manual: &ManualFields,
    start_row: u32,
) -> Result<Vec<StagedRow>, ImportError> {
    let mut staged = Vec::with_capacity(sheet.rows.len());
    let mut failures: Vec<RowFailure> = Vec::new();

    for row in &sheet.rows {
        match transform_row(mapping, manual, row) {
            Ok(transformed) => staged.push(transformed),
            Err(failure) => failures.push(failure),
        }
    }

    if !failures.is_empty() {
        return Err(ImportError::RowsRejected { failures });
    }
    if staged.is_empty() {
        return Err(ImportError::NoDataFound { start_row });
    }
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EntryField, SheetFormat};
    use crate::domain::ImportTemplate;
    use crate::importer::sheet::SheetRow;
    use std::collections::BTreeMap;

    fn mapping() -> ResolvedMapping {
        let mut m = BTreeMap::new();
        m.insert(EntryField::ContainerCode, "A".to_string());
        m.insert(EntryField::OperationType, "B".to_string());
        let template = ImportTemplate::new("t", SheetFormat::Xlsx, 2, m).unwrap();
        ResolvedMapping::from_template(&template).unwrap()
    }

    fn sheet(rows: &[(usize, &[&str])]) -> SheetData {
        SheetData {
            rows: rows
                .iter()
                .map(|(n, cells)| SheetRow {
                    row_number: *n,
                    cells: cells.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_all_rows_staged_in_file_order() {
        let manual = ManualFields {
            manifest_number: "RE-100".to_string(),
            ..Default::default()
        };
        let data = sheet(&[(2, &["C1", "imp"]), (3, &["C2", "trs"]), (4, &["C3", ""])]);

        let staged = build_staged_rows(&data, &mapping(), &manual, 2).unwrap();
        assert_eq!(staged.len(), 3);
        assert_eq!(staged[0].container_code, "C1");
        assert_eq!(staged[2].container_code, "C3");
        assert!(staged.iter().all(|r| r.manifest_number == "RE-100"));
    }

    #[test]
    fn test_one_bad_row_rejects_the_whole_file() {
        let manual = ManualFields::default();
        let data = sheet(&[(2, &["C1", "imp"]), (3, &["C2", "XX"]), (4, &["C3", "trs"])]);

        let err = build_staged_rows(&data, &mapping(), &manual, 2).unwrap_err();
        match err {
            ImportError::RowsRejected { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].row, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_sheet_is_no_data_found() {
        let manual = ManualFields::default();
        let err = build_staged_rows(&sheet(&[]), &mapping(), &manual, 2).unwrap_err();
        assert!(matches!(err, ImportError::NoDataFound { start_row: 2 }));
    }

    #[test]
    fn test_preview_row_renders_dates_and_decimals_as_strings() {
        use rust_decimal::Decimal;
        use std::str::FromStr;

        let manual = ManualFields {
            manifest_number: "RE-100".to_string(),
            registration_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 14),
            ..Default::default()
        };
        let data = sheet(&[(2, &["MSKU1234567", "imp"])]);
        let mut staged = build_staged_rows(&data, &mapping(), &manual, 2).unwrap();
        staged[0].gross_weight = Some(Decimal::from_str("18500.50").unwrap());
        staged[0].container_type_code = "20GP".to_string();

        let rendered = PreviewRow::from(&staged[0]);
        assert_eq!(rendered.registration_date.as_deref(), Some("2025-03-14"));
        assert_eq!(rendered.gross_weight.as_deref(), Some("18500.50"));
        assert_eq!(rendered.operation_type.as_deref(), Some("I"));
        assert_eq!(rendered.container_model, "MSKU20GP");

        // serializes cleanly for the wire
        let json = serde_json::to_string(&rendered).unwrap();
        assert!(json.contains("\"2025-03-14\""));
        assert!(json.contains("\"18500.50\""));
    }
}
