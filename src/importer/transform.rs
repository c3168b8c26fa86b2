// ==========================================
// Manifest Registry - Row Transformer
// ==========================================
// Applies the template's field mapping to one raw row:
// column resolution, per-field type coercion, operation-type
// normalization, then the manual-field overlay. Manual fields
// are batch-level and always win; they are skipped even if a
// stale mapping still names them.
// ==========================================

use crate::domain::types::{EntryField, OperationType};
use crate::domain::{ImportTemplate, ManualFields, StagedRow};
use crate::importer::column::column_label_to_index;
use crate::importer::error::{ImportError, RowFailure};
use crate::importer::sheet::SheetRow;
use rust_decimal::Decimal;
use std::str::FromStr;

/// A template mapping with column labels resolved to 0-based
/// cell indices, done once per file rather than once per row.
#[derive(Debug, Clone)]
pub struct ResolvedMapping {
    columns: Vec<(EntryField, usize)>,
}

impl ResolvedMapping {
    /// Resolve every mapped column label. A malformed label is a
    /// configuration error and aborts before any row is read.
    pub fn from_template(template: &ImportTemplate) -> Result<Self, ImportError> {
        let mut columns = Vec::with_capacity(template.mapping.len());
        for (field, label) in &template.mapping {
            if field.is_manual() {
                continue;
            }
            let index = column_label_to_index(label)?;
            columns.push((*field, index - 1));
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[(EntryField, usize)] {
        &self.columns
    }
}

/// Transform one raw row into a staged row, or a row-scoped failure.
///
/// Conversion rules per field kind:
/// - package count / position number: parsed as a float, truncated
///   to integer; empty cell => absent
/// - gross weight: arbitrary-precision decimal; empty => absent
/// - operation type: strict whitelist, anything not normalizable
///   aborts this row with a descriptive message
/// - everything else: trimmed string; empty => empty string
pub fn transform_row(
    mapping: &ResolvedMapping,
    manual: &ManualFields,
    row: &SheetRow,
) -> Result<StagedRow, RowFailure> {
    let mut staged = StagedRow {
        row_number: row.row_number,
        manifest_number: manual.manifest_number.clone(),
        permit_number: manual.permit_number.clone(),
        operation_request: manual.operation_request.clone(),
        registration_date: manual.registration_date,
        ship_name: manual.ship_name.clone(),
        flag_name: manual.flag_name.clone(),
        position_number: None,
        container_code: String::new(),
        package_count: None,
        gross_weight: None,
        cargo_description: String::new(),
        operation_type: None,
        summary_number: String::new(),
        container_type_code: String::new(),
        shipping_line: String::new(),
    };

    for &(field, index) in mapping.columns() {
        let raw = row.cell(index);
        if raw.is_empty() {
            continue;
        }

        match field {
            EntryField::PackageCount => {
                staged.package_count = Some(parse_truncated_int(raw, field, row.row_number)?);
            }
            EntryField::PositionNumber => {
                staged.position_number = Some(parse_truncated_int(raw, field, row.row_number)?);
            }
            EntryField::GrossWeight => {
                let weight = Decimal::from_str(raw).map_err(|_| RowFailure {
                    row: row.row_number,
                    message: format!("{}: cannot parse '{}' as a decimal", field, raw),
                })?;
                staged.gross_weight = Some(weight);
            }
            EntryField::OperationType => {
                let op = OperationType::normalize(raw).map_err(|message| RowFailure {
                    row: row.row_number,
                    message,
                })?;
                staged.operation_type = Some(op);
            }
            EntryField::ContainerCode => staged.container_code = raw.to_string(),
            EntryField::CargoDescription => staged.cargo_description = raw.to_string(),
            EntryField::SummaryNumber => staged.summary_number = raw.to_string(),
            EntryField::ContainerTypeCode => staged.container_type_code = raw.to_string(),
            EntryField::ShippingLine => staged.shipping_line = raw.to_string(),
            // Manual fields are filtered out at resolution time.
            _ => {}
        }
    }

    Ok(staged)
}

/// Spreadsheet numeric cells often read back as "12.0"; parse as a
/// float first, then truncate.
fn parse_truncated_int(raw: &str, field: EntryField, row: usize) -> Result<i32, RowFailure> {
    raw.parse::<f64>()
        .map(|v| v.trunc() as i32)
        .map_err(|_| RowFailure {
            row,
            message: format!("{}: cannot parse '{}' as a number", field, raw),
        })
}
