// ==========================================
// Manifest Registry - Format Dispatcher
// ==========================================
// Selects the concrete workbook reader from the template's
// declared format and the file extension, and normalizes row
// coordinates so the template's 1-based starting row always
// selects the first data row regardless of reader.
//
// Legacy-named files are sometimes actually modern-format;
// the fallback is taken only when the bytes carry the ZIP
// signature, so a genuinely corrupt legacy file surfaces its
// own parse error instead of a misleading one from the
// wrong reader.
// ==========================================

use crate::domain::types::SheetFormat;
use crate::importer::error::ImportError;
use calamine::{Reader, Xls, Xlsx};
use std::io::Cursor;
use std::path::Path;

/// Magic bytes of a zipped (modern) workbook.
const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// One raw sheet row as ordered, trimmed cell strings.
#[derive(Debug, Clone)]
pub struct SheetRow {
    /// Physical 1-based row number in the sheet.
    pub row_number: usize,
    pub cells: Vec<String>,
}

impl SheetRow {
    /// Cell at a 0-based index; absent and out-of-range cells
    /// both read as empty.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }
}

/// All data rows of the first worksheet, already cut to the
/// template's starting row. Fully-empty rows are dropped;
/// row numbers are preserved.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub rows: Vec<SheetRow>,
}

/// Open uploaded workbook bytes and return its data rows.
///
/// Decision order:
/// - declared/extension modern (.xlsx) => modern reader
/// - declared/extension legacy (.xls) => legacy reader, unless the
///   bytes are actually zipped, in which case the modern reader is
///   used directly
/// - anything else => unrecognized-format error, no guessing
pub fn open_sheet(
    bytes: &[u8],
    file_name: &str,
    declared: SheetFormat,
    start_row: u32,
) -> Result<SheetData, ImportError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let from_extension = SheetFormat::from_extension(extension)
        .ok_or_else(|| ImportError::UnrecognizedFormat(extension.to_string()))?;

    let format = if declared == SheetFormat::Xlsx || from_extension == SheetFormat::Xlsx {
        SheetFormat::Xlsx
    } else {
        SheetFormat::Xls
    };

    match format {
        SheetFormat::Xlsx => open_modern(bytes, start_row),
        SheetFormat::Xls => {
            if bytes.starts_with(&ZIP_SIGNATURE) {
                tracing::warn!(
                    file = file_name,
                    "legacy-named workbook carries the zipped signature, using the modern reader"
                );
                open_modern(bytes, start_row)
            } else {
                open_legacy(bytes, start_row)
            }
        }
    }
}

fn open_modern(bytes: &[u8], start_row: u32) -> Result<SheetData, ImportError> {
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::SheetOpen(e.to_string()))?;
    collect_rows(workbook, start_row)
}

fn open_legacy(bytes: &[u8], start_row: u32) -> Result<SheetData, ImportError> {
    let workbook: Xls<_> = Xls::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::SheetOpen(e.to_string()))?;
    collect_rows(workbook, start_row)
}

/// Read the first worksheet into normalized rows.
///
/// Cells are addressed absolutely so sheets whose used range does
/// not begin at A1 still line up with the template's column labels.
fn collect_rows<R>(mut workbook: R, start_row: u32) -> Result<SheetData, ImportError>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::fmt::Display,
{
    let sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(ImportError::SheetParse("workbook has no sheets".to_string()));
    }
    let sheet_name = sheet_names[0].clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::SheetParse(e.to_string()))?;

    let (end_row, end_col) = match range.end() {
        Some(end) => end,
        None => return Ok(SheetData::default()),
    };

    let first = start_row.saturating_sub(1); // 0-based physical row
    let mut rows = Vec::new();
    for r in first..=end_row {
        let mut cells = Vec::with_capacity(end_col as usize + 1);
        for c in 0..=end_col {
            let value = range
                .get_value((r, c))
                .map(|cell| cell.to_string().trim().to_string())
                .unwrap_or_default();
            cells.push(value);
        }
        if cells.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(SheetRow {
            row_number: r as usize + 1,
            cells,
        });
    }

    Ok(SheetData { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_extension_fails_without_guessing() {
        let result = open_sheet(b"not a workbook", "upload.csv", SheetFormat::Xlsx, 1);
        assert!(matches!(result, Err(ImportError::UnrecognizedFormat(ext)) if ext == "csv"));

        let result = open_sheet(b"whatever", "upload", SheetFormat::Xls, 1);
        assert!(matches!(result, Err(ImportError::UnrecognizedFormat(_))));
    }

    #[test]
    fn test_garbage_modern_bytes_fail_to_open() {
        let result = open_sheet(b"garbage bytes", "upload.xlsx", SheetFormat::Xlsx, 1);
        assert!(matches!(result, Err(ImportError::SheetOpen(_))));
    }

    #[test]
    fn test_garbage_legacy_bytes_fail_without_fallback() {
        // No ZIP signature, so the legacy reader's own error surfaces.
        let result = open_sheet(b"garbage bytes", "upload.xls", SheetFormat::Xls, 1);
        assert!(matches!(result, Err(ImportError::SheetOpen(_))));
    }

    #[test]
    fn test_zip_signature_under_legacy_name_uses_modern_reader() {
        // Zipped signature but not a real workbook: the modern reader
        // is chosen (no legacy error) and then fails to open.
        let mut bytes = ZIP_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"truncated");
        let result = open_sheet(&bytes, "upload.xls", SheetFormat::Xls, 1);
        assert!(matches!(result, Err(ImportError::SheetOpen(_))));
    }

    #[test]
    fn test_sheet_row_cell_out_of_range_is_empty() {
        let row = SheetRow {
            row_number: 2,
            cells: vec!["a".to_string()],
        };
        assert_eq!(row.cell(0), "a");
        assert_eq!(row.cell(5), "");
    }
}
