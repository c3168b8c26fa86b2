// ==========================================
// Test helpers
// ==========================================
// Temporary database setup and row builders shared by the
// integration tests.
// ==========================================

use manifest_registry::db::open_registry_db;
use manifest_registry::domain::types::{EntryField, SheetFormat};
use manifest_registry::domain::{ImportTemplate, ManualFields, StagedRow};
use std::collections::BTreeMap;
use std::error::Error;
use tempfile::NamedTempFile;

/// Create a temporary registry database with the schema applied.
///
/// Returns the temp file (keep it alive for the test's duration)
/// and its path.
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    // Opening once applies PRAGMAs and creates the schema.
    open_registry_db(&db_path)?;

    Ok((temp_file, db_path))
}

/// The standard three-column template from the import scenarios:
/// container -> C, package count -> D, type code -> E, data from row 2.
pub fn standard_template() -> ImportTemplate {
    let mut mapping = BTreeMap::new();
    mapping.insert(EntryField::ContainerCode, "C".to_string());
    mapping.insert(EntryField::PackageCount, "D".to_string());
    mapping.insert(EntryField::ContainerTypeCode, "E".to_string());
    ImportTemplate::new("standard", SheetFormat::Xlsx, 2, mapping).unwrap()
}

/// Manual fields with just a manifest number set.
pub fn manual_fields(manifest_number: &str) -> ManualFields {
    ManualFields {
        manifest_number: manifest_number.to_string(),
        ..Default::default()
    }
}

/// A staged row ready for commit.
pub fn staged_row(
    row_number: usize,
    manifest_number: &str,
    container: &str,
    type_code: &str,
    ship_name: &str,
    flag_name: &str,
) -> StagedRow {
    StagedRow {
        row_number,
        manifest_number: manifest_number.to_string(),
        permit_number: String::new(),
        operation_request: String::new(),
        registration_date: None,
        ship_name: ship_name.to_string(),
        flag_name: flag_name.to_string(),
        position_number: None,
        container_code: container.to_string(),
        package_count: Some(1),
        gross_weight: None,
        cargo_description: String::new(),
        operation_type: None,
        summary_number: String::new(),
        container_type_code: type_code.to_string(),
        shipping_line: String::new(),
    }
}
