// ==========================================
// Manifest Registry - Domain Types
// ==========================================
// Closed enumerations shared across the import
// pipeline, the repositories and the API layer.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Sheet Format
// ==========================================
// The two supported spreadsheet containers. Anything
// else is rejected up front, never guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    /// Legacy binary workbook (.xls, OLE/CFB container)
    Xls,
    /// Modern zipped workbook (.xlsx)
    Xlsx,
}

impl SheetFormat {
    /// Resolve a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xls" => Some(SheetFormat::Xls),
            "xlsx" => Some(SheetFormat::Xlsx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SheetFormat::Xls => "xls",
            SheetFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SheetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SheetFormat::from_extension(s.trim())
            .ok_or_else(|| format!("unknown sheet format: {}", s))
    }
}

// ==========================================
// Operation Type
// ==========================================
// Stored as a 1-character code. Normalization is a strict
// whitelist: values outside it are row-validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    #[serde(rename = "I")]
    Import,
    #[serde(rename = "T")]
    Transit,
}

impl OperationType {
    /// The persisted 1-character code.
    pub fn code(&self) -> &'static str {
        match self {
            OperationType::Import => "I",
            OperationType::Transit => "T",
        }
    }

    /// Normalize a raw spreadsheet value.
    ///
    /// Accepts `IMP`/`TRS` (any case, surrounding whitespace) and the
    /// already-normalized `I`/`T` codes. Everything else is rejected
    /// with the offending value in the message.
    pub fn normalize(raw: &str) -> Result<Self, String> {
        match raw.trim().to_uppercase().as_str() {
            "IMP" | "I" => Ok(OperationType::Import),
            "TRS" | "T" => Ok(OperationType::Transit),
            other => Err(format!(
                "unrecognized operation type '{}' (expected IMP/TRS or I/T)",
                other
            )),
        }
    }

    /// Parse a persisted code back into the enum.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "I" => Some(OperationType::Import),
            "T" => Some(OperationType::Transit),
            _ => None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// Entry Field
// ==========================================
// The closed set of logical entry fields. Template mappings
// reference these by name; the manual subset is supplied once
// per batch by the operator and may never be mapped to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryField {
    ManifestNumber,
    PermitNumber,
    PositionNumber,
    OperationRequest,
    RegistrationDate,
    ContainerCode,
    PackageCount,
    GrossWeight,
    CargoDescription,
    OperationType,
    ShipName,
    FlagName,
    SummaryNumber,
    ContainerTypeCode,
    ShippingLine,
}

impl EntryField {
    /// Fields supplied once per batch by the operator.
    pub const MANUAL: [EntryField; 6] = [
        EntryField::ManifestNumber,
        EntryField::PermitNumber,
        EntryField::RegistrationDate,
        EntryField::OperationRequest,
        EntryField::ShipName,
        EntryField::FlagName,
    ];

    /// Fields a template mapping may bind to a spreadsheet column.
    pub const MAPPABLE: [EntryField; 9] = [
        EntryField::PositionNumber,
        EntryField::ContainerCode,
        EntryField::PackageCount,
        EntryField::GrossWeight,
        EntryField::CargoDescription,
        EntryField::OperationType,
        EntryField::SummaryNumber,
        EntryField::ContainerTypeCode,
        EntryField::ShippingLine,
    ];

    pub fn is_manual(&self) -> bool {
        EntryField::MANUAL.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryField::ManifestNumber => "manifest_number",
            EntryField::PermitNumber => "permit_number",
            EntryField::PositionNumber => "position_number",
            EntryField::OperationRequest => "operation_request",
            EntryField::RegistrationDate => "registration_date",
            EntryField::ContainerCode => "container_code",
            EntryField::PackageCount => "package_count",
            EntryField::GrossWeight => "gross_weight",
            EntryField::CargoDescription => "cargo_description",
            EntryField::OperationType => "operation_type",
            EntryField::ShipName => "ship_name",
            EntryField::FlagName => "flag_name",
            EntryField::SummaryNumber => "summary_number",
            EntryField::ContainerTypeCode => "container_type_code",
            EntryField::ShippingLine => "shipping_line",
        }
    }
}

impl fmt::Display for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_type_normalize_whitelist() {
        assert_eq!(OperationType::normalize("imp"), Ok(OperationType::Import));
        assert_eq!(OperationType::normalize("IMP"), Ok(OperationType::Import));
        assert_eq!(OperationType::normalize(" imp "), Ok(OperationType::Import));
        assert_eq!(OperationType::normalize("trs"), Ok(OperationType::Transit));
        assert_eq!(OperationType::normalize("TRS"), Ok(OperationType::Transit));
        assert_eq!(OperationType::normalize("I"), Ok(OperationType::Import));
        assert_eq!(OperationType::normalize("T"), Ok(OperationType::Transit));
        assert!(OperationType::normalize("X").is_err());
        assert!(OperationType::normalize("IMPORT").is_err());
        assert!(OperationType::normalize("").is_err());
    }

    #[test]
    fn test_manual_fields_never_mappable() {
        for field in EntryField::MANUAL {
            assert!(!EntryField::MAPPABLE.contains(&field));
        }
    }

    #[test]
    fn test_sheet_format_from_extension() {
        assert_eq!(SheetFormat::from_extension("XLS"), Some(SheetFormat::Xls));
        assert_eq!(SheetFormat::from_extension("xlsx"), Some(SheetFormat::Xlsx));
        assert_eq!(SheetFormat::from_extension("csv"), None);
    }
}
