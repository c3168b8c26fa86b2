// ==========================================
// Manifest Registry - Core Library
// ==========================================
// Customs-manifest spreadsheet ingestion into a structured,
// partitioned registry. Stack: Rust + SQLite.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Data repository layer - data access
pub mod repository;

// Import pipeline - spreadsheet ingestion
pub mod importer;

// Database infrastructure (connection init / uniform PRAGMA)
pub mod db;

// Logging
pub mod logging;

// API layer - facades
pub mod api;

// ==========================================
// Core type re-exports
// ==========================================

// Domain types
pub use domain::types::{EntryField, OperationType, SheetFormat};

// Domain entities
pub use domain::{
    ContainerType, Flag, ImportTemplate, ManifestEntry, ManualFields, ManualFieldsInput,
    Partition, Ship, StagedRow, SweepReport,
};

// Pipeline
pub use importer::{
    CommitEngine, ImportError, ImportPreview, LookupReconciler, StagingStore,
};

// API
pub use api::ImportApi;

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "Manifest Registry";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
