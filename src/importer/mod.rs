// ==========================================
// Manifest Registry - Import Pipeline
// ==========================================
// Mapping-driven spreadsheet ingestion: column resolution,
// format dispatch, row transformation, preview aggregation,
// staging, commit, lookup reconciliation.
// ==========================================

pub mod column;
pub mod commit;
pub mod error;
pub mod preview;
pub mod reconcile;
pub mod sheet;
pub mod staging;
pub mod transform;

pub use column::{column_index_to_label, column_label_to_index};
pub use commit::CommitEngine;
pub use error::{ImportError, ImportPipelineResult, RowFailure};
pub use preview::{build_staged_rows, ImportPreview, PreviewRow};
pub use reconcile::{LookupReconciler, ReconcileOutcome};
pub use sheet::{open_sheet, SheetData, SheetRow};
pub use staging::{StagedBatch, StagingStore, DEFAULT_STAGING_TTL};
pub use transform::{transform_row, ResolvedMapping};
