// ==========================================
// Manifest Registry - Commit Engine
// ==========================================
// Drains a staged batch in original row order: allocate the
// next ordinal, persist the entry, reconcile its reference
// links. Each row's commit is the atomic unit; a failure
// keeps the rows already committed and reports how many
// made it.
// ==========================================

use crate::importer::error::ImportError;
use crate::importer::reconcile::LookupReconciler;
use crate::importer::staging::StagedBatch;
use crate::repository::{EntryRepository, LookupRepository};
use std::sync::Arc;

pub struct CommitEngine {
    entries: Arc<dyn EntryRepository>,
    reconciler: LookupReconciler,
}

impl CommitEngine {
    pub fn new(entries: Arc<dyn EntryRepository>, lookups: Arc<dyn LookupRepository>) -> Self {
        let reconciler = LookupReconciler::new(entries.clone(), lookups);
        Self {
            entries,
            reconciler,
        }
    }

    /// Persist every staged row against the batch's target partition.
    ///
    /// Returns the count of entries created. Ordinal allocation and
    /// the insert consuming it happen inside the repository as one
    /// transaction per row. Reconciliation failures never fail the
    /// commit; the entry is left unlinked for a later sweep.
    pub async fn commit(&self, batch: StagedBatch) -> Result<usize, ImportError> {
        let mut created = 0usize;

        for row in &batch.rows {
            let entry = self
                .entries
                .insert_with_next_ordinal(batch.partition_id, row)
                .await
                .map_err(|e| ImportError::PersistFailed {
                    created,
                    message: e.to_string(),
                })?;
            created += 1;

            if let Err(e) = self.reconciler.reconcile_entry(&entry).await {
                tracing::warn!(
                    entry_id = entry.id,
                    row = row.row_number,
                    "reference reconciliation failed, entry left unlinked: {}",
                    e
                );
            }
        }

        tracing::info!(
            created,
            partition_year = batch.partition_year,
            manifest = %batch.manual.manifest_number,
            "import batch committed"
        );
        Ok(created)
    }
}
