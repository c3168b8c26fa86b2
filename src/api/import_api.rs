// ==========================================
// Manifest Registry - Import API
// ==========================================
// Thin facade binding the repositories, the staging store
// and the pipeline stages into the two-phase protocol the
// surrounding request layer calls: preview, confirm, sweep.
// ==========================================

use crate::db::open_registry_db;
use crate::domain::{ManualFieldsInput, SweepReport};
use crate::importer::{
    build_staged_rows, open_sheet, CommitEngine, ImportError, ImportPreview, LookupReconciler,
    PreviewRow, ResolvedMapping, StagedBatch, StagingStore,
};
use crate::repository::{
    EntryRepository, EntryRepositoryImpl, LookupRepository, LookupRepositoryImpl,
    PartitionRepository, PartitionRepositoryImpl, RepositoryError, TemplateRepository,
    TemplateRepositoryImpl,
};
use std::sync::{Arc, Mutex};

pub struct ImportApi {
    templates: Arc<dyn TemplateRepository>,
    partitions: Arc<dyn PartitionRepository>,
    entries: Arc<dyn EntryRepository>,
    lookups: Arc<dyn LookupRepository>,
    staging: Arc<StagingStore>,
}

impl ImportApi {
    /// Build the full stack over one shared SQLite connection.
    pub fn new(db_path: &str) -> Result<Self, RepositoryError> {
        let conn = open_registry_db(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self::from_parts(
            Arc::new(TemplateRepositoryImpl::from_connection(conn.clone())),
            Arc::new(PartitionRepositoryImpl::from_connection(conn.clone())),
            Arc::new(EntryRepositoryImpl::from_connection(conn.clone())),
            Arc::new(LookupRepositoryImpl::from_connection(conn)),
            Arc::new(StagingStore::new()),
        ))
    }

    pub fn from_parts(
        templates: Arc<dyn TemplateRepository>,
        partitions: Arc<dyn PartitionRepository>,
        entries: Arc<dyn EntryRepository>,
        lookups: Arc<dyn LookupRepository>,
        staging: Arc<StagingStore>,
    ) -> Self {
        Self {
            templates,
            partitions,
            entries,
            lookups,
            staging,
        }
    }

    /// Phase 1: parse, transform and validate a whole uploaded file,
    /// staging the accepted batch under the session handle.
    ///
    /// No persistent mutation happens here. Any row failure rejects
    /// the file and reports every offending row.
    pub async fn preview(
        &self,
        session: &str,
        bytes: &[u8],
        file_name: &str,
        template_name: &str,
        manual_input: &ManualFieldsInput,
    ) -> Result<ImportPreview, ImportError> {
        let template = self
            .templates
            .get_by_name(template_name)
            .await?
            .ok_or_else(|| ImportError::TemplateNotFound(template_name.to_string()))?;

        let partition = self
            .partitions
            .resolve_target()
            .await?
            .ok_or(ImportError::MissingPartition)?;

        let manual = manual_input
            .parse()
            .map_err(ImportError::InvalidManualFields)?;

        let mapping = ResolvedMapping::from_template(&template)?;
        let sheet = open_sheet(bytes, file_name, template.sheet_format, template.start_row)?;
        let staged = build_staged_rows(&sheet, &mapping, &manual, template.start_row)?;

        tracing::info!(
            session,
            template = template_name,
            rows = staged.len(),
            partition_year = partition.year,
            "preview staged"
        );

        let rows: Vec<PreviewRow> = staged.iter().map(PreviewRow::from).collect();
        let preview = ImportPreview {
            session: session.to_string(),
            partition_year: partition.year,
            total_rows: rows.len(),
            rows,
        };

        self.staging.put(
            session,
            StagedBatch {
                rows: staged,
                manual,
                partition_id: partition.id,
                partition_year: partition.year,
            },
        );

        Ok(preview)
    }

    /// Phase 2: consume the staged batch for this session and persist
    /// it. Returns the count of entries created.
    pub async fn confirm(&self, session: &str) -> Result<usize, ImportError> {
        let batch = self.staging.take(session)?;
        let engine = CommitEngine::new(self.entries.clone(), self.lookups.clone());
        engine.commit(batch).await
    }

    /// Operator-triggered batch reconciliation sweep over all entries
    /// lacking a reference link.
    pub async fn reconcile_sweep(&self) -> Result<SweepReport, ImportError> {
        let reconciler = LookupReconciler::new(self.entries.clone(), self.lookups.clone());
        Ok(reconciler.sweep().await?)
    }

    /// Drop a session's staged batch without committing it.
    pub fn invalidate_session(&self, session: &str) -> bool {
        self.staging.invalidate(session)
    }
}
