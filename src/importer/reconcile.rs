// ==========================================
// Manifest Registry - Lookup Reconciler
// ==========================================
// Resolves or auto-creates the three reference entities for
// an entry and links the entry to them. Idempotent: re-running
// against already-linked entries creates nothing and overwrites
// no metadata. Also exposed as an operator-triggered batch
// sweep over all unlinked entries.
// ==========================================

use crate::domain::{ManifestEntry, SweepReport};
use crate::repository::{EntryRepository, LookupRepository, RepositoryResult};
use std::sync::Arc;

/// What one reconciliation run did for one entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOutcome {
    pub container_type_created: bool,
    pub flag_created: bool,
    pub ship_created: bool,
    pub linked: bool,
}

pub struct LookupReconciler {
    entries: Arc<dyn EntryRepository>,
    lookups: Arc<dyn LookupRepository>,
}

impl LookupReconciler {
    pub fn new(entries: Arc<dyn EntryRepository>, lookups: Arc<dyn LookupRepository>) -> Self {
        Self { entries, lookups }
    }

    /// Reconcile one entry against the reference tables.
    ///
    /// Steps:
    /// 1. non-empty composite model key and no container-type link yet:
    ///    get-or-create the container type by model key, link the entry
    /// 2. ship name present and no ship link yet: get-or-create the
    ///    flag (when a flag name is present), then get-or-create the
    ///    ship carrying shipping line and flag link, link the entry
    pub async fn reconcile_entry(
        &self,
        entry: &ManifestEntry,
    ) -> RepositoryResult<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();

        if !entry.container_model.is_empty() && entry.container_type_id.is_none() {
            let (container_type, created) = self
                .lookups
                .get_or_create_container_type(&entry.container_model, &entry.container_type_code)
                .await?;
            self.entries
                .set_container_type_link(entry.id, container_type.id)
                .await?;
            outcome.container_type_created = created;
            outcome.linked = true;
        }

        if !entry.ship_name.is_empty() && entry.ship_id.is_none() {
            let flag_id = if entry.flag_name.is_empty() {
                None
            } else {
                let (flag, created) = self.lookups.get_or_create_flag(&entry.flag_name).await?;
                outcome.flag_created = created;
                Some(flag.id)
            };

            let (ship, created) = self
                .lookups
                .get_or_create_ship(&entry.ship_name, &entry.shipping_line, flag_id)
                .await?;
            self.entries.set_ship_link(entry.id, ship.id).await?;
            outcome.ship_created = created;
            outcome.linked = true;
        }

        Ok(outcome)
    }

    /// Batch reconciliation sweep over every entry lacking a link.
    ///
    /// Useful after a template or a reference table was edited
    /// retroactively. Per-entry failures are logged and skipped;
    /// the sweep itself keeps going.
    pub async fn sweep(&self) -> RepositoryResult<SweepReport> {
        let unlinked = self.entries.list_unlinked().await?;
        tracing::info!(count = unlinked.len(), "reconciliation sweep started");

        let mut report = SweepReport::default();
        for entry in &unlinked {
            match self.reconcile_entry(entry).await {
                Ok(outcome) => {
                    if outcome.container_type_created {
                        report.container_types_created += 1;
                    }
                    if outcome.flag_created {
                        report.flags_created += 1;
                    }
                    if outcome.ship_created {
                        report.ships_created += 1;
                    }
                    if outcome.linked {
                        report.entries_linked += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        entry_id = entry.id,
                        ordinal = entry.ordinal,
                        "sweep reconciliation failed, entry left unlinked: {}",
                        e
                    );
                }
            }
        }

        tracing::info!(
            container_types = report.container_types_created,
            flags = report.flags_created,
            ships = report.ships_created,
            linked = report.entries_linked,
            "reconciliation sweep finished"
        );
        Ok(report)
    }
}
