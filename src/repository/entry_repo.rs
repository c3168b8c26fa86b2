// ==========================================
// Manifest Registry - Entry Repository Trait
// ==========================================
// Data access for manifest_entry. No business rules here;
// the one subtlety this layer owns is ordinal allocation,
// which must happen inside the same transaction as the
// insert that consumes it (see insert_with_next_ordinal).
// ==========================================

use crate::domain::{ManifestEntry, StagedRow};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Allocate the next per-partition ordinal and insert the entry
    /// consuming it, as one transaction.
    ///
    /// The ordinal is `MAX(ordinal) + 1` within the partition (1 for an
    /// empty partition). Computing and consuming it in separate steps
    /// would let two concurrent commits observe the same maximum, so
    /// implementations must not split this into two calls.
    async fn insert_with_next_ordinal(
        &self,
        partition_id: i64,
        row: &StagedRow,
    ) -> RepositoryResult<ManifestEntry>;

    async fn get(&self, id: i64) -> RepositoryResult<Option<ManifestEntry>>;

    /// Current maximum assigned ordinal for a partition (0 when empty).
    async fn max_ordinal(&self, partition_id: i64) -> RepositoryResult<i64>;

    async fn count_by_partition(&self, partition_id: i64) -> RepositoryResult<usize>;

    /// Entries of one partition in ordinal order.
    async fn list_by_partition(&self, partition_id: i64) -> RepositoryResult<Vec<ManifestEntry>>;

    /// Entries missing at least one reference link, for the
    /// reconciliation sweep.
    async fn list_unlinked(&self) -> RepositoryResult<Vec<ManifestEntry>>;

    async fn set_container_type_link(
        &self,
        entry_id: i64,
        container_type_id: i64,
    ) -> RepositoryResult<()>;

    async fn set_ship_link(&self, entry_id: i64, ship_id: i64) -> RepositoryResult<()>;

    /// Manifest number of the most recently registered entry in a
    /// partition, if any.
    async fn latest_manifest_number(&self, partition_id: i64) -> RepositoryResult<Option<String>>;
}
