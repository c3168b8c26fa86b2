// ==========================================
// Manifest Registry - Partition Repository
// ==========================================
// Manages the registry_partition table (yearly buckets).
// Invariant: at most one partition is active; activation
// deactivates every other row in the same transaction.
// ==========================================

use crate::db::open_registry_db;
use crate::domain::Partition;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

#[async_trait]
pub trait PartitionRepository: Send + Sync {
    /// Create a new yearly partition (inactive). Duplicate years are
    /// rejected with a unique-constraint error.
    async fn create(&self, year: i32) -> RepositoryResult<Partition>;

    /// Activate one year, deactivating all others atomically.
    async fn activate(&self, year: i32) -> RepositoryResult<Partition>;

    async fn get_by_year(&self, year: i32) -> RepositoryResult<Option<Partition>>;

    async fn get_active(&self) -> RepositoryResult<Option<Partition>>;

    /// The partition imports attach to: the active one, or the most
    /// recent year when none is active.
    async fn resolve_target(&self) -> RepositoryResult<Option<Partition>>;

    /// All partitions, most recent year first.
    async fn list(&self) -> RepositoryResult<Vec<Partition>>;
}

pub struct PartitionRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl PartitionRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_registry_db(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Partition> {
        Ok(Partition {
            id: row.get(0)?,
            year: row.get(1)?,
            is_active: row.get::<_, i64>(2)? != 0,
            created_at: row.get::<_, DateTime<Utc>>(3)?,
        })
    }
}

#[async_trait]
impl PartitionRepository for PartitionRepositoryImpl {
    async fn create(&self, year: i32) -> RepositoryResult<Partition> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO registry_partition (year, is_active, created_at) VALUES (?1, 0, ?2)",
            params![year, Utc::now()],
        )?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            "SELECT id, year, is_active, created_at FROM registry_partition WHERE id = ?1",
            params![id],
            Self::map_row,
        )
        .map_err(RepositoryError::from)
    }

    async fn activate(&self, year: i32) -> RepositoryResult<Partition> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute("UPDATE registry_partition SET is_active = 0", [])?;
        let updated = tx.execute(
            "UPDATE registry_partition SET is_active = 1 WHERE year = ?1",
            params![year],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "registry_partition".to_string(),
                key: year.to_string(),
            });
        }
        let partition = tx.query_row(
            "SELECT id, year, is_active, created_at FROM registry_partition WHERE year = ?1",
            params![year],
            Self::map_row,
        )?;
        tx.commit()?;
        Ok(partition)
    }

    async fn get_by_year(&self, year: i32) -> RepositoryResult<Option<Partition>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, year, is_active, created_at FROM registry_partition WHERE year = ?1",
        )?;
        let mut rows = stmt.query_map(params![year], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn get_active(&self) -> RepositoryResult<Option<Partition>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, year, is_active, created_at FROM registry_partition \
             WHERE is_active = 1 LIMIT 1",
        )?;
        let mut rows = stmt.query_map([], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn resolve_target(&self) -> RepositoryResult<Option<Partition>> {
        if let Some(active) = self.get_active().await? {
            return Ok(Some(active));
        }
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, year, is_active, created_at FROM registry_partition \
             ORDER BY year DESC LIMIT 1",
        )?;
        let mut rows = stmt.query_map([], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> RepositoryResult<Vec<Partition>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, year, is_active, created_at FROM registry_partition ORDER BY year DESC",
        )?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut partitions = Vec::new();
        for row in rows {
            partitions.push(row?);
        }
        Ok(partitions)
    }
}
