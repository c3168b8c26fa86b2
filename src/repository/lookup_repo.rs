// ==========================================
// Manifest Registry - Lookup Repository
// ==========================================
// Data access for the three reference tables. Every
// get-or-create is INSERT OR IGNORE + SELECT inside one
// transaction: a racing creator makes the insert a no-op
// and both callers read the same surviving row, and an
// existing row's metadata is never overwritten.
// ==========================================

use crate::db::open_registry_db;
use crate::domain::{ContainerType, Flag, Ship};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

#[async_trait]
pub trait LookupRepository: Send + Sync {
    /// Resolve or create a container type by its model key.
    /// Returns the row and whether it was newly created.
    async fn get_or_create_container_type(
        &self,
        container_model: &str,
        type_code: &str,
    ) -> RepositoryResult<(ContainerType, bool)>;

    /// Resolve or create a flag by exact name.
    async fn get_or_create_flag(&self, name: &str) -> RepositoryResult<(Flag, bool)>;

    /// Case-insensitive ship lookup by name.
    async fn find_ship(&self, name: &str) -> RepositoryResult<Option<Ship>>;

    /// Resolve a ship case-insensitively or create it carrying the
    /// shipping line and flag link.
    async fn get_or_create_ship(
        &self,
        name: &str,
        shipping_line: &str,
        flag_id: Option<i64>,
    ) -> RepositoryResult<(Ship, bool)>;

    async fn count_container_types(&self) -> RepositoryResult<usize>;
    async fn count_flags(&self) -> RepositoryResult<usize>;
    async fn count_ships(&self) -> RepositoryResult<usize>;
}

pub struct LookupRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl LookupRepositoryImpl {
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

    fn map_container_type(row: &Row<'_>) -> rusqlite::Result<ContainerType> {
        Ok(ContainerType {
            id: row.get(0)?,
            container_model: row.get(1)?,
            type_code: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get::<_, DateTime<Utc>>(4)?,
            updated_at: row.get::<_, DateTime<Utc>>(5)?,
        })
    }

    fn map_flag(row: &Row<'_>) -> rusqlite::Result<Flag> {
        Ok(Flag {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get::<_, DateTime<Utc>>(2)?,
            updated_at: row.get::<_, DateTime<Utc>>(3)?,
        })
    }

    fn map_ship(row: &Row<'_>) -> rusqlite::Result<Ship> {
        Ok(Ship {
            id: row.get(0)?,
            name: row.get(1)?,
            shipping_line: row.get(2)?,
            flag_id: row.get(3)?,
            created_at: row.get::<_, DateTime<Utc>>(4)?,
            updated_at: row.get::<_, DateTime<Utc>>(5)?,
        })
    }

    fn count_table(&self, table: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl LookupRepository for LookupRepositoryImpl {
    async fn get_or_create_container_type(
        &self,
        container_model: &str,
        type_code: &str,
    ) -> RepositoryResult<(ContainerType, bool)> {
        if container_model.is_empty() {
            return Err(RepositoryError::ValidationError(
                "container model key is empty".to_string(),
            ));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO container_type \
             (container_model, type_code, description, created_at, updated_at) \
             VALUES (?1, ?2, '', ?3, ?3)",
            params![container_model, type_code, now],
        )?;
        let row = tx.query_row(
            "SELECT id, container_model, type_code, description, created_at, updated_at \
             FROM container_type WHERE container_model = ?1",
            params![container_model],
            Self::map_container_type,
        )?;
        tx.commit()?;
        Ok((row, inserted > 0))
    }

    async fn get_or_create_flag(&self, name: &str) -> RepositoryResult<(Flag, bool)> {
        if name.is_empty() {
            return Err(RepositoryError::ValidationError(
                "flag name is empty".to_string(),
            ));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO flag (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![name, now],
        )?;
        let row = tx.query_row(
            "SELECT id, name, created_at, updated_at FROM flag WHERE name = ?1",
            params![name],
            Self::map_flag,
        )?;
        tx.commit()?;
        Ok((row, inserted > 0))
    }

    async fn find_ship(&self, name: &str) -> RepositoryResult<Option<Ship>> {
        let conn = self.get_conn()?;
        // name column carries COLLATE NOCASE, so equality is
        // case-insensitive here and in the unique index.
        let mut stmt = conn.prepare(
            "SELECT id, name, shipping_line, flag_id, created_at, updated_at \
             FROM ship WHERE name = ?1",
        )?;
        let mut rows = stmt.query_map(params![name], Self::map_ship)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn get_or_create_ship(
        &self,
        name: &str,
        shipping_line: &str,
        flag_id: Option<i64>,
    ) -> RepositoryResult<(Ship, bool)> {
        if name.is_empty() {
            return Err(RepositoryError::ValidationError(
                "ship name is empty".to_string(),
            ));
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO ship (name, shipping_line, flag_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![name, shipping_line, flag_id, now],
        )?;
        let row = tx.query_row(
            "SELECT id, name, shipping_line, flag_id, created_at, updated_at \
             FROM ship WHERE name = ?1",
            params![name],
            Self::map_ship,
        )?;
        tx.commit()?;
        Ok((row, inserted > 0))
    }

    async fn count_container_types(&self) -> RepositoryResult<usize> {
        self.count_table("container_type")
    }

    async fn count_flags(&self) -> RepositoryResult<usize> {
        self.count_table("flag")
    }

    async fn count_ships(&self) -> RepositoryResult<usize> {
        self.count_table("ship")
    }
}
