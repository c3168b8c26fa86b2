// ==========================================
// Manifest Registry - Entry Repository (rusqlite)
// ==========================================

use crate::db::open_registry_db;
use crate::domain::entry::derive_container_model;
use crate::domain::types::OperationType;
use crate::domain::{ManifestEntry, StagedRow};
use crate::repository::entry_repo::EntryRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rusqlite::{params, Connection, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

const ENTRY_COLUMNS: &str = "id, partition_id, ordinal, manifest_number, permit_number, \
     operation_request, registration_date, ship_name, flag_name, position_number, \
     container_code, package_count, gross_weight, cargo_description, operation_type, \
     summary_number, container_type_code, shipping_line, container_model, \
     container_type_id, ship_id, created_at, updated_at";

pub struct EntryRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl EntryRepositoryImpl {
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

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ManifestEntry> {
        let gross_weight: Option<String> = row.get(12)?;
        let operation_type: Option<String> = row.get(14)?;
        Ok(ManifestEntry {
            id: row.get(0)?,
            partition_id: row.get(1)?,
            ordinal: row.get(2)?,
            manifest_number: row.get(3)?,
            permit_number: row.get(4)?,
            operation_request: row.get(5)?,
            registration_date: row.get::<_, Option<NaiveDate>>(6)?,
            ship_name: row.get(7)?,
            flag_name: row.get(8)?,
            position_number: row.get(9)?,
            container_code: row.get(10)?,
            package_count: row.get(11)?,
            gross_weight: gross_weight.and_then(|w| Decimal::from_str(&w).ok()),
            cargo_description: row.get(13)?,
            operation_type: operation_type.and_then(|c| OperationType::from_code(&c)),
            summary_number: row.get(15)?,
            container_type_code: row.get(16)?,
            shipping_line: row.get(17)?,
            container_model: row.get(18)?,
            container_type_id: row.get(19)?,
            ship_id: row.get(20)?,
            created_at: row.get::<_, DateTime<Utc>>(21)?,
            updated_at: row.get::<_, DateTime<Utc>>(22)?,
        })
    }
}

#[async_trait]
impl EntryRepository for EntryRepositoryImpl {
    async fn insert_with_next_ordinal(
        &self,
        partition_id: i64,
        row: &StagedRow,
    ) -> RepositoryResult<ManifestEntry> {
        let container_model =
            derive_container_model(&row.container_code, &row.container_type_code);
        let now = Utc::now();

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // Read-then-write on the ordinal stays inside this transaction;
        // the connection mutex serializes in-process callers and the
        // transaction covers cross-process ones.
        let ordinal: i64 = tx.query_row(
            "SELECT COALESCE(MAX(ordinal), 0) + 1 FROM manifest_entry WHERE partition_id = ?1",
            params![partition_id],
            |r| r.get(0),
        )?;

        tx.execute(
            r#"
            INSERT INTO manifest_entry (
                partition_id, ordinal, manifest_number, permit_number,
                operation_request, registration_date, ship_name, flag_name,
                position_number, container_code, package_count, gross_weight,
                cargo_description, operation_type, summary_number,
                container_type_code, shipping_line, container_model,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
            )
            "#,
            params![
                partition_id,
                ordinal,
                row.manifest_number,
                row.permit_number,
                row.operation_request,
                row.registration_date,
                row.ship_name,
                row.flag_name,
                row.position_number,
                row.container_code,
                row.package_count,
                row.gross_weight.map(|w| w.to_string()),
                row.cargo_description,
                row.operation_type.map(|o| o.code()),
                row.summary_number,
                row.container_type_code,
                row.shipping_line,
                container_model,
                now,
                now,
            ],
        )?;

        let id = tx.last_insert_rowid();
        let entry = tx.query_row(
            &format!("SELECT {} FROM manifest_entry WHERE id = ?1", ENTRY_COLUMNS),
            params![id],
            Self::map_row,
        )?;
        tx.commit()?;
        Ok(entry)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Option<ManifestEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM manifest_entry WHERE id = ?1",
            ENTRY_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn max_ordinal(&self, partition_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let max: i64 = conn.query_row(
            "SELECT COALESCE(MAX(ordinal), 0) FROM manifest_entry WHERE partition_id = ?1",
            params![partition_id],
            |r| r.get(0),
        )?;
        Ok(max)
    }

    async fn count_by_partition(&self, partition_id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM manifest_entry WHERE partition_id = ?1",
            params![partition_id],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }

    async fn list_by_partition(&self, partition_id: i64) -> RepositoryResult<Vec<ManifestEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM manifest_entry WHERE partition_id = ?1 ORDER BY ordinal",
            ENTRY_COLUMNS
        ))?;
        let rows = stmt.query_map(params![partition_id], Self::map_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    async fn list_unlinked(&self) -> RepositoryResult<Vec<ManifestEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM manifest_entry \
             WHERE (container_model <> '' AND container_type_id IS NULL) \
                OR (ship_name <> '' AND ship_id IS NULL) \
             ORDER BY id",
            ENTRY_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    async fn set_container_type_link(
        &self,
        entry_id: i64,
        container_type_id: i64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE manifest_entry SET container_type_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![container_type_id, Utc::now(), entry_id],
        )?;
        Ok(())
    }

    async fn set_ship_link(&self, entry_id: i64, ship_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE manifest_entry SET ship_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![ship_id, Utc::now(), entry_id],
        )?;
        Ok(())
    }

    async fn latest_manifest_number(
        &self,
        partition_id: i64,
    ) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT manifest_number FROM manifest_entry \
             WHERE partition_id = ?1 ORDER BY ordinal DESC LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![partition_id], |r| r.get::<_, String>(0))?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}
