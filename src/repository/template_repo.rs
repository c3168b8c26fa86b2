// ==========================================
// Manifest Registry - Template Repository
// ==========================================
// Manages the import_template table. The column mapping is
// persisted as a JSON column and re-validated on load, so a
// template edited by hand can never smuggle a manual field
// back into the mapping.
// ==========================================

use crate::db::open_registry_db;
use crate::domain::types::{EntryField, SheetFormat};
use crate::domain::ImportTemplate;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Insert or replace a template by name.
    async fn save(&self, template: &ImportTemplate) -> RepositoryResult<ImportTemplate>;

    async fn get_by_name(&self, name: &str) -> RepositoryResult<Option<ImportTemplate>>;

    async fn list(&self) -> RepositoryResult<Vec<ImportTemplate>>;

    async fn delete(&self, name: &str) -> RepositoryResult<bool>;
}

pub struct TemplateRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl TemplateRepositoryImpl {
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

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, u32, String, DateTime<Utc>, DateTime<Utc>)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
        ))
    }

    fn hydrate(
        (id, name, format_raw, start_row, mapping_json, created_at, updated_at): (
            i64,
            String,
            String,
            u32,
            String,
            DateTime<Utc>,
            DateTime<Utc>,
        ),
    ) -> RepositoryResult<ImportTemplate> {
        let sheet_format = SheetFormat::from_str(&format_raw)
            .map_err(RepositoryError::ValidationError)?;
        let mapping: BTreeMap<EntryField, String> = serde_json::from_str(&mapping_json)?;
        ImportTemplate::validate(start_row, &mapping).map_err(RepositoryError::ValidationError)?;
        Ok(ImportTemplate {
            id: Some(id),
            name,
            sheet_format,
            start_row,
            mapping,
            created_at,
            updated_at,
        })
    }
}

#[async_trait]
impl TemplateRepository for TemplateRepositoryImpl {
    async fn save(&self, template: &ImportTemplate) -> RepositoryResult<ImportTemplate> {
        ImportTemplate::validate(template.start_row, &template.mapping)
            .map_err(RepositoryError::ValidationError)?;
        let mapping_json = serde_json::to_string(&template.mapping)?;
        let now = Utc::now();

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_template (name, sheet_format, start_row, mapping_json, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(name) DO UPDATE SET
                sheet_format = excluded.sheet_format,
                start_row = excluded.start_row,
                mapping_json = excluded.mapping_json,
                updated_at = excluded.updated_at
            "#,
            params![
                template.name,
                template.sheet_format.as_str(),
                template.start_row,
                mapping_json,
                template.created_at,
                now,
            ],
        )?;

        let stored = conn.query_row(
            "SELECT id, name, sheet_format, start_row, mapping_json, created_at, updated_at \
             FROM import_template WHERE name = ?1",
            params![template.name],
            Self::map_row,
        )?;
        Self::hydrate(stored)
    }

    async fn get_by_name(&self, name: &str) -> RepositoryResult<Option<ImportTemplate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, sheet_format, start_row, mapping_json, created_at, updated_at \
             FROM import_template WHERE name = ?1",
        )?;
        let mut rows = stmt.query_map(params![name], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(Self::hydrate(row?)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> RepositoryResult<Vec<ImportTemplate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, sheet_format, start_row, mapping_json, created_at, updated_at \
             FROM import_template ORDER BY name",
        )?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut templates = Vec::new();
        for row in rows {
            templates.push(Self::hydrate(row?)?);
        }
        Ok(templates)
    }

    async fn delete(&self, name: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let deleted = conn.execute(
            "DELETE FROM import_template WHERE name = ?1",
            params![name],
        )?;
        Ok(deleted > 0)
    }
}
