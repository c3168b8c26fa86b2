// ==========================================
// Manifest Registry - SQLite Initialization
// ==========================================
// Goals:
// - one place for Connection::open PRAGMA behavior, so every
//   module sees the same foreign-key and busy-timeout setup
// - idempotent schema creation for fresh databases
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the uniform PRAGMA set.
///
/// foreign_keys and busy_timeout are per-connection settings and
/// must be applied to every connection this process opens.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the uniform configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the registry schema if it does not exist yet.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS registry_partition (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            year        INTEGER NOT NULL UNIQUE,
            is_active   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_template (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL UNIQUE,
            sheet_format  TEXT NOT NULL,
            start_row     INTEGER NOT NULL,
            mapping_json  TEXT NOT NULL,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS container_type (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            container_model  TEXT NOT NULL UNIQUE,
            type_code        TEXT NOT NULL DEFAULT '',
            description      TEXT NOT NULL DEFAULT '',
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS flag (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ship (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            name           TEXT NOT NULL UNIQUE COLLATE NOCASE,
            shipping_line  TEXT NOT NULL DEFAULT '',
            flag_id        INTEGER REFERENCES flag(id) ON DELETE SET NULL,
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS manifest_entry (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            partition_id         INTEGER NOT NULL REFERENCES registry_partition(id) ON DELETE CASCADE,
            ordinal              INTEGER NOT NULL,
            manifest_number      TEXT NOT NULL,
            permit_number        TEXT NOT NULL DEFAULT '',
            operation_request    TEXT NOT NULL DEFAULT '',
            registration_date    TEXT,
            ship_name            TEXT NOT NULL DEFAULT '',
            flag_name            TEXT NOT NULL DEFAULT '',
            position_number      INTEGER,
            container_code       TEXT NOT NULL DEFAULT '',
            package_count        INTEGER,
            gross_weight         TEXT,
            cargo_description    TEXT NOT NULL DEFAULT '',
            operation_type       TEXT,
            summary_number       TEXT NOT NULL DEFAULT '',
            container_type_code  TEXT NOT NULL DEFAULT '',
            shipping_line        TEXT NOT NULL DEFAULT '',
            container_model      TEXT NOT NULL DEFAULT '',
            container_type_id    INTEGER REFERENCES container_type(id) ON DELETE SET NULL,
            ship_id              INTEGER REFERENCES ship(id) ON DELETE SET NULL,
            created_at           TEXT NOT NULL,
            updated_at           TEXT NOT NULL,
            UNIQUE (partition_id, ordinal)
        );

        CREATE INDEX IF NOT EXISTS idx_entry_manifest_container
            ON manifest_entry (manifest_number, container_code);
        CREATE INDEX IF NOT EXISTS idx_entry_registration_date
            ON manifest_entry (registration_date);
        CREATE INDEX IF NOT EXISTS idx_entry_container_model
            ON manifest_entry (container_model);
        "#,
    )
}

/// Open a connection and make sure the schema exists.
pub fn open_registry_db(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='manifest_entry'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
