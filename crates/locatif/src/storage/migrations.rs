//! Schema versions.
//!
//! The version lives in the `metadata` table under `schema_version`. A fresh
//! file starts at 0 and walks every step up to [`CURRENT_VERSION`].

use rusqlite::Connection;
use tracing::info;

use crate::error::{Error, Result};

use super::schema::SCHEMA_STATEMENTS;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Columns added to `tenants` by migration 2.
const BUSINESS_TENANT_COLUMNS: &[(&str, &str)] = &[
    ("company_name", "TEXT"),
    ("siret", "TEXT"),
    ("company_director", "TEXT"),
];

/// Initialize the database schema.
///
/// Creates all tables and indexes if they don't exist, then runs any
/// pending migrations to bring the schema up to the current version.
///
/// # Errors
///
/// Returns an error if schema creation or migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = get_schema_version(conn)?;
    if version < CURRENT_VERSION {
        run_migrations(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (fresh database).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Run migrations from the given version to the current version.
///
/// All steps run in one transaction.
fn run_migrations(conn: &Connection, from_version: i32) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let mut current = from_version;

    while current < CURRENT_VERSION {
        current += 1;
        run_migration(&tx, current)?;
    }

    set_schema_version(&tx, CURRENT_VERSION)?;
    tx.commit()?;
    info!(
        "Migrated database schema from version {} to {}",
        from_version, CURRENT_VERSION
    );
    Ok(())
}

/// Run a specific migration version.
fn run_migration(conn: &Connection, version: i32) -> Result<()> {
    match version {
        1 => migrate_v1(conn),
        2 => migrate_v2(conn),
        _ => Err(Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        }),
    }
}

/// Migration to version 1 (initial schema).
///
/// Version 1 is the base schema created by `SCHEMA_STATEMENTS`.
fn migrate_v1(conn: &Connection) -> Result<()> {
    set_schema_version(conn, 1)
}

/// Migration to version 2: business tenant columns.
///
/// Columns that already exist are left alone.
fn migrate_v2(conn: &Connection) -> Result<()> {
    let existing = table_columns(conn, "tenants")?;
    for (column, sql_type) in BUSINESS_TENANT_COLUMNS {
        if !existing.iter().any(|c| c == column) {
            conn.execute(
                &format!("ALTER TABLE tenants ADD COLUMN {column} {sql_type}"),
                [],
            )?;
        }
    }
    set_schema_version(conn, 2)
}

/// Column names of a table, in declaration order.
fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([table], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(columns)
}
