//! # gigline-db
//!
//! SQLite persistence for profiles, deputy relationships and gigs.
//! Manages the single database at `$GIGLINE_DATA_DIR/gigline.db`.
//!
//! ## Schema
//!
//! - WAL mode, foreign keys enforced
//! - All timestamps are Unix epoch seconds
//! - Booking history rows cannot be updated or deleted (triggers abort)
//! - Schema version stored in `PRAGMA user_version`
//!
//! ## Modules
//!
//! - [`migrations`] — Forward-only schema upgrades
//! - [`queries`] — Query functions per table
//! - [`schema`] — SQL schema
//! - [`store`] — [`SqliteStore`], the collaborator the core crates consume

pub mod migrations;
pub mod queries;
pub mod schema;
pub mod store;

use gigline_types::StoreError;
use rusqlite::Connection;
use std::path::Path;

pub use store::SqliteStore;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A guarded write found the row in a different state.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Serialization(e.to_string())
    }
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => StoreError::NotFound(what),
            DbError::Conflict(what) => StoreError::Conflict(what),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Open or create the database at the given path.
///
/// Configures WAL mode, foreign keys, and runs any pending migrations.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing).
pub fn open_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    migrations::run(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

/// Map "no rows" to [`DbError::NotFound`] for `what`.
pub(crate) fn not_found(what: impl FnOnce() -> String) -> impl FnOnce(rusqlite::Error) -> DbError {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(what()),
        other => DbError::Sqlite(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory() {
        let conn = open_memory().expect("open in-memory db");
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("get user_version");
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = open_memory().expect("open");
        let fk: i32 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("get foreign_keys");
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_store_error_mapping() {
        assert_eq!(
            StoreError::from(DbError::Conflict("x".into())),
            StoreError::Conflict("x".into())
        );
        assert_eq!(
            StoreError::from(DbError::NotFound("y".into())),
            StoreError::NotFound("y".into())
        );
        assert!(matches!(
            StoreError::from(DbError::Migration("z".into())),
            StoreError::Backend(_)
        ));
    }
}
