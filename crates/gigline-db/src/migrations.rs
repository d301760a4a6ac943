//! Forward-only schema upgrades tracked in `PRAGMA user_version`.
//!
//! Each step runs in its own transaction together with the version bump, so
//! a crash mid-upgrade leaves the previous version intact.

use rusqlite::Connection;
use tracing::info;

use crate::{schema, DbError, Result, SCHEMA_VERSION};

/// `(version, sql)` pairs. Entry `n` upgrades a database at `n - 1` to `n`.
const STEPS: [(u32, &str); 1] = [(1, schema::SCHEMA_V1)];

fn user_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Bring the database up to [`SCHEMA_VERSION`].
///
/// # Errors
///
/// [`DbError::Migration`] if the file was written by a newer build or a step
/// is missing.
pub fn run(conn: &Connection) -> Result<()> {
    let current = user_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "database is at schema v{current}, this build supports up to v{SCHEMA_VERSION}"
        )));
    }

    for version in (current + 1)..=SCHEMA_VERSION {
        let sql = STEPS
            .iter()
            .find(|(v, _)| *v == version)
            .map(|(_, sql)| *sql)
            .ok_or_else(|| DbError::Migration(format!("no migration to v{version}")))?;

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!(from = version - 1, to = version, "schema migrated");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().expect("open");
        run(&conn).expect("migrate");
        assert_eq!(user_version(&conn).expect("version"), SCHEMA_VERSION);
    }

    #[test]
    fn test_run_is_repeatable() {
        let conn = crate::open_memory().expect("open");
        run(&conn).expect("second run is a no-op");
        assert_eq!(user_version(&conn).expect("version"), SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_database_rejected() {
        let conn = crate::open_memory().expect("open");
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .expect("bump version");
        assert!(matches!(run(&conn), Err(DbError::Migration(_))));
    }

    #[test]
    fn test_every_version_has_a_step() {
        for version in 1..=SCHEMA_VERSION {
            assert!(STEPS.iter().any(|(v, _)| *v == version));
        }
    }
}
