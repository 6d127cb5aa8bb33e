//! Schema revisions for the `users` store.
//!
//! The revision a database file is at lives in `PRAGMA user_version`. Each
//! entry in `REVISIONS` lifts the file from the previous revision to its own;
//! revision 1 creates the `users` table.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Revision this binary reads and writes.
pub const SCHEMA_VERSION: u32 = 1;

const REVISIONS: &[(u32, &str)] = &[(1, include_str!("sql/0001_users.sql"))];

/// Reads the revision recorded in the database header.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings `conn` up to `SCHEMA_VERSION` inside one transaction.
///
/// Files written by a newer binary are refused rather than downgraded.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let pending: Vec<_> = REVISIONS
        .iter()
        .filter(|(revision, _)| *revision > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (revision, ddl) in pending {
        tx.execute_batch(ddl)?;
        tx.pragma_update(None, "user_version", revision)?;
    }
    tx.commit()?;

    info!(
        "event=db_schema module=db status=ok from_version={} to_version={}",
        found, SCHEMA_VERSION
    );
    Ok(())
}
