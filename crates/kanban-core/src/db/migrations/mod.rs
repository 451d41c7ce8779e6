//! Versioned schema changes for the kanban store.
//!
//! `PRAGMA user_version` records the last step applied to a database file.
//! v1 creates the user, tag, and work item tables; v2 adds the indexes
//! behind the filtered listings; v3 rebuilds `work_items` so an item can
//! name an assignee that is not (yet) a stored user.

use super::schema;
use rusqlite::{Connection, types::Type};

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 3;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "entity tables",
        sql: schema::MIGRATION_V1_SQL,
    },
    Migration {
        version: 2,
        name: "listing indexes",
        sql: schema::MIGRATION_V2_SQL,
    },
    Migration {
        version: 3,
        name: "unlink assignee from users",
        sql: schema::MIGRATION_V3_SQL,
    },
];

/// The schema version stamped on `conn`, or 0 for a fresh file.
///
/// # Errors
///
/// Returns an error if the pragma cannot be read or holds a negative or
/// oversized value.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(version)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(error)))
}

/// Bring the store up to [`LATEST_SCHEMA_VERSION`] and return the version
/// reached. A store that is already current is left untouched.
///
/// Each step commits on its own together with its `user_version` bump.
/// Foreign key enforcement is suspended while steps run, because the
/// `work_items` rebuild drops a table that `work_item_tags` cascades from,
/// and restored afterwards to whatever the connection had.
///
/// # Errors
///
/// Returns an error if any step fails. Steps committed before the failure
/// stay applied.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let from = current_schema_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > from).collect();
    if pending.is_empty() {
        return Ok(from);
    }

    let enforce_foreign_keys: bool =
        conn.pragma_query_value(None, "foreign_keys", |row| row.get(0))?;
    conn.pragma_update(None, "foreign_keys", false)?;
    let applied = apply_steps(conn, &pending);
    let restored = conn.pragma_update(None, "foreign_keys", enforce_foreign_keys);

    let reached = applied?;
    restored?;
    Ok(reached)
}

fn apply_steps(conn: &mut Connection, steps: &[&Migration]) -> rusqlite::Result<u32> {
    let mut reached = 0;
    for step in steps {
        let tx = conn.transaction()?;
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", i64::from(step.version))?;
        tx.commit()?;
        tracing::debug!(version = step.version, step = step.name, "store schema migrated");
        reached = step.version;
    }
    Ok(reached)
}
