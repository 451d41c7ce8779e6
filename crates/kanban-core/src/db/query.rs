//! `SQLite` query helpers for the kanban store.
//!
//! Typed lookups and filtered listings over users, tags, and work items.
//! Every function takes a shared `&Connection` (a live transaction derefs to
//! one, so these also run inside a commit) and returns typed structs, never
//! raw rows.

use crate::model::{State, Tag, TagId, User, UserId, WorkItem, WorkItemId};
use crate::session::{StoreError, WorkItemFilter};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::collections::BTreeSet;
use std::fmt::Write as _;

// `u.*` come from a LEFT JOIN and are NULL when the assignee is not a stored user.
const WORK_ITEM_COLUMNS: &str = "w.work_item_id, w.title, w.description, w.state, \
     w.created_at_us, w.state_updated_at_us, w.assigned_to, u.user_id, u.name, u.email";

/// Stored value was outside the range `chrono` can represent.
#[derive(Debug, thiserror::Error)]
#[error("timestamp {0}us is out of range")]
struct TimestampOutOfRange(i64);

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Convert a timestamp to the stored microsecond representation.
#[must_use]
pub fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn column_micros(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let us: i64 = row.get(idx)?;
    DateTime::<Utc>::from_timestamp_micros(us).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(TimestampOutOfRange(us)))
    })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Fetch a single user by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_user(conn: &Connection, id: UserId) -> Result<Option<User>, StoreError> {
    let user = conn
        .query_row(
            "SELECT user_id, name, email FROM users WHERE user_id = ?1",
            params![id],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

/// List every user ordered by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, StoreError> {
    let mut stmt = conn.prepare("SELECT user_id, name, email FROM users ORDER BY user_id")?;
    let rows = stmt.query_map([], row_to_user)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Fetch a single tag by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_tag(conn: &Connection, id: TagId) -> Result<Option<Tag>, StoreError> {
    let tag = conn
        .query_row(
            "SELECT tag_id, name FROM tags WHERE tag_id = ?1",
            params![id],
            row_to_tag,
        )
        .optional()?;
    Ok(tag)
}

/// Fetch a tag by exact name. SQLite's default `BINARY` collation makes
/// the comparison case and whitespace sensitive.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_tag_by_name(conn: &Connection, name: &str) -> Result<Option<Tag>, StoreError> {
    let tag = conn
        .query_row(
            "SELECT tag_id, name FROM tags WHERE name = ?1",
            params![name],
            row_to_tag,
        )
        .optional()?;
    Ok(tag)
}

/// List every tag ordered by name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_tags(conn: &Connection) -> Result<Vec<Tag>, StoreError> {
    let mut stmt = conn.prepare("SELECT tag_id, name FROM tags ORDER BY name")?;
    let rows = stmt.query_map([], row_to_tag)?;

    let mut tags = Vec::new();
    for row in rows {
        tags.push(row?);
    }
    Ok(tags)
}

/// All tags associated with one work item.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn tags_for_work_item(conn: &Connection, id: WorkItemId) -> Result<BTreeSet<Tag>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT t.tag_id, t.name \
         FROM work_item_tags wt \
         INNER JOIN tags t ON t.tag_id = wt.tag_id \
         WHERE wt.work_item_id = ?1",
    )?;
    let rows = stmt.query_map(params![id], row_to_tag)?;

    let mut tags = BTreeSet::new();
    for row in rows {
        tags.insert(row?);
    }
    Ok(tags)
}

// ---------------------------------------------------------------------------
// Work items
// ---------------------------------------------------------------------------

/// Fetch a single work item with its assignee and tags.
///
/// Returns `None` if the work item does not exist. An item whose assignee is
/// not a stored user is still returned, with `assignee` set to `None`.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored value cannot
/// be decoded.
pub fn get_work_item(conn: &Connection, id: WorkItemId) -> Result<Option<WorkItem>, StoreError> {
    let sql = format!(
        "SELECT {WORK_ITEM_COLUMNS} \
         FROM work_items w \
         LEFT JOIN users u ON u.user_id = w.assigned_to \
         WHERE w.work_item_id = ?1"
    );

    let Some(mut item) = conn
        .query_row(&sql, params![id], row_to_work_item)
        .optional()?
    else {
        return Ok(None);
    };

    item.tags = tags_for_work_item(conn, item.id)?;
    Ok(Some(item))
}

/// List work items matching the filter, ordered by id.
///
/// # Errors
///
/// Returns an error if the database query fails or a stored value cannot
/// be decoded.
pub fn list_work_items(conn: &Connection, filter: &WorkItemFilter) -> Result<Vec<WorkItem>, StoreError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(user) = filter.assigned_to {
        param_values.push(Box::new(user));
        conditions.push(format!("w.assigned_to = ?{}", param_values.len()));
    }

    if let Some(state) = filter.state {
        param_values.push(Box::new(state));
        conditions.push(format!("w.state = ?{}", param_values.len()));
    }

    // Tag membership requires a JOIN through the association table
    let mut joins = String::new();
    if let Some(ref tag) = filter.tag {
        param_values.push(Box::new(tag.clone()));
        let _ = write!(
            joins,
            " INNER JOIN work_item_tags wt ON wt.work_item_id = w.work_item_id \
             INNER JOIN tags t ON t.tag_id = wt.tag_id AND t.name = ?{}",
            param_values.len()
        );
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT {WORK_ITEM_COLUMNS} \
         FROM work_items w \
         LEFT JOIN users u ON u.user_id = w.assigned_to{joins}{where_clause} \
         ORDER BY w.work_item_id ASC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(AsRef::as_ref).collect();
    let rows = stmt.query_map(params_from_iter(params_ref), row_to_work_item)?;

    let mut items = Vec::new();
    for row in rows {
        let mut item = row?;
        item.tags = tags_for_work_item(conn, item.id)?;
        items.push(item);
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
    })
}

fn row_to_tag(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Map a `WORK_ITEM_COLUMNS` row. Tags are loaded separately.
fn row_to_work_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkItem> {
    let state: State = row.get(3)?;
    let assignee = match row.get::<_, Option<UserId>>(7)? {
        Some(id) => Some(User {
            id,
            name: row.get(8)?,
            email: row.get(9)?,
        }),
        None => None,
    };

    Ok(WorkItem {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        state,
        created_at: column_micros(row, 4)?,
        state_updated_at: column_micros(row, 5)?,
        assigned_to: row.get(6)?,
        assignee,
        tags: BTreeSet::new(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
