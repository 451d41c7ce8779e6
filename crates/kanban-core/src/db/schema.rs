//! SQLite schema for the kanban store.
//!
//! - `users`, `tags`, `work_items` hold one row per entity
//! - `work_item_tags` is the bare association table between items and tags
//! - timestamps are stored as UTC microseconds (`*_at_us`)
//! - `work_items.assigned_to` is a plain user id; from v3 on it carries no
//!   foreign key, so an item may name a user that is not in `users`

/// Migration v1: entity tables and the association table.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS work_items (
    work_item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    assigned_to INTEGER NOT NULL REFERENCES users(user_id) ON DELETE RESTRICT,
    state TEXT NOT NULL CHECK (state IN ('new', 'active', 'resolved', 'closed', 'removed')),
    created_at_us INTEGER NOT NULL,
    state_updated_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS work_item_tags (
    work_item_id INTEGER NOT NULL REFERENCES work_items(work_item_id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(tag_id) ON DELETE RESTRICT,
    PRIMARY KEY (work_item_id, tag_id)
);
"#;

/// Migration v2: read-path indexes for the filtered listings.
pub const MIGRATION_V2_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_work_items_state
    ON work_items(state, work_item_id);

CREATE INDEX IF NOT EXISTS idx_work_items_assigned_to
    ON work_items(assigned_to, work_item_id);

CREATE INDEX IF NOT EXISTS idx_work_item_tags_tag
    ON work_item_tags(tag_id, work_item_id);
"#;

/// Migration v3: rebuild `work_items` without the foreign key on
/// `assigned_to`. The `AUTOINCREMENT` sequence moves with the table so ids
/// are never reused. Runs with `foreign_keys = OFF`; dropping the old table
/// must not cascade into `work_item_tags`.
pub const MIGRATION_V3_SQL: &str = r#"
CREATE TABLE work_items_v3 (
    work_item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    assigned_to INTEGER NOT NULL,
    state TEXT NOT NULL CHECK (state IN ('new', 'active', 'resolved', 'closed', 'removed')),
    created_at_us INTEGER NOT NULL,
    state_updated_at_us INTEGER NOT NULL
);

INSERT INTO work_items_v3
    (work_item_id, title, description, assigned_to, state, created_at_us, state_updated_at_us)
SELECT work_item_id, title, description, assigned_to, state, created_at_us, state_updated_at_us
FROM work_items;

DELETE FROM sqlite_sequence WHERE name = 'work_items_v3';
UPDATE sqlite_sequence SET name = 'work_items_v3' WHERE name = 'work_items';

DROP TABLE work_items;
ALTER TABLE work_items_v3 RENAME TO work_items;

CREATE INDEX IF NOT EXISTS idx_work_items_state
    ON work_items(state, work_item_id);

CREATE INDEX IF NOT EXISTS idx_work_items_assigned_to
    ON work_items(assigned_to, work_item_id);
"#;

/// Indexes expected by list/filter query paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_work_items_state",
    "idx_work_items_assigned_to",
    "idx_work_item_tags_tag",
];
