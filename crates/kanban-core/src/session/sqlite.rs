//! [`Session`] implementation backed by a `rusqlite` connection.

use super::{Change, ChangeSet, CommitReceipt, Session, StoreError, TagRef, WorkItemFilter, WorkItemRecord};
use crate::db::{self, query};
use crate::model::{NewUser, Tag, TagId, User, UserId, WorkItem, WorkItemId};
use anyhow::Result;
use rusqlite::{Connection, Transaction, params};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// A unit of work over one SQLite connection.
#[derive(Debug)]
pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    /// Wrap an already configured and migrated connection.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if opening, configuring, or migrating the database fails.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        Ok(Self::new(db::open_store(path, busy_timeout)?))
    }

    /// Open a private in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if migrating the database fails.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(db::open_in_memory()?))
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    #[must_use]
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl Session for SqliteSession {
    fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        query::get_user(&self.conn, id)
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        query::list_users(&self.conn)
    }

    fn tag(&self, id: TagId) -> Result<Option<Tag>, StoreError> {
        query::get_tag(&self.conn, id)
    }

    fn tag_by_name(&self, name: &str) -> Result<Option<Tag>, StoreError> {
        query::get_tag_by_name(&self.conn, name)
    }

    fn tags(&self) -> Result<Vec<Tag>, StoreError> {
        query::list_tags(&self.conn)
    }

    fn work_item(&self, id: WorkItemId) -> Result<Option<WorkItem>, StoreError> {
        query::get_work_item(&self.conn, id)
    }

    fn work_items(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>, StoreError> {
        query::list_work_items(&self.conn, filter)
    }

    fn commit(&mut self, changes: ChangeSet) -> Result<CommitReceipt, StoreError> {
        let staged = changes.len();
        let tx = self.conn.transaction()?;
        let mut applier = Applier {
            tx: &tx,
            pending_tags: HashMap::new(),
            receipt: CommitReceipt::default(),
        };

        for change in changes {
            applier.apply(change)?;
        }

        let receipt = applier.receipt;
        // Dropping an uncommitted transaction rolls it back, so any `?` above
        // leaves the store untouched.
        tx.commit()?;

        debug!(
            staged,
            users = receipt.users.len(),
            tags = receipt.tags.len(),
            work_items = receipt.work_items.len(),
            "session committed"
        );
        Ok(receipt)
    }
}

/// Applies staged changes inside one open transaction.
struct Applier<'a, 'conn> {
    tx: &'a Transaction<'conn>,
    /// Tags inserted earlier in this commit, by name.
    pending_tags: HashMap<String, TagId>,
    receipt: CommitReceipt,
}

impl Applier<'_, '_> {
    fn apply(&mut self, change: Change) -> Result<(), StoreError> {
        match change {
            Change::InsertUser(user) => {
                let id = self.insert_user(&user)?;
                self.receipt.users.push(id);
            }
            Change::InsertTag(name) => {
                self.tx
                    .execute("INSERT INTO tags (name) VALUES (?1)", params![name])?;
                let id = TagId::new(self.tx.last_insert_rowid());
                self.pending_tags.insert(name.clone(), id);
                self.receipt.tags.push(Tag { id, name });
            }
            Change::InsertWorkItem(record) => {
                self.tx.execute(
                    "INSERT INTO work_items \
                     (title, description, assigned_to, state, created_at_us, state_updated_at_us) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.title,
                        record.description,
                        record.assigned_to,
                        record.state,
                        query::to_micros(record.created_at),
                        query::to_micros(record.state_updated_at),
                    ],
                )?;
                let id = WorkItemId::new(self.tx.last_insert_rowid());
                self.link_tags(id, &record)?;
                self.receipt.work_items.push(id);
            }
            Change::UpdateWorkItem(id, record) => {
                let updated = self.tx.execute(
                    "UPDATE work_items SET \
                     title = ?2, description = ?3, assigned_to = ?4, state = ?5, \
                     created_at_us = ?6, state_updated_at_us = ?7 \
                     WHERE work_item_id = ?1",
                    params![
                        id,
                        record.title,
                        record.description,
                        record.assigned_to,
                        record.state,
                        query::to_micros(record.created_at),
                        query::to_micros(record.state_updated_at),
                    ],
                )?;
                if updated == 0 {
                    return Err(StoreError::Conflict {
                        detail: format!("work item {id} was removed by another writer"),
                    });
                }
                self.tx.execute(
                    "DELETE FROM work_item_tags WHERE work_item_id = ?1",
                    params![id],
                )?;
                self.link_tags(id, &record)?;
            }
            Change::RemoveWorkItem(id) => {
                self.tx.execute(
                    "DELETE FROM work_item_tags WHERE work_item_id = ?1",
                    params![id],
                )?;
                let removed = self
                    .tx
                    .execute("DELETE FROM work_items WHERE work_item_id = ?1", params![id])?;
                if removed == 0 {
                    return Err(StoreError::Conflict {
                        detail: format!("work item {id} was already removed by another writer"),
                    });
                }
            }
        }
        Ok(())
    }

    fn insert_user(&self, user: &NewUser) -> Result<UserId, StoreError> {
        self.tx.execute(
            "INSERT INTO users (name, email) VALUES (?1, ?2)",
            params![user.name, user.email],
        )?;
        Ok(UserId::new(self.tx.last_insert_rowid()))
    }

    fn link_tags(&self, id: WorkItemId, record: &WorkItemRecord) -> Result<(), StoreError> {
        for tag in &record.tags {
            let tag_id = match tag {
                TagRef::Stored(tag) => tag.id,
                TagRef::Pending(name) => *self
                    .pending_tags
                    .get(name)
                    .ok_or(StoreError::Internal("pending tag was not staged before use"))?,
            };
            self.tx.execute(
                "INSERT OR IGNORE INTO work_item_tags (work_item_id, tag_id) VALUES (?1, ?2)",
                params![id, tag_id],
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteSession;
    use crate::model::{NewUser, State, UserId, WorkItemId};
    use crate::session::{ChangeSet, Session, StoreError, TagRef, WorkItemFilter, WorkItemRecord};
    use chrono::{TimeZone, Utc};

    fn record(title: &str, user: UserId, tags: Vec<TagRef>) -> WorkItemRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        WorkItemRecord {
            title: title.into(),
            description: None,
            assigned_to: user,
            tags,
            state: State::New,
            created_at: at,
            state_updated_at: at,
        }
    }

    fn session_with_user() -> (SqliteSession, UserId) {
        let mut session = SqliteSession::open_in_memory().unwrap();
        let mut changes = ChangeSet::new();
        changes.insert_user(NewUser::new("Adrian", "adrian@example.com"));
        let receipt = session.commit(changes).unwrap();
        (session, receipt.users[0])
    }

    #[test]
    fn commit_links_pending_tags_to_new_items() {
        let (mut session, adrian) = session_with_user();

        let mut changes = ChangeSet::new();
        changes.insert_tag("Doing");
        changes.insert_work_item(record(
            "Make Pasta",
            adrian,
            vec![TagRef::Pending("Doing".into())],
        ));
        let receipt = session.commit(changes).unwrap();

        assert_eq!(receipt.tags.len(), 1);
        assert_eq!(receipt.work_items.len(), 1);

        let item = session.work_item(receipt.work_items[0]).unwrap().unwrap();
        assert_eq!(item.tags.iter().next(), receipt.tags.first());
        assert_eq!(
            item.created_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn failed_commit_leaves_no_partial_state() {
        let (mut session, adrian) = session_with_user();

        let mut changes = ChangeSet::new();
        changes.insert_tag("Doing");
        changes.insert_work_item(record("Make Pasta", adrian, Vec::new()));
        // The last change targets a row that does not exist and aborts everything.
        changes.update_work_item(WorkItemId::new(99), record("Ghost", adrian, Vec::new()));

        let err = session.commit(changes).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");

        assert!(session.tags().unwrap().is_empty());
        assert!(session.work_items(&WorkItemFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn duplicate_tag_insert_is_a_conflict() {
        let (mut session, _) = session_with_user();

        let mut first = ChangeSet::new();
        first.insert_tag("Doing");
        session.commit(first).unwrap();

        let mut second = ChangeSet::new();
        second.insert_tag("Doing");
        let err = session.commit(second).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");
        assert_eq!(session.tags().unwrap().len(), 1);
    }

    #[test]
    fn updating_a_vanished_item_is_a_conflict() {
        let (mut session, adrian) = session_with_user();

        let mut changes = ChangeSet::new();
        changes.update_work_item(WorkItemId::new(7), record("Ghost", adrian, Vec::new()));
        let err = session.commit(changes).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");
    }

    #[test]
    fn removing_a_vanished_item_is_a_conflict() {
        let (mut session, adrian) = session_with_user();

        let mut changes = ChangeSet::new();
        changes.insert_tag("Doing");
        changes.insert_work_item(record(
            "Make Pasta",
            adrian,
            vec![TagRef::Pending("Doing".into())],
        ));
        let id = session.commit(changes).unwrap().work_items[0];

        let mut first = ChangeSet::new();
        first.remove_work_item(id);
        session.commit(first).unwrap();

        let mut second = ChangeSet::new();
        second.remove_work_item(id);
        let err = session.commit(second).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");
    }

    #[test]
    fn item_with_unknown_assignee_commits() {
        let (mut session, _) = session_with_user();

        let mut changes = ChangeSet::new();
        changes.insert_work_item(record("Play Computer", UserId::new(40), Vec::new()));
        let id = session.commit(changes).unwrap().work_items[0];

        let item = session.work_item(id).unwrap().unwrap();
        assert_eq!(item.assigned_to, UserId::new(40));
        assert!(item.assignee.is_none());
    }

    #[test]
    fn pending_tag_without_insert_is_rejected() {
        let (mut session, adrian) = session_with_user();

        let mut changes = ChangeSet::new();
        changes.insert_work_item(record(
            "Make Pasta",
            adrian,
            vec![TagRef::Pending("Never staged".into())],
        ));
        let err = session.commit(changes).unwrap_err();
        assert!(matches!(err, StoreError::Internal(_)), "{err:?}");
        assert!(session.work_items(&WorkItemFilter::all()).unwrap().is_empty());
    }

    #[test]
    fn remove_keeps_tags_and_user() {
        let (mut session, adrian) = session_with_user();

        let mut changes = ChangeSet::new();
        changes.insert_tag("Doing");
        changes.insert_work_item(record(
            "Make Pasta",
            adrian,
            vec![TagRef::Pending("Doing".into())],
        ));
        let id = session.commit(changes).unwrap().work_items[0];

        let mut removal = ChangeSet::new();
        removal.remove_work_item(id);
        session.commit(removal).unwrap();

        assert!(session.work_item(id).unwrap().is_none());
        assert_eq!(session.tags().unwrap().len(), 1);
        assert!(session.user(adrian).unwrap().is_some());
        let links: i64 = session
            .connection()
            .query_row("SELECT COUNT(*) FROM work_item_tags", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 0);
    }
}
