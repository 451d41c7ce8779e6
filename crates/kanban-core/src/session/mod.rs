//! The persistence boundary the repository talks to.
//!
//! A [`Session`] answers point lookups and predicate queries, and applies a
//! [`ChangeSet`] atomically on [`Session::commit`]. [`SqliteSession`] is the
//! shipped implementation.

pub mod changes;
pub mod sqlite;

pub use changes::{Change, ChangeSet, CommitReceipt, TagRef, WorkItemRecord};
pub use sqlite::SqliteSession;

use crate::error::ErrorCode;
use crate::model::{State, Tag, TagId, User, UserId, WorkItem, WorkItemId};
use rusqlite::ErrorCode as SqliteCode;

/// Errors raised by the store itself. Business outcomes never use this type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another writer got there first: two writers created the same tag
    /// name, or the item being updated or removed is already gone.
    #[error("conflicting write: {detail}")]
    Conflict { detail: String },

    /// Any other integrity constraint rejected the commit.
    #[error("constraint violated: {detail}")]
    Constraint { detail: String },

    /// The database stayed locked past the busy timeout.
    #[error("store busy: {0}")]
    Busy(#[source] rusqlite::Error),

    /// A stored value could not be decoded.
    #[error("corrupt stored value: {detail}")]
    Corrupt { detail: String },

    /// The store answered in a way the session cannot interpret.
    #[error("inconsistent store response: {0}")]
    Internal(&'static str),

    /// Any other driver failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[source] rusqlite::Error),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Conflict { .. } => ErrorCode::ConcurrentWrite,
            Self::Constraint { .. } => ErrorCode::ConstraintViolation,
            Self::Busy(_) => ErrorCode::StoreBusy,
            Self::Corrupt { .. } => ErrorCode::CorruptStore,
            Self::Internal(_) | Self::Sqlite(_) => ErrorCode::InternalUnexpected,
        }
    }

    /// Optional remediation hint for operators and agents.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message) => {
                let detail = message
                    .clone()
                    .unwrap_or_else(|| failure.to_string());
                match failure.code {
                    SqliteCode::ConstraintViolation
                        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                            || failure.extended_code
                                == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                    {
                        Self::Conflict { detail }
                    }
                    SqliteCode::ConstraintViolation => Self::Constraint { detail },
                    SqliteCode::DatabaseBusy | SqliteCode::DatabaseLocked => Self::Busy(err),
                    _ => Self::Sqlite(err),
                }
            }
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => Self::Corrupt {
                detail: err.to_string(),
            },
            _ => Self::Sqlite(err),
        }
    }
}

/// Predicate for [`Session::work_items`].
///
/// All fields are optional. When multiple fields are set, they are combined
/// with AND semantics; the default filter matches every work item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkItemFilter {
    /// Item must carry a tag with exactly this name.
    pub tag: Option<String>,
    /// Item must be assigned to this user.
    pub assigned_to: Option<UserId>,
    /// Item must be in this state.
    pub state: Option<State>,
}

impl WorkItemFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn by_tag(name: impl Into<String>) -> Self {
        Self {
            tag: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_user(user: UserId) -> Self {
        Self {
            assigned_to: Some(user),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_state(state: State) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Evaluate the filter against an already loaded item.
    #[must_use]
    pub fn matches(&self, item: &WorkItem) -> bool {
        self.tag.as_deref().is_none_or(|name| item.has_tag(name))
            && self.assigned_to.is_none_or(|id| item.assigned_to == id)
            && self.state.is_none_or(|state| item.state == state)
    }
}

/// Transactional unit of work over the store.
///
/// Reads observe committed data only; staged changes become visible after a
/// successful [`commit`](Session::commit). A failed commit leaves nothing
/// behind.
pub trait Session {
    fn user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    fn users(&self) -> Result<Vec<User>, StoreError>;

    fn tag(&self, id: TagId) -> Result<Option<Tag>, StoreError>;

    /// Exact, case-sensitive name lookup.
    fn tag_by_name(&self, name: &str) -> Result<Option<Tag>, StoreError>;

    fn tags(&self) -> Result<Vec<Tag>, StoreError>;

    fn work_item(&self, id: WorkItemId) -> Result<Option<WorkItem>, StoreError>;

    fn work_items(&self, filter: &WorkItemFilter) -> Result<Vec<WorkItem>, StoreError>;

    /// Apply every staged change in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] on uniqueness violations and
    /// [`StoreError::Constraint`] on other integrity violations; the
    /// transaction is rolled back in both cases.
    fn commit(&mut self, changes: ChangeSet) -> Result<CommitReceipt, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::{StoreError, WorkItemFilter};
    use crate::error::ErrorCode;
    use crate::model::{State, Tag, TagId, User, UserId, WorkItem, WorkItemId};
    use chrono::Utc;

    fn item(state: State, user: i64, tags: &[&str]) -> WorkItem {
        let now = Utc::now();
        WorkItem {
            id: WorkItemId::new(1),
            title: "t".into(),
            description: None,
            assigned_to: UserId::new(user),
            assignee: Some(User {
                id: UserId::new(user),
                name: "u".into(),
                email: "u@example.com".into(),
            }),
            tags: tags
                .iter()
                .zip(1..)
                .map(|(name, id)| Tag {
                    id: TagId::new(id),
                    name: (*name).into(),
                })
                .collect(),
            state,
            created_at: now,
            state_updated_at: now,
        }
    }

    #[test]
    fn default_filter_matches_everything() {
        assert!(WorkItemFilter::all().matches(&item(State::Closed, 3, &[])));
    }

    #[test]
    fn filters_combine_with_and() {
        let filter = WorkItemFilter {
            tag: Some("Doing".into()),
            assigned_to: Some(UserId::new(1)),
            state: Some(State::Active),
        };
        assert!(filter.matches(&item(State::Active, 1, &["Doing"])));
        assert!(!filter.matches(&item(State::New, 1, &["Doing"])));
        assert!(!filter.matches(&item(State::Active, 2, &["Doing"])));
        assert!(!filter.matches(&item(State::Active, 1, &["doing"])));
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: StoreError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, StoreError::Conflict { .. }), "{err:?}");
        assert_eq!(err.code(), ErrorCode::ConcurrentWrite);
    }

    #[test]
    fn not_null_violation_maps_to_constraint() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL);").unwrap();
        let err: StoreError = conn
            .execute("INSERT INTO t VALUES (NULL)", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, StoreError::Constraint { .. }), "{err:?}");
        assert!(err.hint().is_some());
    }
}
