//! Explicitly staged changes handed to [`super::Session::commit`].
//!
//! Nothing is tracked implicitly: whatever a caller pushes onto a
//! [`ChangeSet`] is applied, in order, inside one transaction, and nothing
//! else is.

use crate::model::{NewUser, State, Tag, TagId, UserId, WorkItemId};
use chrono::{DateTime, Utc};

/// A tag as seen by a staged work item: either already stored, or staged
/// for insertion earlier in the same change set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagRef {
    Stored(Tag),
    Pending(String),
}

impl TagRef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Stored(tag) => &tag.name,
            Self::Pending(name) => name,
        }
    }

    /// The stored id, if the tag already exists.
    #[must_use]
    pub const fn id(&self) -> Option<TagId> {
        match self {
            Self::Stored(tag) => Some(tag.id),
            Self::Pending(_) => None,
        }
    }
}

/// Column values of a work item row plus its full tag association set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemRecord {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: UserId,
    pub tags: Vec<TagRef>,
    pub state: State,
    pub created_at: DateTime<Utc>,
    pub state_updated_at: DateTime<Utc>,
}

/// One staged mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    InsertUser(NewUser),
    InsertTag(String),
    InsertWorkItem(WorkItemRecord),
    /// Overwrite every column and replace every tag association.
    UpdateWorkItem(WorkItemId, WorkItemRecord),
    /// Remove the row and its tag associations; tags and users stay.
    RemoveWorkItem(WorkItemId),
}

/// Ordered list of staged changes for a single commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&mut self, user: NewUser) {
        self.changes.push(Change::InsertUser(user));
    }

    /// Stage a new tag. Returns `false` (and stages nothing) when a tag with
    /// the same name is already staged in this set.
    pub fn insert_tag(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.is_tag_staged(&name) {
            return false;
        }
        self.changes.push(Change::InsertTag(name));
        true
    }

    #[must_use]
    pub fn is_tag_staged(&self, name: &str) -> bool {
        self.changes
            .iter()
            .any(|change| matches!(change, Change::InsertTag(staged) if staged == name))
    }

    pub fn insert_work_item(&mut self, record: WorkItemRecord) {
        self.changes.push(Change::InsertWorkItem(record));
    }

    pub fn update_work_item(&mut self, id: WorkItemId, record: WorkItemRecord) {
        self.changes.push(Change::UpdateWorkItem(id, record));
    }

    pub fn remove_work_item(&mut self, id: WorkItemId) {
        self.changes.push(Change::RemoveWorkItem(id));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }
}

impl IntoIterator for ChangeSet {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

/// Ids assigned by the store during a commit, in staging order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    pub users: Vec<UserId>,
    pub tags: Vec<Tag>,
    pub work_items: Vec<WorkItemId>,
}
