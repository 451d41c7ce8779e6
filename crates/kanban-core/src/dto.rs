//! Request and response shapes exchanged with callers of the repository.
//!
//! Requests name tags and users by their external handles (tag names, user
//! ids); responses flatten the entity graph into plain fields. Neither shape
//! mirrors the persisted entity layout.

use crate::model::{State, UserId, WorkItem, WorkItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input for [`crate::repository::WorkItemRepository::create`].
///
/// There is no state field: new work items always start as `New`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemCreate {
    pub title: String,
    pub assigned_to_id: UserId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl WorkItemCreate {
    pub fn new<I, N>(
        title: impl Into<String>,
        assigned_to_id: UserId,
        description: Option<String>,
        tags: I,
    ) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self {
            title: title.into(),
            assigned_to_id,
            description,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Input for [`crate::repository::WorkItemRepository::update`].
///
/// Every field replaces the stored value; `tags` replaces the whole tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemUpdate {
    pub id: WorkItemId,
    pub title: String,
    pub assigned_to_id: UserId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub state: State,
}

impl WorkItemUpdate {
    /// An update that would write back exactly what `item` holds today.
    ///
    /// Callers override the fields they want to change.
    #[must_use]
    pub fn from_item(item: &WorkItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            assigned_to_id: item.assigned_to,
            description: item.description.clone(),
            tags: item.tag_names().into_iter().map(str::to_string).collect(),
            state: item.state,
        }
    }
}

/// One row of a work item listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemSummary {
    pub id: WorkItemId,
    pub title: String,
    /// `None` when the assignee id names no stored user.
    pub assigned_to_name: Option<String>,
    pub tags: Vec<String>,
    pub state: State,
}

impl From<&WorkItem> for WorkItemSummary {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            assigned_to_name: item.assignee_name().map(str::to_string),
            tags: item.tag_names().into_iter().map(str::to_string).collect(),
            state: item.state,
        }
    }
}

/// Full detail view of a single work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemDetails {
    pub id: WorkItemId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created: DateTime<Utc>,
    pub assigned_to_id: UserId,
    pub assigned_to_name: Option<String>,
    pub tags: Vec<String>,
    pub state: State,
    pub state_updated: DateTime<Utc>,
}

impl From<&WorkItem> for WorkItemDetails {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            created: item.created_at,
            assigned_to_id: item.assigned_to,
            assigned_to_name: item.assignee_name().map(str::to_string),
            tags: item.tag_names().into_iter().map(str::to_string).collect(),
            state: item.state,
            state_updated: item.state_updated_at,
        }
    }
}
