use super::id::{UserId, WorkItemId};
use super::tag::Tag;
use super::user::User;
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::{fmt, str::FromStr};

/// The five lifecycle states.
///
/// Any state may be updated to any other state. The only rule attached to
/// a state is that an `Active` work item cannot be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    New,
    Active,
    Resolved,
    Closed,
    Removed,
}

impl State {
    /// Every state, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Active,
        Self::Resolved,
        Self::Closed,
        Self::Removed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Active => "active",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Removed => "removed",
        }
    }

    /// Whether a work item in this state may be deleted.
    #[must_use]
    pub const fn is_deletable(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// A persisted work item with its assignee and tags materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    pub title: String,
    pub description: Option<String>,
    /// The assignee id as written at create or update time.
    pub assigned_to: UserId,
    /// The stored user behind `assigned_to`, if there is one. `create` does
    /// not check the assignee, so this can be `None`.
    pub assignee: Option<User>,
    pub tags: BTreeSet<Tag>,
    pub state: State,
    /// Set once when the item is created.
    pub created_at: DateTime<Utc>,
    /// Refreshed only when an update changes `state`.
    pub state_updated_at: DateTime<Utc>,
}

impl WorkItem {
    /// Display name of the assignee, when the user exists.
    #[must_use]
    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee.as_ref().map(|user| user.name.as_str())
    }

    /// Tag names in sorted order.
    #[must_use]
    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.iter().map(|tag| tag.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Exact-match membership test on tag names.
    #[must_use]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for State {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "new" => Ok(Self::New),
            "active" => Ok(Self::Active),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            "removed" => Ok(Self::Removed),
            _ => Err(ParseEnumError {
                expected: "state",
                got: s.to_string(),
            }),
        }
    }
}

impl ToSql for State {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for State {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse().map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}
