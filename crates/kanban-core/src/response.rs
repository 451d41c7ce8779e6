//! Outcome codes returned by mutating repository operations.
//!
//! Expected business conditions (missing item, unknown assignee, deleting
//! active work) are values of [`Response`], never errors. Only store
//! failures travel through `Err`.

use crate::error::ErrorCode;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Created,
    Updated,
    Deleted,
    Conflict,
    BadRequest,
    NotFound,
}

impl Response {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Conflict => "conflict",
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
        }
    }

    /// `true` when the operation took effect.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Created | Self::Updated | Self::Deleted)
    }

    /// Error code a boundary layer reports for a refused operation.
    #[must_use]
    pub const fn error_code(self) -> Option<ErrorCode> {
        match self {
            Self::Created | Self::Updated | Self::Deleted => None,
            Self::Conflict => Some(ErrorCode::ActiveWorkItem),
            Self::BadRequest => Some(ErrorCode::AssigneeNotFound),
            Self::NotFound => Some(ErrorCode::WorkItemNotFound),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
