use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    WorkItemNotFound,
    AssigneeNotFound,
    ActiveWorkItem,
    InvalidEnumValue,
    ConcurrentWrite,
    ConstraintViolation,
    CorruptStore,
    StoreBusy,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::WorkItemNotFound => "E2001",
            Self::AssigneeNotFound => "E2002",
            Self::ActiveWorkItem => "E2003",
            Self::InvalidEnumValue => "E2004",
            Self::ConcurrentWrite => "E3001",
            Self::ConstraintViolation => "E3002",
            Self::CorruptStore => "E3003",
            Self::StoreBusy => "E5001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::WorkItemNotFound => "Work item not found",
            Self::AssigneeNotFound => "Assigned user does not exist",
            Self::ActiveWorkItem => "Active work item cannot be deleted",
            Self::InvalidEnumValue => "Invalid state value",
            Self::ConcurrentWrite => "Conflicting concurrent write",
            Self::ConstraintViolation => "Store constraint violated",
            Self::CorruptStore => "Corrupt store data",
            Self::StoreBusy => "Store busy",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `kb init` to initialize this project."),
            Self::ConfigParseError => Some("Fix syntax in .kanban/config.toml and retry."),
            Self::WorkItemNotFound => Some("Use `kb list` to see existing work items."),
            Self::AssigneeNotFound => Some("Use `kb user list` to pick an existing user id."),
            Self::ActiveWorkItem => {
                Some("Move the item to closed or removed with `kb update --state` first.")
            }
            Self::InvalidEnumValue => {
                Some("Use one of: new, active, resolved, closed, removed.")
            }
            Self::ConcurrentWrite => {
                Some("Another writer changed the same data; re-read and retry the command.")
            }
            Self::ConstraintViolation => {
                Some("A stored value broke a schema rule; check the command input.")
            }
            Self::CorruptStore => Some("Inspect the database file; it holds unreadable values."),
            Self::StoreBusy => Some("Retry after the other `kb` process releases the database."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
