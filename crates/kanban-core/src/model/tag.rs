use super::id::TagId;
use serde::{Deserialize, Serialize};

/// A named label shared by any number of work items.
///
/// Names are unique in the store and compared as exact strings: `"Doing"`
/// and `"doing"` are two different tags.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}
