//! Tag resolution: turn tag names into tag references, reusing stored tags
//! and staging the missing ones.

use crate::session::{ChangeSet, Session, StoreError, TagRef};
use std::collections::HashSet;
use tracing::debug;

/// Resolves tag names against a session.
///
/// Matching is exact: no trimming or case folding. Two concurrent resolvers
/// may both stage the same new name; the second commit then fails with
/// [`StoreError::Conflict`] from the store's uniqueness constraint.
pub struct TagResolver<'s, S: ?Sized> {
    session: &'s S,
}

impl<'s, S: Session + ?Sized> TagResolver<'s, S> {
    pub const fn new(session: &'s S) -> Self {
        Self { session }
    }

    /// Resolve `names` to one [`TagRef`] per distinct name, in order of first
    /// appearance. Names with no stored tag are staged on `changes`.
    ///
    /// # Errors
    ///
    /// Returns an error if a tag lookup fails.
    pub fn resolve<I, N>(&self, changes: &mut ChangeSet, names: I) -> Result<Vec<TagRef>, StoreError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for name in names {
            let name = name.as_ref();
            if !seen.insert(name.to_owned()) {
                continue;
            }

            if let Some(tag) = self.session.tag_by_name(name)? {
                resolved.push(TagRef::Stored(tag));
            } else {
                if changes.insert_tag(name) {
                    debug!(tag = name, "staged new tag");
                }
                resolved.push(TagRef::Pending(name.to_owned()));
            }
        }

        Ok(resolved)
    }
}
