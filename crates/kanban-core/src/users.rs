//! Seeding and listing users.
//!
//! Users are owned outside the work item core; these helpers exist so a
//! fresh store can be populated through the same session and change set.

use crate::model::{NewUser, User, UserId};
use crate::session::{ChangeSet, Session, StoreError};
use tracing::info;

/// Insert one user and return the id the store assigned.
///
/// # Errors
///
/// Returns an error if the commit fails.
pub fn create_user<S: Session + ?Sized>(session: &mut S, user: NewUser) -> Result<UserId, StoreError> {
    let mut changes = ChangeSet::new();
    changes.insert_user(user);

    let receipt = session.commit(changes)?;
    let id = receipt
        .users
        .first()
        .copied()
        .ok_or(StoreError::Internal("commit returned no id for the new user"))?;

    info!(user_id = %id, "user created");
    Ok(id)
}

/// Every user, ordered by id.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn list_users<S: Session + ?Sized>(session: &S) -> Result<Vec<User>, StoreError> {
    session.users()
}
