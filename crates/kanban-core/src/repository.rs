//! The work item repository.
//!
//! Each mutating operation builds one [`ChangeSet`], hands it to
//! [`Session::commit`] exactly once, and reports a [`Response`]. Expected
//! refusals (missing item, unknown assignee, deleting active work) stage and
//! commit nothing.

use crate::dto::{WorkItemCreate, WorkItemUpdate};
use crate::model::{State, UserId, WorkItem, WorkItemId};
use crate::response::Response;
use crate::session::{ChangeSet, Session, StoreError, WorkItemFilter, WorkItemRecord};
use crate::tags::TagResolver;
use chrono::Utc;
use tracing::{debug, info, warn};

pub struct WorkItemRepository<S> {
    session: S,
}

impl<S: Session> WorkItemRepository<S> {
    pub const fn new(session: S) -> Self {
        Self { session }
    }

    pub const fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// Create a work item in state `New` with both timestamps set to now.
    ///
    /// The assignee id is stored as given and never looked up, so an item
    /// may name a user that does not exist. Only [`Self::update`] checks it.
    ///
    /// # Errors
    ///
    /// Returns an error if tag lookup or the commit fails.
    pub fn create(&mut self, request: WorkItemCreate) -> Result<(Response, WorkItemId), StoreError> {
        let mut changes = ChangeSet::new();
        let tags = TagResolver::new(&self.session).resolve(&mut changes, &request.tags)?;

        let now = Utc::now();
        changes.insert_work_item(WorkItemRecord {
            title: request.title,
            description: request.description,
            assigned_to: request.assigned_to_id,
            tags,
            state: State::New,
            created_at: now,
            state_updated_at: now,
        });

        let receipt = self.session.commit(changes)?;
        let id = receipt
            .work_items
            .first()
            .copied()
            .ok_or(StoreError::Internal("commit returned no id for the new work item"))?;

        info!(work_item_id = %id, assigned_to = %request.assigned_to_id, "work item created");
        Ok((Response::Created, id))
    }

    /// Replace every field of an existing work item.
    ///
    /// `state_updated_at` only moves when `request.state` differs from the
    /// stored state.
    ///
    /// # Errors
    ///
    /// Returns an error if a lookup or the commit fails.
    pub fn update(&mut self, request: WorkItemUpdate) -> Result<Response, StoreError> {
        let Some(current) = self.session.work_item(request.id)? else {
            debug!(work_item_id = %request.id, "update target not found");
            return Ok(Response::NotFound);
        };

        if self.session.user(request.assigned_to_id)?.is_none() {
            warn!(
                work_item_id = %request.id,
                assigned_to = %request.assigned_to_id,
                "update rejected: assignee does not exist"
            );
            return Ok(Response::BadRequest);
        }

        let mut changes = ChangeSet::new();
        let tags = TagResolver::new(&self.session).resolve(&mut changes, &request.tags)?;

        let (state, state_updated_at) = if request.state == current.state {
            (current.state, current.state_updated_at)
        } else {
            debug!(
                work_item_id = %current.id,
                from = %current.state,
                to = %request.state,
                "state changed"
            );
            (request.state, Utc::now())
        };

        changes.update_work_item(
            current.id,
            WorkItemRecord {
                title: request.title,
                description: request.description,
                assigned_to: request.assigned_to_id,
                tags,
                state,
                created_at: current.created_at,
                state_updated_at,
            },
        );

        self.session.commit(changes)?;
        info!(work_item_id = %current.id, state = %state, "work item updated");
        Ok(Response::Updated)
    }

    /// Delete a work item unless it is `Active`.
    ///
    /// Tag associations go with the item; the tags and the assignee stay.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup or the commit fails.
    pub fn delete(&mut self, id: WorkItemId) -> Result<Response, StoreError> {
        let Some(current) = self.session.work_item(id)? else {
            debug!(work_item_id = %id, "delete target not found");
            return Ok(Response::NotFound);
        };

        if !current.state.is_deletable() {
            warn!(work_item_id = %id, state = %current.state, "delete refused for active work item");
            return Ok(Response::Conflict);
        }

        let mut changes = ChangeSet::new();
        changes.remove_work_item(id);
        self.session.commit(changes)?;

        info!(work_item_id = %id, "work item deleted");
        Ok(Response::Deleted)
    }

    /// Look up a work item; `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub fn read(&self, id: WorkItemId) -> Result<Option<WorkItem>, StoreError> {
        self.session.work_item(id)
    }

    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub fn read_all(&self) -> Result<Vec<WorkItem>, StoreError> {
        self.session.work_items(&WorkItemFilter::all())
    }

    /// Work items carrying a tag with exactly this name.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub fn read_all_by_tag(&self, name: &str) -> Result<Vec<WorkItem>, StoreError> {
        self.session.work_items(&WorkItemFilter::by_tag(name))
    }

    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub fn read_all_by_user(&self, user: UserId) -> Result<Vec<WorkItem>, StoreError> {
        self.session.work_items(&WorkItemFilter::by_user(user))
    }

    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub fn read_all_by_state(&self, state: State) -> Result<Vec<WorkItem>, StoreError> {
        self.session.work_items(&WorkItemFilter::by_state(state))
    }
}
