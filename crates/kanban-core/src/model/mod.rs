//! Entity model: users, tags, work items, and the lifecycle state.
//!
//! These are plain records. References between them are explicit values
//! loaded by the session; nothing here talks to the store.

pub mod id;
pub mod item;
pub mod tag;
pub mod user;

pub use id::{TagId, UserId, WorkItemId};
pub use item::{ParseEnumError, State, WorkItem};
pub use tag::Tag;
pub use user::{NewUser, User};
