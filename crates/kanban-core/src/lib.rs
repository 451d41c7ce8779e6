//! kanban-core library.
//!
//! Work items owned by users, labelled with shared tags, moving through a
//! small lifecycle. [`repository::WorkItemRepository`] holds the business
//! rules; it talks to storage only through [`session::Session`].
//!
//! # Conventions
//!
//! - **Errors**: store failures are [`session::StoreError`]; expected
//!   business outcomes are [`response::Response`] values. Plumbing
//!   (opening files, config) uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod model;
pub mod repository;
pub mod response;
pub mod session;
pub mod tags;
pub mod users;
