//! # vink-store
//!
//! SQLite persistence for the vink service.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for vanish
//! records and their attachments.  Migrations run before any other
//! operation, and all parent/attachment mutations are transactional so
//! attachment rows can never outlive (or predate) their parent record.

pub mod database;
pub mod migrations;
pub mod models;
pub mod vanishes;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
