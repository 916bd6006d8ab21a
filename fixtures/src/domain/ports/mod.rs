//! Domain ports (traits)
//!
//! Adapters in `crate::adapters` provide the SeaORM-backed implementations,
//! `crate::test_utils` the in-memory ones.

pub mod backend;
pub mod record_store;
pub mod repositories;

pub use backend::BackendCapabilities;
pub use record_store::{NewRow, RecordStore};
pub use repositories::{EventRepository, PostRepository, UserRepository};
