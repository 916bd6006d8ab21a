//! Adapters layer
//!
//! Implementations of port traits for the fixture databases.

pub mod sql;

pub use sql::{SqlEventRepository, SqlPostRepository, SqlRecordStore, SqlUserRepository};
