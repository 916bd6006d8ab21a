//! Test utilities
//!
//! Hand-written in-memory implementations of the port traits and ready-made
//! entities, so factory behaviour can be tested without a database.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
