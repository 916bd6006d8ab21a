//! Fixture environment provisioning
//!
//! Boot sequence, run once per environment:
//! 1. `select_backend` picks a connection profile per logical database
//! 2. `FixtureDatabase::connect` opens each one
//! 3. `reset_and_apply_schema` clears old rows and creates missing tables
//! 4. the default factories are registered

pub mod backend;
pub mod database;
pub mod environment;
pub mod profile;
pub mod schema;

pub use backend::{select_backend, PRIMARY_DB_FILE, SECONDARY_DB_FILE};
pub use database::FixtureDatabase;
pub use environment::{BootReport, DatabaseReport, FixtureEnvironment};
pub use profile::{server_url, AdapterKind, Capabilities, ConnectionProfile, StorageLocation};
pub use schema::{schema_for, PrimarySchema, SchemaDefinition, SecondarySchema};

use crate::error::{SchemaError, TruncationError};

/// Truncate all tables of `database`, then apply `schema`.
///
/// Truncation errors are discarded: on a fresh database there is nothing to
/// clear, and a failed reset must not stop the test run. Schema errors are
/// returned.
pub async fn reset_and_apply_schema(
    database: &FixtureDatabase,
    schema: &dyn SchemaDefinition,
) -> Result<(), SchemaError> {
    match database.try_truncate().await {
        Ok(()) => {}
        Err(TruncationError::MissingRelation(msg)) => {
            tracing::debug!(group = %database.profile().group, "Nothing to truncate: {}", msg);
        }
        Err(err @ TruncationError::Backend(_)) => {
            tracing::warn!(group = %database.profile().group, "Ignoring truncation failure: {}", err);
        }
    }

    database.apply_schema(schema).await
}
