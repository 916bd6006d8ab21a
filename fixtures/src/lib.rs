//! fixture-kit
//!
//! Provisions two logical test databases (SQLite in memory or on disk, or
//! PostgreSQL) and seeds them through factory definitions.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use fixture_kit::factory::Overrides;
//! use fixture_kit::FixtureEnvironment;
//!
//! let env = FixtureEnvironment::ephemeral().await?;
//! let user = env.create("user", &["with_posts"], Overrides::new()).await?;
//! assert_eq!(user.dependents().len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod factory;
pub mod provision;
pub mod telemetry;

#[cfg(test)]
mod test_utils;


pub use config::{BackendMode, Config};
pub use error::{FactoryError, ProvisionError};
pub use provision::{select_backend, reset_and_apply_schema, FixtureEnvironment};
