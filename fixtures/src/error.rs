//! Error types for the fixture layer
//!
//! - `ConfigError`: missing or invalid environment configuration (fatal at boot)
//! - `TruncationError`: clearing old tables failed (always recovered)
//! - `SchemaError`: creating extensions or tables failed (fatal at boot)
//! - `FactoryError`: building or creating a record failed (scoped to one test)
//! - `DomainError`: repository errors
//! - `ProvisionError`: everything `FixtureEnvironment::boot` can fail with

use std::path::PathBuf;

use sea_orm::DbErr;
use thiserror::Error;

use crate::domain::entities::DatabaseGroup;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum TruncationError {
    #[error("Relation does not exist: {0}")]
    MissingRelation(String),

    #[error("Truncation failed: {0}")]
    Backend(String),
}

impl TruncationError {
    /// Classify a database error raised while clearing tables
    pub fn from_db(err: DbErr) -> Self {
        let message = err.to_string();
        let lower = message.to_lowercase();
        if lower.contains("no such table")
            || (lower.contains("relation") && lower.contains("does not exist"))
        {
            TruncationError::MissingRelation(message)
        } else {
            TruncationError::Backend(message)
        }
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to enable extension {name}: {source}")]
    Extension {
        name: String,
        #[source]
        source: DbErr,
    },

    #[error("Failed to create table {table}: {source}")]
    Table {
        table: String,
        #[source]
        source: DbErr,
    },

    #[error("Failed to inspect schema: {0}")]
    Inspect(#[source] DbErr),
}

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Factory not registered: {0}")]
    UnknownFactory(String),

    #[error("Factory already registered: {0}")]
    DuplicateFactory(String),

    #[error("Trait {name} not defined for factory {factory}")]
    UnknownTrait { factory: String, name: String },

    #[error("Factory {factory} has no field {field}")]
    UnknownField { factory: String, field: String },

    #[error("Sequence not registered: {0}")]
    UnknownSequence(String),

    #[error("Validation failed for {factory}: {message}")]
    Validation { factory: String, message: String },

    #[error("Failed to persist {factory}: {source}")]
    Persistence {
        factory: String,
        #[source]
        source: DomainError,
    },

    #[error("Cannot convert {factory} record: {message}")]
    Conversion { factory: String, message: String },

    #[error("After-create hook failed: {0}")]
    Hook(String),
}

/// Repository errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to connect to {group} database: {source}")]
    Connect {
        group: DatabaseGroup,
        #[source]
        source: DbErr,
    },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Factory error: {0}")]
    Factory(#[from] FactoryError),
}
