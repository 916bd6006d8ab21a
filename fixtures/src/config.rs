use std::env;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::ConfigError;

pub const DEFAULT_OUTPUT_DIR: &str = "tmp/fixture_kit";
pub const DEFAULT_PRIMARY_DATABASE: &str = "fixture_kit_test";
pub const DEFAULT_SECONDARY_DATABASE: &str = "fixture_kit_test_2";

/// Which storage the fixture databases live in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// In-process SQLite, gone when the connection closes
    #[default]
    Ephemeral,
    /// SQLite files under the output directory
    File,
    /// PostgreSQL servers addressed by URL
    Networked,
}

impl BackendMode {
    /// Parse the `DB` switch. Unknown values fall back to ephemeral storage.
    pub fn from_switch(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("sqlite-file") | Some("file") => BackendMode::File,
            Some("postgres") | Some("networked") => BackendMode::Networked,
            None | Some("") | Some("sqlite") | Some("memory") | Some("ephemeral") => {
                BackendMode::Ephemeral
            }
            Some(other) => {
                tracing::warn!("Unknown DB mode {:?}, using ephemeral storage", other);
                BackendMode::Ephemeral
            }
        }
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendMode::Ephemeral => write!(f, "ephemeral"),
            BackendMode::File => write!(f, "file"),
            BackendMode::Networked => write!(f, "networked"),
        }
    }
}

/// Connection settings for networked mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkedSettings {
    pub primary_url: String,
    pub primary_database: String,
    pub secondary_url: String,
    pub secondary_database: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: BackendMode,
    /// Directory holding the database files in file mode
    pub output_dir: PathBuf,
    /// Log every SQL statement to stdout
    pub log_sql: bool,
    /// Only present in networked mode
    pub networked: Option<NetworkedSettings>,
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = BackendMode::from_switch(lookup("DB").as_deref());

        let networked = match mode {
            BackendMode::Networked => Some(NetworkedSettings {
                primary_url: required(&lookup, "DATABASE_URL")?,
                primary_database: lookup("DB_NAME")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_PRIMARY_DATABASE.to_string()),
                secondary_url: required(&lookup, "DATABASE_URL_2")?,
                secondary_database: lookup("DB_NAME_2")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_SECONDARY_DATABASE.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            mode,
            output_dir: lookup("FIXTURE_OUTPUT_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            log_sql: lookup("LOG").map(|v| is_truthy(&v)).unwrap_or(false),
            networked,
        })
    }

    /// In-memory configuration with SQL logging off
    pub fn ephemeral() -> Self {
        Self {
            mode: BackendMode::Ephemeral,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_sql: false,
            networked: None,
        }
    }

    /// File-backed configuration writing into `output_dir`
    pub fn file(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: BackendMode::File,
            output_dir: output_dir.into(),
            ..Self::ephemeral()
        }
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(key))
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}
