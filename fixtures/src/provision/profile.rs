//! Connection profiles
//!
//! A profile names a logical database, the adapter serving it and where its
//! data lives. Capabilities are computed once when the profile is built.

use std::path::PathBuf;

use sea_orm::DatabaseBackend;
use serde::Serialize;
use url::Url;

use crate::domain::entities::DatabaseGroup;
use crate::domain::ports::BackendCapabilities;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    Sqlite,
    Postgres,
}

impl AdapterKind {
    pub fn backend(&self) -> DatabaseBackend {
        match self {
            AdapterKind::Sqlite => DatabaseBackend::Sqlite,
            AdapterKind::Postgres => DatabaseBackend::Postgres,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            AdapterKind::Sqlite => Capabilities {
                uuid_keys: false,
                extensions: Vec::new(),
            },
            AdapterKind::Postgres => Capabilities {
                uuid_keys: true,
                extensions: vec!["pgcrypto".to_string()],
            },
        }
    }
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterKind::Sqlite => write!(f, "sqlite"),
            AdapterKind::Postgres => write!(f, "postgres"),
        }
    }
}

/// What a backend can do, cached in the profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub uuid_keys: bool,
    pub extensions: Vec<String>,
}

impl BackendCapabilities for Capabilities {
    fn supports_uuid_keys(&self) -> bool {
        self.uuid_keys
    }

    fn supports_extension(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| ext == name)
    }
}

/// Where a database's data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// Private to the connection that opened it
    Memory,
    File(PathBuf),
    /// Server URL already pointed at the target database
    Server(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    pub group: DatabaseGroup,
    pub adapter: AdapterKind,
    pub location: StorageLocation,
    capabilities: Capabilities,
}

impl ConnectionProfile {
    pub fn new(group: DatabaseGroup, adapter: AdapterKind, location: StorageLocation) -> Self {
        Self {
            group,
            adapter,
            location,
            capabilities: adapter.capabilities(),
        }
    }

    pub fn memory(group: DatabaseGroup) -> Self {
        Self::new(group, AdapterKind::Sqlite, StorageLocation::Memory)
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// URL handed to SeaORM
    pub fn connection_url(&self) -> String {
        match &self.location {
            StorageLocation::Memory => "sqlite::memory:".to_string(),
            StorageLocation::File(path) => format!("sqlite://{}?mode=rwc", path.display()),
            StorageLocation::Server(url) => url.to_string(),
        }
    }

    /// Connection URL with any password masked, for logs and reports
    pub fn display_url(&self) -> String {
        match &self.location {
            StorageLocation::Server(url) => redact_password(url).to_string(),
            _ => self.connection_url(),
        }
    }

    /// Whether both profiles would read and write the same physical storage.
    /// In-memory databases are private to their connection and never shared.
    pub fn shares_storage_with(&self, other: &ConnectionProfile) -> bool {
        match (&self.location, &other.location) {
            (StorageLocation::Memory, _) | (_, StorageLocation::Memory) => false,
            (StorageLocation::File(a), StorageLocation::File(b)) => a == b,
            (StorageLocation::Server(a), StorageLocation::Server(b)) => a == b,
            _ => false,
        }
    }
}

impl BackendCapabilities for ConnectionProfile {
    fn supports_uuid_keys(&self) -> bool {
        self.capabilities.supports_uuid_keys()
    }

    fn supports_extension(&self, name: &str) -> bool {
        self.capabilities.supports_extension(name)
    }
}

/// Parse a Postgres server URL and point its path at `database`, keeping
/// credentials and any query string. `var` names the setting for errors.
pub fn server_url(var: &'static str, url: &str, database: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        var,
        value: url.to_string(),
    };

    let mut parsed = Url::parse(url).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "postgres" | "postgresql") {
        return Err(invalid());
    }

    parsed
        .path_segments_mut()
        .map_err(|_| invalid())?
        .clear()
        .push(database);
    Ok(parsed)
}

fn redact_password(url: &Url) -> Url {
    let mut masked = url.clone();
    if masked.password().is_some() {
        // Fails only for hostless URLs, which cannot carry a password
        let _ = masked.set_password(Some("***"));
    }
    masked
}
