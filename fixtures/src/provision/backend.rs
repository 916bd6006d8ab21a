//! Backend selection
//!
//! Turns the configured mode into one profile per logical database.

use std::fs;
use std::path::Path;

use crate::config::{BackendMode, Config};
use crate::domain::entities::DatabaseGroup;
use crate::error::{ConfigError, ProvisionError};

use super::profile::{server_url, AdapterKind, ConnectionProfile, StorageLocation};

pub const PRIMARY_DB_FILE: &str = "testdb.sqlite";
pub const SECONDARY_DB_FILE: &str = "testdb_2.sqlite";

/// Pick the primary and secondary connection profiles for the configured mode.
///
/// File mode creates the output directory and removes stale database files
/// left by an earlier run. Networked mode fails with a configuration error
/// when the server URLs are missing.
pub fn select_backend(
    config: &Config,
) -> Result<(ConnectionProfile, ConnectionProfile), ProvisionError> {
    let profiles = match config.mode {
        BackendMode::Ephemeral => (
            ConnectionProfile::memory(DatabaseGroup::Primary),
            ConnectionProfile::memory(DatabaseGroup::Secondary),
        ),
        BackendMode::File => file_profiles(&config.output_dir)?,
        BackendMode::Networked => networked_profiles(config)?,
    };

    tracing::debug!(
        mode = %config.mode,
        primary = %profiles.0.display_url(),
        secondary = %profiles.1.display_url(),
        "Selected backend"
    );

    Ok(profiles)
}

fn file_profiles(
    output_dir: &Path,
) -> Result<(ConnectionProfile, ConnectionProfile), ProvisionError> {
    fs::create_dir_all(output_dir).map_err(|source| ProvisionError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let primary = output_dir.join(PRIMARY_DB_FILE);
    let secondary = output_dir.join(SECONDARY_DB_FILE);

    for path in [&primary, &secondary] {
        if path.is_file() {
            tracing::debug!("Removing stale database file {}", path.display());
            fs::remove_file(path).map_err(|source| ProvisionError::Io {
                path: path.clone(),
                source,
            })?;
        }
    }

    Ok((
        ConnectionProfile::new(
            DatabaseGroup::Primary,
            AdapterKind::Sqlite,
            StorageLocation::File(primary),
        ),
        ConnectionProfile::new(
            DatabaseGroup::Secondary,
            AdapterKind::Sqlite,
            StorageLocation::File(secondary),
        ),
    ))
}

fn networked_profiles(
    config: &Config,
) -> Result<(ConnectionProfile, ConnectionProfile), ProvisionError> {
    let settings = config
        .networked
        .as_ref()
        .ok_or(ConfigError::MissingVar("DATABASE_URL"))?;

    let primary = ConnectionProfile::new(
        DatabaseGroup::Primary,
        AdapterKind::Postgres,
        StorageLocation::Server(server_url(
            "DATABASE_URL",
            &settings.primary_url,
            &settings.primary_database,
        )?),
    );
    let secondary = ConnectionProfile::new(
        DatabaseGroup::Secondary,
        AdapterKind::Postgres,
        StorageLocation::Server(server_url(
            "DATABASE_URL_2",
            &settings.secondary_url,
            &settings.secondary_database,
        )?),
    );

    // Both groups truncate independently, so they must not point at one database
    if primary.shares_storage_with(&secondary) {
        return Err(ConfigError::InvalidValue {
            var: "DB_NAME_2",
            value: settings.secondary_database.clone(),
        }
        .into());
    }

    Ok((primary, secondary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkedSettings;

    fn networked_config(primary_db: &str, secondary_db: &str) -> Config {
        Config {
            mode: BackendMode::Networked,
            networked: Some(NetworkedSettings {
                primary_url: "postgres://localhost:5432".to_string(),
                primary_database: primary_db.to_string(),
                secondary_url: "postgres://localhost:5432".to_string(),
                secondary_database: secondary_db.to_string(),
            }),
            ..Config::ephemeral()
        }
    }

    fn assert_pair(primary: &ConnectionProfile, secondary: &ConnectionProfile) {
        assert_eq!(primary.group, DatabaseGroup::Primary);
        assert_eq!(secondary.group, DatabaseGroup::Secondary);
        assert!(!primary.shares_storage_with(secondary));
    }

    #[test]
    fn ephemeral_mode_uses_memory() {
        let (primary, secondary) = select_backend(&Config::ephemeral()).unwrap();
        assert_pair(&primary, &secondary);
        assert_eq!(primary.location, StorageLocation::Memory);
        assert_eq!(primary.connection_url(), "sqlite::memory:");
    }

    #[test]
    fn file_mode_creates_dir_and_removes_stale_files() {
        let tmp = tempfile::tempdir().unwrap();
        let output_dir = tmp.path().join("nested").join("out");
        fs::create_dir_all(&output_dir).unwrap();
        fs::write(output_dir.join(PRIMARY_DB_FILE), b"stale").unwrap();
        fs::write(output_dir.join(SECONDARY_DB_FILE), b"stale").unwrap();

        let (primary, secondary) = select_backend(&Config::file(&output_dir)).unwrap();
        assert_pair(&primary, &secondary);
        assert!(!output_dir.join(PRIMARY_DB_FILE).exists());
        assert!(!output_dir.join(SECONDARY_DB_FILE).exists());
        assert_eq!(
            primary.location,
            StorageLocation::File(output_dir.join(PRIMARY_DB_FILE))
        );
    }

    #[test]
    fn file_mode_creates_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let output_dir = tmp.path().join("fresh");

        select_backend(&Config::file(&output_dir)).unwrap();
        assert!(output_dir.is_dir());
    }

    #[test]
    fn networked_mode_uses_database_names() {
        let (primary, secondary) =
            select_backend(&networked_config("fixtures_a", "fixtures_b")).unwrap();
        assert_pair(&primary, &secondary);
        assert_eq!(primary.adapter, AdapterKind::Postgres);
        assert_eq!(
            secondary.connection_url(),
            "postgres://localhost:5432/fixtures_b"
        );
    }

    #[test]
    fn networked_mode_without_settings_fails() {
        let config = Config {
            mode: BackendMode::Networked,
            ..Config::ephemeral()
        };
        let err = select_backend(&config).unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Config(ConfigError::MissingVar("DATABASE_URL"))
        ));
    }

    #[test]
    fn networked_mode_rejects_shared_database() {
        let err = select_backend(&networked_config("same", "same")).unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Config(ConfigError::InvalidValue { var: "DB_NAME_2", .. })
        ));
    }

    #[test]
    fn networked_mode_rejects_non_postgres_urls() {
        let mut config = networked_config("a", "b");
        if let Some(settings) = config.networked.as_mut() {
            settings.primary_url = "mysql://localhost".to_string();
        }
        let err = select_backend(&config).unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Config(ConfigError::InvalidValue { var: "DATABASE_URL", .. })
        ));
    }

    #[test]
    fn networked_mode_rejects_malformed_urls() {
        let mut config = networked_config("a", "b");
        if let Some(settings) = config.networked.as_mut() {
            settings.secondary_url = "postgres//localhost:5432".to_string();
        }
        let err = select_backend(&config).unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Config(ConfigError::InvalidValue { var: "DATABASE_URL_2", .. })
        ));
    }
}
