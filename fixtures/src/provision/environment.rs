//! The booted fixture environment
//!
//! Owns both database connections, the factory registry and the record store
//! factories write through. Tests hold one for their whole lifetime.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::adapters::{SqlEventRepository, SqlPostRepository, SqlRecordStore, SqlUserRepository};
use crate::config::{BackendMode, Config};
use crate::domain::entities::{DatabaseGroup, FieldValue};
use crate::error::{FactoryError, ProvisionError, SchemaError};
use crate::factory::{
    register_defaults, Factories, FactoryDefinition, FactoryHandle, Overrides, Record, Registry,
};

use super::backend::select_backend;
use super::database::FixtureDatabase;
use super::profile::ConnectionProfile;
use super::reset_and_apply_schema;
use super::schema::schema_for;

pub struct FixtureEnvironment {
    config: Config,
    primary: Arc<FixtureDatabase>,
    secondary: Arc<FixtureDatabase>,
    registry: Registry,
    store: SqlRecordStore,
}

impl FixtureEnvironment {
    /// Select storage, connect, reset both databases and register the default
    /// factories
    pub async fn boot(config: Config) -> Result<Self, ProvisionError> {
        if config.log_sql {
            let installed = crate::telemetry::init(&config);
            tracing::debug!(installed, "SQL logging enabled");
        }

        let (primary, secondary) = select_backend(&config)?;

        let primary = Arc::new(open(primary, config.log_sql).await?);
        let secondary = Arc::new(open(secondary, config.log_sql).await?);

        for database in [&primary, &secondary] {
            reset_and_apply_schema(database, schema_for(database.profile().group)).await?;
        }

        let mut registry = Registry::new();
        register_defaults(&mut registry)?;

        tracing::info!(
            mode = %config.mode,
            primary = %primary.profile().display_url(),
            secondary = %secondary.profile().display_url(),
            "Fixture environment ready"
        );

        let store = SqlRecordStore::new(primary.clone(), secondary.clone());
        Ok(Self {
            config,
            primary,
            secondary,
            registry,
            store,
        })
    }

    /// Boot on two private in-memory SQLite databases
    pub async fn ephemeral() -> Result<Self, ProvisionError> {
        Self::boot(Config::ephemeral()).await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> BackendMode {
        self.config.mode
    }

    pub fn define_factory(
        &mut self,
        definition: FactoryDefinition,
    ) -> Result<FactoryHandle, FactoryError> {
        self.registry.define(definition)
    }

    pub fn define_sequence<F, T>(&mut self, name: impl Into<String>, format: F)
    where
        F: Fn(u64) -> T + Send + Sync + 'static,
        T: Into<FieldValue>,
    {
        self.registry.define_sequence(name, format);
    }

    pub fn generate(&self, sequence: &str) -> Result<FieldValue, FactoryError> {
        self.registry.generate(sequence)
    }

    pub fn database(&self, group: DatabaseGroup) -> &FixtureDatabase {
        match group {
            DatabaseGroup::Primary => self.primary.as_ref(),
            DatabaseGroup::Secondary => self.secondary.as_ref(),
        }
    }

    pub fn factories(&self) -> Factories<'_> {
        Factories::new(&self.registry, &self.store)
    }

    pub async fn build(
        &self,
        factory: &str,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Record, FactoryError> {
        self.factories().build(factory, traits, overrides).await
    }

    pub async fn create(
        &self,
        factory: &str,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Record, FactoryError> {
        self.factories().create(factory, traits, overrides).await
    }

    pub async fn attributes_for(
        &self,
        factory: &str,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<BTreeMap<String, FieldValue>, FactoryError> {
        self.factories()
            .attributes_for(factory, traits, overrides)
            .await
    }

    pub async fn build_list(
        &self,
        factory: &str,
        count: usize,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Vec<Record>, FactoryError> {
        self.factories()
            .build_list(factory, count, traits, overrides)
            .await
    }

    pub async fn create_list(
        &self,
        factory: &str,
        count: usize,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Vec<Record>, FactoryError> {
        self.factories()
            .create_list(factory, count, traits, overrides)
            .await
    }

    pub async fn create_pair(
        &self,
        factory: &str,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Vec<Record>, FactoryError> {
        self.factories().create_pair(factory, traits, overrides).await
    }

    pub fn users(&self) -> SqlUserRepository {
        SqlUserRepository::new(self.primary.clone())
    }

    pub fn posts(&self) -> SqlPostRepository {
        SqlPostRepository::new(self.primary.clone())
    }

    pub fn events(&self) -> SqlEventRepository {
        SqlEventRepository::new(self.secondary.clone())
    }

    /// Clear every table and restart all sequences, keeping the connections
    pub async fn reset(&self) -> Result<(), SchemaError> {
        for group in DatabaseGroup::ALL {
            reset_and_apply_schema(self.database(group), schema_for(group)).await?;
        }
        self.registry.rewind_sequences();
        Ok(())
    }

    /// What was provisioned, for logs and the binary's output
    pub async fn report(&self) -> Result<BootReport, SchemaError> {
        let mut databases = Vec::with_capacity(DatabaseGroup::ALL.len());
        for group in DatabaseGroup::ALL {
            let database = self.database(group);
            let profile = database.profile();
            databases.push(DatabaseReport {
                group: profile.group,
                adapter: profile.adapter.to_string(),
                url: profile.display_url(),
                tables: database.table_names().await.map_err(SchemaError::Inspect)?,
            });
        }

        Ok(BootReport {
            mode: self.config.mode,
            databases,
            factories: self.registry.names().into_iter().map(String::from).collect(),
        })
    }
}

async fn open(profile: ConnectionProfile, log_sql: bool) -> Result<FixtureDatabase, ProvisionError> {
    let group = profile.group;
    FixtureDatabase::connect(profile, log_sql)
        .await
        .map_err(|source| ProvisionError::Connect { group, source })
}

#[derive(Debug, Clone, Serialize)]
pub struct BootReport {
    pub mode: BackendMode,
    pub databases: Vec<DatabaseReport>,
    pub factories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseReport {
    pub group: DatabaseGroup,
    pub adapter: String,
    pub url: String,
    pub tables: Vec<String>,
}
