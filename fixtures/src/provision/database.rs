//! A connected logical database
//!
//! Wraps the SeaORM connection with the profile it was opened from and the
//! maintenance operations the provisioner needs: table listing, truncation
//! and schema application.

use std::time::Duration;

use sea_orm::sea_query::{Alias, Query};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Statement,
};

use crate::domain::entities::KeyKind;
use crate::domain::ports::BackendCapabilities;
use crate::error::{SchemaError, TruncationError};

use super::profile::{AdapterKind, ConnectionProfile, StorageLocation};
use super::schema::{schema_for, SchemaDefinition};

/// Idle and lifetime limit for in-memory connections. Closing the only
/// connection discards the database, so the pool must never reap it.
const MEMORY_KEEP_ALIVE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

pub struct FixtureDatabase {
    profile: ConnectionProfile,
    conn: DatabaseConnection,
}

impl FixtureDatabase {
    /// Open a connection pool for the profile
    pub async fn connect(profile: ConnectionProfile, log_sql: bool) -> Result<Self, DbErr> {
        let conn = Database::connect(connect_options(&profile, log_sql)).await?;
        tracing::debug!(
            group = %profile.group,
            adapter = %profile.adapter,
            "Connected to {}",
            profile.display_url()
        );

        Ok(Self { profile, conn })
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.profile.adapter.backend()
    }

    /// Key type of a table in this database
    pub fn key_kind(&self, table: &str) -> KeyKind {
        schema_for(self.profile.group).key_kind(table, &self.profile)
    }

    /// User tables, sorted by name
    pub async fn table_names(&self) -> Result<Vec<String>, DbErr> {
        let sql = match self.profile.adapter {
            AdapterKind::Sqlite => {
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
            }
            AdapterKind::Postgres => {
                "SELECT tablename::text AS name FROM pg_catalog.pg_tables \
                 WHERE schemaname = current_schema() ORDER BY tablename"
            }
        };

        let rows = self
            .conn
            .query_all(Statement::from_string(self.backend(), sql))
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String>("", "name"))
            .collect()
    }

    /// Column names of a table in declaration order (empty if it doesn't exist)
    pub async fn describe_table(&self, table: &str) -> Result<Vec<String>, DbErr> {
        let sql = match self.profile.adapter {
            AdapterKind::Sqlite => "SELECT name FROM pragma_table_info(?) ORDER BY cid",
            AdapterKind::Postgres => {
                "SELECT column_name::text AS name FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = $1 \
                 ORDER BY ordinal_position"
            }
        };

        let rows = self
            .conn
            .query_all(Statement::from_sql_and_values(
                self.backend(),
                sql,
                [table.into()],
            ))
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String>("", "name"))
            .collect()
    }

    /// Remove every row from every table in this database.
    ///
    /// Succeeds trivially when there are no tables yet.
    pub async fn try_truncate(&self) -> Result<(), TruncationError> {
        let tables = self
            .table_names()
            .await
            .map_err(TruncationError::from_db)?;
        if tables.is_empty() {
            return Ok(());
        }

        match self.profile.adapter {
            AdapterKind::Postgres => {
                let list = tables
                    .iter()
                    .map(|t| quote_ident(t))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.conn
                    .execute_unprepared(&format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", list))
                    .await
                    .map_err(TruncationError::from_db)?;
            }
            AdapterKind::Sqlite => {
                self.conn
                    .execute_unprepared("PRAGMA foreign_keys = OFF")
                    .await
                    .map_err(TruncationError::from_db)?;
                let result = self.delete_all(&tables).await;
                self.conn
                    .execute_unprepared("PRAGMA foreign_keys = ON")
                    .await
                    .map_err(TruncationError::from_db)?;
                result.map_err(TruncationError::from_db)?;
            }
        }

        tracing::debug!(group = %self.profile.group, tables = ?tables, "Truncated tables");
        Ok(())
    }

    async fn delete_all(&self, tables: &[String]) -> Result<(), DbErr> {
        for table in tables {
            let stmt = Query::delete()
                .from_table(Alias::new(table.as_str()))
                .to_owned();
            self.conn.execute(self.backend().build(&stmt)).await?;
        }

        // Restart AUTOINCREMENT counters
        let has_sequences = self
            .conn
            .query_one(Statement::from_string(
                self.backend(),
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
            ))
            .await?
            .is_some();
        if has_sequences {
            self.conn
                .execute_unprepared("DELETE FROM sqlite_sequence")
                .await?;
        }

        Ok(())
    }

    /// Enable supported extensions and create every table that doesn't exist yet
    pub async fn apply_schema(&self, schema: &dyn SchemaDefinition) -> Result<(), SchemaError> {
        for extension in schema.extensions() {
            if !self.profile.supports_extension(extension) {
                continue;
            }
            self.conn
                .execute_unprepared(&format!(
                    "CREATE EXTENSION IF NOT EXISTS {}",
                    quote_ident(extension)
                ))
                .await
                .map_err(|source| SchemaError::Extension {
                    name: extension.to_string(),
                    source,
                })?;
        }

        for table in schema.tables(&self.profile) {
            self.conn
                .execute(self.backend().build(&table.statement))
                .await
                .map_err(|source| SchemaError::Table {
                    table: table.name.to_string(),
                    source,
                })?;
        }

        tracing::debug!(
            group = %self.profile.group,
            uuid_keys = self.profile.supports_uuid_keys(),
            "Schema applied"
        );
        Ok(())
    }
}

fn connect_options(profile: &ConnectionProfile, log_sql: bool) -> ConnectOptions {
    let mut options = ConnectOptions::new(profile.connection_url());
    options.sqlx_logging(log_sql);
    if profile.adapter == AdapterKind::Sqlite {
        options.max_connections(1).min_connections(1);
    }
    if profile.location == StorageLocation::Memory {
        // An in-memory database exists only inside the connection that created it
        options
            .idle_timeout(MEMORY_KEEP_ALIVE)
            .max_lifetime(MEMORY_KEEP_ALIVE);
    }
    options
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
