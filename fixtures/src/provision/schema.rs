//! Table definitions for the two logical databases
//!
//! primary: `users`, `posts` (posts.user_id -> users.id)
//! secondary: `events`
//!
//! Every table is created with IF NOT EXISTS so applying a schema twice is a
//! no-op. Key columns follow the backend: UUIDs where supported, otherwise
//! auto-incrementing integers.

use sea_orm::sea_query::{ColumnDef, ForeignKey, ForeignKeyAction, Table, TableCreateStatement};
use sea_orm::DeriveIden;

use crate::domain::entities::{DatabaseGroup, KeyKind};
use crate::domain::ports::BackendCapabilities;

use super::profile::{AdapterKind, ConnectionProfile};

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Name,
    Tag,
}

#[derive(DeriveIden)]
pub enum Posts {
    Table,
    Id,
    Text,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Events {
    Table,
    Id,
    Data,
}

/// A named CREATE TABLE statement
pub struct TableDefinition {
    pub name: &'static str,
    pub statement: TableCreateStatement,
}

/// Schema of one logical database
pub trait SchemaDefinition: Send + Sync {
    fn group(&self) -> DatabaseGroup;

    /// Extensions to enable first, when the backend supports them
    fn extensions(&self) -> &[&'static str] {
        &["pgcrypto"]
    }

    /// Key type of `table` on this profile's backend
    fn key_kind(&self, _table: &str, profile: &ConnectionProfile) -> KeyKind {
        profile.preferred_key()
    }

    fn tables(&self, profile: &ConnectionProfile) -> Vec<TableDefinition>;
}

pub struct PrimarySchema;

impl SchemaDefinition for PrimarySchema {
    fn group(&self) -> DatabaseGroup {
        DatabaseGroup::Primary
    }

    fn key_kind(&self, table: &str, profile: &ConnectionProfile) -> KeyKind {
        match table {
            "posts" => KeyKind::Integer,
            _ => profile.preferred_key(),
        }
    }

    fn tables(&self, profile: &ConnectionProfile) -> Vec<TableDefinition> {
        let user_key = self.key_kind("users", profile);

        let users = Table::create()
            .table(Users::Table)
            .if_not_exists()
            .col(&mut key_column(Users::Id, user_key, profile.adapter))
            .col(ColumnDef::new(Users::Name).string())
            .col(ColumnDef::new(Users::Tag).string())
            .to_owned();

        let mut user_id = ColumnDef::new(Posts::UserId);
        match user_key {
            KeyKind::Uuid => user_id.uuid(),
            KeyKind::Integer => user_id.big_integer(),
        };

        let posts = Table::create()
            .table(Posts::Table)
            .if_not_exists()
            .col(&mut key_column(Posts::Id, KeyKind::Integer, profile.adapter))
            .col(ColumnDef::new(Posts::Text).text())
            .col(&mut user_id)
            .col(
                ColumnDef::new(Posts::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Posts::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_posts_user_id")
                    .from(Posts::Table, Posts::UserId)
                    .to(Users::Table, Users::Id)
                    .on_delete(ForeignKeyAction::NoAction),
            )
            .to_owned();

        vec![
            TableDefinition {
                name: "users",
                statement: users,
            },
            TableDefinition {
                name: "posts",
                statement: posts,
            },
        ]
    }
}

pub struct SecondarySchema;

impl SchemaDefinition for SecondarySchema {
    fn group(&self) -> DatabaseGroup {
        DatabaseGroup::Secondary
    }

    fn tables(&self, profile: &ConnectionProfile) -> Vec<TableDefinition> {
        let events = Table::create()
            .table(Events::Table)
            .if_not_exists()
            .col(&mut key_column(
                Events::Id,
                self.key_kind("events", profile),
                profile.adapter,
            ))
            .col(ColumnDef::new(Events::Data).string())
            .to_owned();

        vec![TableDefinition {
            name: "events",
            statement: events,
        }]
    }
}

/// Schema for a logical database
pub fn schema_for(group: DatabaseGroup) -> &'static dyn SchemaDefinition {
    match group {
        DatabaseGroup::Primary => &PrimarySchema,
        DatabaseGroup::Secondary => &SecondarySchema,
    }
}

fn key_column<T>(column: T, key: KeyKind, adapter: AdapterKind) -> ColumnDef
where
    T: sea_orm::sea_query::IntoIden,
{
    let mut def = ColumnDef::new(column);
    match (key, adapter) {
        (KeyKind::Uuid, _) => def
            .uuid()
            .not_null()
            .primary_key()
            .extra("DEFAULT gen_random_uuid()"),
        // SQLite only auto-increments INTEGER PRIMARY KEY columns
        (KeyKind::Integer, AdapterKind::Sqlite) => {
            def.integer().not_null().auto_increment().primary_key()
        }
        (KeyKind::Integer, AdapterKind::Postgres) => {
            def.big_integer().not_null().auto_increment().primary_key()
        }
    };
    def
}
