//! SQL adapter for RecordStore

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::{DatabaseGroup, RecordId};
use crate::domain::ports::{NewRow, RecordStore};
use crate::error::DomainError;
use crate::provision::FixtureDatabase;

use super::insert_row;

/// Routes factory inserts to the database of the row's group
#[derive(Clone)]
pub struct SqlRecordStore {
    primary: Arc<FixtureDatabase>,
    secondary: Arc<FixtureDatabase>,
}

impl SqlRecordStore {
    pub fn new(primary: Arc<FixtureDatabase>, secondary: Arc<FixtureDatabase>) -> Self {
        Self { primary, secondary }
    }

    fn database(&self, group: DatabaseGroup) -> &FixtureDatabase {
        match group {
            DatabaseGroup::Primary => self.primary.as_ref(),
            DatabaseGroup::Secondary => self.secondary.as_ref(),
        }
    }
}

#[async_trait]
impl RecordStore for SqlRecordStore {
    async fn insert(&self, row: NewRow) -> Result<RecordId, DomainError> {
        let db = self.database(row.group);
        let key = db.key_kind(&row.table);

        let id = insert_row(db.connection(), &row.table, key, &row.values).await?;
        tracing::trace!(group = %row.group, table = %row.table, id = %id, "Inserted row");
        Ok(id)
    }
}
