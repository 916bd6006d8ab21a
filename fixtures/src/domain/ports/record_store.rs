//! Persistence port used by factories
//!
//! Factories don't know table layouts beyond column names; the store decides
//! how keys are generated for the target database.

use async_trait::async_trait;

use crate::domain::entities::{DatabaseGroup, FieldValue, RecordId};
use crate::error::DomainError;

/// A row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewRow {
    pub group: DatabaseGroup,
    pub table: String,
    pub values: Vec<(String, FieldValue)>,
}

impl NewRow {
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a row and return its primary key
    async fn insert(&self, row: NewRow) -> Result<RecordId, DomainError>;
}
