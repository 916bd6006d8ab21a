//! Mock implementations of port traits

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::domain::entities::RecordId;
use crate::domain::ports::{NewRow, RecordStore};
use crate::error::{DomainError, FactoryError};
use crate::factory::{AfterCreateHook, Factories, Record};

// ============================================================================
// In-Memory Record Store
// ============================================================================

/// Stores inserted rows in memory and hands out sequential integer ids per
/// table, the way an autoincrement column would.
#[derive(Default)]
pub struct InMemoryRecordStore {
    rows: Arc<RwLock<Vec<(RecordId, NewRow)>>>,
    next_ids: Arc<RwLock<HashMap<String, i64>>>,
    failing: bool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every insert fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Rows inserted into `table`, in insertion order
    pub fn rows_in(&self, table: &str) -> Vec<(RecordId, NewRow)> {
        self.rows
            .read()
            .unwrap()
            .iter()
            .filter(|(_, row)| row.table == table)
            .cloned()
            .collect()
    }

    pub fn count(&self, table: &str) -> usize {
        self.rows_in(table).len()
    }

    pub fn total(&self) -> usize {
        self.rows.read().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, row: NewRow) -> Result<RecordId, DomainError> {
        if self.failing {
            return Err(DomainError::Database(format!(
                "insert into {} refused",
                row.table
            )));
        }

        let id = {
            let mut next_ids = self.next_ids.write().unwrap();
            let next = next_ids.entry(row.table.clone()).or_insert(0);
            *next += 1;
            RecordId::Int(*next)
        };
        self.rows.write().unwrap().push((id, row));
        Ok(id)
    }
}

// ============================================================================
// Recording Hook
// ============================================================================

/// After-create hook that appends its label to a shared log
#[derive(Clone)]
pub struct RecordingHook {
    label: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingHook {
    pub fn new(label: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            label: label.to_string(),
            log,
        }
    }
}

#[async_trait]
impl AfterCreateHook for RecordingHook {
    async fn after_create(
        &self,
        _factories: &Factories<'_>,
        record: &mut Record,
    ) -> Result<(), FactoryError> {
        let id = record
            .id()
            .ok_or_else(|| FactoryError::Hook(format!("{} ran before insert", self.label)))?;
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, id));
        Ok(())
    }
}

/// After-create hook that always fails
pub struct FailingHook;

#[async_trait]
impl AfterCreateHook for FailingHook {
    async fn after_create(
        &self,
        _factories: &Factories<'_>,
        _record: &mut Record,
    ) -> Result<(), FactoryError> {
        Err(FactoryError::Hook("refused".to_string()))
    }
}
