//! Factory output
//!
//! A `Record` is the dynamic result of `build`/`create`: column values, the
//! id once persisted, the associated records it pulled in and any records
//! its after-create hooks produced. Convert into `User`, `Post` or `Event`
//! for typed access.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{DatabaseGroup, Event, FieldValue, Post, RecordId, User};
use crate::domain::ports::NewRow;
use crate::error::FactoryError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    factory: String,
    group: DatabaseGroup,
    table: String,
    id: Option<RecordId>,
    attributes: BTreeMap<String, FieldValue>,
    associations: BTreeMap<String, Record>,
    dependents: Vec<Record>,
}

impl Record {
    pub(crate) fn new(factory: &str, group: DatabaseGroup, table: &str) -> Self {
        Self {
            factory: factory.to_string(),
            group,
            table: table.to_string(),
            id: None,
            attributes: BTreeMap::new(),
            associations: BTreeMap::new(),
            dependents: Vec::new(),
        }
    }

    pub fn factory(&self) -> &str {
        &self.factory
    }

    pub fn group(&self) -> DatabaseGroup {
        self.group
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.attributes.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn attributes(&self) -> &BTreeMap<String, FieldValue> {
        &self.attributes
    }

    pub fn association(&self, name: &str) -> Option<&Record> {
        self.associations.get(name)
    }

    /// Records created by after-create hooks, in creation order
    pub fn dependents(&self) -> &[Record] {
        &self.dependents
    }

    pub(crate) fn has(&self, field: &str) -> bool {
        self.attributes.contains_key(field)
    }

    pub(crate) fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.attributes.insert(field.into(), value);
    }

    pub(crate) fn associate(&mut self, name: impl Into<String>, record: Record) {
        self.associations.insert(name.into(), record);
    }

    pub(crate) fn associations_mut(&mut self) -> impl Iterator<Item = (&String, &mut Record)> {
        self.associations.iter_mut()
    }

    pub(crate) fn push_dependent(&mut self, record: Record) {
        self.dependents.push(record);
    }

    pub(crate) fn mark_persisted(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    pub(crate) fn to_row(&self) -> NewRow {
        NewRow {
            group: self.group,
            table: self.table.clone(),
            values: self
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }

    fn conversion_error(&self, message: impl Into<String>) -> FactoryError {
        FactoryError::Conversion {
            factory: self.factory.clone(),
            message: message.into(),
        }
    }

    fn require_id(&self) -> Result<RecordId, FactoryError> {
        self.id
            .ok_or_else(|| self.conversion_error("record is not persisted"))
    }

    fn optional_text(&self, field: &str) -> Result<Option<String>, FactoryError> {
        match self.get(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Text(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.conversion_error(format!("{} is not text: {:?}", field, other))),
        }
    }

    fn timestamp(&self, field: &str) -> Result<DateTime<Utc>, FactoryError> {
        match self.get(field) {
            Some(FieldValue::Timestamp(ts)) => Ok(*ts),
            other => Err(self.conversion_error(format!("{} is not a timestamp: {:?}", field, other))),
        }
    }
}

impl TryFrom<Record> for User {
    type Error = FactoryError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        Ok(User {
            id: record.require_id()?,
            name: record.optional_text("name")?.unwrap_or_default(),
            tag: record.optional_text("tag")?,
        })
    }
}

impl TryFrom<Record> for Post {
    type Error = FactoryError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let id = record
            .require_id()?
            .as_int()
            .ok_or_else(|| record.conversion_error("post ids are integers"))?;
        let user_id = record
            .get("user_id")
            .and_then(FieldValue::as_record_id)
            .ok_or_else(|| record.conversion_error("user_id is not set"))?;

        Ok(Post {
            id,
            text: record.optional_text("text")?,
            user_id,
            created_at: record.timestamp("created_at")?,
            updated_at: record.timestamp("updated_at")?,
            dirty: false,
        })
    }
}

impl TryFrom<Record> for Event {
    type Error = FactoryError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        Ok(Event {
            id: record.require_id()?,
            data: record.optional_text("data")?,
        })
    }
}

/// Explicit values that beat every generator and trait
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    values: BTreeMap<String, FieldValue>,
    associations: BTreeMap<String, Record>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column (or an association's foreign key column)
    pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Use an existing record for an association instead of generating one
    pub fn associate(mut self, name: impl Into<String>, record: Record) -> Self {
        self.associations.insert(name.into(), record);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.associations.is_empty()
    }

    pub(crate) fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.values.iter()
    }

    pub(crate) fn association(&self, name: &str) -> Option<&Record> {
        self.associations.get(name)
    }

    pub(crate) fn association_names(&self) -> impl Iterator<Item = &String> {
        self.associations.keys()
    }
}
