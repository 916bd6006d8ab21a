//! Column values produced by factories

use chrono::{DateTime, Utc};
use sea_orm::Value;
use serde::Serialize;
use uuid::Uuid;

use super::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Interpret the value as a foreign key
    pub fn as_record_id(&self) -> Option<RecordId> {
        match self {
            FieldValue::Int(n) => Some(RecordId::Int(*n)),
            FieldValue::Uuid(id) => Some(RecordId::Uuid(*id)),
            _ => None,
        }
    }

    /// Bind value for sea-query. `None` for NULL: callers leave the column out
    /// so the database applies its default.
    pub fn to_sea_value(&self) -> Option<Value> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some((*b).into()),
            FieldValue::Int(n) => Some((*n).into()),
            FieldValue::Text(s) => Some(s.clone().into()),
            FieldValue::Uuid(id) => Some((*id).into()),
            FieldValue::Timestamp(ts) => Some((*ts).into()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Uuid> for FieldValue {
    fn from(id: Uuid) -> Self {
        FieldValue::Uuid(id)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl From<RecordId> for FieldValue {
    fn from(id: RecordId) -> Self {
        match id {
            RecordId::Int(n) => FieldValue::Int(n),
            RecordId::Uuid(id) => FieldValue::Uuid(id),
        }
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}
