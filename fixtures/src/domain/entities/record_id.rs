//! Primary key values
//!
//! SQLite tables use auto-incrementing integers, PostgreSQL tables use UUIDs.
//! Which one a table gets is decided once from the backend's capabilities.

use sea_orm::Value;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Column type of a table's primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Integer,
    Uuid,
}

/// Identifier of a persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Uuid(Uuid),
}

impl RecordId {
    pub fn kind(&self) -> KeyKind {
        match self {
            RecordId::Int(_) => KeyKind::Integer,
            RecordId::Uuid(_) => KeyKind::Uuid,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            RecordId::Int(id) => Some(*id),
            RecordId::Uuid(_) => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            RecordId::Uuid(id) => Some(*id),
            RecordId::Int(_) => None,
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        RecordId::Uuid(id)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        match id {
            RecordId::Int(id) => id.into(),
            RecordId::Uuid(id) => id.into(),
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Uuid(id) => write!(f, "{}", id),
        }
    }
}
