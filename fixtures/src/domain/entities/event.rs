//! Event entity (secondary database)

use serde::Serialize;

use super::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: RecordId,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub data: Option<String>,
}
