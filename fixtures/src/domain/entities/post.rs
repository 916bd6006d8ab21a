//! Post entity (primary database)

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: i64,
    pub text: Option<String>,
    pub user_id: RecordId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// In-memory marker for tests, never persisted
    #[serde(skip)]
    pub dirty: bool,
}

impl Post {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub text: Option<String>,
    pub user_id: RecordId,
}
