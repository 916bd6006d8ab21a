//! User entity (primary database)

use serde::Serialize;

use super::RecordId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub tag: Option<String>,
}

impl User {
    /// Unsaved copy of this user, marked as a clone
    pub fn duplicate(&self) -> NewUser {
        NewUser {
            name: format!("{} (cloned)", self.name),
            tag: self.tag.clone(),
        }
    }
}

/// Data needed to insert a user
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub tag: Option<String>,
}

impl NewUser {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
        }
    }

    /// Users must carry a non-blank name
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name can't be blank".to_string());
        }
        Ok(())
    }
}
