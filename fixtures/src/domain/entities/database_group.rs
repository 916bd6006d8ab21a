use serde::{Deserialize, Serialize};

/// A logical database: its own connection, schema and truncation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseGroup {
    /// users and posts
    Primary,
    /// events
    Secondary,
}

impl DatabaseGroup {
    pub const ALL: [DatabaseGroup; 2] = [DatabaseGroup::Primary, DatabaseGroup::Secondary];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseGroup::Primary => "primary",
            DatabaseGroup::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for DatabaseGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
