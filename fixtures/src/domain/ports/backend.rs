//! Capability queries for storage backends
//!
//! Schema code asks these questions instead of matching on the adapter kind.

use crate::domain::entities::KeyKind;

pub trait BackendCapabilities {
    /// Whether primary keys can be opaque UUIDs generated by the database
    fn supports_uuid_keys(&self) -> bool;

    /// Whether the named extension can be enabled (e.g. `pgcrypto`)
    fn supports_extension(&self, name: &str) -> bool;

    /// Key type for tables that follow the backend's preference
    fn preferred_key(&self) -> KeyKind {
        if self.supports_uuid_keys() {
            KeyKind::Uuid
        } else {
            KeyKind::Integer
        }
    }
}
