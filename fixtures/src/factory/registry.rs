//! Factory registry
//!
//! Holds every factory definition and named sequence for one fixture
//! environment. Register once at boot, then share by reference.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{DatabaseGroup, FieldValue};
use crate::error::FactoryError;

use super::definition::FactoryDefinition;
use super::sequence::Sequence;

/// Returned by `Registry::define`
#[derive(Debug, Clone)]
pub struct FactoryHandle {
    definition: Arc<FactoryDefinition>,
}

impl FactoryHandle {
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn group(&self) -> DatabaseGroup {
        self.definition.group()
    }

    pub fn trait_names(&self) -> Vec<&str> {
        self.definition.trait_names()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    factories: HashMap<String, Arc<FactoryDefinition>>,
    sequences: HashMap<String, Arc<Sequence>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, definition: FactoryDefinition) -> Result<FactoryHandle, FactoryError> {
        let name = definition.name().to_string();
        if self.factories.contains_key(&name) {
            return Err(FactoryError::DuplicateFactory(name));
        }

        let definition = Arc::new(definition);
        self.factories.insert(name.clone(), definition.clone());
        tracing::trace!(factory = %name, "Factory registered");

        Ok(FactoryHandle { definition })
    }

    pub fn get(&self, name: &str) -> Result<Arc<FactoryDefinition>, FactoryError> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| FactoryError::UnknownFactory(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered factory names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register a named sequence usable outside any factory
    pub fn define_sequence<F, T>(&mut self, name: impl Into<String>, format: F)
    where
        F: Fn(u64) -> T + Send + Sync + 'static,
        T: Into<FieldValue>,
    {
        self.sequences
            .insert(name.into(), Arc::new(Sequence::new(format)));
    }

    /// Next value of a named sequence
    pub fn generate(&self, name: &str) -> Result<FieldValue, FactoryError> {
        self.sequences
            .get(name)
            .map(|seq| seq.next_value())
            .ok_or_else(|| FactoryError::UnknownSequence(name.to_string()))
    }

    /// Reset every sequence, named and per-factory, back to 1
    pub fn rewind_sequences(&self) {
        for seq in self.sequences.values() {
            seq.rewind();
        }
        for definition in self.factories.values() {
            for seq in definition.sequences() {
                seq.rewind();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::definition::TraitDefinition;

    fn user_definition() -> FactoryDefinition {
        FactoryDefinition::new("user", DatabaseGroup::Primary, "users")
            .sequence("name", |n| format!("John {n}"))
            .with_trait(TraitDefinition::new("traited").value("tag", "traited"))
    }

    #[test]
    fn define_returns_handle() {
        let mut registry = Registry::new();
        let handle = registry.define(user_definition()).unwrap();

        assert_eq!(handle.name(), "user");
        assert_eq!(handle.group(), DatabaseGroup::Primary);
        assert_eq!(handle.trait_names(), vec!["traited"]);
        assert!(registry.contains("user"));
        assert_eq!(registry.names(), vec!["user"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = Registry::new();
        registry.define(user_definition()).unwrap();

        let err = registry.define(user_definition()).unwrap_err();
        assert!(matches!(err, FactoryError::DuplicateFactory(name) if name == "user"));
    }

    #[test]
    fn unknown_factory() {
        let registry = Registry::new();
        assert!(matches!(
            registry.get("ghost"),
            Err(FactoryError::UnknownFactory(name)) if name == "ghost"
        ));
    }

    #[test]
    fn named_sequences() {
        let mut registry = Registry::new();
        registry.define_sequence("email", |n| format!("person{n}@example.com"));

        assert_eq!(
            registry.generate("email").unwrap(),
            FieldValue::from("person1@example.com")
        );
        assert_eq!(
            registry.generate("email").unwrap(),
            FieldValue::from("person2@example.com")
        );
        assert!(matches!(
            registry.generate("phone"),
            Err(FactoryError::UnknownSequence(_))
        ));
    }

    #[test]
    fn rewind_resets_factory_sequences() {
        let mut registry = Registry::new();
        registry.define(user_definition()).unwrap();
        registry.define_sequence("code", |n| n as i64);
        registry.generate("code").unwrap();

        let definition = registry.get("user").unwrap();
        let seq = definition.sequences().next().unwrap().clone();
        seq.next_value();
        seq.next_value();

        registry.rewind_sequences();
        assert_eq!(seq.position(), 0);
        assert_eq!(registry.generate("code").unwrap(), FieldValue::Int(1));
    }
}
