//! Factory evaluation
//!
//! `Factories` pairs a registry with a record store and runs definitions:
//! traits are laid over the base generators in order, explicit overrides beat
//! both, associations follow the owner's strategy unless declared as always
//! created, and after-create hooks run in trait order once the owner has an id.

use std::collections::BTreeMap;

use chrono::Utc;
use futures::future::BoxFuture;

use crate::domain::entities::FieldValue;
use crate::domain::ports::RecordStore;
use crate::error::FactoryError;

use super::definition::{AfterCreate, FactoryDefinition, FieldGenerator};
use super::record::{Overrides, Record};
use super::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Materialize values without touching the database
    Build,
    /// Build, persist, then run after-create hooks
    Create,
    /// Plain attribute values, associations skipped
    AttributesFor,
}

impl Strategy {
    fn for_association(self) -> Strategy {
        match self {
            Strategy::Create => Strategy::Create,
            Strategy::Build | Strategy::AttributesFor => Strategy::Build,
        }
    }
}

pub struct Factories<'a> {
    registry: &'a Registry,
    store: &'a dyn RecordStore,
}

impl<'a> Factories<'a> {
    pub fn new(registry: &'a Registry, store: &'a dyn RecordStore) -> Self {
        Self { registry, store }
    }

    pub async fn build(
        &self,
        factory: &str,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Record, FactoryError> {
        self.run(factory.to_string(), to_strings(traits), overrides, Strategy::Build)
            .await
    }

    pub async fn create(
        &self,
        factory: &str,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Record, FactoryError> {
        self.run(factory.to_string(), to_strings(traits), overrides, Strategy::Create)
            .await
    }

    /// Attribute values only: nothing persisted, associations left out
    pub async fn attributes_for(
        &self,
        factory: &str,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<BTreeMap<String, FieldValue>, FactoryError> {
        let record = self
            .run(
                factory.to_string(),
                to_strings(traits),
                overrides,
                Strategy::AttributesFor,
            )
            .await?;
        Ok(record.attributes().clone())
    }

    pub async fn build_list(
        &self,
        factory: &str,
        count: usize,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Vec<Record>, FactoryError> {
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(self.build(factory, traits, overrides.clone()).await?);
        }
        Ok(records)
    }

    pub async fn create_list(
        &self,
        factory: &str,
        count: usize,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Vec<Record>, FactoryError> {
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(self.create(factory, traits, overrides.clone()).await?);
        }
        Ok(records)
    }

    pub async fn create_pair(
        &self,
        factory: &str,
        traits: &[&str],
        overrides: Overrides,
    ) -> Result<Vec<Record>, FactoryError> {
        self.create_list(factory, 2, traits, overrides).await
    }

    /// Boxed so associations can recurse into other factories
    pub fn run(
        &self,
        factory: String,
        traits: Vec<String>,
        overrides: Overrides,
        strategy: Strategy,
    ) -> BoxFuture<'_, Result<Record, FactoryError>> {
        Box::pin(async move {
            let definition = self.registry.get(&factory)?;
            let applied = definition.resolve_traits(&traits)?;

            for field in overrides
                .values()
                .map(|(name, _)| name)
                .chain(overrides.association_names())
            {
                if !definition.accepts_field(field) {
                    return Err(FactoryError::UnknownField {
                        factory: factory.clone(),
                        field: field.clone(),
                    });
                }
            }

            let mut record = Record::new(definition.name(), definition.group(), definition.table());

            for (field, generator) in definition.effective_fields(&applied) {
                if let Some(spec) = generator.association_spec() {
                    let association_strategy = match generator {
                        FieldGenerator::CreatedAssociation(_) => Strategy::Create,
                        _ => strategy.for_association(),
                    };

                    if let Some(existing) = overrides.association(field) {
                        let mut associated = existing.clone();
                        if strategy != Strategy::AttributesFor
                            && association_strategy == Strategy::Create
                            && !associated.is_persisted()
                        {
                            self.autosave(&mut associated).await?;
                        }
                        record.set(spec.foreign_key.as_str(), associated.id().into());
                        record.associate(field, associated);
                        continue;
                    }
                    if let Some(value) = overrides
                        .value(&spec.foreign_key)
                        .or_else(|| overrides.value(field))
                    {
                        record.set(spec.foreign_key.as_str(), value.clone());
                        continue;
                    }
                    if strategy == Strategy::AttributesFor {
                        continue;
                    }

                    let associated = self
                        .run(
                            spec.factory.clone(),
                            spec.traits.clone(),
                            Overrides::new(),
                            association_strategy,
                        )
                        .await?;

                    record.set(spec.foreign_key.as_str(), associated.id().into());
                    record.associate(field, associated);
                    continue;
                }

                let value = match (overrides.value(field), generator) {
                    (Some(value), _) => value.clone(),
                    (None, FieldGenerator::Value(value)) => value.clone(),
                    (None, FieldGenerator::Sequence(seq)) => seq.next_value(),
                    (None, _) => FieldValue::Null,
                };
                record.set(field, value);
            }

            // Overrides for fields with no generator in play, e.g. a column
            // only a trait that wasn't applied would set
            for (field, value) in overrides.values() {
                if !record.has(field) && !definition.is_association_key(field) {
                    record.set(field.as_str(), value.clone());
                }
            }

            if strategy != Strategy::Create {
                return Ok(record);
            }

            self.persist(&definition, &mut record).await?;

            for applied_trait in &applied {
                for callback in applied_trait.after_create_hooks() {
                    self.after_create(callback, &mut record).await?;
                }
            }

            Ok(record)
        })
    }

    /// Save a record built elsewhere, saving its unsaved associations first
    /// so its foreign keys point at real rows. Hooks do not run.
    fn autosave<'r>(&'r self, record: &'r mut Record) -> BoxFuture<'r, Result<(), FactoryError>> {
        Box::pin(async move {
            let definition = self.registry.get(record.factory())?;

            let mut keys = Vec::new();
            for (name, associated) in record.associations_mut() {
                if !associated.is_persisted() {
                    self.autosave(associated).await?;
                }
                if let Some(column) = definition.foreign_key_for(name) {
                    keys.push((column.to_string(), associated.id()));
                }
            }
            for (column, id) in keys {
                record.set(column, id.into());
            }

            self.persist(&definition, record).await
        })
    }

    async fn persist(
        &self,
        definition: &FactoryDefinition,
        record: &mut Record,
    ) -> Result<(), FactoryError> {
        definition.validate(record)?;

        if definition.has_timestamps() {
            let now = FieldValue::Timestamp(Utc::now());
            for column in ["created_at", "updated_at"] {
                if !record.has(column) {
                    record.set(column, now.clone());
                }
            }
        }

        let id = self
            .store
            .insert(record.to_row())
            .await
            .map_err(|source| FactoryError::Persistence {
                factory: definition.name().to_string(),
                source,
            })?;
        record.mark_persisted(id);
        tracing::trace!(factory = %definition.name(), id = %id, "Record created");
        Ok(())
    }

    async fn after_create(
        &self,
        callback: &AfterCreate,
        record: &mut Record,
    ) -> Result<(), FactoryError> {
        match callback {
            AfterCreate::CreateList {
                factory,
                traits,
                count,
                foreign_key,
            } => {
                let mut overrides = Overrides::new();
                if let (Some(column), Some(id)) = (foreign_key, record.id()) {
                    overrides = overrides.set(column.as_str(), id);
                }
                for _ in 0..*count {
                    let dependent = self
                        .run(
                            factory.clone(),
                            traits.clone(),
                            overrides.clone(),
                            Strategy::Create,
                        )
                        .await?;
                    record.push_dependent(dependent);
                }
                Ok(())
            }
            AfterCreate::Hook(hook) => hook.after_create(self, record).await,
        }
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
