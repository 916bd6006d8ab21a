//! Factory and trait definitions
//!
//! A factory is an ordered list of field generators bound to a table. Traits
//! are named overlays: they replace or add generators and may register
//! after-create hooks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::{DatabaseGroup, FieldValue};
use crate::error::FactoryError;

use super::record::Record;
use super::runner::Factories;
use super::sequence::Sequence;

/// A related record built by another factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSpec {
    pub factory: String,
    pub traits: Vec<String>,
    /// Column holding the related record's id
    pub foreign_key: String,
}

#[derive(Clone)]
pub enum FieldGenerator {
    Value(FieldValue),
    Sequence(Arc<Sequence>),
    /// Built when the owner is built, created when the owner is created
    Association(AssociationSpec),
    /// Always created, even when the owner is only built
    CreatedAssociation(AssociationSpec),
}

impl FieldGenerator {
    pub fn association_spec(&self) -> Option<&AssociationSpec> {
        match self {
            FieldGenerator::Association(spec) | FieldGenerator::CreatedAssociation(spec) => {
                Some(spec)
            }
            _ => None,
        }
    }
}

impl fmt::Debug for FieldGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldGenerator::Value(v) => f.debug_tuple("Value").field(v).finish(),
            FieldGenerator::Sequence(s) => f.debug_tuple("Sequence").field(s).finish(),
            FieldGenerator::Association(a) => f.debug_tuple("Association").field(a).finish(),
            FieldGenerator::CreatedAssociation(a) => {
                f.debug_tuple("CreatedAssociation").field(a).finish()
            }
        }
    }
}

/// Custom work to run once a record has been persisted
#[async_trait]
pub trait AfterCreateHook: Send + Sync {
    async fn after_create(
        &self,
        factories: &Factories<'_>,
        record: &mut Record,
    ) -> Result<(), FactoryError>;
}

#[derive(Clone)]
pub enum AfterCreate {
    /// Create `count` records of another factory, optionally pointing back at
    /// the owner through `foreign_key`
    CreateList {
        factory: String,
        traits: Vec<String>,
        count: usize,
        foreign_key: Option<String>,
    },
    Hook(Arc<dyn AfterCreateHook>),
}

impl AfterCreate {
    pub fn create_list(factory: impl Into<String>, count: usize) -> Self {
        AfterCreate::CreateList {
            factory: factory.into(),
            traits: Vec::new(),
            count,
            foreign_key: None,
        }
    }

    pub fn create_pair(factory: impl Into<String>) -> Self {
        Self::create_list(factory, 2)
    }

    /// Link created records to the owner's id through `column`
    pub fn linked_by(self, column: impl Into<String>) -> Self {
        match self {
            AfterCreate::CreateList {
                factory,
                traits,
                count,
                ..
            } => AfterCreate::CreateList {
                factory,
                traits,
                count,
                foreign_key: Some(column.into()),
            },
            hook => hook,
        }
    }

    pub fn with_traits(self, names: &[&str]) -> Self {
        match self {
            AfterCreate::CreateList {
                factory,
                count,
                foreign_key,
                ..
            } => AfterCreate::CreateList {
                factory,
                traits: to_strings(names),
                count,
                foreign_key,
            },
            hook => hook,
        }
    }

    pub fn hook(hook: impl AfterCreateHook + 'static) -> Self {
        AfterCreate::Hook(Arc::new(hook))
    }
}

impl fmt::Debug for AfterCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AfterCreate::CreateList {
                factory,
                traits,
                count,
                foreign_key,
            } => f
                .debug_struct("CreateList")
                .field("factory", factory)
                .field("traits", traits)
                .field("count", count)
                .field("foreign_key", foreign_key)
                .finish(),
            AfterCreate::Hook(_) => f.write_str("Hook(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TraitDefinition {
    name: String,
    fields: Vec<(String, FieldGenerator)>,
    after_create: Vec<AfterCreate>,
}

impl TraitDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            after_create: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, FieldGenerator)] {
        &self.fields
    }

    pub fn after_create_hooks(&self) -> &[AfterCreate] {
        &self.after_create
    }

    pub fn value(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        set_generator(&mut self.fields, field.into(), FieldGenerator::Value(value.into()));
        self
    }

    pub fn sequence<F, T>(mut self, field: impl Into<String>, format: F) -> Self
    where
        F: Fn(u64) -> T + Send + Sync + 'static,
        T: Into<FieldValue>,
    {
        set_generator(
            &mut self.fields,
            field.into(),
            FieldGenerator::Sequence(Arc::new(Sequence::new(format))),
        );
        self
    }

    /// Build the association with the given factory traits
    pub fn association(mut self, field: &str, factory: &str, traits: &[&str]) -> Self {
        let spec = association_spec(field, factory, traits);
        set_generator(&mut self.fields, field.to_string(), FieldGenerator::Association(spec));
        self
    }

    /// Always create the association, whatever the owner's strategy
    pub fn created_association(mut self, field: &str, factory: &str, traits: &[&str]) -> Self {
        let spec = association_spec(field, factory, traits);
        set_generator(
            &mut self.fields,
            field.to_string(),
            FieldGenerator::CreatedAssociation(spec),
        );
        self
    }

    pub fn after_create(mut self, callback: AfterCreate) -> Self {
        self.after_create.push(callback);
        self
    }
}

/// Checks run before a record is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Presence(String),
}

impl Validation {
    fn check(&self, record: &Record) -> Result<(), String> {
        match self {
            Validation::Presence(field) => {
                let present = match record.get(field) {
                    None | Some(FieldValue::Null) => false,
                    Some(FieldValue::Text(s)) => !s.trim().is_empty(),
                    Some(_) => true,
                };
                if present {
                    Ok(())
                } else {
                    Err(format!("{} can't be blank", field))
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FactoryDefinition {
    name: String,
    group: DatabaseGroup,
    table: String,
    fields: Vec<(String, FieldGenerator)>,
    traits: HashMap<String, TraitDefinition>,
    validations: Vec<Validation>,
    timestamps: bool,
}

impl FactoryDefinition {
    pub fn new(name: impl Into<String>, group: DatabaseGroup, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group,
            table: table.into(),
            fields: Vec::new(),
            traits: HashMap::new(),
            validations: Vec::new(),
            timestamps: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> DatabaseGroup {
        self.group
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn has_timestamps(&self) -> bool {
        self.timestamps
    }

    pub fn trait_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.traits.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn value(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        set_generator(&mut self.fields, field.into(), FieldGenerator::Value(value.into()));
        self
    }

    pub fn sequence<F, T>(mut self, field: impl Into<String>, format: F) -> Self
    where
        F: Fn(u64) -> T + Send + Sync + 'static,
        T: Into<FieldValue>,
    {
        set_generator(
            &mut self.fields,
            field.into(),
            FieldGenerator::Sequence(Arc::new(Sequence::new(format))),
        );
        self
    }

    /// Default association: `field` is filled from `factory` unless overridden.
    /// The foreign key column is `<field>_id`.
    pub fn association(mut self, field: &str, factory: &str) -> Self {
        let spec = association_spec(field, factory, &[]);
        set_generator(&mut self.fields, field.to_string(), FieldGenerator::Association(spec));
        self
    }

    /// Set `created_at` / `updated_at` when persisting
    pub fn timestamps(mut self) -> Self {
        self.timestamps = true;
        self
    }

    pub fn validates_presence_of(mut self, field: impl Into<String>) -> Self {
        self.validations.push(Validation::Presence(field.into()));
        self
    }

    pub fn with_trait(mut self, definition: TraitDefinition) -> Self {
        self.traits.insert(definition.name.clone(), definition);
        self
    }

    pub(crate) fn resolve_traits(
        &self,
        names: &[String],
    ) -> Result<Vec<&TraitDefinition>, FactoryError> {
        names
            .iter()
            .map(|name| {
                self.traits
                    .get(name)
                    .ok_or_else(|| FactoryError::UnknownTrait {
                        factory: self.name.clone(),
                        name: name.clone(),
                    })
            })
            .collect()
    }

    /// Base generators with the traits laid over them in order; a later trait
    /// replaces a generator an earlier one set.
    pub(crate) fn effective_fields<'d>(
        &'d self,
        traits: &[&'d TraitDefinition],
    ) -> Vec<(&'d str, &'d FieldGenerator)> {
        let mut fields: Vec<(&str, &FieldGenerator)> = self
            .fields
            .iter()
            .map(|(name, generator)| (name.as_str(), generator))
            .collect();

        for definition in traits {
            for (name, generator) in &definition.fields {
                match fields.iter_mut().find(|(existing, _)| *existing == name.as_str()) {
                    Some(slot) => slot.1 = generator,
                    None => fields.push((name.as_str(), generator)),
                }
            }
        }

        fields
    }

    /// Whether an override key names something this factory can set
    pub(crate) fn accepts_field(&self, field: &str) -> bool {
        let all_fields = self
            .fields
            .iter()
            .chain(self.traits.values().flat_map(|t| t.fields.iter()));

        for (name, generator) in all_fields {
            if name == field {
                return true;
            }
            if let Some(spec) = generator.association_spec() {
                if spec.foreign_key == field {
                    return true;
                }
            }
        }

        self.timestamps && (field == "created_at" || field == "updated_at")
    }

    /// Every association declared on the base or a trait
    fn associations(&self) -> impl Iterator<Item = (&str, &AssociationSpec)> {
        self.fields
            .iter()
            .chain(self.traits.values().flat_map(|t| t.fields.iter()))
            .filter_map(|(name, generator)| {
                generator.association_spec().map(|spec| (name.as_str(), spec))
            })
    }

    /// Whether `field` is an association name or foreign key column
    pub(crate) fn is_association_key(&self, field: &str) -> bool {
        self.associations()
            .any(|(name, spec)| name == field || spec.foreign_key == field)
    }

    pub(crate) fn foreign_key_for(&self, association: &str) -> Option<&str> {
        self.associations()
            .find(|(name, _)| *name == association)
            .map(|(_, spec)| spec.foreign_key.as_str())
    }

    /// Run the presence validations, then require every association the
    /// record carries to point at a row.
    pub(crate) fn validate(&self, record: &Record) -> Result<(), FactoryError> {
        let invalid = |message: String| FactoryError::Validation {
            factory: self.name.clone(),
            message,
        };

        for validation in &self.validations {
            validation.check(record).map_err(&invalid)?;
        }

        for (name, spec) in self.associations() {
            if record.get(&spec.foreign_key).is_some_and(FieldValue::is_null) {
                return Err(invalid(format!("{} must exist", name)));
            }
        }
        Ok(())
    }

    /// Every sequence this factory owns, traits included
    pub(crate) fn sequences(&self) -> impl Iterator<Item = &Arc<Sequence>> {
        self.fields
            .iter()
            .chain(self.traits.values().flat_map(|t| t.fields.iter()))
            .filter_map(|(_, generator)| match generator {
                FieldGenerator::Sequence(seq) => Some(seq),
                _ => None,
            })
    }
}

fn set_generator(fields: &mut Vec<(String, FieldGenerator)>, field: String, generator: FieldGenerator) {
    match fields.iter_mut().find(|(name, _)| *name == field) {
        Some(slot) => slot.1 = generator,
        None => fields.push((field, generator)),
    }
}

fn association_spec(field: &str, factory: &str, traits: &[&str]) -> AssociationSpec {
    AssociationSpec {
        factory: factory.to_string(),
        traits: to_strings(traits),
        foreign_key: format!("{}_id", field),
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
