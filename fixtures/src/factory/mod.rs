//! Test data factories
//!
//! Definitions live in an explicit `Registry`; `Factories` evaluates them
//! against a `RecordStore`.

pub mod definition;
pub mod definitions;
pub mod record;
pub mod registry;
pub mod runner;
pub mod sequence;

pub use definition::{
    AfterCreate, AfterCreateHook, AssociationSpec, FactoryDefinition, FieldGenerator,
    TraitDefinition, Validation,
};
pub use definitions::register_defaults;
pub use record::{Overrides, Record};
pub use registry::{FactoryHandle, Registry};
pub use runner::{Factories, Strategy};
pub use sequence::Sequence;
