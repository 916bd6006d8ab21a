//! The stock factories: `user`, `post` (primary) and `event` (secondary)

use crate::domain::entities::DatabaseGroup;
use crate::error::FactoryError;

use super::definition::{AfterCreate, FactoryDefinition, TraitDefinition};
use super::registry::Registry;

pub fn user_factory() -> FactoryDefinition {
    FactoryDefinition::new("user", DatabaseGroup::Primary, "users")
        .sequence("name", |n| format!("John {n}"))
        .validates_presence_of("name")
        .with_trait(
            TraitDefinition::new("with_posts")
                .after_create(AfterCreate::create_pair("post").linked_by("user_id")),
        )
        .with_trait(TraitDefinition::new("traited").value("tag", "traited"))
        .with_trait(TraitDefinition::new("other_trait").value("tag", "other_trait"))
}

pub fn post_factory() -> FactoryDefinition {
    FactoryDefinition::new("post", DatabaseGroup::Primary, "posts")
        .sequence("text", |n| format!("Post #{n}"))
        .association("user", "user")
        .timestamps()
        .with_trait(TraitDefinition::new("with_bad_user").created_association("user", "user", &[]))
        .with_trait(TraitDefinition::new("with_traited_user").association(
            "user",
            "user",
            &["traited"],
        ))
        .with_trait(TraitDefinition::new("with_other_traited_user").association(
            "user",
            "user",
            &["other_trait"],
        ))
}

pub fn event_factory() -> FactoryDefinition {
    FactoryDefinition::new("event", DatabaseGroup::Secondary, "events")
        .sequence("data", |n| format!("Event #{n}"))
}

/// Register `user`, `post` and `event`
pub fn register_defaults(registry: &mut Registry) -> Result<(), FactoryError> {
    registry.define(user_factory())?;
    registry.define(post_factory())?;
    registry.define(event_factory())?;
    Ok(())
}
