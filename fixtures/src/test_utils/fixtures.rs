//! Test fixtures
//!
//! Ready-made registries and entities with sensible defaults.

use crate::domain::entities::{NewPost, NewUser, RecordId};
use crate::factory::{register_defaults, Registry};

/// Registry holding the stock `user`, `post` and `event` factories
pub fn test_registry() -> Registry {
    let mut registry = Registry::new();
    register_defaults(&mut registry).unwrap();
    registry
}

/// A valid user with the given name
pub fn test_new_user(name: &str) -> NewUser {
    NewUser::named(name)
}

/// A post with some text, owned by `user_id`
pub fn test_new_post(user_id: RecordId) -> NewPost {
    NewPost {
        text: Some("hello".to_string()),
        user_id,
    }
}
