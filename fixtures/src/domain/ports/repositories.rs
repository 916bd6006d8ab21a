//! Repository port traits
//!
//! Typed access to the fixture tables, used by tests to check what the
//! factories persisted.

use async_trait::async_trait;

use crate::domain::entities::{Event, NewEvent, NewPost, NewUser, Post, RecordId, User};
use crate::error::DomainError;

/// Repository for users (primary database)
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<User>, DomainError>;

    /// Find the first user with the given name
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, DomainError>;

    /// Insert a user after validating it
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    /// Number of users
    async fn count(&self) -> Result<u64, DomainError>;

    /// Delete a user together with its posts
    async fn delete(&self, id: &RecordId) -> Result<(), DomainError>;
}

/// Repository for posts (primary database)
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError>;

    /// Posts belonging to a user, oldest first
    async fn find_by_user(&self, user_id: &RecordId) -> Result<Vec<Post>, DomainError>;

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for events (secondary database)
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Event>, DomainError>;

    async fn create(&self, event: &NewEvent) -> Result<Event, DomainError>;

    async fn count(&self) -> Result<u64, DomainError>;
}
