//! Domain entities
//!
//! Plain record types for the two logical databases. Factories hand out
//! dynamic `Record`s which convert into these.

pub mod database_group;
pub mod event;
pub mod field_value;
pub mod post;
pub mod record_id;
pub mod user;

pub use database_group::DatabaseGroup;
pub use event::{Event, NewEvent};
pub use field_value::FieldValue;
pub use post::{NewPost, Post};
pub use record_id::{KeyKind, RecordId};
pub use user::{NewUser, User};
