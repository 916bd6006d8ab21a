//! SQL adapter for PostRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Order, Query, SelectStatement};
use sea_orm::{QueryResult, Value};

use crate::domain::entities::{FieldValue, NewPost, Post, RecordId};
use crate::domain::ports::PostRepository;
use crate::error::DomainError;
use crate::provision::schema::Posts;
use crate::provision::FixtureDatabase;

use super::{count_rows, insert_row, query_all, query_one, read_record_id};

pub struct SqlPostRepository {
    db: Arc<FixtureDatabase>,
}

impl SqlPostRepository {
    pub fn new(db: Arc<FixtureDatabase>) -> Self {
        Self { db }
    }

    fn select() -> SelectStatement {
        Query::select()
            .columns([
                Posts::Id,
                Posts::Text,
                Posts::UserId,
                Posts::CreatedAt,
                Posts::UpdatedAt,
            ])
            .from(Posts::Table)
            .to_owned()
    }

    fn from_row(&self, row: &QueryResult) -> Result<Post, DomainError> {
        Ok(Post {
            id: row.try_get("", "id")?,
            text: row.try_get("", "text")?,
            user_id: read_record_id(row, "user_id", self.db.key_kind("users"))?,
            created_at: row.try_get("", "created_at")?,
            updated_at: row.try_get("", "updated_at")?,
            dirty: false,
        })
    }
}

#[async_trait]
impl PostRepository for SqlPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let stmt = Self::select()
            .and_where(Expr::col(Posts::Id).eq(id))
            .to_owned();

        let row = query_one(self.db.connection(), &stmt).await?;
        row.map(|r| self.from_row(&r)).transpose()
    }

    async fn find_by_user(&self, user_id: &RecordId) -> Result<Vec<Post>, DomainError> {
        let stmt = Self::select()
            .and_where(Expr::col(Posts::UserId).eq(Value::from(*user_id)))
            .order_by(Posts::Id, Order::Asc)
            .to_owned();

        let rows = query_all(self.db.connection(), &stmt).await?;
        rows.iter().map(|r| self.from_row(r)).collect()
    }

    async fn create(&self, post: &NewPost) -> Result<Post, DomainError> {
        let now = Utc::now();
        let values = vec![
            ("text".to_string(), FieldValue::from(post.text.clone())),
            ("user_id".to_string(), FieldValue::from(post.user_id)),
            ("created_at".to_string(), FieldValue::from(now)),
            ("updated_at".to_string(), FieldValue::from(now)),
        ];
        let id = insert_row(
            self.db.connection(),
            "posts",
            self.db.key_kind("posts"),
            &values,
        )
        .await?;

        let id = id
            .as_int()
            .ok_or_else(|| DomainError::Internal(format!("post id is not an integer: {}", id)))?;
        Ok(Post {
            id,
            text: post.text.clone(),
            user_id: post.user_id,
            created_at: now,
            updated_at: now,
            dirty: false,
        })
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(count_rows(self.db.connection(), "posts").await?)
    }
}
