//! SQL adapter for UserRepository

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{QueryResult, TransactionTrait, Value};

use crate::domain::entities::{FieldValue, KeyKind, NewUser, RecordId, User};
use crate::domain::ports::UserRepository;
use crate::error::DomainError;
use crate::provision::schema::{Posts, Users};
use crate::provision::FixtureDatabase;

use super::{count_rows, exec, insert_row, query_one, read_record_id};

pub struct SqlUserRepository {
    db: Arc<FixtureDatabase>,
}

impl SqlUserRepository {
    pub fn new(db: Arc<FixtureDatabase>) -> Self {
        Self { db }
    }

    fn key(&self) -> KeyKind {
        self.db.key_kind("users")
    }

    fn select() -> SelectStatement {
        Query::select()
            .columns([Users::Id, Users::Name, Users::Tag])
            .from(Users::Table)
            .to_owned()
    }

    fn from_row(&self, row: &QueryResult) -> Result<User, DomainError> {
        Ok(User {
            id: read_record_id(row, "id", self.key())?,
            name: row.try_get("", "name")?,
            tag: row.try_get("", "tag")?,
        })
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<User>, DomainError> {
        let stmt = Self::select()
            .and_where(Expr::col(Users::Id).eq(Value::from(*id)))
            .to_owned();

        let row = query_one(self.db.connection(), &stmt).await?;
        row.map(|r| self.from_row(&r)).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, DomainError> {
        let stmt = Self::select()
            .and_where(Expr::col(Users::Name).eq(name))
            .order_by(Users::Id, sea_orm::sea_query::Order::Asc)
            .limit(1)
            .to_owned();

        let row = query_one(self.db.connection(), &stmt).await?;
        row.map(|r| self.from_row(&r)).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        user.validate().map_err(DomainError::Validation)?;

        let values = vec![
            ("name".to_string(), FieldValue::from(user.name.as_str())),
            ("tag".to_string(), FieldValue::from(user.tag.clone())),
        ];
        let id = insert_row(self.db.connection(), "users", self.key(), &values).await?;

        Ok(User {
            id,
            name: user.name.clone(),
            tag: user.tag.clone(),
        })
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(count_rows(self.db.connection(), "users").await?)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), DomainError> {
        let txn = self.db.connection().begin().await?;

        let posts = Query::delete()
            .from_table(Posts::Table)
            .and_where(Expr::col(Posts::UserId).eq(Value::from(*id)))
            .to_owned();
        let removed_posts = exec(&txn, &posts).await?.rows_affected();

        let user = Query::delete()
            .from_table(Users::Table)
            .and_where(Expr::col(Users::Id).eq(Value::from(*id)))
            .to_owned();
        if exec(&txn, &user).await?.rows_affected() == 0 {
            txn.rollback().await?;
            return Err(DomainError::NotFound(format!("user {}", id)));
        }

        txn.commit().await?;
        tracing::debug!(user_id = %id, posts = removed_posts, "Deleted user");
        Ok(())
    }
}
