//! SQL adapter for EventRepository

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::Value;

use crate::domain::entities::{Event, FieldValue, NewEvent, RecordId};
use crate::domain::ports::EventRepository;
use crate::error::DomainError;
use crate::provision::schema::Events;
use crate::provision::FixtureDatabase;

use super::{count_rows, insert_row, query_one, read_record_id};

pub struct SqlEventRepository {
    db: Arc<FixtureDatabase>,
}

impl SqlEventRepository {
    pub fn new(db: Arc<FixtureDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventRepository for SqlEventRepository {
    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Event>, DomainError> {
        let stmt = Query::select()
            .columns([Events::Id, Events::Data])
            .from(Events::Table)
            .and_where(Expr::col(Events::Id).eq(Value::from(*id)))
            .to_owned();

        let Some(row) = query_one(self.db.connection(), &stmt).await? else {
            return Ok(None);
        };
        Ok(Some(Event {
            id: read_record_id(&row, "id", self.db.key_kind("events"))?,
            data: row.try_get("", "data")?,
        }))
    }

    async fn create(&self, event: &NewEvent) -> Result<Event, DomainError> {
        let values = vec![("data".to_string(), FieldValue::from(event.data.clone()))];
        let id = insert_row(
            self.db.connection(),
            "events",
            self.db.key_kind("events"),
            &values,
        )
        .await?;

        Ok(Event {
            id,
            data: event.data.clone(),
        })
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(count_rows(self.db.connection(), "events").await?)
    }
}
