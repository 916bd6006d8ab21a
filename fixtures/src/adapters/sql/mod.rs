//! SQL adapters
//!
//! Implementations of the port traits on top of SeaORM connections. Statements
//! are built with sea-query and rendered for whichever backend the connection
//! runs on, so the same code serves SQLite and PostgreSQL.

pub mod event_repo;
pub mod post_repo;
pub mod record_store;
pub mod user_repo;

#[cfg(test)]
mod integration_tests;

pub use event_repo::SqlEventRepository;
pub use post_repo::SqlPostRepository;
pub use record_store::SqlRecordStore;
pub use user_repo::SqlUserRepository;

use sea_orm::sea_query::{Alias, Asterisk, Expr, Query, SimpleExpr};
use sea_orm::{ConnectionTrait, DbErr, ExecResult, QueryResult, StatementBuilder};
use uuid::Uuid;

use crate::domain::entities::{FieldValue, KeyKind, RecordId};

pub(crate) async fn exec<C, S>(conn: &C, stmt: &S) -> Result<ExecResult, DbErr>
where
    C: ConnectionTrait,
    S: StatementBuilder,
{
    let backend = conn.get_database_backend();
    conn.execute(backend.build(stmt)).await
}

pub(crate) async fn query_one<C, S>(conn: &C, stmt: &S) -> Result<Option<QueryResult>, DbErr>
where
    C: ConnectionTrait,
    S: StatementBuilder,
{
    let backend = conn.get_database_backend();
    conn.query_one(backend.build(stmt)).await
}

pub(crate) async fn query_all<C, S>(conn: &C, stmt: &S) -> Result<Vec<QueryResult>, DbErr>
where
    C: ConnectionTrait,
    S: StatementBuilder,
{
    let backend = conn.get_database_backend();
    conn.query_all(backend.build(stmt)).await
}

/// Read a key column as the table's key type
pub(crate) fn read_record_id(row: &QueryResult, column: &str, key: KeyKind) -> Result<RecordId, DbErr> {
    match key {
        KeyKind::Integer => row.try_get::<i64>("", column).map(RecordId::Int),
        KeyKind::Uuid => row.try_get::<Uuid>("", column).map(RecordId::Uuid),
    }
}

/// Insert a row and return its id.
///
/// NULL values are left out so column defaults apply. UUID keys are generated
/// here unless the caller supplied one.
pub(crate) async fn insert_row<C>(
    conn: &C,
    table: &str,
    key: KeyKind,
    values: &[(String, FieldValue)],
) -> Result<RecordId, DbErr>
where
    C: ConnectionTrait,
{
    let mut columns = Vec::with_capacity(values.len() + 1);
    let mut binds: Vec<SimpleExpr> = Vec::with_capacity(values.len() + 1);

    if key == KeyKind::Uuid && !values.iter().any(|(column, _)| column == "id") {
        columns.push(Alias::new("id"));
        binds.push(SimpleExpr::Value(Uuid::new_v4().into()));
    }
    for (column, value) in values {
        if let Some(bind) = value.to_sea_value() {
            columns.push(Alias::new(column.as_str()));
            binds.push(SimpleExpr::Value(bind));
        }
    }

    let mut stmt = Query::insert();
    stmt.into_table(Alias::new(table))
        .returning_col(Alias::new("id"));
    if columns.is_empty() {
        stmt.or_default_values();
    } else {
        stmt.columns(columns)
            .values(binds)
            .map_err(|e| DbErr::Custom(e.to_string()))?;
    }

    let row = query_one(conn, &stmt)
        .await?
        .ok_or(DbErr::RecordNotInserted)?;
    read_record_id(&row, "id", key)
}

/// Number of rows in a table
pub(crate) async fn count_rows<C>(conn: &C, table: &str) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let stmt = Query::select()
        .expr_as(Expr::col(Asterisk).count(), Alias::new("count"))
        .from(Alias::new(table))
        .to_owned();

    let count = match query_one(conn, &stmt).await? {
        Some(row) => row.try_get::<i64>("", "count")?,
        None => 0,
    };
    Ok(count.max(0) as u64)
}
