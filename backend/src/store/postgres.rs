//! PostgreSQL row store
//!
//! Rows travel as JSONB: reads go through `to_jsonb(t)`, writes through
//! `jsonb_populate_record`, so one set of queries serves every table.

use std::time::Duration;

use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{
    check_identifier, Filter, OrderBy, Record, RowStore, StoreError, StoreResult,
    Table,
};
use crate::config::DatabaseConfig;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub struct PgRowStore {
    pool: PgPool,
}

impl PgRowStore {
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// `WHERE` clause over `to_jsonb(t)`, binds starting at `$first`
fn where_clause(filters: &[Filter], first: usize) -> StoreResult<(String, Vec<String>)> {
    let mut conditions = Vec::with_capacity(filters.len());
    let mut binds = Vec::new();

    for filter in filters {
        let column = check_identifier(filter.column)?;
        match filter.text() {
            Some(text) => {
                binds.push(text);
                conditions.push(format!(
                    "(to_jsonb(t) ->> '{}') = ${}",
                    column,
                    first + binds.len() - 1
                ));
            }
            None => conditions.push(format!("(to_jsonb(t) ->> '{}') IS NULL", column)),
        }
    }

    if conditions.is_empty() {
        Ok((String::new(), binds))
    } else {
        Ok((format!(" WHERE {}", conditions.join(" AND ")), binds))
    }
}

fn columns(record: &Record) -> StoreResult<Vec<&str>> {
    record.keys().map(|k| check_identifier(k)).collect()
}

/// Postgres constraint names follow `<table>_<columns>_key` / `_fkey`
fn constraint_subject(table: Table, constraint: Option<&str>, suffix: &str) -> String {
    constraint
        .and_then(|c| c.strip_prefix(table.name()))
        .and_then(|c| c.strip_prefix('_'))
        .and_then(|c| c.strip_suffix(suffix))
        .map(str::to_string)
        .unwrap_or_else(|| table.name().to_string())
}

fn map_error(table: Table, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return StoreError::UniqueViolation(constraint_subject(
                    table,
                    db.constraint(),
                    "_key",
                ))
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return StoreError::ForeignKeyViolation(table.name().to_string())
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

fn into_records(rows: Vec<Value>) -> StoreResult<Vec<Record>> {
    rows.into_iter()
        .map(|row| match row {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::InvalidRecord(other.to_string())),
        })
        .collect()
}

#[axum::async_trait]
impl RowStore for PgRowStore {
    async fn fetch(
        &self,
        table: Table,
        filters: &[Filter],
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Record>> {
        let (clause, binds) = where_clause(filters, 1)?;
        let mut sql = format!("SELECT to_jsonb(t) FROM {} AS t{}", table.name(), clause);
        if let Some(order) = order_by {
            sql.push_str(&format!(
                " ORDER BY t.{} {} NULLS LAST",
                check_identifier(order.column)?,
                if order.descending { "DESC" } else { "ASC" }
            ));
        }

        let mut query = sqlx::query_scalar::<_, Value>(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_error(table, e))?;
        into_records(rows)
    }

    async fn insert(&self, table: Table, record: Record) -> StoreResult<Record> {
        let cols = columns(&record)?.join(", ");
        let sql = format!(
            "INSERT INTO {table} AS t ({cols}) \
             SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) \
             RETURNING to_jsonb(t.*)",
            table = table.name(),
            cols = cols,
        );

        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(record))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_error(table, e))?;

        into_records(vec![row])?
            .pop()
            .ok_or_else(|| StoreError::InvalidRecord("insert returned no row".to_string()))
    }

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        patch: Record,
    ) -> StoreResult<Vec<Record>> {
        if patch.is_empty() {
            return self.fetch(table, filters, None).await;
        }

        let assignments = columns(&patch)?
            .iter()
            .map(|c| format!("{c} = r.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let (clause, binds) = where_clause(filters, 2)?;
        let sql = format!(
            "UPDATE {table} AS t SET {assignments} \
             FROM jsonb_populate_record(NULL::{table}, $1) AS r{clause} \
             RETURNING to_jsonb(t.*)",
            table = table.name(),
        );

        let mut query = sqlx::query_scalar::<_, Value>(&sql).bind(Value::Object(patch));
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_error(table, e))?;
        into_records(rows)
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> StoreResult<Vec<Record>> {
        let (clause, binds) = where_clause(filters, 1)?;
        let sql = format!(
            "DELETE FROM {} AS t{} RETURNING to_jsonb(t.*)",
            table.name(),
            clause
        );

        let mut query = sqlx::query_scalar::<_, Value>(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_error(table, e))?;
        into_records(rows)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
