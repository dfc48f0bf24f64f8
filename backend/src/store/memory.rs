//! In-memory row store for tests and local demos
//!
//! Fills in the columns the database would generate (`id`, timestamps and
//! column defaults) and enforces the same unique and foreign keys.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{
    value_text, Filter, OnDelete, OrderBy, Record, RowStore, StoreError, StoreResult, Table,
};

type Tables = HashMap<Table, Vec<Record>>;

#[derive(Default)]
pub struct MemoryRowStore {
    tables: Mutex<Tables>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::InvalidRecord("memory store lock poisoned".to_string()))
    }
}

fn matches(record: &Record, filters: &[Filter]) -> bool {
    filters.iter().all(|f| {
        let actual = record.get(f.column).and_then(value_text);
        actual == f.text()
    })
}

fn is_null(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // NULLS LAST in either direction
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Column defaults declared in the migration
fn apply_defaults(table: Table, record: &mut Record) {
    let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));
    let mut default = |column: &str, value: Value| {
        let slot = record.entry(column.to_string()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = value;
        }
    };

    default("id", Value::String(Uuid::new_v4().to_string()));
    match table {
        Table::Inventory => {
            default("quantity", Value::from(0.0));
            default("updated_at", now);
        }
        Table::BasketTypes => {
            default("is_active", Value::Bool(true));
            default("created_at", now);
        }
        Table::BasketTypeItems | Table::DeliveryItems => {}
        Table::Deliveries => {
            default("is_custom", Value::Bool(false));
            default("delivered_at", now);
        }
        Table::Families => {
            default("is_church_member", Value::Bool(false));
            default("is_cell_member", Value::Bool(false));
            default("total_people", Value::from(1));
            for column in ["adults", "children", "adolescents", "elderly"] {
                default(column, Value::from(0));
            }
            default("created_at", now);
        }
        Table::Products => {
            default("unit", Value::from("unit"));
            default("created_at", now);
        }
        _ => default("created_at", now),
    }
}

fn check_unique(tables: &Tables, table: Table, record: &Record) -> StoreResult<()> {
    let rows = tables.get(&table).map(Vec::as_slice).unwrap_or(&[]);
    for key in table.unique_keys() {
        let clash = rows.iter().any(|row| {
            key.iter().all(|column| {
                let value = record.get(*column).and_then(value_text);
                value.is_some() && row.get(*column).and_then(value_text) == value
            })
        });
        if clash {
            return Err(StoreError::UniqueViolation(key.join("_")));
        }
    }
    Ok(())
}

fn check_references(tables: &Tables, table: Table, record: &Record) -> StoreResult<()> {
    for key in table.foreign_keys() {
        let Some(target) = record.get(key.column).and_then(value_text) else {
            continue;
        };
        let exists = tables
            .get(&key.parent)
            .map(|rows| {
                rows.iter()
                    .any(|row| row.get("id").and_then(value_text).as_deref() == Some(target.as_str()))
            })
            .unwrap_or(false);
        if !exists {
            return Err(StoreError::ForeignKeyViolation(table.name().to_string()));
        }
    }
    Ok(())
}

/// Delete matching rows and resolve references to them, like `ON DELETE`
fn delete_rows(tables: &mut Tables, table: Table, filters: &[Filter]) -> StoreResult<Vec<Record>> {
    let rows = tables.entry(table).or_default();
    let (deleted, kept): (Vec<Record>, Vec<Record>) =
        rows.drain(..).partition(|row| matches(row, filters));
    *rows = kept;

    let ids: Vec<String> = deleted
        .iter()
        .filter_map(|row| row.get("id").and_then(value_text))
        .collect();

    for child in Table::ALL {
        for key in child.foreign_keys().iter().filter(|k| k.parent == table) {
            for id in &ids {
                let filter = [Filter::new(key.column, id.as_str())];
                let referencing = tables
                    .get(&child)
                    .map(|rows| rows.iter().any(|row| matches(row, &filter)))
                    .unwrap_or(false);
                if !referencing {
                    continue;
                }
                match key.on_delete {
                    OnDelete::Restrict => {
                        return Err(StoreError::ForeignKeyViolation(child.name().to_string()))
                    }
                    OnDelete::Cascade => {
                        delete_rows(tables, child, &filter)?;
                    }
                    OnDelete::SetNull => {
                        for row in tables.entry(child).or_default().iter_mut() {
                            if matches(row, &filter) {
                                row.insert(key.column.to_string(), Value::Null);
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(deleted)
}

#[axum::async_trait]
impl RowStore for MemoryRowStore {
    async fn fetch(
        &self,
        table: Table,
        filters: &[Filter],
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Record>> {
        let tables = self.lock()?;
        let mut rows: Vec<Record> = tables
            .get(&table)
            .map(|rows| rows.iter().filter(|r| matches(r, filters)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = order_by {
            rows.sort_by(|a, b| {
                let (x, y) = (a.get(order.column), b.get(order.column));
                if order.descending && !is_null(x) && !is_null(y) {
                    compare(y, x)
                } else {
                    compare(x, y)
                }
            });
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, mut record: Record) -> StoreResult<Record> {
        let mut tables = self.lock()?;
        apply_defaults(table, &mut record);
        check_unique(&tables, table, &record)?;
        check_references(&tables, table, &record)?;

        tables.entry(table).or_default().push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        patch: Record,
    ) -> StoreResult<Vec<Record>> {
        let mut tables = self.lock()?;
        check_references(&tables, table, &patch)?;

        let current = tables.get(&table).cloned().unwrap_or_default();
        let mut updated = Vec::new();
        let mut next = Vec::with_capacity(current.len());
        for row in current {
            if matches(&row, filters) {
                let mut row = row;
                for (column, value) in &patch {
                    row.insert(column.clone(), value.clone());
                }
                updated.push(row.clone());
                next.push(row);
            } else {
                next.push(row);
            }
        }

        let mut staged = tables.clone();
        staged.insert(table, Vec::new());
        for row in &next {
            check_unique(&staged, table, row)?;
            staged.entry(table).or_default().push(row.clone());
        }

        tables.insert(table, next);
        Ok(updated)
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> StoreResult<Vec<Record>> {
        let mut tables = self.lock()?;
        let mut staged = tables.clone();
        let deleted = delete_rows(&mut staged, table, filters)?;
        *tables = staged;
        Ok(deleted)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }

    async fn close(&self) {}
}
