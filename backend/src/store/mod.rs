//! Row store: generic CRUD over named tables
//!
//! Services talk to the database through [`RowStore`], addressing rows by
//! table and exact-match equality filters. Joins are done in application
//! code by mapping ids to loaded records.

mod memory;
mod postgres;

pub use memory::MemoryRowStore;
pub use postgres::PgRowStore;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// A row as a JSON object keyed by column name
pub type Record = serde_json::Map<String, Value>;

/// Row store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Carries the offending column(s), joined with `_`
    #[error("Unique constraint violated on {0}")]
    UniqueViolation(String),

    /// Carries the referencing or referenced table
    #[error("Foreign key constraint violated on {0}")]
    ForeignKeyViolation(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Tables of the Basket Stock schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Inventory,
    StockMovements,
    BasketTypes,
    BasketTypeItems,
    Supervisors,
    CellLeaders,
    Cells,
    Families,
    Deliveries,
    DeliveryItems,
}

/// What happens to referencing rows when the parent row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Restrict,
    Cascade,
    SetNull,
}

/// A reference from a column of one table to the `id` of another
#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub parent: Table,
    pub on_delete: OnDelete,
}

const fn fk(column: &'static str, parent: Table, on_delete: OnDelete) -> ForeignKey {
    ForeignKey {
        column,
        parent,
        on_delete,
    }
}

const INVENTORY_FKS: &[ForeignKey] = &[fk("product_id", Table::Products, OnDelete::Cascade)];
const STOCK_MOVEMENT_FKS: &[ForeignKey] = &[fk("product_id", Table::Products, OnDelete::Restrict)];
const BASKET_ITEM_FKS: &[ForeignKey] = &[
    fk("basket_type_id", Table::BasketTypes, OnDelete::Cascade),
    fk("product_id", Table::Products, OnDelete::Restrict),
];
const LEADER_FKS: &[ForeignKey] = &[fk("supervisor_id", Table::Supervisors, OnDelete::SetNull)];
const CELL_FKS: &[ForeignKey] = &[
    fk("leader_id", Table::CellLeaders, OnDelete::SetNull),
    fk("supervisor_id", Table::Supervisors, OnDelete::SetNull),
];
// A cell with families linked to it cannot be deleted
const FAMILY_FKS: &[ForeignKey] = &[fk("cell_id", Table::Cells, OnDelete::Restrict)];
const DELIVERY_FKS: &[ForeignKey] = &[
    fk("family_id", Table::Families, OnDelete::Restrict),
    fk("leader_id", Table::CellLeaders, OnDelete::Restrict),
    fk("basket_type_id", Table::BasketTypes, OnDelete::Restrict),
];
const DELIVERY_ITEM_FKS: &[ForeignKey] = &[
    fk("delivery_id", Table::Deliveries, OnDelete::Cascade),
    fk("product_id", Table::Products, OnDelete::Restrict),
];

impl Table {
    pub const ALL: [Table; 11] = [
        Table::Products,
        Table::Inventory,
        Table::StockMovements,
        Table::BasketTypes,
        Table::BasketTypeItems,
        Table::Supervisors,
        Table::CellLeaders,
        Table::Cells,
        Table::Families,
        Table::Deliveries,
        Table::DeliveryItems,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Inventory => "inventory",
            Table::StockMovements => "stock_movements",
            Table::BasketTypes => "basket_types",
            Table::BasketTypeItems => "basket_type_items",
            Table::Supervisors => "supervisors",
            Table::CellLeaders => "cell_leaders",
            Table::Cells => "cells",
            Table::Families => "families",
            Table::Deliveries => "deliveries",
            Table::DeliveryItems => "delivery_items",
        }
    }

    /// Column sets that must be unique; mirrors the migration
    pub fn unique_keys(&self) -> &'static [&'static [&'static str]] {
        match self {
            Table::Inventory => &[&["product_id"]],
            Table::BasketTypes => &[&["name"]],
            Table::BasketTypeItems => &[&["basket_type_id", "product_id"]],
            Table::Supervisors | Table::CellLeaders => &[&["phone"]],
            Table::Families => &[&["representative_phone"]],
            _ => &[],
        }
    }

    /// Outgoing references; mirrors the migration
    pub fn foreign_keys(&self) -> &'static [ForeignKey] {
        match self {
            Table::Inventory => INVENTORY_FKS,
            Table::StockMovements => STOCK_MOVEMENT_FKS,
            Table::BasketTypeItems => BASKET_ITEM_FKS,
            Table::CellLeaders => LEADER_FKS,
            Table::Cells => CELL_FKS,
            Table::Families => FAMILY_FKS,
            Table::Deliveries => DELIVERY_FKS,
            Table::DeliveryItems => DELIVERY_ITEM_FKS,
            _ => &[],
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact-match equality filter on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub value: Value,
}

impl Filter {
    pub fn new(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }

    pub fn id(column: &'static str, id: Uuid) -> Self {
        Self::new(column, id.to_string())
    }

    /// Filter value as compared by the store: text form, `None` for null
    pub fn text(&self) -> Option<String> {
        value_text(&self.value)
    }
}

pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Sort order for fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            descending: true,
        }
    }
}

/// Column and table names go into SQL text, so only `[a-z0-9_]` is allowed
pub(crate) fn check_identifier(name: &str) -> StoreResult<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Generic row store contract
#[axum::async_trait]
pub trait RowStore: Send + Sync {
    /// Rows matching every filter, in the requested order
    async fn fetch(
        &self,
        table: Table,
        filters: &[Filter],
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Record>>;

    /// Insert one row; returns it with generated columns filled in
    async fn insert(&self, table: Table, record: Record) -> StoreResult<Record>;

    /// Apply `patch` to every matching row; returns the updated rows
    async fn update(&self, table: Table, filters: &[Filter], patch: Record)
        -> StoreResult<Vec<Record>>;

    /// Delete every matching row; returns the deleted rows
    async fn delete(&self, table: Table, filters: &[Filter]) -> StoreResult<Vec<Record>>;

    async fn ping(&self) -> StoreResult<()>;

    /// Release connections; called once on shutdown
    async fn close(&self);
}

fn to_record<T: Serialize>(value: &T) -> StoreResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidRecord(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

fn from_records<T: DeserializeOwned>(records: Vec<Record>) -> StoreResult<Vec<T>> {
    records
        .into_iter()
        .map(|r| serde_json::from_value(Value::Object(r)).map_err(StoreError::from))
        .collect()
}

/// Typed helpers over the record-level contract
impl<'a> dyn RowStore + 'a {
    pub async fn fetch_as<T: DeserializeOwned + Send>(
        &self,
        table: Table,
        filters: &[Filter],
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<T>> {
        from_records(self.fetch(table, filters, order_by).await?)
    }

    pub async fn fetch_one<T: DeserializeOwned + Send>(
        &self,
        table: Table,
        filters: &[Filter],
    ) -> StoreResult<Option<T>> {
        Ok(self.fetch_as(table, filters, None).await?.into_iter().next())
    }

    pub async fn insert_as<T, N>(&self, table: Table, new: &N) -> StoreResult<T>
    where
        T: DeserializeOwned + Send,
        N: Serialize + Sync,
    {
        let record = self.insert(table, to_record(new)?).await?;
        Ok(serde_json::from_value(Value::Object(record))?)
    }

    pub async fn update_as<T, P>(&self, table: Table, filters: &[Filter], patch: &P) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
        P: Serialize + Sync,
    {
        from_records(self.update(table, filters, to_record(patch)?).await?)
    }
}
