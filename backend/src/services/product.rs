//! Product catalog service

use std::sync::Arc;

use serde::Serialize;
use shared::{Product, ProductInput, StockSnapshot};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{Filter, OrderBy, RowStore, Table};

#[derive(Serialize)]
struct NewSnapshot {
    product_id: Uuid,
    quantity: f64,
}

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn RowStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// All products ordered by name
    pub async fn list(&self) -> AppResult<Vec<Product>> {
        Ok(self
            .store
            .fetch_as(Table::Products, &[], Some(OrderBy::asc("name")))
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        super::find_by_id(self.store.as_ref(), Table::Products, id, "Product").await
    }

    /// Create a product together with its zero stock snapshot
    pub async fn create(&self, input: ProductInput) -> AppResult<Product> {
        let input = input.normalized();
        input.validate()?;

        let product: Product = self.store.insert_as(Table::Products, &input).await?;
        let _: StockSnapshot = self
            .store
            .insert_as(
                Table::Inventory,
                &NewSnapshot {
                    product_id: product.id,
                    quantity: 0.0,
                },
            )
            .await?;

        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    pub async fn update(&self, id: Uuid, input: ProductInput) -> AppResult<Product> {
        let input = input.normalized();
        input.validate()?;

        let updated: Vec<Product> = self
            .store
            .update_as(Table::Products, &[Filter::id("id", id)], &input)
            .await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Fails with a conflict while recipes, movements or deliveries reference it
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        super::delete_by_id(self.store.as_ref(), Table::Products, id, "Product").await?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
