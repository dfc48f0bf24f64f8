//! Stock ledger: current quantity per product plus an append-only movement log
//!
//! `adjust` is a plain read-modify-write against the row store. It takes no
//! lock and opens no transaction, so two concurrent adjustments of the same
//! product race and the last write wins. Stock is allowed to go negative.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use shared::{
    validate_stock_delta, MeasureUnit, MovementKind, NewStockMovement, Product, StockEntryInput,
    StockMap, StockMovement, StockSnapshot,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{Filter, OrderBy, RowStore, Table};

/// Movements returned by the history view when no limit is given
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Stock ledger service
#[derive(Clone)]
pub struct StockLedger {
    store: Arc<dyn RowStore>,
}

/// Current stock of one product
#[derive(Debug, Clone, Serialize)]
pub struct StockLevel {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: MeasureUnit,
    pub quantity: f64,
}

/// A movement with its product name resolved
#[derive(Debug, Clone, Serialize)]
pub struct MovementView {
    #[serde(flatten)]
    pub movement: StockMovement,
    pub product_name: Option<String>,
}

#[derive(Serialize)]
struct NewSnapshot {
    product_id: Uuid,
    quantity: f64,
}

#[derive(Serialize)]
struct SnapshotPatch {
    quantity: f64,
    updated_at: chrono::DateTime<Utc>,
}

impl StockLedger {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Apply `delta` to the product's snapshot and append one movement
    pub async fn adjust(
        &self,
        product_id: Uuid,
        delta: f64,
        kind: MovementKind,
        reference: Option<String>,
    ) -> AppResult<StockMovement> {
        let filter = [Filter::id("product_id", product_id)];
        let current: Option<StockSnapshot> = self.store.fetch_one(Table::Inventory, &filter).await?;

        let new_quantity = match current {
            Some(snapshot) => {
                let quantity = snapshot.quantity + delta;
                let _: Vec<StockSnapshot> = self
                    .store
                    .update_as(
                        Table::Inventory,
                        &filter,
                        &SnapshotPatch {
                            quantity,
                            updated_at: Utc::now(),
                        },
                    )
                    .await?;
                quantity
            }
            None => {
                let _: StockSnapshot = self
                    .store
                    .insert_as(
                        Table::Inventory,
                        &NewSnapshot {
                            product_id,
                            quantity: delta,
                        },
                    )
                    .await?;
                delta
            }
        };

        let movement: StockMovement = self
            .store
            .insert_as(
                Table::StockMovements,
                &NewStockMovement {
                    product_id,
                    qty_change: delta,
                    movement_type: kind,
                    reference,
                },
            )
            .await?;

        tracing::info!(
            product_id = %product_id,
            delta,
            quantity = new_quantity,
            kind = %kind,
            "Stock adjusted"
        );
        if new_quantity < 0.0 {
            tracing::warn!(product_id = %product_id, quantity = new_quantity, "Stock went negative");
        }

        Ok(movement)
    }

    /// Manual stock entry or adjustment from staff
    pub async fn entry(&self, input: StockEntryInput) -> AppResult<StockMovement> {
        validate_stock_delta(input.quantity).map_err(|msg| {
            AppError::validation(
                "quantity",
                msg,
                "Quantidade deve ser diferente de zero.",
            )
        })?;
        let _: Product =
            super::find_by_id(self.store.as_ref(), Table::Products, input.product_id, "Product")
                .await?;

        let reference = input
            .reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        self.adjust(input.product_id, input.quantity, input.movement_type, reference)
            .await
    }

    /// Current quantity of every snapshot, keyed by product
    pub async fn stock_map(&self) -> AppResult<StockMap> {
        let snapshots: Vec<StockSnapshot> = self.store.fetch_as(Table::Inventory, &[], None).await?;
        Ok(shared::stock_map(&snapshots))
    }

    /// Every product with its quantity (0 without a snapshot), ordered by name
    pub async fn current_stock(&self) -> AppResult<Vec<StockLevel>> {
        let products: Vec<Product> = self
            .store
            .fetch_as(Table::Products, &[], Some(OrderBy::asc("name")))
            .await?;
        let stock = self.stock_map().await?;

        Ok(products
            .into_iter()
            .map(|p| StockLevel {
                quantity: stock.get(&p.id).copied().unwrap_or(0.0),
                product_id: p.id,
                product_name: p.name,
                unit: p.unit,
            })
            .collect())
    }

    /// Most recent movements first
    pub async fn history(&self, limit: Option<usize>) -> AppResult<Vec<MovementView>> {
        let mut movements: Vec<StockMovement> = self
            .store
            .fetch_as(Table::StockMovements, &[], Some(OrderBy::desc("created_at")))
            .await?;
        movements.truncate(limit.unwrap_or(DEFAULT_HISTORY_LIMIT));

        let products: Vec<Product> = self.store.fetch_as(Table::Products, &[], None).await?;
        let names: HashMap<Uuid, String> = products.into_iter().map(|p| (p.id, p.name)).collect();

        Ok(movements
            .into_iter()
            .map(|movement| MovementView {
                product_name: names.get(&movement.product_id).cloned(),
                movement,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{test_support, ProductService};
    use shared::ProductInput;

    async fn product(store: &Arc<dyn RowStore>, name: &str) -> Product {
        ProductService::new(store.clone())
            .create(ProductInput {
                name: name.to_string(),
                unit: MeasureUnit::Kg,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_adjust_updates_snapshot_and_logs_movement() {
        let store = test_support::store();
        let rice = product(&store, "Arroz").await;
        let ledger = StockLedger::new(store.clone());

        ledger
            .adjust(rice.id, 10.0, MovementKind::Inbound, Some("Doação".to_string()))
            .await
            .unwrap();
        let movement = ledger
            .adjust(rice.id, -2.5, MovementKind::BasketOutflow, None)
            .await
            .unwrap();

        assert_eq!(movement.qty_change, -2.5);
        assert_eq!(movement.movement_type, MovementKind::BasketOutflow);
        assert_eq!(ledger.stock_map().await.unwrap()[&rice.id], 7.5);

        let history = ledger.history(None).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].product_name.as_deref(), Some("Arroz"));
    }

    #[tokio::test]
    async fn test_adjust_creates_missing_snapshot_and_allows_negative() {
        let store = test_support::store();
        let rice = product(&store, "Arroz").await;
        store
            .delete(Table::Inventory, &[Filter::id("product_id", rice.id)])
            .await
            .unwrap();

        let ledger = StockLedger::new(store.clone());
        ledger
            .adjust(rice.id, -3.0, MovementKind::Correction, None)
            .await
            .unwrap();
        assert_eq!(ledger.stock_map().await.unwrap()[&rice.id], -3.0);
    }

    #[tokio::test]
    async fn test_entry_rejects_zero_quantity() {
        let store = test_support::store();
        let rice = product(&store, "Arroz").await;
        let ledger = StockLedger::new(store);

        let err = ledger
            .entry(StockEntryInput {
                product_id: rice.id,
                quantity: 0.0,
                movement_type: MovementKind::Inbound,
                reference: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "quantity"));
        assert!(ledger.history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_current_stock_lists_every_product() {
        let store = test_support::store();
        let rice = product(&store, "Arroz").await;
        product(&store, "Feijão").await;
        let ledger = StockLedger::new(store);

        ledger
            .entry(StockEntryInput {
                product_id: rice.id,
                quantity: 4.0,
                movement_type: MovementKind::Inbound,
                reference: Some("  ".to_string()),
            })
            .await
            .unwrap();

        let levels = ledger.current_stock().await.unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].quantity, 4.0);
        assert_eq!(levels[1].quantity, 0.0);
        assert_eq!(ledger.history(None).await.unwrap()[0].movement.reference, None);
    }

    #[tokio::test]
    async fn test_history_limit() {
        let store = test_support::store();
        let rice = product(&store, "Arroz").await;
        let ledger = StockLedger::new(store);
        for _ in 0..3 {
            ledger
                .adjust(rice.id, 1.0, MovementKind::Inbound, None)
                .await
                .unwrap();
        }
        assert_eq!(ledger.history(Some(2)).await.unwrap().len(), 2);
    }
}
