//! Delivery recorder
//!
//! Writes one delivery, then for every affected product adjusts the stock
//! ledger and writes a delivery item. The writes are sequential and not
//! wrapped in a transaction: a failure part-way leaves the delivery with
//! the items recorded so far. Stock sufficiency is not checked.

use std::sync::Arc;

use shared::{
    normalize_note, plan_custom_delivery, plan_recipe_delivery, recipe_lines, BasketType,
    CellLeader, CustomDeliveryInput, Delivery, DeliveryInput, DeliveryItem, DeliveryLine,
    DeliveryWithItems, Family, MovementKind, NewDelivery, NewDeliveryItem, Product,
};
use uuid::Uuid;
use validator::Validate;

use super::{BasketService, StockLedger};
use crate::error::AppResult;
use crate::store::{Filter, OrderBy, RowStore, Table};

/// Delivery recorder service
#[derive(Clone)]
pub struct DeliveryRecorder {
    store: Arc<dyn RowStore>,
}

/// Movement reference linking stock outflow to its delivery
pub fn delivery_reference(delivery_id: Uuid) -> String {
    format!("Delivery {}", delivery_id)
}

impl DeliveryRecorder {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Deliver `quantity` baskets, consuming the recipe once per basket
    pub async fn record(&self, input: DeliveryInput) -> AppResult<DeliveryWithItems> {
        input.validate()?;
        self.check_parties(input.family_id, input.leader_id, input.basket_type_id)
            .await?;

        let recipe = BasketService::new(self.store.clone())
            .recipe(input.basket_type_id)
            .await?;
        let lines = plan_recipe_delivery(&recipe_lines(&recipe), input.quantity);

        self.write(
            NewDelivery {
                family_id: input.family_id,
                leader_id: input.leader_id,
                basket_type_id: input.basket_type_id,
                quantity: input.quantity,
                is_custom: false,
                notes: normalize_note(input.notes),
            },
            lines,
        )
        .await
    }

    /// Deliver with explicit per-product quantities instead of the recipe
    pub async fn record_custom(&self, input: CustomDeliveryInput) -> AppResult<DeliveryWithItems> {
        input.validate()?;
        self.check_parties(input.family_id, input.leader_id, input.basket_type_id)
            .await?;

        let lines = plan_custom_delivery(&input.items);
        for line in &lines {
            let _: Product =
                super::find_by_id(self.store.as_ref(), Table::Products, line.product_id, "Product")
                    .await?;
        }

        self.write(
            NewDelivery {
                family_id: input.family_id,
                leader_id: input.leader_id,
                basket_type_id: input.basket_type_id,
                quantity: input.quantity,
                is_custom: true,
                notes: normalize_note(input.notes),
            },
            lines,
        )
        .await
    }

    /// Most recent deliveries first
    pub async fn list(&self) -> AppResult<Vec<Delivery>> {
        Ok(self
            .store
            .fetch_as(Table::Deliveries, &[], Some(OrderBy::desc("delivered_at")))
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<DeliveryWithItems> {
        let delivery: Delivery =
            super::find_by_id(self.store.as_ref(), Table::Deliveries, id, "Delivery").await?;
        let items = self
            .store
            .fetch_as(Table::DeliveryItems, &[Filter::id("delivery_id", id)], None)
            .await?;
        Ok(DeliveryWithItems { delivery, items })
    }

    async fn check_parties(&self, family_id: Uuid, leader_id: Uuid, basket_type_id: Uuid) -> AppResult<()> {
        let store = self.store.as_ref();
        let _: Family = super::find_by_id(store, Table::Families, family_id, "Family").await?;
        let _: CellLeader = super::find_by_id(store, Table::CellLeaders, leader_id, "Leader").await?;
        let _: BasketType =
            super::find_by_id(store, Table::BasketTypes, basket_type_id, "Basket type").await?;
        Ok(())
    }

    async fn write(&self, new: NewDelivery, lines: Vec<DeliveryLine>) -> AppResult<DeliveryWithItems> {
        let delivery: Delivery = self.store.insert_as(Table::Deliveries, &new).await?;
        let reference = delivery_reference(delivery.id);
        let ledger = StockLedger::new(self.store.clone());

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            ledger
                .adjust(
                    line.product_id,
                    -line.quantity,
                    MovementKind::BasketOutflow,
                    Some(reference.clone()),
                )
                .await?;
            let item: DeliveryItem = self
                .store
                .insert_as(
                    Table::DeliveryItems,
                    &NewDeliveryItem {
                        delivery_id: delivery.id,
                        product_id: line.product_id,
                        qty_delivered: line.quantity,
                    },
                )
                .await?;
            items.push(item);
        }

        tracing::info!(
            delivery_id = %delivery.id,
            family_id = %delivery.family_id,
            baskets = delivery.quantity,
            custom = delivery.is_custom,
            items = items.len(),
            "Delivery recorded"
        );
        Ok(DeliveryWithItems { delivery, items })
    }
}
