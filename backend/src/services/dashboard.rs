//! Dashboard: availability of every active basket, and quick checkout

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{
    plan_recipe_delivery, recipe_lines, validate_basket_count, BasketSummary, BasketType,
    MovementKind, StockMovement,
};
use uuid::Uuid;

use super::{BasketService, StockLedger};
use crate::error::{AppError, AppResult};
use crate::store::RowStore;

/// Reference recorded on quick checkout movements when none is given
pub const QUICK_CHECKOUT_REFERENCE: &str = "Quick checkout - Dashboard";

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn RowStore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardEntry {
    pub basket_type: BasketType,
    pub summary: BasketSummary,
}

/// Consume stock for baskets handed out without a delivery record
#[derive(Debug, Clone, Deserialize)]
pub struct QuickCheckoutInput {
    pub basket_type_id: Uuid,
    pub quantity: i32,
    pub reference: Option<String>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Active basket types ordered by name, each with its summary
    pub async fn overview(&self) -> AppResult<Vec<DashboardEntry>> {
        let baskets = BasketService::new(self.store.clone());
        let mut entries = Vec::new();
        for basket_type in baskets.list_active().await? {
            let summary = baskets.basket_summary(basket_type.id).await?;
            entries.push(DashboardEntry {
                basket_type,
                summary,
            });
        }
        Ok(entries)
    }

    /// Remove one recipe's worth of stock per basket, without a delivery
    pub async fn quick_checkout(&self, input: QuickCheckoutInput) -> AppResult<Vec<StockMovement>> {
        validate_basket_count(input.quantity).map_err(|msg| {
            AppError::validation("quantity", msg, "A quantidade deve ser pelo menos 1")
        })?;

        let baskets = BasketService::new(self.store.clone());
        baskets.get(input.basket_type_id).await?;
        let recipe = baskets.recipe(input.basket_type_id).await?;
        if recipe.is_empty() {
            return Err(AppError::EmptyRecipe(input.basket_type_id));
        }

        let reference = input
            .reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| QUICK_CHECKOUT_REFERENCE.to_string());

        let ledger = StockLedger::new(self.store.clone());
        let mut movements = Vec::with_capacity(recipe.len());
        for line in plan_recipe_delivery(&recipe_lines(&recipe), input.quantity) {
            let movement = ledger
                .adjust(
                    line.product_id,
                    -line.quantity,
                    MovementKind::BasketOutflow,
                    Some(reference.clone()),
                )
                .await?;
            movements.push(movement);
        }

        tracing::info!(
            basket_type_id = %input.basket_type_id,
            quantity = input.quantity,
            "Quick checkout recorded"
        );
        Ok(movements)
    }
}
