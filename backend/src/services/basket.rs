//! Basket types, their recipes, and the availability entry points

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use shared::{
    analyze, mountable, recipe_lines, summarize, validate_required_quantity, BasketAnalysis,
    BasketSummary, BasketType, BasketTypeInput, Mountable, NewRecipeItem, Product, RecipeItem,
    RecipeItemInput, NO_PRODUCT,
};
use uuid::Uuid;
use validator::Validate;

use super::StockLedger;
use crate::error::{AppError, AppResult};
use crate::store::{Filter, OrderBy, RowStore, Table};

/// Basket catalog and availability service
#[derive(Clone)]
pub struct BasketService {
    store: Arc<dyn RowStore>,
}

/// Recipe item with its product resolved
#[derive(Debug, Clone, Serialize)]
pub struct RecipeItemView {
    #[serde(flatten)]
    pub item: RecipeItem,
    pub product_name: String,
}

/// Availability of a basket type with product names for display
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    pub basket_type_id: Uuid,
    #[serde(flatten)]
    pub analysis: BasketAnalysis,
    /// Product name blocking the next basket, `-` when nothing is short
    pub limiting_product: String,
    pub product_names: HashMap<Uuid, String>,
}

#[derive(Serialize)]
struct QuantityPatch {
    quantity_required: f64,
}

impl BasketService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Basket types
    // ========================================================================

    /// All basket types ordered by name
    pub async fn list(&self) -> AppResult<Vec<BasketType>> {
        Ok(self
            .store
            .fetch_as(Table::BasketTypes, &[], Some(OrderBy::asc("name")))
            .await?)
    }

    /// Active basket types ordered by name
    pub async fn list_active(&self) -> AppResult<Vec<BasketType>> {
        Ok(self
            .store
            .fetch_as(
                Table::BasketTypes,
                &[Filter::new("is_active", true)],
                Some(OrderBy::asc("name")),
            )
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<BasketType> {
        super::find_by_id(self.store.as_ref(), Table::BasketTypes, id, "Basket type").await
    }

    pub async fn create(&self, input: BasketTypeInput) -> AppResult<BasketType> {
        let input = input.normalized();
        input.validate()?;

        let basket: BasketType = self.store.insert_as(Table::BasketTypes, &input).await?;
        tracing::info!(basket_type_id = %basket.id, name = %basket.name, "Basket type created");
        Ok(basket)
    }

    pub async fn update(&self, id: Uuid, input: BasketTypeInput) -> AppResult<BasketType> {
        let input = input.normalized();
        input.validate()?;

        let updated: Vec<BasketType> = self
            .store
            .update_as(Table::BasketTypes, &[Filter::id("id", id)], &input)
            .await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Basket type".to_string()))
    }

    /// Removes the recipe with it; fails with a conflict once deliveries exist
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        super::delete_by_id(self.store.as_ref(), Table::BasketTypes, id, "Basket type").await?;
        tracing::info!(basket_type_id = %id, "Basket type deleted");
        Ok(())
    }

    // ========================================================================
    // Recipe
    // ========================================================================

    /// Raw recipe items in store order
    pub async fn recipe(&self, basket_type_id: Uuid) -> AppResult<Vec<RecipeItem>> {
        Ok(self
            .store
            .fetch_as(
                Table::BasketTypeItems,
                &[Filter::id("basket_type_id", basket_type_id)],
                None,
            )
            .await?)
    }

    pub async fn recipe_items(&self, basket_type_id: Uuid) -> AppResult<Vec<RecipeItemView>> {
        self.get(basket_type_id).await?;
        let items = self.recipe(basket_type_id).await?;
        let names = self.product_names().await?;

        Ok(items
            .into_iter()
            .map(|item| RecipeItemView {
                product_name: names
                    .get(&item.product_id)
                    .cloned()
                    .unwrap_or_else(|| NO_PRODUCT.to_string()),
                item,
            })
            .collect())
    }

    /// Add a product to the recipe, or change its quantity when already present
    pub async fn upsert_item(
        &self,
        basket_type_id: Uuid,
        input: RecipeItemInput,
    ) -> AppResult<RecipeItem> {
        validate_required_quantity(input.quantity_required).map_err(|msg| {
            AppError::validation(
                "quantity_required",
                msg,
                "A quantidade necessária deve ser maior que zero",
            )
        })?;
        self.get(basket_type_id).await?;
        let _: Product =
            super::find_by_id(self.store.as_ref(), Table::Products, input.product_id, "Product")
                .await?;

        let key = [
            Filter::id("basket_type_id", basket_type_id),
            Filter::id("product_id", input.product_id),
        ];
        let existing: Option<RecipeItem> = self.store.fetch_one(Table::BasketTypeItems, &key).await?;

        let item = match existing {
            Some(_) => {
                let updated: Vec<RecipeItem> = self
                    .store
                    .update_as(
                        Table::BasketTypeItems,
                        &key,
                        &QuantityPatch {
                            quantity_required: input.quantity_required,
                        },
                    )
                    .await?;
                updated
                    .into_iter()
                    .next()
                    .ok_or_else(|| AppError::NotFound("Recipe item".to_string()))?
            }
            None => {
                self.store
                    .insert_as(
                        Table::BasketTypeItems,
                        &NewRecipeItem {
                            basket_type_id,
                            product_id: input.product_id,
                            quantity_required: input.quantity_required,
                        },
                    )
                    .await?
            }
        };

        tracing::info!(
            basket_type_id = %basket_type_id,
            product_id = %item.product_id,
            quantity_required = item.quantity_required,
            "Recipe item saved"
        );
        Ok(item)
    }

    pub async fn remove_item(&self, basket_type_id: Uuid, item_id: Uuid) -> AppResult<()> {
        let removed = self
            .store
            .delete(
                Table::BasketTypeItems,
                &[
                    Filter::id("id", item_id),
                    Filter::id("basket_type_id", basket_type_id),
                ],
            )
            .await?;
        if removed.is_empty() {
            return Err(AppError::NotFound("Recipe item".to_string()));
        }
        Ok(())
    }

    // ========================================================================
    // Availability
    // ========================================================================

    /// Complete baskets, per-product shortfalls for one more, and the checklist
    pub async fn analyze_basket(&self, basket_type_id: Uuid) -> AppResult<AnalysisView> {
        self.get(basket_type_id).await?;
        let recipe = recipe_lines(&self.recipe(basket_type_id).await?);
        let stock = StockLedger::new(self.store.clone()).stock_map().await?;
        let names = self.product_names().await?;

        let analysis = analyze(&recipe, &stock);
        let limiting_product = analysis
            .limiting()
            .and_then(|l| names.get(&l.product_id).cloned())
            .unwrap_or_else(|| NO_PRODUCT.to_string());
        let product_names = recipe
            .iter()
            .filter_map(|line| names.get(&line.product_id).map(|n| (line.product_id, n.clone())))
            .collect();

        Ok(AnalysisView {
            basket_type_id,
            analysis,
            limiting_product,
            product_names,
        })
    }

    /// Complete baskets, limiting product name and its shortfall
    pub async fn basket_summary(&self, basket_type_id: Uuid) -> AppResult<BasketSummary> {
        let recipe = recipe_lines(&self.recipe(basket_type_id).await?);
        let stock = StockLedger::new(self.store.clone()).stock_map().await?;
        let names = self.product_names().await?;

        Ok(summarize(&recipe, &stock, |id| names.get(id).cloned()))
    }

    /// Complete baskets and the product with the smallest stock/required ratio
    pub async fn compute_mountable_for_basket(&self, basket_type_id: Uuid) -> AppResult<Mountable> {
        let recipe = recipe_lines(&self.recipe(basket_type_id).await?);
        let stock = StockLedger::new(self.store.clone()).stock_map().await?;
        Ok(mountable(&recipe, &stock))
    }

    async fn product_names(&self) -> AppResult<HashMap<Uuid, String>> {
        let products: Vec<Product> = self.store.fetch_as(Table::Products, &[], None).await?;
        Ok(products.into_iter().map(|p| (p.id, p.name)).collect())
    }
}
