//! Basket type and recipe models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::availability::RecipeLine;

/// A named recipe of products assembled into one deliverable unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasketType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Deactivate rather than delete once deliveries reference the type
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a basket type
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BasketTypeInput {
    #[validate(custom = "crate::validation::validate_not_blank", length(max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl BasketTypeInput {
    pub fn normalized(self) -> Self {
        Self {
            name: super::trimmed(&self.name),
            description: super::trimmed_opt(self.description),
            is_active: self.is_active,
        }
    }
}

/// One product's required quantity within a basket type.
///
/// Unique per (basket type, product).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeItem {
    pub id: Uuid,
    pub basket_type_id: Uuid,
    pub product_id: Uuid,
    pub quantity_required: f64,
}

impl RecipeItem {
    pub fn line(&self) -> RecipeLine {
        RecipeLine {
            product_id: self.product_id,
            required: self.quantity_required,
        }
    }
}

/// Recipe items as engine input, keeping recipe order
pub fn recipe_lines(items: &[RecipeItem]) -> Vec<RecipeLine> {
    items.iter().map(RecipeItem::line).collect()
}

/// Input for adding a product to a recipe (or changing its quantity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeItemInput {
    pub product_id: Uuid,
    pub quantity_required: f64,
}

/// A recipe item row about to be inserted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipeItem {
    pub basket_type_id: Uuid,
    pub product_id: Uuid,
    pub quantity_required: f64,
}
