//! Delivery planning
//!
//! Turns a recipe (or a caller-supplied override) into the per-product
//! quantities a delivery removes from stock.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::availability::RecipeLine;

/// Quantity of one product removed from stock
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DeliveryLine {
    pub product_id: Uuid,
    pub quantity: f64,
}

/// Lines for `baskets` baskets of a recipe: one per recipe item, in recipe order
pub fn plan_recipe_delivery(recipe: &[RecipeLine], baskets: i32) -> Vec<DeliveryLine> {
    recipe
        .iter()
        .map(|line| DeliveryLine {
            product_id: line.product_id,
            quantity: line.required * f64::from(baskets),
        })
        .collect()
}

/// Lines for a custom delivery.
///
/// Entries are a product to quantity mapping: a repeated product keeps its
/// first position and its last quantity. Quantities of zero or less are
/// dropped.
pub fn plan_custom_delivery(entries: &[DeliveryLine]) -> Vec<DeliveryLine> {
    let mut merged: Vec<DeliveryLine> = Vec::with_capacity(entries.len());
    for entry in entries {
        match merged.iter_mut().find(|l| l.product_id == entry.product_id) {
            Some(existing) => existing.quantity = entry.quantity,
            None => merged.push(*entry),
        }
    }
    merged.retain(|l| l.quantity > 0.0);
    merged
}
