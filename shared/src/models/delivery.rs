//! Delivery models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::delivery::DeliveryLine;

/// Baskets given to a family via a leader. Write-once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delivery {
    pub id: Uuid,
    pub family_id: Uuid,
    pub leader_id: Uuid,
    pub basket_type_id: Uuid,
    pub quantity: i32,
    /// Partial or custom delivery whose items override the recipe
    pub is_custom: bool,
    pub notes: Option<String>,
    pub delivered_at: DateTime<Utc>,
}

/// A delivery row about to be inserted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDelivery {
    pub family_id: Uuid,
    pub leader_id: Uuid,
    pub basket_type_id: Uuid,
    pub quantity: i32,
    pub is_custom: bool,
    pub notes: Option<String>,
}

/// Concrete per-product quantity removed from stock for a delivery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryItem {
    pub id: Uuid,
    pub delivery_id: Uuid,
    pub product_id: Uuid,
    pub qty_delivered: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDeliveryItem {
    pub delivery_id: Uuid,
    pub product_id: Uuid,
    pub qty_delivered: f64,
}

/// Input for a recipe-driven delivery
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeliveryInput {
    pub family_id: Uuid,
    pub leader_id: Uuid,
    pub basket_type_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Input for a delivery whose items override the recipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomDeliveryInput {
    pub family_id: Uuid,
    pub leader_id: Uuid,
    pub basket_type_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub notes: Option<String>,
    pub items: Vec<DeliveryLine>,
}

/// A delivery together with the items it removed from stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryWithItems {
    #[serde(flatten)]
    pub delivery: Delivery,
    pub items: Vec<DeliveryItem>,
}
