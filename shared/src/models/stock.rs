//! Stock snapshot and movement models

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::MovementKind;

/// Current on-hand quantity of a product.
///
/// At most one snapshot exists per product; a missing snapshot means zero.
/// The quantity may go negative, nothing guards against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockSnapshot {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Immutable audit-trail entry of a stock change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub qty_change: f64,
    pub movement_type: MovementKind,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A stock movement about to be appended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewStockMovement {
    pub product_id: Uuid,
    pub qty_change: f64,
    pub movement_type: MovementKind,
    pub reference: Option<String>,
}

/// Input for a manual stock entry or adjustment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntryInput {
    pub product_id: Uuid,
    pub quantity: f64,
    #[serde(default)]
    pub movement_type: MovementKind,
    pub reference: Option<String>,
}

/// Index snapshots by product for the availability engine
pub fn stock_map(snapshots: &[StockSnapshot]) -> HashMap<Uuid, f64> {
    snapshots
        .iter()
        .map(|s| (s.product_id, s.quantity))
        .collect()
}
