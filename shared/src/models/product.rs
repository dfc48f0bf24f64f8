//! Product catalog models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::types::MeasureUnit;

/// A product that can be stocked and put into baskets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub unit: MeasureUnit,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(custom = "crate::validation::validate_not_blank", length(max = 200))]
    pub name: String,
    #[serde(default)]
    pub unit: MeasureUnit,
}

impl ProductInput {
    pub fn normalized(self) -> Self {
        Self {
            name: super::trimmed(&self.name),
            unit: self.unit,
        }
    }
}
