//! Beneficiary family models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A family receiving baskets, identified by its representative
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Family {
    pub id: Uuid,
    pub representative_name: String,
    pub representative_phone: String,
    pub is_church_member: bool,
    pub is_cell_member: bool,
    pub total_people: i32,
    pub adults: i32,
    pub children: i32,
    pub adolescents: i32,
    pub elderly: i32,
    pub cell_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Family {
    pub fn matches(&self, needle: &str) -> bool {
        crate::types::text_matches(&[&self.representative_name, &self.representative_phone], needle)
    }
}

/// Input for registering or replacing a family
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FamilyInput {
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub representative_name: String,
    #[validate(custom = "crate::validation::validate_phone")]
    pub representative_phone: String,
    #[serde(default)]
    pub is_church_member: bool,
    #[serde(default)]
    pub is_cell_member: bool,
    #[serde(default = "default_total_people")]
    #[validate(range(min = 1))]
    pub total_people: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub adults: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub children: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub adolescents: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub elderly: i32,
    pub cell_id: Option<Uuid>,
}

fn default_total_people() -> i32 {
    1
}

impl FamilyInput {
    pub fn normalized(self) -> Self {
        Self {
            representative_name: super::trimmed(&self.representative_name),
            representative_phone: super::trimmed(&self.representative_phone),
            ..self
        }
    }
}
