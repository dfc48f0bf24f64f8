//! Church organisation models: supervisors, cell leaders and cells

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{trimmed, trimmed_opt};

/// Supervisor of leaders and cells
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supervisor {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SupervisorInput {
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub name: String,
    #[validate(custom = "crate::validation::validate_phone")]
    pub phone: String,
}

impl SupervisorInput {
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(&self.name),
            phone: trimmed(&self.phone),
        }
    }
}

/// Leader of a cell; requests deliveries for families
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellLeader {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub network_name: String,
    pub supervisor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CellLeaderInput {
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub name: String,
    #[validate(custom = "crate::validation::validate_phone")]
    pub phone: String,
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub network_name: String,
    pub supervisor_id: Option<Uuid>,
}

impl CellLeaderInput {
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(&self.name),
            phone: trimmed(&self.phone),
            network_name: trimmed(&self.network_name),
            supervisor_id: self.supervisor_id,
        }
    }
}

impl CellLeader {
    pub fn matches(&self, needle: &str) -> bool {
        crate::types::text_matches(&[&self.name, &self.phone, &self.network_name], needle)
    }
}

impl Supervisor {
    pub fn matches(&self, needle: &str) -> bool {
        crate::types::text_matches(&[&self.name, &self.phone], needle)
    }
}

/// A church cell (small group)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    pub id: Uuid,
    pub cell_name: String,
    pub network_name: String,
    pub leader_id: Option<Uuid>,
    pub supervisor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CellInput {
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub cell_name: String,
    #[validate(custom = "crate::validation::validate_not_blank")]
    pub network_name: String,
    pub leader_id: Option<Uuid>,
    pub supervisor_id: Option<Uuid>,
}

impl CellInput {
    pub fn normalized(self) -> Self {
        Self {
            cell_name: trimmed(&self.cell_name),
            network_name: trimmed(&self.network_name),
            leader_id: self.leader_id,
            supervisor_id: self.supervisor_id,
        }
    }
}

/// Optional free-text note, trimmed
pub fn normalize_note(note: Option<String>) -> Option<String> {
    trimmed_opt(note)
}
