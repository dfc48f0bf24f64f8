//! Beneficiary families

use std::sync::Arc;

use shared::{Cell, Family, FamilyInput};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{Filter, OrderBy, RowStore, Table};

/// Family registry service
#[derive(Clone)]
pub struct FamilyService {
    store: Arc<dyn RowStore>,
}

impl FamilyService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Families ordered by representative; search matches name or phone
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Family>> {
        let families: Vec<Family> = self
            .store
            .fetch_as(Table::Families, &[], Some(OrderBy::asc("representative_name")))
            .await?;
        Ok(match search {
            Some(needle) => families.into_iter().filter(|f| f.matches(needle)).collect(),
            None => families,
        })
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Family> {
        super::find_by_id(self.store.as_ref(), Table::Families, id, "Family").await
    }

    pub async fn create(&self, input: FamilyInput) -> AppResult<Family> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_cell(input.cell_id).await?;

        let family: Family = self.store.insert_as(Table::Families, &input).await?;
        tracing::info!(family_id = %family.id, people = family.total_people, "Family registered");
        Ok(family)
    }

    pub async fn update(&self, id: Uuid, input: FamilyInput) -> AppResult<Family> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_cell(input.cell_id).await?;

        let updated: Vec<Family> = self
            .store
            .update_as(Table::Families, &[Filter::id("id", id)], &input)
            .await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Family".to_string()))
    }

    /// Fails with a conflict once the family has deliveries
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        super::delete_by_id(self.store.as_ref(), Table::Families, id, "Family").await
    }

    async fn ensure_cell(&self, cell_id: Option<Uuid>) -> AppResult<()> {
        if let Some(id) = cell_id {
            let _: Cell = super::find_by_id(self.store.as_ref(), Table::Cells, id, "Cell").await?;
        }
        Ok(())
    }
}
