//! Church organisation: supervisors, cell leaders and cells

use std::sync::Arc;

use shared::{Cell, CellInput, CellLeader, CellLeaderInput, Supervisor, SupervisorInput};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::store::{Filter, OrderBy, RowStore, Table};

/// Organisation service
#[derive(Clone)]
pub struct OrganizationService {
    store: Arc<dyn RowStore>,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    async fn replace<T, P>(&self, table: Table, id: Uuid, patch: &P, label: &str) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned + Send,
        P: serde::Serialize + Sync,
    {
        let updated: Vec<T> = self
            .store
            .update_as(table, &[Filter::id("id", id)], patch)
            .await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(label.to_string()))
    }

    async fn ensure_exists(&self, table: Table, id: Option<Uuid>, label: &str) -> AppResult<()> {
        if let Some(id) = id {
            let _: serde_json::Value =
                super::find_by_id(self.store.as_ref(), table, id, label).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Supervisors
    // ========================================================================

    pub async fn list_supervisors(&self, search: Option<&str>) -> AppResult<Vec<Supervisor>> {
        let supervisors: Vec<Supervisor> = self
            .store
            .fetch_as(Table::Supervisors, &[], Some(OrderBy::asc("name")))
            .await?;
        Ok(match search {
            Some(needle) => supervisors.into_iter().filter(|s| s.matches(needle)).collect(),
            None => supervisors,
        })
    }

    pub async fn get_supervisor(&self, id: Uuid) -> AppResult<Supervisor> {
        super::find_by_id(self.store.as_ref(), Table::Supervisors, id, "Supervisor").await
    }

    pub async fn create_supervisor(&self, input: SupervisorInput) -> AppResult<Supervisor> {
        let input = input.normalized();
        input.validate()?;
        let supervisor: Supervisor = self.store.insert_as(Table::Supervisors, &input).await?;
        tracing::info!(supervisor_id = %supervisor.id, "Supervisor created");
        Ok(supervisor)
    }

    pub async fn update_supervisor(&self, id: Uuid, input: SupervisorInput) -> AppResult<Supervisor> {
        let input = input.normalized();
        input.validate()?;
        self.replace(Table::Supervisors, id, &input, "Supervisor").await
    }

    /// Leaders and cells pointing at the supervisor lose the link
    pub async fn delete_supervisor(&self, id: Uuid) -> AppResult<()> {
        super::delete_by_id(self.store.as_ref(), Table::Supervisors, id, "Supervisor").await
    }

    // ========================================================================
    // Cell leaders
    // ========================================================================

    /// Search matches name, phone or network
    pub async fn list_leaders(&self, search: Option<&str>) -> AppResult<Vec<CellLeader>> {
        let leaders: Vec<CellLeader> = self
            .store
            .fetch_as(Table::CellLeaders, &[], Some(OrderBy::asc("name")))
            .await?;
        Ok(match search {
            Some(needle) => leaders.into_iter().filter(|l| l.matches(needle)).collect(),
            None => leaders,
        })
    }

    pub async fn get_leader(&self, id: Uuid) -> AppResult<CellLeader> {
        super::find_by_id(self.store.as_ref(), Table::CellLeaders, id, "Leader").await
    }

    pub async fn create_leader(&self, input: CellLeaderInput) -> AppResult<CellLeader> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_exists(Table::Supervisors, input.supervisor_id, "Supervisor")
            .await?;
        let leader: CellLeader = self.store.insert_as(Table::CellLeaders, &input).await?;
        tracing::info!(leader_id = %leader.id, network = %leader.network_name, "Leader created");
        Ok(leader)
    }

    pub async fn update_leader(&self, id: Uuid, input: CellLeaderInput) -> AppResult<CellLeader> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_exists(Table::Supervisors, input.supervisor_id, "Supervisor")
            .await?;
        self.replace(Table::CellLeaders, id, &input, "Leader").await
    }

    /// Fails with a conflict once the leader has deliveries
    pub async fn delete_leader(&self, id: Uuid) -> AppResult<()> {
        super::delete_by_id(self.store.as_ref(), Table::CellLeaders, id, "Leader").await
    }

    // ========================================================================
    // Cells
    // ========================================================================

    pub async fn list_cells(&self) -> AppResult<Vec<Cell>> {
        Ok(self
            .store
            .fetch_as(Table::Cells, &[], Some(OrderBy::asc("cell_name")))
            .await?)
    }

    pub async fn get_cell(&self, id: Uuid) -> AppResult<Cell> {
        super::find_by_id(self.store.as_ref(), Table::Cells, id, "Cell").await
    }

    pub async fn create_cell(&self, input: CellInput) -> AppResult<Cell> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_exists(Table::CellLeaders, input.leader_id, "Leader").await?;
        self.ensure_exists(Table::Supervisors, input.supervisor_id, "Supervisor")
            .await?;
        let cell: Cell = self.store.insert_as(Table::Cells, &input).await?;
        tracing::info!(cell_id = %cell.id, name = %cell.cell_name, "Cell created");
        Ok(cell)
    }

    pub async fn update_cell(&self, id: Uuid, input: CellInput) -> AppResult<Cell> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_exists(Table::CellLeaders, input.leader_id, "Leader").await?;
        self.ensure_exists(Table::Supervisors, input.supervisor_id, "Supervisor")
            .await?;
        self.replace(Table::Cells, id, &input, "Cell").await
    }

    /// Families in the cell lose the link
    pub async fn delete_cell(&self, id: Uuid) -> AppResult<()> {
        super::delete_by_id(self.store.as_ref(), Table::Cells, id, "Cell").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;

    fn supervisor(name: &str, phone: &str) -> SupervisorInput {
        SupervisorInput {
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }

    #[tokio::test]
    async fn test_supervisor_phone_is_unique() {
        let service = OrganizationService::new(test_support::store());
        service
            .create_supervisor(supervisor("Ana", "11999990000"))
            .await
            .unwrap();
        let err = service
            .create_supervisor(supervisor("Bruno", " 11999990000 "))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Store(crate::store::StoreError::UniqueViolation(ref f)) if f == "phone"
        ));
    }

    #[tokio::test]
    async fn test_leader_search_and_unknown_supervisor() {
        let service = OrganizationService::new(test_support::store());
        let ana = service
            .create_supervisor(supervisor("Ana", "11999990000"))
            .await
            .unwrap();

        service
            .create_leader(CellLeaderInput {
                name: "Carlos".to_string(),
                phone: "11988887777".to_string(),
                network_name: "Rede Jovem".to_string(),
                supervisor_id: Some(ana.id),
            })
            .await
            .unwrap();
        service
            .create_leader(CellLeaderInput {
                name: "Daniela".to_string(),
                phone: "11977776666".to_string(),
                network_name: "Rede Casais".to_string(),
                supervisor_id: None,
            })
            .await
            .unwrap();

        let found = service.list_leaders(Some("jovem")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Carlos");
        assert_eq!(service.list_leaders(None).await.unwrap().len(), 2);

        let err = service
            .create_leader(CellLeaderInput {
                name: "Eduardo".to_string(),
                phone: "11966665555".to_string(),
                network_name: "Rede Jovem".to_string(),
                supervisor_id: Some(Uuid::new_v4()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_deleting_supervisor_unlinks_cells() {
        let service = OrganizationService::new(test_support::store());
        let ana = service
            .create_supervisor(supervisor("Ana", "11999990000"))
            .await
            .unwrap();
        let cell = service
            .create_cell(CellInput {
                cell_name: "Célula Esperança".to_string(),
                network_name: "Rede Jovem".to_string(),
                leader_id: None,
                supervisor_id: Some(ana.id),
            })
            .await
            .unwrap();

        service.delete_supervisor(ana.id).await.unwrap();
        assert_eq!(service.get_cell(cell.id).await.unwrap().supervisor_id, None);
    }
}
