//! Business logic services for the Basket Stock server

pub mod auth;
pub mod basket;
pub mod dashboard;
pub mod delivery;
pub mod family;
pub mod organization;
pub mod product;
pub mod reporting;
pub mod stock;

pub use auth::AuthService;
pub use basket::BasketService;
pub use dashboard::DashboardService;
pub use delivery::DeliveryRecorder;
pub use family::FamilyService;
pub use organization::OrganizationService;
pub use product::ProductService;
pub use reporting::ReportingService;
pub use stock::StockLedger;

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{Filter, RowStore, Table};

/// Load a row by id or fail with `NotFound(label)`
pub(crate) async fn find_by_id<T: DeserializeOwned + Send>(
    store: &dyn RowStore,
    table: Table,
    id: Uuid,
    label: &str,
) -> AppResult<T> {
    store
        .fetch_one(table, &[Filter::id("id", id)])
        .await?
        .ok_or_else(|| AppError::NotFound(label.to_string()))
}

/// Delete a row by id or fail with `NotFound(label)`
pub(crate) async fn delete_by_id(
    store: &dyn RowStore,
    table: Table,
    id: Uuid,
    label: &str,
) -> AppResult<()> {
    let deleted = store.delete(table, &[Filter::id("id", id)]).await?;
    if deleted.is_empty() {
        return Err(AppError::NotFound(label.to_string()));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::store::{MemoryRowStore, RowStore};

    pub fn store() -> Arc<dyn RowStore> {
        Arc::new(MemoryRowStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Product, ProductInput};

    #[tokio::test]
    async fn test_find_and_delete_through_borrowed_store() {
        let store = test_support::store();
        let borrowed: &dyn RowStore = store.as_ref();
        let rice: Product = borrowed
            .insert_as(
                Table::Products,
                &ProductInput {
                    name: "Arroz".to_string(),
                    unit: Default::default(),
                },
            )
            .await
            .unwrap();

        let found: Product = find_by_id(borrowed, Table::Products, rice.id, "Product")
            .await
            .unwrap();
        assert_eq!(found.name, "Arroz");

        delete_by_id(borrowed, Table::Products, rice.id, "Product")
            .await
            .unwrap();
        let err = find_by_id::<Product>(borrowed, Table::Products, rice.id, "Product")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref label) if label == "Product"));
        assert!(matches!(
            delete_by_id(borrowed, Table::Products, rice.id, "Product").await,
            Err(AppError::NotFound(_))
        ));
    }
}
