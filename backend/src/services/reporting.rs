//! Delivery report
//!
//! Joins every delivery with its family, leader, basket type, the family's
//! cell and a supervisor, then filters in memory.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{BasketType, Cell, CellLeader, DateRange, Delivery, Family, Supervisor, NO_PRODUCT};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{OrderBy, RowStore, Table};

/// Default report window in days
pub const DEFAULT_REPORT_DAYS: i64 = 30;

/// Placeholder for a missing reference
const MISSING: &str = NO_PRODUCT;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn RowStore>,
}

/// Report filter parameters. Text filters are exact matches.
#[derive(Debug, Default, Deserialize)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub cell_network: Option<String>,
    pub leader: Option<String>,
    pub basket: Option<String>,
    pub cell: Option<String>,
    pub supervisor: Option<String>,
}

/// One delivery with its references resolved to names
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReportRow {
    pub delivery_id: Uuid,
    pub delivered_at: DateTime<Utc>,
    pub representative_name: String,
    pub representative_phone: String,
    pub cell_name: String,
    pub cell_network: String,
    pub supervisor_name: String,
    pub supervisor_phone: String,
    pub leader_name: String,
    pub leader_phone: String,
    pub leader_network: String,
    pub basket_name: String,
    pub quantity: i32,
    pub is_custom: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub deliveries: usize,
    pub total_baskets: i64,
    /// Distinct representative phones
    pub families: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryReport {
    pub range: DateRange,
    pub rows: Vec<DeliveryReportRow>,
    pub summary: ReportSummary,
}

fn by_id<T>(rows: Vec<T>, id: impl Fn(&T) -> Uuid) -> HashMap<Uuid, T> {
    rows.into_iter().map(|r| (id(&r), r)).collect()
}

fn or_missing(value: Option<&String>) -> String {
    value.cloned().unwrap_or_else(|| MISSING.to_string())
}

fn matches_exact(filter: &Option<String>, value: &str) -> bool {
    match filter.as_deref().map(str::trim) {
        Some(wanted) if !wanted.is_empty() => wanted == value,
        _ => true,
    }
}

impl ReportFilter {
    /// Requested range, defaulting to the last 30 days up to `today`
    pub fn range(&self, today: NaiveDate) -> AppResult<DateRange> {
        let default = DateRange::last_days(today, DEFAULT_REPORT_DAYS);
        let range = DateRange {
            start: self.start_date.unwrap_or(default.start),
            end: self.end_date.unwrap_or(default.end),
        };
        if range.start > range.end {
            return Err(AppError::validation(
                "start_date",
                "Start date must not be after end date",
                "A data inicial não pode ser posterior à data final",
            ));
        }
        Ok(range)
    }

    fn accepts(&self, row: &DeliveryReportRow) -> bool {
        matches_exact(&self.cell_network, &row.cell_network)
            && matches_exact(&self.leader, &row.leader_name)
            && matches_exact(&self.basket, &row.basket_name)
            && matches_exact(&self.cell, &row.cell_name)
            && matches_exact(&self.supervisor, &row.supervisor_name)
    }
}

impl ReportSummary {
    pub fn from_rows(rows: &[DeliveryReportRow]) -> Self {
        let phones: HashSet<&str> = rows
            .iter()
            .map(|r| r.representative_phone.as_str())
            .filter(|p| *p != MISSING)
            .collect();
        Self {
            deliveries: rows.len(),
            total_baskets: rows.iter().map(|r| i64::from(r.quantity)).sum(),
            families: phones.len(),
        }
    }
}

impl ReportingService {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    pub async fn delivery_report(&self, filter: &ReportFilter) -> AppResult<DeliveryReport> {
        let range = filter.range(Utc::now().date_naive())?;

        let deliveries: Vec<Delivery> = self
            .store
            .fetch_as(Table::Deliveries, &[], Some(OrderBy::desc("delivered_at")))
            .await?;
        let families = by_id(self.store.fetch_as::<Family>(Table::Families, &[], None).await?, |f| f.id);
        let leaders = by_id(
            self.store.fetch_as::<CellLeader>(Table::CellLeaders, &[], None).await?,
            |l| l.id,
        );
        let baskets = by_id(
            self.store.fetch_as::<BasketType>(Table::BasketTypes, &[], None).await?,
            |b| b.id,
        );
        let cells = by_id(self.store.fetch_as::<Cell>(Table::Cells, &[], None).await?, |c| c.id);
        let supervisors = by_id(
            self.store.fetch_as::<Supervisor>(Table::Supervisors, &[], None).await?,
            |s| s.id,
        );

        let mut rows: Vec<DeliveryReportRow> = deliveries
            .into_iter()
            .filter(|d| range.contains(d.delivered_at.date_naive()))
            .map(|d| {
                let family = families.get(&d.family_id);
                let leader = leaders.get(&d.leader_id);
                let cell = family.and_then(|f| f.cell_id).and_then(|id| cells.get(&id));
                let supervisor = cell
                    .and_then(|c| c.supervisor_id)
                    .or_else(|| leader.and_then(|l| l.supervisor_id))
                    .and_then(|id| supervisors.get(&id));

                DeliveryReportRow {
                    delivery_id: d.id,
                    delivered_at: d.delivered_at,
                    representative_name: or_missing(family.map(|f| &f.representative_name)),
                    representative_phone: or_missing(family.map(|f| &f.representative_phone)),
                    cell_name: or_missing(cell.map(|c| &c.cell_name)),
                    cell_network: or_missing(cell.map(|c| &c.network_name)),
                    supervisor_name: or_missing(supervisor.map(|s| &s.name)),
                    supervisor_phone: or_missing(supervisor.map(|s| &s.phone)),
                    leader_name: or_missing(leader.map(|l| &l.name)),
                    leader_phone: or_missing(leader.map(|l| &l.phone)),
                    leader_network: or_missing(leader.map(|l| &l.network_name)),
                    basket_name: or_missing(baskets.get(&d.basket_type_id).map(|b| &b.name)),
                    quantity: d.quantity,
                    is_custom: d.is_custom,
                }
            })
            .filter(|row| filter.accepts(row))
            .collect();
        rows.sort_by(|a, b| b.delivered_at.cmp(&a.delivered_at));

        let summary = ReportSummary::from_rows(&rows);
        tracing::debug!(rows = rows.len(), start = %range.start, end = %range.end, "Delivery report built");
        Ok(DeliveryReport {
            range,
            rows,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        test_support, BasketService, DeliveryRecorder, FamilyService, OrganizationService,
    };
    use shared::{
        BasketTypeInput, CellInput, CellLeaderInput, DeliveryInput, FamilyInput, SupervisorInput,
    };

    struct Seeded {
        store: Arc<dyn RowStore>,
        cell_family: Uuid,
        loose_family: Uuid,
        leader: Uuid,
        basket: Uuid,
    }

    fn family(name: &str, phone: &str, cell_id: Option<Uuid>) -> FamilyInput {
        FamilyInput {
            representative_name: name.to_string(),
            representative_phone: phone.to_string(),
            is_church_member: false,
            is_cell_member: cell_id.is_some(),
            total_people: 2,
            adults: 2,
            children: 0,
            adolescents: 0,
            elderly: 0,
            cell_id,
        }
    }

    async fn seed() -> Seeded {
        let store = test_support::store();
        let org = OrganizationService::new(store.clone());
        let ana = org
            .create_supervisor(SupervisorInput {
                name: "Ana".to_string(),
                phone: "11999990000".to_string(),
            })
            .await
            .unwrap();
        let bia = org
            .create_supervisor(SupervisorInput {
                name: "Bia".to_string(),
                phone: "11999991111".to_string(),
            })
            .await
            .unwrap();
        let leader = org
            .create_leader(CellLeaderInput {
                name: "Carlos".to_string(),
                phone: "11988887777".to_string(),
                network_name: "Rede Jovem".to_string(),
                supervisor_id: Some(bia.id),
            })
            .await
            .unwrap();
        let cell = org
            .create_cell(CellInput {
                cell_name: "Célula Esperança".to_string(),
                network_name: "Rede Jovem".to_string(),
                leader_id: Some(leader.id),
                supervisor_id: Some(ana.id),
            })
            .await
            .unwrap();

        let families = FamilyService::new(store.clone());
        let cell_family = families
            .create(family("Maria", "11911110000", Some(cell.id)))
            .await
            .unwrap();
        let loose_family = families
            .create(family("José", "11922220000", None))
            .await
            .unwrap();

        let basket = BasketService::new(store.clone())
            .create(BasketTypeInput {
                name: "Cesta Adulto".to_string(),
                description: None,
                is_active: true,
            })
            .await
            .unwrap();

        Seeded {
            store,
            cell_family: cell_family.id,
            loose_family: loose_family.id,
            leader: leader.id,
            basket: basket.id,
        }
    }

    async fn deliver(s: &Seeded, family_id: Uuid, quantity: i32) {
        DeliveryRecorder::new(s.store.clone())
            .record(DeliveryInput {
                family_id,
                leader_id: s.leader,
                basket_type_id: s.basket,
                quantity,
                notes: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_report_resolves_names_and_summarises() {
        let s = seed().await;
        deliver(&s, s.cell_family, 2).await;
        deliver(&s, s.loose_family, 1).await;
        deliver(&s, s.cell_family, 1).await;

        let report = ReportingService::new(s.store.clone())
            .delivery_report(&ReportFilter::default())
            .await
            .unwrap();

        assert_eq!(
            report.summary,
            ReportSummary {
                deliveries: 3,
                total_baskets: 4,
                families: 2,
            }
        );
        assert!(report
            .rows
            .windows(2)
            .all(|w| w[0].delivered_at >= w[1].delivered_at));

        let in_cell = report
            .rows
            .iter()
            .find(|r| r.representative_name == "Maria")
            .unwrap();
        assert_eq!(in_cell.cell_name, "Célula Esperança");
        assert_eq!(in_cell.supervisor_name, "Ana");

        // Without a cell the leader's supervisor is used
        let loose = report
            .rows
            .iter()
            .find(|r| r.representative_name == "José")
            .unwrap();
        assert_eq!(loose.cell_name, MISSING);
        assert_eq!(loose.supervisor_name, "Bia");
        assert_eq!(loose.basket_name, "Cesta Adulto");
    }

    #[tokio::test]
    async fn test_exact_filters() {
        let s = seed().await;
        deliver(&s, s.cell_family, 1).await;
        deliver(&s, s.loose_family, 1).await;
        let service = ReportingService::new(s.store.clone());

        let filter = ReportFilter {
            cell: Some("Célula Esperança".to_string()),
            ..Default::default()
        };
        let report = service.delivery_report(&filter).await.unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].representative_name, "Maria");

        let filter = ReportFilter {
            supervisor: Some("Ana".to_string()),
            leader: Some("Carl".to_string()),
            ..Default::default()
        };
        assert!(service.delivery_report(&filter).await.unwrap().rows.is_empty());
    }

    #[tokio::test]
    async fn test_range_outside_window_is_empty() {
        let s = seed().await;
        deliver(&s, s.cell_family, 1).await;

        let filter = ReportFilter {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2020, 1, 31),
            ..Default::default()
        };
        let report = ReportingService::new(s.store.clone())
            .delivery_report(&filter)
            .await
            .unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(report.summary, ReportSummary::default());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let filter = ReportFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(matches!(
            filter.range(today),
            Err(AppError::Validation { ref field, .. }) if field == "start_date"
        ));
    }

    #[test]
    fn test_default_range_is_last_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = ReportFilter::default().range(today).unwrap();
        assert_eq!(range.end, today);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }
}
