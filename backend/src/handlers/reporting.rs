//! Reporting HTTP handlers

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppError;
use crate::services::reporting::{DeliveryReport, ReportFilter};
use crate::services::ReportingService;
use crate::AppState;

/// Deliveries in a date range with names resolved, plus totals
pub async fn delivery_report(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<DeliveryReport>, AppError> {
    let service = ReportingService::new(state.store);
    Ok(Json(service.delivery_report(&filter).await?))
}
