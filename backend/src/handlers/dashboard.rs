//! Dashboard HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::services::dashboard::QuickCheckoutInput;
use crate::services::DashboardService;
use crate::AppState;

/// Active basket types with their availability summary
pub async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    let service = DashboardService::new(state.store);

    match service.overview().await {
        Ok(entries) => (StatusCode::OK, Json(serde_json::json!({ "baskets": entries }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Consume stock for baskets handed out without a delivery record
pub async fn quick_checkout(
    State(state): State<AppState>,
    Json(input): Json<QuickCheckoutInput>,
) -> impl IntoResponse {
    let service = DashboardService::new(state.store);

    match service.quick_checkout(input).await {
        Ok(movements) => {
            (StatusCode::CREATED, Json(serde_json::json!({ "movements": movements }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
