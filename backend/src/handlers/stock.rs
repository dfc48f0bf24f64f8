//! Stock ledger HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::StockEntryInput;

use crate::services::StockLedger;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Current quantity of every product
pub async fn current_stock(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = StockLedger::new(state.store);

    match ledger.current_stock().await {
        Ok(stock) => (StatusCode::OK, Json(serde_json::json!({ "stock": stock }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a stock entry or adjustment
pub async fn create_stock_entry(
    State(state): State<AppState>,
    Json(input): Json<StockEntryInput>,
) -> impl IntoResponse {
    let ledger = StockLedger::new(state.store);

    match ledger.entry(input).await {
        Ok(movement) => (StatusCode::CREATED, Json(movement)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Most recent movements first
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let ledger = StockLedger::new(state.store);

    match ledger.history(query.limit).await {
        Ok(movements) => {
            (StatusCode::OK, Json(serde_json::json!({ "movements": movements }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
