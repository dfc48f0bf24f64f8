//! Delivery HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{CustomDeliveryInput, DeliveryInput, DeliveryWithItems};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::DeliveryRecorder;
use crate::AppState;

/// Most recent deliveries first
pub async fn list_deliveries(State(state): State<AppState>) -> impl IntoResponse {
    let recorder = DeliveryRecorder::new(state.store);

    match recorder.list().await {
        Ok(deliveries) => {
            (StatusCode::OK, Json(serde_json::json!({ "deliveries": deliveries }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
) -> Result<Json<DeliveryWithItems>, AppError> {
    let recorder = DeliveryRecorder::new(state.store);
    Ok(Json(recorder.get(delivery_id).await?))
}

/// Record a delivery that consumes the basket recipe
pub async fn record_delivery(
    State(state): State<AppState>,
    Json(input): Json<DeliveryInput>,
) -> impl IntoResponse {
    let recorder = DeliveryRecorder::new(state.store);

    match recorder.record(input).await {
        Ok(delivery) => (StatusCode::CREATED, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a delivery with hand-picked quantities
pub async fn record_custom_delivery(
    State(state): State<AppState>,
    Json(input): Json<CustomDeliveryInput>,
) -> impl IntoResponse {
    let recorder = DeliveryRecorder::new(state.store);

    match recorder.record_custom(input).await {
        Ok(delivery) => (StatusCode::CREATED, Json(delivery)).into_response(),
        Err(e) => e.into_response(),
    }
}
