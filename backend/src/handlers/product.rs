//! Product catalog HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::ProductInput;
use uuid::Uuid;

use crate::services::ProductService;
use crate::AppState;

/// List products ordered by name
pub async fn list_products(State(state): State<AppState>) -> impl IntoResponse {
    let service = ProductService::new(state.store);

    match service.list().await {
        Ok(products) => (StatusCode::OK, Json(serde_json::json!({ "products": products }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductService::new(state.store);

    match service.get(product_id).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a product with an empty stock snapshot
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> impl IntoResponse {
    let service = ProductService::new(state.store);

    match service.create(input).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> impl IntoResponse {
    let service = ProductService::new(state.store);

    match service.update(product_id, input).await {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductService::new(state.store);

    match service.delete(product_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
