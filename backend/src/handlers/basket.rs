//! Basket type, recipe and availability HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{BasketSummary, BasketTypeInput, Mountable, RecipeItemInput};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::basket::AnalysisView;
use crate::services::BasketService;
use crate::AppState;

/// List basket types ordered by name
pub async fn list_basket_types(State(state): State<AppState>) -> impl IntoResponse {
    let service = BasketService::new(state.store);

    match service.list().await {
        Ok(baskets) => {
            (StatusCode::OK, Json(serde_json::json!({ "basket_types": baskets }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_basket_type(
    State(state): State<AppState>,
    Path(basket_type_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BasketService::new(state.store);

    match service.get(basket_type_id).await {
        Ok(basket) => (StatusCode::OK, Json(basket)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_basket_type(
    State(state): State<AppState>,
    Json(input): Json<BasketTypeInput>,
) -> impl IntoResponse {
    let service = BasketService::new(state.store);

    match service.create(input).await {
        Ok(basket) => (StatusCode::CREATED, Json(basket)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_basket_type(
    State(state): State<AppState>,
    Path(basket_type_id): Path<Uuid>,
    Json(input): Json<BasketTypeInput>,
) -> impl IntoResponse {
    let service = BasketService::new(state.store);

    match service.update(basket_type_id, input).await {
        Ok(basket) => (StatusCode::OK, Json(basket)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_basket_type(
    State(state): State<AppState>,
    Path(basket_type_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BasketService::new(state.store);

    match service.delete(basket_type_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Recipe items with product names
pub async fn list_recipe_items(
    State(state): State<AppState>,
    Path(basket_type_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = BasketService::new(state.store);

    match service.recipe_items(basket_type_id).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Add a product to the recipe, or change its required quantity
pub async fn upsert_recipe_item(
    State(state): State<AppState>,
    Path(basket_type_id): Path<Uuid>,
    Json(input): Json<RecipeItemInput>,
) -> impl IntoResponse {
    let service = BasketService::new(state.store);

    match service.upsert_item(basket_type_id, input).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn remove_recipe_item(
    State(state): State<AppState>,
    Path((basket_type_id, item_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = BasketService::new(state.store);

    match service.remove_item(basket_type_id, item_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn analyze_basket(
    State(state): State<AppState>,
    Path(basket_type_id): Path<Uuid>,
) -> Result<Json<AnalysisView>, AppError> {
    let service = BasketService::new(state.store);
    Ok(Json(service.analyze_basket(basket_type_id).await?))
}

pub async fn basket_summary(
    State(state): State<AppState>,
    Path(basket_type_id): Path<Uuid>,
) -> Result<Json<BasketSummary>, AppError> {
    let service = BasketService::new(state.store);
    service.get(basket_type_id).await?;
    Ok(Json(service.basket_summary(basket_type_id).await?))
}

pub async fn mountable_baskets(
    State(state): State<AppState>,
    Path(basket_type_id): Path<Uuid>,
) -> Result<Json<Mountable>, AppError> {
    let service = BasketService::new(state.store);
    service.get(basket_type_id).await?;
    Ok(Json(service.compute_mountable_for_basket(basket_type_id).await?))
}
