//! Family registry HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{Family, FamilyInput};
use uuid::Uuid;

use super::organization::SearchQuery;
use crate::error::AppError;
use crate::services::FamilyService;
use crate::AppState;

pub async fn list_families(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let service = FamilyService::new(state.store);

    match service.list(query.search.as_deref()).await {
        Ok(families) => (StatusCode::OK, Json(serde_json::json!({ "families": families }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_family(
    State(state): State<AppState>,
    Path(family_id): Path<Uuid>,
) -> Result<Json<Family>, AppError> {
    let service = FamilyService::new(state.store);
    Ok(Json(service.get(family_id).await?))
}

pub async fn create_family(
    State(state): State<AppState>,
    Json(input): Json<FamilyInput>,
) -> impl IntoResponse {
    let service = FamilyService::new(state.store);

    match service.create(input).await {
        Ok(family) => (StatusCode::CREATED, Json(family)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_family(
    State(state): State<AppState>,
    Path(family_id): Path<Uuid>,
    Json(input): Json<FamilyInput>,
) -> Result<Json<Family>, AppError> {
    let service = FamilyService::new(state.store);
    Ok(Json(service.update(family_id, input).await?))
}

pub async fn delete_family(
    State(state): State<AppState>,
    Path(family_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = FamilyService::new(state.store);
    service.delete(family_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
