//! Supervisor, leader and cell HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::{Cell, CellInput, CellLeader, CellLeaderInput, Supervisor, SupervisorInput};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::OrganizationService;
use crate::AppState;

/// `?search=` text filter
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

// ============================================================================
// Supervisors
// ============================================================================

pub async fn list_supervisors(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let service = OrganizationService::new(state.store);

    match service.list_supervisors(query.search.as_deref()).await {
        Ok(supervisors) => {
            (StatusCode::OK, Json(serde_json::json!({ "supervisors": supervisors }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_supervisor(
    State(state): State<AppState>,
    Path(supervisor_id): Path<Uuid>,
) -> Result<Json<Supervisor>, AppError> {
    let service = OrganizationService::new(state.store);
    Ok(Json(service.get_supervisor(supervisor_id).await?))
}

pub async fn create_supervisor(
    State(state): State<AppState>,
    Json(input): Json<SupervisorInput>,
) -> impl IntoResponse {
    let service = OrganizationService::new(state.store);

    match service.create_supervisor(input).await {
        Ok(supervisor) => (StatusCode::CREATED, Json(supervisor)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_supervisor(
    State(state): State<AppState>,
    Path(supervisor_id): Path<Uuid>,
    Json(input): Json<SupervisorInput>,
) -> Result<Json<Supervisor>, AppError> {
    let service = OrganizationService::new(state.store);
    Ok(Json(service.update_supervisor(supervisor_id, input).await?))
}

pub async fn delete_supervisor(
    State(state): State<AppState>,
    Path(supervisor_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = OrganizationService::new(state.store);
    service.delete_supervisor(supervisor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Cell leaders
// ============================================================================

pub async fn list_leaders(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let service = OrganizationService::new(state.store);

    match service.list_leaders(query.search.as_deref()).await {
        Ok(leaders) => (StatusCode::OK, Json(serde_json::json!({ "leaders": leaders }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_leader(
    State(state): State<AppState>,
    Path(leader_id): Path<Uuid>,
) -> Result<Json<CellLeader>, AppError> {
    let service = OrganizationService::new(state.store);
    Ok(Json(service.get_leader(leader_id).await?))
}

pub async fn create_leader(
    State(state): State<AppState>,
    Json(input): Json<CellLeaderInput>,
) -> impl IntoResponse {
    let service = OrganizationService::new(state.store);

    match service.create_leader(input).await {
        Ok(leader) => (StatusCode::CREATED, Json(leader)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_leader(
    State(state): State<AppState>,
    Path(leader_id): Path<Uuid>,
    Json(input): Json<CellLeaderInput>,
) -> Result<Json<CellLeader>, AppError> {
    let service = OrganizationService::new(state.store);
    Ok(Json(service.update_leader(leader_id, input).await?))
}

pub async fn delete_leader(
    State(state): State<AppState>,
    Path(leader_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = OrganizationService::new(state.store);
    service.delete_leader(leader_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Cells
// ============================================================================

pub async fn list_cells(State(state): State<AppState>) -> impl IntoResponse {
    let service = OrganizationService::new(state.store);

    match service.list_cells().await {
        Ok(cells) => (StatusCode::OK, Json(serde_json::json!({ "cells": cells }))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_cell(
    State(state): State<AppState>,
    Path(cell_id): Path<Uuid>,
) -> Result<Json<Cell>, AppError> {
    let service = OrganizationService::new(state.store);
    Ok(Json(service.get_cell(cell_id).await?))
}

pub async fn create_cell(
    State(state): State<AppState>,
    Json(input): Json<CellInput>,
) -> impl IntoResponse {
    let service = OrganizationService::new(state.store);

    match service.create_cell(input).await {
        Ok(cell) => (StatusCode::CREATED, Json(cell)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_cell(
    State(state): State<AppState>,
    Path(cell_id): Path<Uuid>,
    Json(input): Json<CellInput>,
) -> Result<Json<Cell>, AppError> {
    let service = OrganizationService::new(state.store);
    Ok(Json(service.update_cell(cell_id, input).await?))
}

pub async fn delete_cell(
    State(state): State<AppState>,
    Path(cell_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = OrganizationService::new(state.store);
    service.delete_cell(cell_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
