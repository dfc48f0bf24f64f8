//! Authentication handlers

use axum::{extract::State, Json};

use crate::error::AppError;
use crate::middleware::CurrentSession;
use crate::services::auth::{AuthSession, LoginInput, SessionToken};
use crate::services::AuthService;
use crate::AppState;

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<Json<SessionToken>, AppError> {
    let auth_service = AuthService::new(&state.config.auth);
    Ok(Json(auth_service.login(&body)?))
}

/// Current session
pub async fn session(CurrentSession(session): CurrentSession) -> Json<AuthSession> {
    Json(session)
}
