//! Authentication middleware
//!
//! Session token check in front of every protected route

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::error::{ErrorDetail, ErrorResponse};
use crate::services::auth::AuthSession;
use crate::services::AuthService;
use crate::AppState;

/// Validates the bearer token and inserts an [`AuthSession`] into request
/// extensions. With no PIN configured every request gets an open session.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let service = AuthService::new(&state.config.auth);

    let session = if !service.pin_required() {
        AuthSession::open()
    } else {
        let Some(TypedHeader(Authorization(bearer))) = bearer else {
            return unauthorized_response("Missing or invalid Authorization header");
        };
        match service.validate_token(bearer.token()) {
            Ok(session) => session,
            Err(e) => return e.into_response(),
        }
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message_en: message.to_string(),
            message_pt: "Informe o PIN para continuar".to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for the session established by [`auth_middleware`]
#[derive(Clone, Debug)]
pub struct CurrentSession(pub AuthSession);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| unauthorized_response("Authentication required"))
    }
}
