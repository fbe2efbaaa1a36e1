// src/middleware.rs

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::auth::{self, Claims};
use crate::models::Employee;
use crate::service::IntegrationService;

/// Состояние приложения
pub type AppState = Arc<IntegrationService>;

#[derive(Debug)]
pub enum AuthError {
    NoToken,
    InvalidToken,
    Forbidden,
    DecodeError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::NoToken => (StatusCode::UNAUTHORIZED, "Missing token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Admin rights required"),
            AuthError::DecodeError => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to decode token"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Извлечение `Claims` из заголовка Authorization
#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        let token = auth_header.ok_or(AuthError::NoToken)?;

        match auth::validate_token(token) {
            Ok(claims) => Ok(claims),
            Err(_) => Err(AuthError::InvalidToken),
        }
    }
}

/// Карточка сотрудника по токену
pub async fn current_employee(
    claims: &Claims,
    service: &IntegrationService,
) -> Result<Employee, AuthError> {
    let id = uuid::Uuid::parse_str(&claims.sub).map_err(|_| AuthError::DecodeError)?;
    service
        .employees()
        .get_employee(id)
        .await
        .map_err(|_| AuthError::InvalidToken)?
        .ok_or(AuthError::InvalidToken)
}

/// Переносы и синхронизация — только для админов
pub async fn require_admin(
    claims: &Claims,
    service: &IntegrationService,
) -> Result<Employee, AuthError> {
    let employee = current_employee(claims, service).await?;
    if !employee.is_admin {
        return Err(AuthError::Forbidden);
    }
    Ok(employee)
}
