//! Authentication Middleware
//! Mission: Gate protected routes on verified tokens and role claims

use crate::auth::{
    jwt::TokenIssuer,
    models::{Claims, ADMINISTRATOR_ROLE},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Auth gate that validates the Bearer token on every protected request.
///
/// On success the verified `Claims` are inserted into request extensions for
/// downstream guards and handlers.
pub async fn auth_middleware(
    State(issuer): State<Arc<TokenIssuer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let claims = issuer
        .validate_token(token)
        .map_err(|_| AuthError::InvalidToken)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Role guard evaluated after `auth_middleware`: the verified claims must
/// contain `role`.
pub async fn require_role(
    role: &'static str,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AuthError::MissingToken)?;

    if !claims.has_role(role) {
        debug!(sub = %claims.sub, role, "Required role claim not present");
        return Err(AuthError::MissingRole(role));
    }

    Ok(next.run(req).await)
}

/// Guard for the Administrator-only probe.
pub async fn require_administrator(req: Request, next: Next) -> Result<Response, AuthError> {
    require_role(ADMINISTRATOR_ROLE, req, next).await
}

/// Auth gate error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    MissingRole(&'static str),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingToken => {
                (StatusCode::UNAUTHORIZED, "Missing authorization token").into_response()
            }
            AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response()
            }
            AuthError::MissingRole(role) => {
                (StatusCode::FORBIDDEN, format!("Requires role: {role}")).into_response()
            }
        }
    }
}
