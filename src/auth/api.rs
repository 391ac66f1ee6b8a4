//! Authentication API Endpoints
//! Mission: Credential login plus token-gated probes

use crate::auth::{
    jwt::TokenIssuer,
    models::{LoginRequest, LoginResponse, UserResponse},
    user_store::CredentialStore,
};
use crate::config::AppConfig;
use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub store: Arc<dyn CredentialStore>,
    pub issuer: Arc<TokenIssuer>,
    /// When set, 500 responses carry the underlying error message. Meant for
    /// non-production environments only.
    pub expose_error_detail: bool,
}

impl AuthState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        issuer: Arc<TokenIssuer>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            issuer,
            expose_error_detail: config.expose_error_detail,
        }
    }
}

/// Authenticate endpoint - POST /api/auth/authenticate
pub async fn authenticate(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("🔐 Authentication attempt: {}", payload.username);

    match try_authenticate(&state, &payload) {
        Ok(Some(response)) => {
            info!("✅ Authentication successful: {}", response.user.username);
            Ok(Json(response))
        }
        Ok(None) => {
            // Unknown username and wrong password collapse into one outcome
            // so callers cannot probe which check failed.
            warn!("❌ Failed authentication attempt: {}", payload.username);
            Err(AuthApiError::Unauthorized)
        }
        Err(e) => {
            error!("Authentication error: {e:#}");
            let message = if state.expose_error_detail {
                format!("{e:#}")
            } else {
                "internal server error".to_string()
            };
            Err(AuthApiError::Internal { message })
        }
    }
}

fn try_authenticate(state: &AuthState, payload: &LoginRequest) -> Result<Option<LoginResponse>> {
    let Some(mut user) = state.store.find_user_by_username(&payload.username)? else {
        return Ok(None);
    };

    if !state
        .store
        .verify_password(&payload.username, &payload.password)?
    {
        return Ok(None);
    }

    // Memberships as of this moment; later role changes do not affect the
    // issued token.
    user.roles = state.store.roles_of(&user.id)?;

    let now = Utc::now();
    let expires_at = now + Duration::minutes(state.issuer.settings().lifetime_minutes);
    let token = state
        .issuer
        .issue_token(&user.username, &user.email, &user.roles, now, expires_at)?;

    Ok(Some(LoginResponse {
        user: UserResponse::from_user(&user),
        token,
    }))
}

/// Probe - GET /api/auth/isAuthenticated
///
/// Reachable only through the auth gate; arriving here means the presented
/// token was valid.
pub async fn is_authenticated() -> StatusCode {
    StatusCode::OK
}

/// Probe - GET /api/auth/isAdministrator
///
/// Gated by the Administrator role guard in addition to the auth gate.
pub async fn is_administrator() -> StatusCode {
    StatusCode::OK
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    /// Bad credentials. 401 with an empty body.
    Unauthorized,
    Internal { message: String },
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        match self {
            AuthApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            AuthApiError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": message })),
            )
                .into_response(),
        }
    }
}
