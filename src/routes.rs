//! API router assembly.
//!
//! Public surface: health check and the authenticate endpoint. Everything
//! else sits behind the token gate, with the administrator probe additionally
//! behind the role guard.

use crate::auth::{api as auth_api, auth_middleware, require_administrator, AuthState};
use crate::middleware::request_logging;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

/// Create the application router.
pub fn create_router(state: AuthState) -> Router {
    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/authenticate", post(auth_api::authenticate))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/api/auth/isAuthenticated", get(auth_api::is_authenticated))
        .route(
            "/api/auth/isAdministrator",
            get(auth_api::is_administrator).route_layer(middleware::from_fn(require_administrator)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.issuer.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let app = Router::new().route("/health", get(health_check));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }
}
