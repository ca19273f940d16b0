//! HTTP API layer.
//!
//! REST surface over Axum. All versioned routes live under `/api/v1/`;
//! health and metrics are unversioned. Handlers return
//! `Result<impl IntoResponse, QuillError>` so errors convert to the
//! standard response envelope automatically.

mod handlers;
pub mod v1;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::ai::AiClient;
use crate::auth::TokenService;
use crate::db::Database;
use crate::engagement::EngagementOrchestrator;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub engagement: EngagementOrchestrator,
    pub tokens: Arc<TokenService>,
    pub ai: Arc<AiClient>,
}

impl AppState {
    pub fn new(db: Arc<Database>, tokens: TokenService, ai: AiClient) -> Self {
        Self {
            engagement: EngagementOrchestrator::new(db.clone()),
            db,
            tokens: Arc::new(tokens),
            ai: Arc::new(ai),
        }
    }
}

/// Build the API router.
///
/// - Health check endpoint (unversioned)
/// - Prometheus metrics endpoint (unversioned)
/// - V1 API routes under `/api/v1/`
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::prometheus_metrics))
        .nest("/api/v1", v1::routes::v1_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// API response wrapper.
#[derive(Debug, serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_code: None,
        }
    }

    pub fn error_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_code: Some(code.into()),
        }
    }
}
