//! cinemind-agent library interface
//!
//! Exposes the rating core, adapters, job registry and HTTP router for the
//! binary and for integration tests.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use cinemind_common::TomlConfig;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{JobRegistry, RatingComposer, ReviewAgent, ReviewAggregator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Review pipeline; absent when API keys are not configured
    pub agent: Option<Arc<ReviewAgent>>,
    /// Rating jobs polled by the UI
    pub jobs: JobRegistry,
    /// Rating core for `/api/rating/analyze` (no external services needed)
    pub aggregator: ReviewAggregator,
    pub composer: RatingComposer,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: &TomlConfig, agent: Option<ReviewAgent>) -> Self {
        Self {
            agent: agent.map(Arc::new),
            jobs: JobRegistry::new(config.jobs.retention_seconds),
            aggregator: services::review_agent::aggregator_from_config(config),
            composer: RatingComposer::new(),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Agent or 503 when external services are not configured
    pub fn require_agent(&self) -> ApiResult<Arc<ReviewAgent>> {
        self.agent.clone().ok_or_else(|| {
            ApiError::ServiceUnavailable(
                "TMDB and language model API keys are not configured".to_string(),
            )
        })
    }

    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI routes (HTML page and embedded assets)
        .merge(api::ui_routes())
        // API routes
        .merge(api::job_routes())
        .merge(api::review_routes())
        .merge(api::rating_routes())
        .merge(api::movie_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
