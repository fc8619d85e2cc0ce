//! Synchronous review generation
//!
//! POST /api/review, POST /api/review/batch

use axum::{extract::State, routing::post, Json, Router};

use crate::{
    error::ApiResult,
    models::{BatchReviewRequest, BatchReviewResponse, ReviewRequest, ReviewResponse},
    AppState,
};

/// POST /api/review
///
/// Runs the whole pipeline within the request.
pub async fn generate_review(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    let agent = state.require_agent()?;
    request.validate()?;

    match agent.generate_review(&request, None).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!(title = %request.title, error = %e, "Review generation failed");
            state.record_error(e.to_string()).await;
            Err(e.into())
        }
    }
}

/// POST /api/review/batch
pub async fn generate_batch(
    State(state): State<AppState>,
    Json(batch): Json<BatchReviewRequest>,
) -> ApiResult<Json<BatchReviewResponse>> {
    let agent = state.require_agent()?;
    batch.validate()?;

    tracing::info!(movies = batch.movies.len(), comparison = batch.comparison_mode, "Batch review");
    Ok(Json(agent.generate_batch(&batch).await))
}

/// Build review routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/review", post(generate_review))
        .route("/api/review/batch", post(generate_batch))
}
