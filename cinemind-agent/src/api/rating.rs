//! POST /api/rating/analyze
//!
//! Runs the rating core over posted reviews. Needs no external service.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiResult,
    models::{AggregateRatingResult, Review},
    services::{review_agent::rate_with, ReviewExemplar},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub rating: AggregateRatingResult,
    /// Reviews posted, including empty ones
    pub total_reviews: usize,
    pub keywords: Vec<String>,
    /// Per-review scores in input order (empty reviews skipped)
    pub sentiment_scores: Vec<f64>,
    pub most_positive: Option<ReviewExemplar>,
    pub most_negative: Option<ReviewExemplar>,
}

pub async fn analyze_reviews(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let outcome = rate_with(&state.aggregator, &state.composer, &request.reviews);

    tracing::debug!(
        reviews = request.reviews.len(),
        rating = outcome.rating.final_rating,
        "Rating analysis"
    );

    Ok(Json(AnalyzeResponse {
        rating: outcome.rating,
        total_reviews: outcome.analysis.total_reviews,
        keywords: outcome.analysis.keywords,
        sentiment_scores: outcome.analysis.sentiment_scores,
        most_positive: outcome.analysis.most_positive,
        most_negative: outcome.analysis.most_negative,
    }))
}

pub fn rating_routes() -> Router<AppState> {
    Router::new().route("/api/rating/analyze", post(analyze_reviews))
}
