//! Movie catalog lookups
//!
//! GET /api/search?query=&year=, GET /api/popular?page=

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    models::MovieInfo,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

/// GET /api/search
pub async fn search_movie(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<MovieInfo>> {
    let agent = state.require_agent()?;
    if query.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let movie = agent.catalog().search_movie(query.query.trim(), query.year).await?;
    Ok(Json(movie))
}

/// GET /api/popular
pub async fn popular_movies(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> ApiResult<Json<Vec<MovieInfo>>> {
    let agent = state.require_agent()?;
    let movies = agent.catalog().popular_movies(query.page).await?;
    Ok(Json(movies))
}

pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/api/search", get(search_movie))
        .route("/api/popular", get(popular_movies))
}
