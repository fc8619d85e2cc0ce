//! TMDB catalog client
//!
//! Supplies movie metadata and audience reviews to the rating pipeline.
//!
//! # API Reference
//! - Search: `GET /search/movie?query=&year=`
//! - Details: `GET /movie/{id}`, `/movie/{id}/credits`, `/movie/{id}/keywords`
//! - Popular: `GET /movie/popular?page=`
//! - Reviews: `GET /movie/{id}/reviews?page=` (at most `max_review_pages` pages)
//!
//! Every request carries `api_key` and `language` and waits for a rate
//! limiter permit first.

use async_trait::async_trait;
use cinemind_common::config::TmdbConfig;
use cinemind_common::text::clean_text;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{year_from_release_date, MovieInfo, Review};

/// Leading cast members kept in [`MovieInfo::cast`]
const MAX_CAST: usize = 10;

/// TMDB client errors
#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("TMDB API key not configured")]
    NotConfigured,

    #[error("TMDB request failed: {0}")]
    Network(String),

    #[error("TMDB API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse TMDB response: {0}")]
    Parse(String),
}

/// Source of movie metadata and audience reviews
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Best match for a title; a basic record when nothing matches
    async fn search_movie(&self, title: &str, year: Option<i32>) -> Result<MovieInfo, TmdbError>;

    /// One page of currently popular movies
    async fn popular_movies(&self, page: u32) -> Result<Vec<MovieInfo>, TmdbError>;

    /// Cleaned audience reviews for a movie
    async fn movie_reviews(&self, movie_id: u64) -> Result<Vec<Review>, TmdbError>;
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
}

/// Movie record; also matches the rows of the popular list
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TmdbMovie {
    id: Option<u64>,
    title: String,
    release_date: Option<String>,
    runtime: Option<u32>,
    overview: Option<String>,
    vote_average: Option<f64>,
    vote_count: Option<u64>,
    poster_path: Option<String>,
    budget: Option<f64>,
    revenue: Option<f64>,
    popularity: Option<f64>,
    original_language: Option<String>,
    genres: Vec<Named>,
    production_companies: Vec<Named>,
}

#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Credits {
    cast: Vec<Named>,
    crew: Vec<CrewMember>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CrewMember {
    name: String,
    job: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Keywords {
    keywords: Vec<Named>,
}

#[derive(Debug, Deserialize)]
struct TmdbReview {
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

type DirectLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// HTTP client for the TMDB v3 API
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
    language: String,
    max_review_pages: u32,
    rate_limiter: DirectLimiter,
}

impl TmdbClient {
    /// Build a client from the `[tmdb]` configuration section
    pub fn new(config: &TmdbConfig, api_key: impl Into<String>) -> Result<Self, TmdbError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TmdbError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| TmdbError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.clone(),
            language: config.language.clone(),
            max_review_pages: config.max_review_pages.max(1),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, TmdbError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(path = %path, "TMDB request");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| TmdbError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TmdbError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TmdbError::Parse(e.to_string()))
    }

    /// Optional sub-resource: failures are logged and replaced by defaults
    async fn get_optional<T: DeserializeOwned + Default>(&self, path: &str) -> T {
        match self.get_json(path, &[]).await {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %path, error = %e, "TMDB sub-resource unavailable");
                T::default()
            }
        }
    }

    fn poster_url(&self, poster_path: Option<&str>) -> Option<String> {
        poster_path
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}{}", self.image_base_url, p))
    }

    fn build_movie_info(&self, mut details: TmdbMovie, credits: Credits, keywords: Keywords) -> MovieInfo {
        let genres = std::mem::take(&mut details.genres);
        let companies = std::mem::take(&mut details.production_companies);
        let mut info = self.movie_from_row(details);

        info.director = credits
            .crew
            .into_iter()
            .filter(|member| member.job == "Director")
            .map(|member| member.name)
            .collect();
        info.cast = credits
            .cast
            .into_iter()
            .take(MAX_CAST)
            .map(|actor| actor.name)
            .collect();
        info.keywords = keywords.keywords.into_iter().map(|k| k.name).collect();
        info.genre = genres.into_iter().map(|g| g.name).collect();
        info.production_companies = companies.into_iter().map(|c| c.name).collect();
        info
    }

    fn movie_from_row(&self, row: TmdbMovie) -> MovieInfo {
        let release_date = row.release_date.filter(|d| !d.is_empty());
        MovieInfo {
            id: row.id,
            year: release_date.as_deref().and_then(year_from_release_date),
            poster_url: self.poster_url(row.poster_path.as_deref()),
            title: row.title,
            runtime: row.runtime,
            plot: row.overview.filter(|o| !o.is_empty()),
            rating: row.vote_average,
            release_date,
            budget: row.budget,
            revenue: row.revenue,
            popularity: row.popularity,
            vote_count: row.vote_count,
            original_language: row.original_language,
            ..Default::default()
        }
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn search_movie(&self, title: &str, year: Option<i32>) -> Result<MovieInfo, TmdbError> {
        let mut params = vec![("query", title.to_string()), ("page", "1".to_string())];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }

        let hits: Page<SearchHit> = self.get_json("/search/movie", &params).await?;
        let Some(best) = hits.results.first() else {
            debug!(title = %title, "No TMDB match");
            return Ok(MovieInfo::basic(title, year));
        };

        let details: TmdbMovie = self.get_json(&format!("/movie/{}", best.id), &[]).await?;
        let credits: Credits = self.get_optional(&format!("/movie/{}/credits", best.id)).await;
        let keywords: Keywords = self.get_optional(&format!("/movie/{}/keywords", best.id)).await;

        Ok(self.build_movie_info(details, credits, keywords))
    }

    async fn popular_movies(&self, page: u32) -> Result<Vec<MovieInfo>, TmdbError> {
        let rows: Page<TmdbMovie> = self
            .get_json("/movie/popular", &[("page", page.max(1).to_string())])
            .await?;
        Ok(rows.results.into_iter().map(|row| self.movie_from_row(row)).collect())
    }

    async fn movie_reviews(&self, movie_id: u64) -> Result<Vec<Review>, TmdbError> {
        let path = format!("/movie/{}/reviews", movie_id);

        let first: Page<TmdbReview> = self.get_json(&path, &[("page", "1".to_string())]).await?;
        let last_page = first.total_pages.clamp(1, self.max_review_pages);
        let mut raw = first.results;

        for page in 2..=last_page {
            match self
                .get_json::<Page<TmdbReview>>(&path, &[("page", page.to_string())])
                .await
            {
                Ok(next) => raw.extend(next.results),
                Err(e) => {
                    warn!(movie_id, page, error = %e, "Stopping review pagination");
                    break;
                }
            }
        }

        let reviews: Vec<Review> = raw
            .into_iter()
            .map(|r| Review::new(clean_text(r.content.as_deref().unwrap_or_default()), r.author))
            .collect();

        debug!(movie_id, count = reviews.len(), pages = last_page, "Fetched TMDB reviews");
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TmdbClient {
        TmdbClient::new(&TmdbConfig::default(), "test-key").unwrap()
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let result = TmdbClient::new(&TmdbConfig::default(), "  ");
        assert!(matches!(result, Err(TmdbError::NotConfigured)));
    }

    #[test]
    fn test_build_movie_info_from_payloads() {
        let details: TmdbMovie = serde_json::from_str(
            r#"{
                "id": 278,
                "title": "肖申克的救赎",
                "release_date": "1994-09-23",
                "runtime": 142,
                "overview": "希望让人自由。",
                "vote_average": 8.7,
                "poster_path": "/poster.jpg",
                "popularity": 120.5,
                "genres": [{"id": 18, "name": "剧情"}],
                "production_companies": [{"name": "Castle Rock"}]
            }"#,
        )
        .unwrap();
        let credits: Credits = serde_json::from_str(
            r#"{
                "cast": [{"name": "Tim Robbins"}, {"name": "Morgan Freeman"}],
                "crew": [{"name": "Frank Darabont", "job": "Director"}, {"name": "Roger Deakins", "job": "Director of Photography"}]
            }"#,
        )
        .unwrap();
        let keywords: Keywords = serde_json::from_str(r#"{"keywords": [{"name": "prison"}]}"#).unwrap();

        let info = client().build_movie_info(details, credits, keywords);
        assert_eq!(info.id, Some(278));
        assert_eq!(info.year, Some(1994));
        assert_eq!(info.director, vec!["Frank Darabont"]);
        assert_eq!(info.cast.len(), 2);
        assert_eq!(info.genre, vec!["剧情"]);
        assert_eq!(info.production_companies, vec!["Castle Rock"]);
        assert_eq!(info.keywords, vec!["prison"]);
        assert_eq!(
            info.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/poster.jpg")
        );
    }

    #[test]
    fn test_popular_row_without_dates() {
        let row: TmdbMovie = serde_json::from_str(r#"{"id": 1, "title": "X", "release_date": "", "poster_path": null}"#).unwrap();
        let info = client().movie_from_row(row);
        assert_eq!(info.year, None);
        assert_eq!(info.release_date, None);
        assert_eq!(info.poster_url, None);
    }

    #[test]
    fn test_review_page_tolerates_missing_content() {
        let page: Page<TmdbReview> =
            serde_json::from_str(r#"{"results": [{"author": "a"}, {"content": "好看"}], "total_pages": 9}"#).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.total_pages, 9);
        assert!(page.results[0].content.is_none());
    }
}
