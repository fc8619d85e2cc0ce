//! Review pipeline orchestration
//!
//! **Steps (job percent):**
//! 1. Fetch movie metadata (10)
//! 2. Fetch audience reviews (30)
//! 3. Analyze review sentiment (60)
//! 4. Compose the rating (70)
//! 5. Generate the narrative (80)
//!
//! A review fetch failure is not fatal: it is logged, the rating core is
//! skipped and the metadata-based fallback rating is used. Metadata and
//! narrative failures fail the request.

use chrono::Utc;
use cinemind_common::config::TomlConfig;
use cinemind_common::text::{count_words, extract_quotes, summarize_text};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::{
    AggregateRatingResult, BatchReviewRequest, BatchReviewResponse, JobStep, MovieInfo, Review,
    ReviewRequest, ReviewResponse,
};
use crate::services::job_registry::JobHandle;
use crate::services::llm_client::{LlmClient, LlmError, NarrativeGenerator};
use crate::services::review_aggregator::{ReviewAggregator, ReviewAnalysis, ReviewExemplar};
use crate::services::review_prompt::{build_review_messages, comparison_analysis};
use crate::services::sentiment_analyzer::{Lexicon, SentimentAnalyzer};
use crate::services::tmdb_client::{MovieCatalog, TmdbClient, TmdbError};
use crate::services::RatingComposer;

/// Summary length used when a review has no quotable sentence
const HIGHLIGHT_FALLBACK_CHARS: usize = 100;

/// Review pipeline errors
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    InvalidRequest(#[from] cinemind_common::Error),

    #[error("Movie lookup failed: {0}")]
    Metadata(#[source] TmdbError),

    #[error("Catalog request failed: {0}")]
    Catalog(#[source] TmdbError),

    #[error("Review generation failed: {0}")]
    Narrative(#[from] LlmError),
}

/// Sentiment analysis and rating for one review batch
#[derive(Debug, Clone)]
pub struct RatingOutcome {
    pub analysis: ReviewAnalysis,
    pub rating: AggregateRatingResult,
}

/// Movie review agent: catalog + rating core + narrative generator
pub struct ReviewAgent {
    catalog: Arc<dyn MovieCatalog>,
    generator: Arc<dyn NarrativeGenerator>,
    aggregator: ReviewAggregator,
    composer: RatingComposer,
}

impl ReviewAgent {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        generator: Arc<dyn NarrativeGenerator>,
        aggregator: ReviewAggregator,
    ) -> Self {
        Self {
            catalog,
            generator,
            aggregator,
            composer: RatingComposer::new(),
        }
    }

    /// Agent wired to TMDB and the configured language model
    ///
    /// Fails with a not-configured error when either API key is missing.
    pub fn from_config(config: &TomlConfig) -> Result<Self, AgentError> {
        let tmdb_key = config.tmdb.api_key.as_deref().unwrap_or_default();
        let llm_key = config.llm.api_key.as_deref().unwrap_or_default();

        let catalog = TmdbClient::new(&config.tmdb, tmdb_key).map_err(AgentError::Catalog)?;
        let generator = LlmClient::new(&config.llm, llm_key)?;

        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(generator),
            aggregator_from_config(config),
        ))
    }

    pub fn catalog(&self) -> &dyn MovieCatalog {
        self.catalog.as_ref()
    }

    /// Run the rating core over a review batch (no external I/O)
    pub fn rate_reviews(&self, reviews: &[Review]) -> RatingOutcome {
        rate_with(&self.aggregator, &self.composer, reviews)
    }

    /// Generate one review, reporting progress to `progress` when given
    pub async fn generate_review(
        &self,
        request: &ReviewRequest,
        progress: Option<&JobHandle>,
    ) -> Result<ReviewResponse, AgentError> {
        request.validate()?;
        let request = request.normalized();

        report(progress, JobStep::FetchingMetadata).await;
        let movie = self
            .catalog
            .search_movie(&request.title, request.year)
            .await
            .map_err(AgentError::Metadata)?;
        info!(title = %movie.title, movie_id = ?movie.id, "Movie resolved");

        report(progress, JobStep::FetchingReviews).await;
        let reviews = self.fetch_reviews(&movie).await;

        report(progress, JobStep::AnalyzingSentiment).await;
        let outcome = match &reviews {
            Some(reviews) => self.rate_reviews(reviews),
            None => RatingOutcome {
                analysis: ReviewAnalysis::empty(0),
                rating: AggregateRatingResult::no_data(),
            },
        };

        report(progress, JobStep::ComposingRating).await;
        let rating = if outcome.rating.final_rating > 0.0 {
            outcome.rating.final_rating
        } else {
            let fallback = fallback_rating(&movie, outcome.analysis.average_sentiment);
            debug!(title = %movie.title, fallback, "Using metadata fallback rating");
            fallback
        };

        report(progress, JobStep::GeneratingNarrative).await;
        let messages = build_review_messages(&movie, &outcome.analysis, &outcome.rating, &request);
        let review = self.generator.generate(&messages).await?;

        let mut sources = vec!["TMDB 电影信息".to_string()];
        if outcome.analysis.total_reviews > 0 {
            sources.push(format!("TMDB 观众评论 ({}条)", outcome.analysis.total_reviews));
        }

        info!(
            title = %movie.title,
            rating,
            reviews = outcome.analysis.total_reviews,
            confidence = %outcome.rating.confidence_level,
            "Review generated"
        );

        Ok(ReviewResponse {
            title: movie.title.clone(),
            year: movie.year,
            rating,
            word_count: count_words(&review),
            review,
            pros: highlights(outcome.analysis.most_positive.as_ref(), |s| s > 0.0),
            cons: highlights(outcome.analysis.most_negative.as_ref(), |s| s < 0.0),
            keywords: outcome.analysis.keywords.clone(),
            sources,
            generated_at: Utc::now(),
            review_style: request.review_style.clone(),
            rating_breakdown: outcome.rating.breakdown.clone(),
            confidence_level: outcome.rating.confidence_level,
            sentiment_distribution: outcome.rating.distribution,
            average_sentiment: outcome.rating.average_sentiment,
            review_count: outcome.analysis.total_reviews,
            movie,
        })
    }

    /// Run one job to a terminal state
    pub async fn run_job(&self, request: ReviewRequest, handle: JobHandle) {
        let job_id = handle.job_id();
        info!(job_id = %job_id, title = %request.title, "Job started");

        match self.generate_review(&request, Some(&handle)).await {
            Ok(response) => {
                info!(job_id = %job_id, rating = response.rating, "Job completed");
                handle.complete(response).await;
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Job failed");
                handle.fail(e.to_string()).await;
            }
        }
    }

    /// Generate several reviews concurrently
    ///
    /// Failed movies are logged and left out of the response.
    pub async fn generate_batch(&self, batch: &BatchReviewRequest) -> BatchReviewResponse {
        let results = join_all(
            batch
                .movies
                .iter()
                .map(|request| self.generate_review(request, None)),
        )
        .await;

        let mut reviews = Vec::with_capacity(results.len());
        for (request, result) in batch.movies.iter().zip(results) {
            match result {
                Ok(review) => reviews.push(review),
                Err(e) => warn!(title = %request.title, error = %e, "Batch item failed"),
            }
        }

        let comparison = (batch.comparison_mode && reviews.len() > 1).then(|| comparison_analysis(&reviews));

        BatchReviewResponse {
            total_movies: batch.movies.len(),
            reviews,
            comparison_analysis: comparison,
            generated_at: Utc::now(),
        }
    }

    async fn fetch_reviews(&self, movie: &MovieInfo) -> Option<Vec<Review>> {
        let Some(movie_id) = movie.id else {
            debug!(title = %movie.title, "No catalog id, no reviews to fetch");
            return Some(Vec::new());
        };
        match self.catalog.movie_reviews(movie_id).await {
            Ok(reviews) => Some(reviews),
            Err(e) => {
                warn!(movie_id, error = %e, "Review fetch failed, skipping review-based rating");
                None
            }
        }
    }
}

/// Aggregator configured from the `[sentiment]` section
pub fn aggregator_from_config(config: &TomlConfig) -> ReviewAggregator {
    let lexicon = Lexicon::builtin().with_extra_words(
        config.sentiment.extra_positive.as_slice(),
        config.sentiment.extra_negative.as_slice(),
    );
    ReviewAggregator::new(SentimentAnalyzer::with_lexicon(lexicon))
        .with_keyword_limit(config.sentiment.keyword_limit)
}

/// Aggregate a batch and compose its rating
pub fn rate_with(
    aggregator: &ReviewAggregator,
    composer: &RatingComposer,
    reviews: &[Review],
) -> RatingOutcome {
    let analysis = aggregator.analyze_reviews(reviews);
    let rating = composer.compose(
        &analysis.distribution,
        analysis.analyzed_count,
        &analysis.sentiment_scores,
    );
    RatingOutcome { analysis, rating }
}

/// Metadata-based rating used when the reviews give none
///
/// `vote_average×0.6 + (sentiment×5+5)×0.2 + min(popularity,10)×0.2`,
/// clamped to [0, 10], one decimal.
pub fn fallback_rating(movie: &MovieInfo, average_sentiment: f64) -> f64 {
    let vote = movie.rating.unwrap_or(0.0);
    let popularity = movie.popularity.unwrap_or(0.0).min(10.0);
    let score = vote * 0.6 + (average_sentiment * 5.0 + 5.0) * 0.2 + popularity * 0.2;
    (score.clamp(0.0, 10.0) * 10.0).round() / 10.0
}

fn highlights(exemplar: Option<&ReviewExemplar>, keep: impl Fn(f64) -> bool) -> Vec<String> {
    let Some(exemplar) = exemplar.filter(|e| keep(e.score)) else {
        return Vec::new();
    };
    let quotes = extract_quotes(&exemplar.review.text);
    if quotes.is_empty() {
        vec![summarize_text(&exemplar.review.text, HIGHLIGHT_FALLBACK_CHARS)]
    } else {
        quotes
    }
}

async fn report(progress: Option<&JobHandle>, step: JobStep) {
    if let Some(handle) = progress {
        handle.advance(step).await;
    }
}
