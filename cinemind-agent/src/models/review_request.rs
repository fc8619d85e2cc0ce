//! Review generation requests and responses

use chrono::{DateTime, Utc};
use cinemind_common::text::{extract_movie_title, split_title_year};
use cinemind_common::{Error, Result};
use serde::{Deserialize, Serialize};

use super::{ConfidenceLevel, MovieInfo, RatingBreakdown, SentimentDistribution};

/// Review generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default = "default_review_style")]
    pub review_style: String,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Target length in characters
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default)]
    pub include_spoilers: bool,
}

fn default_review_style() -> String {
    "professional".to_string()
}

fn default_language() -> String {
    "zh".to_string()
}

fn default_max_length() -> u32 {
    1000
}

impl ReviewRequest {
    /// Request with defaults for everything but the title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            target_audience: None,
            review_style: default_review_style(),
            focus_areas: Vec::new(),
            language: default_language(),
            max_length: default_max_length(),
            include_spoilers: false,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidRequest("title must not be empty"));
        }
        if self.max_length == 0 {
            return Err(Error::InvalidRequest("max_length must be positive"));
        }
        Ok(())
    }

    /// Copy with `《…》` unwrapped and a bracketed year moved to `year`
    ///
    /// A year is only taken from the title when none was given and some
    /// title text remains after removing it. Bare numbers stay in the
    /// title ("1917", "Blade Runner 2049").
    pub fn normalized(&self) -> Self {
        let raw = self.title.trim();
        let mut normalized = self.clone();

        let mut title_source = raw.to_string();
        if self.year.is_none() {
            if let Some((stripped, year)) = split_title_year(raw) {
                if !extract_movie_title(&stripped).is_empty() {
                    normalized.year = Some(year);
                    title_source = stripped;
                }
            }
        }

        normalized.title = extract_movie_title(&title_source);
        normalized
    }

    /// Prompt wording for the requested style
    pub fn style_description(&self) -> &str {
        match self.review_style.as_str() {
            "professional" => "专业严谨",
            "casual" => "轻松随意",
            "academic" => "学术分析",
            "entertaining" => "幽默风趣",
            "brief" => "简洁精炼",
            other => other,
        }
    }
}

/// Generated review with its rating evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub title: String,
    pub year: Option<i32>,
    /// Composite rating (0-10)
    pub rating: f64,
    /// Generated prose
    pub review: String,
    /// Highlights from the most positive audience review
    pub pros: Vec<String>,
    /// Highlights from the most negative audience review
    pub cons: Vec<String>,
    /// Most frequent sentiment keywords across reviews
    pub keywords: Vec<String>,
    pub sources: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub word_count: usize,
    pub review_style: String,
    pub rating_breakdown: Option<RatingBreakdown>,
    pub confidence_level: ConfidenceLevel,
    pub sentiment_distribution: SentimentDistribution,
    pub average_sentiment: f64,
    /// Reviews received from the source, including empty ones
    pub review_count: usize,
    pub movie: MovieInfo,
}

/// Several review requests processed together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReviewRequest {
    pub movies: Vec<ReviewRequest>,
    #[serde(default)]
    pub comparison_mode: bool,
}

impl BatchReviewRequest {
    pub fn validate(&self) -> Result<()> {
        if self.movies.is_empty() {
            return Err(Error::InvalidRequest("movies must not be empty"));
        }
        self.movies.iter().try_for_each(ReviewRequest::validate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReviewResponse {
    pub reviews: Vec<ReviewResponse>,
    pub comparison_analysis: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub total_movies: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: ReviewRequest = serde_json::from_str(r#"{"title": "活着"}"#).unwrap();
        assert_eq!(request.review_style, "professional");
        assert_eq!(request.language, "zh");
        assert_eq!(request.max_length, 1000);
        assert!(!request.include_spoilers);
        assert!(request.focus_areas.is_empty());
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(ReviewRequest::new("   ").validate().is_err());
        assert!(ReviewRequest::new("活着").validate().is_ok());
    }

    #[test]
    fn test_normalized_unwraps_brackets_and_year() {
        let request = ReviewRequest::new("《霸王别姬》 1993").normalized();
        assert_eq!(request.title, "霸王别姬");
        assert_eq!(request.year, Some(1993));

        let request = ReviewRequest::new("Inception (2010)").normalized();
        assert_eq!(request.title, "Inception");
        assert_eq!(request.year, Some(2010));
    }

    #[test]
    fn test_normalized_keeps_explicit_year_and_numeric_titles() {
        let request = ReviewRequest::new("1917").normalized();
        assert_eq!(request.title, "1917");
        assert_eq!(request.year, None);

        let request = ReviewRequest::new("Blade Runner 2049").with_year(2017).normalized();
        assert_eq!(request.title, "Blade Runner 2049");
        assert_eq!(request.year, Some(2017));
    }

    #[test]
    fn test_normalized_leaves_digits_inside_titles() {
        let request = ReviewRequest::new("Blade Runner 2049").normalized();
        assert_eq!(request.title, "Blade Runner 2049");
        assert_eq!(request.year, None);

        let request = ReviewRequest::new("Room 12019").normalized();
        assert_eq!(request.title, "Room 12019");
        assert_eq!(request.year, None);

        let request = ReviewRequest::new("《2046》（2004）").normalized();
        assert_eq!(request.title, "2046");
        assert_eq!(request.year, Some(2004));
    }

    #[test]
    fn test_style_description() {
        assert_eq!(ReviewRequest::new("x").style_description(), "专业严谨");
        let mut request = ReviewRequest::new("x");
        request.review_style = "noir".to_string();
        assert_eq!(request.style_description(), "noir");
    }

    #[test]
    fn test_empty_batch_rejected() {
        let batch = BatchReviewRequest {
            movies: Vec::new(),
            comparison_mode: true,
        };
        assert!(batch.validate().is_err());
    }
}
