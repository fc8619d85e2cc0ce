//! Rating data model
//!
//! Records flowing through the rating core: raw [`Review`] input, per-review
//! [`SentimentLabel`], batch [`SentimentDistribution`] and the composed
//! [`AggregateRatingResult`].

use serde::{Deserialize, Serialize};

/// Score above which a review counts as positive
pub const POSITIVE_THRESHOLD: f64 = 0.1;
/// Score below which a review counts as negative
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Audience review as delivered by the review source
///
/// A review without a text field deserializes with empty text and is
/// skipped by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, alias = "content")]
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
}

impl Review {
    pub fn new(text: impl Into<String>, author: Option<String>) -> Self {
        Self {
            text: text.into(),
            author,
        }
    }

    /// False only for a missing or empty text; whitespace still counts
    /// and scores neutral
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Polarity class of a sentiment score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Classify a score with the shared thresholds
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score < NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

/// Review counts per polarity
///
/// Sum equals the number of reviews with non-empty text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentDistribution {
    /// Count labels for a sequence of scores
    pub fn from_scores(scores: &[f64]) -> Self {
        let mut distribution = Self::default();
        for &score in scores {
            distribution.record(SentimentLabel::from_score(score));
        }
        distribution
    }

    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Trust in a composite rating given sample size and consensus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "低")]
    Low,
    #[serde(rename = "中低")]
    MediumLow,
    #[serde(rename = "中等")]
    Medium,
    #[serde(rename = "中高")]
    MediumHigh,
    #[serde(rename = "高")]
    High,
    #[serde(rename = "无数据")]
    NoData,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "低",
            ConfidenceLevel::MediumLow => "中低",
            ConfidenceLevel::Medium => "中等",
            ConfidenceLevel::MediumHigh => "中高",
            ConfidenceLevel::High => "高",
            ConfidenceLevel::NoData => "无数据",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-scores of a composite rating, returned verbatim for auditing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingBreakdown {
    /// Positive-ratio score (0-10)
    pub audience_score: f64,
    /// Agreement between positive and negative shares (0-10)
    pub consistency_score: f64,
    /// Strength and spread of sentiment (0-10)
    pub intensity_score: f64,
    /// Sample size discount (0-1]
    pub quantity_weight: f64,
    /// Positive share in percent, one decimal
    pub positive_ratio: f64,
    /// Negative share in percent, one decimal
    pub negative_ratio: f64,
    /// Human-readable formula with the numbers used
    pub formula: String,
}

/// Composite rating for one review batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRatingResult {
    /// Composite rating (0-10, one decimal)
    pub final_rating: f64,
    /// Reviews that entered the formula
    pub review_count: usize,
    pub distribution: SentimentDistribution,
    /// Mean sentiment (-1 to 1, three decimals)
    pub average_sentiment: f64,
    /// Absent for the no-data result
    pub breakdown: Option<RatingBreakdown>,
    pub confidence_level: ConfidenceLevel,
}

impl AggregateRatingResult {
    /// Defined result for an empty batch
    pub fn no_data() -> Self {
        Self {
            final_rating: 0.0,
            review_count: 0,
            distribution: SentimentDistribution::default(),
            average_sentiment: 0.0,
            breakdown: None,
            confidence_level: ConfidenceLevel::NoData,
        }
    }

    pub fn has_data(&self) -> bool {
        self.review_count > 0
    }
}
