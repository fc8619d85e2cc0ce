//! Composite rating from a review batch
//!
//! ```text
//! final = clamp(0, 10, (audience×0.6 + consistency×0.25 + intensity×0.15) × quantity_weight)
//! ```
//!
//! - audience: positive ratio mapped onto 0-10 with bands at 0.5..0.9
//! - consistency: agreement between positive and negative shares
//! - intensity: mean absolute sentiment, bonus for low spread
//! - quantity weight: discount for small samples
//!
//! All functions are pure; the same inputs always give the same result.

use crate::models::{AggregateRatingResult, ConfidenceLevel, RatingBreakdown, SentimentDistribution};

const AUDIENCE_WEIGHT: f64 = 0.6;
const CONSISTENCY_WEIGHT: f64 = 0.25;
const INTENSITY_WEIGHT: f64 = 0.15;

/// (lower bound of positive ratio, base score), highest first
const AUDIENCE_BANDS: [(f64, f64); 5] = [(0.9, 9.0), (0.8, 8.0), (0.7, 7.0), (0.6, 6.0), (0.5, 5.0)];

/// (minimum review count, weight), highest first
const QUANTITY_WEIGHTS: [(usize, f64); 5] = [(100, 1.0), (50, 0.95), (20, 0.9), (10, 0.85), (5, 0.8)];
const SMALL_SAMPLE_WEIGHT: f64 = 0.7;

/// (minimum mean absolute score, score), highest first
const INTENSITY_BANDS: [(f64, f64); 4] = [(0.7, 9.0), (0.5, 8.0), (0.3, 7.0), (0.15, 6.0)];
const BASE_INTENSITY: f64 = 5.0;
const LOW_SPREAD_STDEV: f64 = 0.2;
const LOW_SPREAD_BONUS: f64 = 0.5;

/// Stateless rating composer
#[derive(Debug, Clone, Copy, Default)]
pub struct RatingComposer;

impl RatingComposer {
    pub fn new() -> Self {
        Self
    }

    /// Compose the rating for one batch
    ///
    /// `total_review_count == 0` yields [`AggregateRatingResult::no_data`].
    pub fn compose(
        &self,
        distribution: &SentimentDistribution,
        total_review_count: usize,
        sentiment_scores: &[f64],
    ) -> AggregateRatingResult {
        if total_review_count == 0 {
            return AggregateRatingResult::no_data();
        }

        let total = total_review_count as f64;
        let positive_ratio = distribution.positive as f64 / total;
        let negative_ratio = distribution.negative as f64 / total;

        let audience = audience_score(positive_ratio);
        let consistency = consistency_score(positive_ratio, negative_ratio);
        let intensity = intensity_score(sentiment_scores);
        let weight = quantity_weight(total_review_count);

        let weighted =
            audience * AUDIENCE_WEIGHT + consistency * CONSISTENCY_WEIGHT + intensity * INTENSITY_WEIGHT;
        let final_rating = round_to(1, (weighted * weight).clamp(0.0, 10.0));

        let formula = format!(
            "(({:.1}×0.6 + {:.1}×0.25 + {:.1}×0.15) × {:.2})",
            audience, consistency, intensity, weight
        );

        AggregateRatingResult {
            final_rating,
            review_count: total_review_count,
            distribution: *distribution,
            average_sentiment: round_to(3, mean(sentiment_scores)),
            breakdown: Some(RatingBreakdown {
                audience_score: audience,
                consistency_score: consistency,
                intensity_score: intensity,
                quantity_weight: weight,
                positive_ratio: round_to(1, positive_ratio * 100.0),
                negative_ratio: round_to(1, negative_ratio * 100.0),
                formula,
            }),
            confidence_level: confidence_level(total_review_count, positive_ratio),
        }
    }
}

/// Positive ratio mapped onto 0-10
///
/// Continuous and non-decreasing: each band starts at its base score and
/// climbs 1 point per 0.1 of ratio.
pub fn audience_score(positive_ratio: f64) -> f64 {
    for (band, base) in AUDIENCE_BANDS {
        if positive_ratio >= band {
            return base + (positive_ratio - band) * 10.0;
        }
    }
    positive_ratio * 10.0
}

/// Agreement score (1-9)
pub fn consistency_score(positive_ratio: f64, negative_ratio: f64) -> f64 {
    if positive_ratio >= 0.8 && negative_ratio <= 0.1 {
        9.0
    } else if positive_ratio >= 0.7 && negative_ratio <= 0.15 {
        8.0
    } else if positive_ratio >= 0.6 && negative_ratio <= 0.2 {
        7.0
    } else if positive_ratio >= 0.5 {
        6.0
    } else if positive_ratio >= 0.4 {
        5.0
    } else {
        (4.0 - negative_ratio * 5.0).max(1.0)
    }
}

/// Sample size discount in (0, 1]
pub fn quantity_weight(total_review_count: usize) -> f64 {
    QUANTITY_WEIGHTS
        .iter()
        .find(|(min_count, _)| total_review_count >= *min_count)
        .map(|(_, weight)| *weight)
        .unwrap_or(SMALL_SAMPLE_WEIGHT)
}

/// Mean absolute sentiment mapped onto 5-10
///
/// Opposing reviews do not cancel: `[1.0, -1.0]` is as intense as `[1.0]`,
/// minus the low-spread bonus.
pub fn intensity_score(sentiment_scores: &[f64]) -> f64 {
    let strength = mean_absolute(sentiment_scores);

    let mut score = INTENSITY_BANDS
        .iter()
        .find(|(min_strength, _)| strength >= *min_strength)
        .map(|(_, score)| *score)
        .unwrap_or(BASE_INTENSITY);

    if sample_stdev(sentiment_scores) < LOW_SPREAD_STDEV {
        score += LOW_SPREAD_BONUS;
    }
    score.min(10.0)
}

/// Confidence label from sample size and positive share
pub fn confidence_level(total_review_count: usize, positive_ratio: f64) -> ConfidenceLevel {
    match total_review_count {
        0 => ConfidenceLevel::NoData,
        n if n >= 50 && positive_ratio >= 0.7 => ConfidenceLevel::High,
        n if n >= 20 && positive_ratio >= 0.6 => ConfidenceLevel::MediumHigh,
        n if n >= 10 => ConfidenceLevel::Medium,
        n if n >= 5 => ConfidenceLevel::MediumLow,
        _ => ConfidenceLevel::Low,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_absolute(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1); 0 for fewer than two values
fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn round_to(decimals: i32, value: f64) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
