//! Rating core tests: sentiment scoring, aggregation and rating composition
//! working together on realistic review batches

use cinemind_agent::models::{ConfidenceLevel, Review, SentimentLabel};
use cinemind_agent::services::review_agent::{aggregator_from_config, rate_with};
use cinemind_agent::services::{RatingComposer, ReviewAggregator, SentimentAnalyzer};
use cinemind_common::TomlConfig;

fn reviews(texts: &[&str]) -> Vec<Review> {
    texts.iter().map(|t| Review::new(*t, None)).collect()
}

const SAMPLE_TEXTS: &[&str] = &[
    "太棒了，非常精彩",
    "很差，浪费时间",
    "一般",
    "",
    "   ",
    "不精彩，也不感动",
    "剧情老套，演员尴尬，节奏拖沓",
    "A brilliant, moving masterpiece",
    "not great, really boring",
    "经典！经典！经典！",
    "😀😀😀",
    "1234567890",
];

#[test]
fn test_scores_stay_in_range() {
    let analyzer = SentimentAnalyzer::new();
    for text in SAMPLE_TEXTS {
        let score = analyzer.analyze(text);
        assert!((-1.0..=1.0).contains(&score), "{:?} scored {}", text, score);

        let detailed = analyzer.analyze_detailed(text);
        assert_eq!(detailed.score, score);
        assert!((0.0..=1.0).contains(&detailed.confidence));
    }
}

#[test]
fn test_empty_text_is_exactly_neutral() {
    let analyzer = SentimentAnalyzer::new();
    assert_eq!(analyzer.analyze(""), 0.0);
    assert_eq!(analyzer.analyze_detailed("").label, SentimentLabel::Neutral);
}

#[test]
fn test_three_review_scenario() {
    let outcome = rate_with(
        &ReviewAggregator::default(),
        &RatingComposer::new(),
        &reviews(&["太棒了，非常精彩", "很差，浪费时间", "一般"]),
    );

    let analyzer = SentimentAnalyzer::new();
    let labels: Vec<SentimentLabel> = ["太棒了，非常精彩", "很差，浪费时间", "一般"]
        .iter()
        .map(|t| analyzer.analyze_detailed(t).label)
        .collect();
    assert_eq!(
        labels,
        vec![SentimentLabel::Positive, SentimentLabel::Negative, SentimentLabel::Neutral]
    );

    let distribution = outcome.rating.distribution;
    assert_eq!((distribution.positive, distribution.neutral, distribution.negative), (1, 1, 1));
    assert!(outcome.rating.average_sentiment.abs() < 1e-9);
    assert_eq!(outcome.rating.confidence_level, ConfidenceLevel::Low);
    assert_eq!(outcome.rating.review_count, 3);
}

#[test]
fn test_distribution_counts_every_scored_review() {
    let outcome = rate_with(
        &ReviewAggregator::default(),
        &RatingComposer::new(),
        &reviews(SAMPLE_TEXTS),
    );

    // only the empty text is skipped; whitespace scores neutral
    assert_eq!(outcome.analysis.total_reviews, SAMPLE_TEXTS.len());
    assert_eq!(outcome.analysis.analyzed_count, SAMPLE_TEXTS.len() - 1);
    assert_eq!(outcome.rating.distribution.total(), outcome.analysis.analyzed_count);
    assert_eq!(outcome.analysis.sentiment_scores.len(), outcome.analysis.analyzed_count);
    assert!((0.0..=10.0).contains(&outcome.rating.final_rating));
}

#[test]
fn test_blank_batch_is_no_data() {
    for batch in [reviews(&[]), reviews(&["", "", ""])] {
        let outcome = rate_with(&ReviewAggregator::default(), &RatingComposer::new(), &batch);

        assert_eq!(outcome.analysis.total_reviews, batch.len());
        assert_eq!(outcome.analysis.overall_tone(), "无数据");
        assert_eq!(outcome.rating.final_rating, 0.0);
        assert_eq!(outcome.rating.confidence_level, ConfidenceLevel::NoData);
        assert!(outcome.rating.breakdown.is_none());
    }
}

#[test]
fn test_whitespace_reviews_count_toward_ratios() {
    let outcome = rate_with(
        &ReviewAggregator::default(),
        &RatingComposer::new(),
        &reviews(&["太棒了，非常精彩", "  ", "\n", "很差，浪费时间", "一般"]),
    );

    assert_eq!(outcome.rating.review_count, 5);
    assert_eq!(outcome.rating.distribution.neutral, 3);
    let breakdown = outcome.rating.breakdown.unwrap();
    assert_eq!(breakdown.positive_ratio, 20.0);
    assert_eq!(breakdown.negative_ratio, 20.0);
    assert_eq!(breakdown.quantity_weight, 0.8);
}

#[test]
fn test_sixty_review_batch_end_to_end() {
    let mut texts = vec!["太棒了，非常精彩"; 48];
    texts.extend(vec!["一般"; 6]);
    texts.extend(vec!["很差，浪费时间"; 6]);

    let outcome = rate_with(&ReviewAggregator::default(), &RatingComposer::new(), &reviews(&texts));
    let breakdown = outcome.rating.breakdown.clone().unwrap();

    assert_eq!(outcome.rating.distribution.positive, 48);
    assert_eq!(outcome.rating.distribution.negative, 6);
    assert!(breakdown.audience_score >= 8.0 && breakdown.audience_score < 9.0);
    assert_eq!(breakdown.consistency_score, 9.0);
    assert_eq!(breakdown.quantity_weight, 0.95);
    assert_eq!(outcome.rating.confidence_level, ConfidenceLevel::High);
}

#[test]
fn test_more_agreement_rates_higher() {
    let praise = reviews(&["太棒了，非常精彩"; 10]);
    let mut mixed_texts = vec!["太棒了，非常精彩"; 5];
    mixed_texts.extend(vec!["很差，浪费时间"; 5]);
    let mixed = reviews(&mixed_texts);

    let aggregator = ReviewAggregator::default();
    let composer = RatingComposer::new();
    let praised = rate_with(&aggregator, &composer, &praise);
    let split = rate_with(&aggregator, &composer, &mixed);

    assert!(praised.rating.final_rating > split.rating.final_rating);
}

#[test]
fn test_rating_is_deterministic() {
    let aggregator = ReviewAggregator::default();
    let composer = RatingComposer::new();
    let batch = reviews(SAMPLE_TEXTS);

    let first = rate_with(&aggregator, &composer, &batch);
    let second = rate_with(&aggregator, &composer, &batch);
    assert_eq!(first.rating, second.rating);
    assert_eq!(first.analysis.keywords, second.analysis.keywords);
}

#[test]
fn test_configured_lexicon_extends_builtin_words() {
    let config = TomlConfig::from_toml_str(
        r#"
        [sentiment]
        extra_positive = ["燃爆"]
        extra_negative = ["催眠"]
        "#,
    )
    .unwrap();
    let aggregator = aggregator_from_config(&config);

    let outcome = rate_with(&aggregator, &RatingComposer::new(), &reviews(&["燃爆", "催眠"]));
    assert_eq!(outcome.rating.distribution.positive, 1);
    assert_eq!(outcome.rating.distribution.negative, 1);

    let builtin = ReviewAggregator::default().analyze_reviews(&reviews(&["燃爆"]));
    assert_eq!(builtin.distribution.neutral, 1);
}
