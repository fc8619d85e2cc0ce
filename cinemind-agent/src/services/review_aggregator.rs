//! Review batch aggregation
//!
//! Scores every review with non-empty text and summarizes the batch:
//! polarity distribution, mean sentiment, most frequent lexicon keywords and
//! the most positive / most negative review.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Review, SentimentDistribution, SentimentLabel};
use crate::services::SentimentAnalyzer;

/// Keyword list size used when the caller does not choose one
pub const DEFAULT_KEYWORD_LIMIT: usize = 20;

/// Review picked as an example of one end of the sentiment range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewExemplar {
    pub review: Review,
    pub score: f64,
}

/// Summary of one review batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAnalysis {
    /// Reviews received, including those with empty text
    pub total_reviews: usize,
    /// Reviews with non-empty text that were scored
    pub analyzed_count: usize,
    /// Mean score of analyzed reviews (0.0 when none)
    pub average_sentiment: f64,
    pub distribution: SentimentDistribution,
    /// Most frequent lexicon keywords, most frequent first
    pub keywords: Vec<String>,
    /// Scores of analyzed reviews in input order
    pub sentiment_scores: Vec<f64>,
    pub most_positive: Option<ReviewExemplar>,
    pub most_negative: Option<ReviewExemplar>,
}

impl ReviewAnalysis {
    /// Zero result for a batch of `total_reviews` reviews without text
    pub fn empty(total_reviews: usize) -> Self {
        Self {
            total_reviews,
            analyzed_count: 0,
            average_sentiment: 0.0,
            distribution: SentimentDistribution::default(),
            keywords: Vec::new(),
            sentiment_scores: Vec::new(),
            most_positive: None,
            most_negative: None,
        }
    }

    pub fn has_data(&self) -> bool {
        self.analyzed_count > 0
    }

    /// Overall tone in words, for prompts and summaries
    pub fn overall_tone(&self) -> &'static str {
        if !self.has_data() {
            return "无数据";
        }
        match SentimentLabel::from_score(self.average_sentiment) {
            SentimentLabel::Positive => "正面",
            SentimentLabel::Neutral => "中性",
            SentimentLabel::Negative => "负面",
        }
    }
}

/// Batch analyzer over a [`SentimentAnalyzer`]
#[derive(Debug, Clone)]
pub struct ReviewAggregator {
    analyzer: SentimentAnalyzer,
    keyword_limit: usize,
}

impl ReviewAggregator {
    pub fn new(analyzer: SentimentAnalyzer) -> Self {
        Self {
            analyzer,
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
        }
    }

    /// Number of keywords reported (typically 10 or 20)
    pub fn with_keyword_limit(mut self, keyword_limit: usize) -> Self {
        self.keyword_limit = keyword_limit;
        self
    }

    pub fn analyzer(&self) -> &SentimentAnalyzer {
        &self.analyzer
    }

    /// Analyze a review batch
    ///
    /// Reviews with empty text are skipped; whitespace-only text is scored
    /// (neutral). Empty input, or input whose reviews all lack text, yields
    /// the zero result (no keywords, no exemplars, average 0).
    pub fn analyze_reviews(&self, reviews: &[Review]) -> ReviewAnalysis {
        let mut analysis = ReviewAnalysis::empty(reviews.len());

        let mut keyword_counts: Vec<(String, usize)> = Vec::new();
        let mut keyword_index: HashMap<String, usize> = HashMap::new();

        for review in reviews.iter().filter(|r| r.has_text()) {
            let result = self.analyzer.analyze_detailed(&review.text);

            analysis.distribution.record(result.label);
            analysis.sentiment_scores.push(result.score);

            for keyword in result.keywords {
                match keyword_index.get(&keyword) {
                    Some(&i) => keyword_counts[i].1 += 1,
                    None => {
                        keyword_index.insert(keyword.clone(), keyword_counts.len());
                        keyword_counts.push((keyword, 1));
                    }
                }
            }

            // strict comparisons keep the first of equal scores
            if analysis
                .most_positive
                .as_ref()
                .map_or(true, |best| result.score > best.score)
            {
                analysis.most_positive = Some(ReviewExemplar {
                    review: review.clone(),
                    score: result.score,
                });
            }
            if analysis
                .most_negative
                .as_ref()
                .map_or(true, |worst| result.score < worst.score)
            {
                analysis.most_negative = Some(ReviewExemplar {
                    review: review.clone(),
                    score: result.score,
                });
            }
        }

        analysis.analyzed_count = analysis.sentiment_scores.len();
        if analysis.analyzed_count == 0 {
            return analysis;
        }

        analysis.average_sentiment =
            analysis.sentiment_scores.iter().sum::<f64>() / analysis.analyzed_count as f64;

        // sort_by is stable: equal counts stay in first-seen order
        keyword_counts.sort_by(|a, b| b.1.cmp(&a.1));
        analysis.keywords = keyword_counts
            .into_iter()
            .take(self.keyword_limit)
            .map(|(keyword, _)| keyword)
            .collect();

        analysis
    }
}

impl Default for ReviewAggregator {
    fn default() -> Self {
        Self::new(SentimentAnalyzer::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviews(texts: &[&str]) -> Vec<Review> {
        texts.iter().map(|t| Review::new(*t, None)).collect()
    }

    #[test]
    fn test_empty_batch_is_zero_result() {
        let analysis = ReviewAggregator::default().analyze_reviews(&[]);
        assert_eq!(analysis.total_reviews, 0);
        assert_eq!(analysis.analyzed_count, 0);
        assert_eq!(analysis.average_sentiment, 0.0);
        assert_eq!(analysis.distribution, SentimentDistribution::default());
        assert!(analysis.keywords.is_empty());
        assert!(analysis.most_positive.is_none());
        assert_eq!(analysis.overall_tone(), "无数据");
    }

    #[test]
    fn test_empty_texts_are_skipped_but_counted_as_source() {
        let analysis = ReviewAggregator::default().analyze_reviews(&reviews(&["", "非常精彩"]));
        assert_eq!(analysis.total_reviews, 2);
        assert_eq!(analysis.analyzed_count, 1);
        assert_eq!(analysis.distribution.total(), 1);
        assert_eq!(analysis.distribution.positive, 1);
    }

    #[test]
    fn test_whitespace_text_scores_neutral() {
        let analysis = ReviewAggregator::default().analyze_reviews(&reviews(&["   ", "精彩"]));
        assert_eq!(analysis.analyzed_count, 2);
        assert_eq!(analysis.distribution.total(), 2);
        assert_eq!(analysis.distribution.neutral, 1);
        assert_eq!(analysis.distribution.positive, 1);
        assert_eq!(analysis.sentiment_scores[0], 0.0);
        assert_eq!(analysis.most_positive.unwrap().review.text, "精彩");
    }

    #[test]
    fn test_all_empty_texts_is_zero_result() {
        let analysis = ReviewAggregator::default().analyze_reviews(&reviews(&["", ""]));
        assert_eq!(analysis.total_reviews, 2);
        assert!(!analysis.has_data());
        assert_eq!(analysis.distribution.total(), 0);
    }

    #[test]
    fn test_three_review_scenario() {
        let analysis = ReviewAggregator::default()
            .analyze_reviews(&reviews(&["太棒了，非常精彩", "很差，浪费时间", "一般"]));

        assert_eq!(analysis.distribution.positive, 1);
        assert_eq!(analysis.distribution.negative, 1);
        assert_eq!(analysis.distribution.neutral, 1);
        assert!(analysis.average_sentiment.abs() < 1e-9);
        assert_eq!(analysis.most_positive.unwrap().review.text, "太棒了，非常精彩");
        assert_eq!(analysis.most_negative.unwrap().review.text, "很差，浪费时间");
    }

    #[test]
    fn test_keywords_ranked_by_frequency_then_first_seen() {
        let analysis = ReviewAggregator::default()
            .with_keyword_limit(3)
            .analyze_reviews(&reviews(&["老套", "精彩", "精彩", "感动", "感动", "无聊"]));

        assert_eq!(analysis.keywords, vec!["精彩", "感动", "老套"]);
    }

    #[test]
    fn test_exemplar_ties_keep_first_occurrence() {
        let batch = vec![
            Review::new("精彩", Some("first".to_string())),
            Review::new("精彩", Some("second".to_string())),
            Review::new("无聊", Some("third".to_string())),
            Review::new("无聊", Some("fourth".to_string())),
        ];
        let analysis = ReviewAggregator::default().analyze_reviews(&batch);

        assert_eq!(
            analysis.most_positive.unwrap().review.author.as_deref(),
            Some("first")
        );
        assert_eq!(
            analysis.most_negative.unwrap().review.author.as_deref(),
            Some("third")
        );
    }

    #[test]
    fn test_scores_follow_input_order() {
        let analysis = ReviewAggregator::default().analyze_reviews(&reviews(&["无聊", "", "精彩"]));
        assert_eq!(analysis.sentiment_scores.len(), 2);
        assert!(analysis.sentiment_scores[0] < 0.0);
        assert!(analysis.sentiment_scores[1] > 0.0);
    }
}
