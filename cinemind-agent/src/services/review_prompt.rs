//! Prompt assembly and batch comparison text

use serde_json::json;

use crate::models::{AggregateRatingResult, MovieInfo, ReviewRequest, ReviewResponse};
use crate::services::llm_client::ChatMessage;
use crate::services::ReviewAnalysis;

const SYSTEM_PROMPT: &str = "你是一位专业的电影评论家，能够基于多方面信息生成真实、客观、有深度的影评。\n\
你的影评应当：\n\
- 基于真实数据和观众观点\n\
- 避免主观偏见，优缺点平衡\n\
- 提供具体的例子和分析\n\
- 语言生动但不浮夸";

/// Characters of each review quoted in the comparison
const COMPARISON_EXCERPT_CHARS: usize = 200;

/// Messages asking the model for one review
pub fn build_review_messages(
    movie: &MovieInfo,
    analysis: &ReviewAnalysis,
    rating: &AggregateRatingResult,
    request: &ReviewRequest,
) -> Vec<ChatMessage> {
    let movie_json = serde_json::to_string_pretty(movie).unwrap_or_default();
    let sentiment_json = serde_json::to_string_pretty(&json!({
        "review_count": analysis.total_reviews,
        "analyzed_count": analysis.analyzed_count,
        "positive": analysis.distribution.positive,
        "neutral": analysis.distribution.neutral,
        "negative": analysis.distribution.negative,
        "average_score": rating.average_sentiment,
        "overall_tone": analysis.overall_tone(),
        "keywords": analysis.keywords,
        "audience_rating": rating.final_rating,
        "confidence_level": rating.confidence_level,
    }))
    .unwrap_or_default();

    let audience = request.target_audience.as_deref().unwrap_or("普通观众");
    let spoilers = if request.include_spoilers {
        "可以讨论关键剧情和结局"
    } else {
        "不要透露关键剧情和结局"
    };

    let mut requirements = vec![
        "从剧情、导演手法、演员表现、技术层面、主题深度等角度分析".to_string(),
        "结合现有观众评价，但保持独立判断".to_string(),
        format!("风格：{}", request.style_description()),
        format!("适合{}阅读", audience),
        format!("字数控制在{}字左右", request.max_length),
        spoilers.to_string(),
    ];
    if !request.focus_areas.is_empty() {
        requirements.push(format!("重点关注：{}", request.focus_areas.join("、")));
    }
    if request.language != "zh" {
        requirements.push(format!("使用语言：{}", request.language));
    }

    let numbered: Vec<String> = requirements
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {}", i + 1, r))
        .collect();

    let user = format!(
        "基于以下信息，为电影{}生成一篇影评：\n\n基本信息：\n{}\n\n观众评论情感分析：\n{}\n\n要求：\n{}\n\n请生成完整影评：",
        movie.display_title(),
        movie_json,
        sentiment_json,
        numbered.join("\n")
    );

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}

/// Markdown comparison of several reviews
///
/// Empty input yields an empty string; best and worst ties keep the first
/// review.
pub fn comparison_analysis(reviews: &[ReviewResponse]) -> String {
    let Some(first) = reviews.first() else {
        return String::new();
    };

    let average = reviews.iter().map(|r| r.rating).sum::<f64>() / reviews.len() as f64;
    let mut best = first;
    let mut worst = first;
    for review in &reviews[1..] {
        if review.rating > best.rating {
            best = review;
        }
        if review.rating < worst.rating {
            worst = review;
        }
    }

    let tier = if average >= 7.0 {
        "较高"
    } else if average >= 5.0 {
        "中等"
    } else {
        "偏低"
    };

    format!(
        "## 电影对比分析\n\n本次分析了{}部电影，平均评分为{:.1}/10。\n\n\
         **最佳推荐**：《{}》(评分：{}/10)\n{}...\n\n\
         **相对较弱**：《{}》(评分：{}/10)\n{}...\n\n\
         **总结**：\n- 最佳影片比最差影片高出{:.1}分\n- 整体质量{}",
        reviews.len(),
        average,
        best.title,
        best.rating,
        excerpt(&best.review),
        worst.title,
        worst.rating,
        excerpt(&worst.review),
        (best.rating - worst.rating).abs(),
        tier
    )
}

fn excerpt(text: &str) -> String {
    text.chars().take(COMPARISON_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfidenceLevel, SentimentDistribution};
    use crate::services::ReviewAggregator;
    use chrono::Utc;

    fn response(title: &str, rating: f64) -> ReviewResponse {
        ReviewResponse {
            title: title.to_string(),
            year: None,
            rating,
            review: format!("{}的影评", title),
            pros: Vec::new(),
            cons: Vec::new(),
            keywords: Vec::new(),
            sources: Vec::new(),
            generated_at: Utc::now(),
            word_count: 0,
            review_style: "professional".to_string(),
            rating_breakdown: None,
            confidence_level: ConfidenceLevel::NoData,
            sentiment_distribution: SentimentDistribution::default(),
            average_sentiment: 0.0,
            review_count: 0,
            movie: MovieInfo::basic(title, None),
        }
    }

    #[test]
    fn test_prompt_carries_request_options() {
        let mut request = ReviewRequest::new("活着");
        request.focus_areas = vec!["表演".to_string(), "配乐".to_string()];
        request.include_spoilers = true;
        request.target_audience = Some("学生群体".to_string());

        let movie = MovieInfo::basic("活着", Some(1994));
        let analysis = ReviewAggregator::default().analyze_reviews(&[]);
        let rating = AggregateRatingResult::no_data();

        let messages = build_review_messages(&movie, &analysis, &rating, &request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");

        let user = &messages[1].content;
        assert!(user.contains("《活着》(1994)"));
        assert!(user.contains("重点关注：表演、配乐"));
        assert!(user.contains("适合学生群体阅读"));
        assert!(user.contains("可以讨论关键剧情"));
        assert!(user.contains("\"confidence_level\": \"无数据\""));
    }

    #[test]
    fn test_comparison_picks_best_and_worst() {
        let text = comparison_analysis(&[response("A", 6.0), response("B", 8.5), response("C", 4.0)]);
        assert!(text.contains("本次分析了3部电影"));
        assert!(text.contains("**最佳推荐**：《B》"));
        assert!(text.contains("**相对较弱**：《C》"));
        assert!(text.contains("高出4.5分"));
        assert!(text.contains("整体质量中等"));
    }

    #[test]
    fn test_comparison_of_nothing_is_empty() {
        assert_eq!(comparison_analysis(&[]), "");
    }
}
