//! Lexicon-based sentiment scorer
//!
//! Scores one text into [-1, 1] using bilingual (Chinese/English) keyword
//! lexicons with local negation and intensifier handling:
//!
//! 1. Each lexicon keyword found in the lowercased text (first occurrence)
//!    is judged by the 8 characters preceding it.
//! 2. A negation in that window, followed by at most `negation length + 2`
//!    characters, flips the hit: -1 on its own polarity tally.
//! 3. Otherwise +1 on its tally, +0.5 more if an intensifier is in the window.
//! 4. `(positive - negative) / lexicon size × 12`, clamped to [-1, 1].
//!
//! The window is a local proxy for syntactic scope, not a parser: a negation
//! further than a couple of characters before a keyword is not seen.

use serde::{Deserialize, Serialize};

use crate::models::SentimentLabel;

/// Characters inspected before each keyword
const WINDOW_CHARS: usize = 8;
/// Extra characters allowed between a negation and its keyword
const NEGATION_SLACK: usize = 2;
/// Bonus added to a tally when an intensifier precedes a keyword
const INTENSIFIER_BONUS: f64 = 0.5;
/// Amplification applied to the normalized tally difference
const AMPLIFICATION: f64 = 12.0;

const POSITIVE_WORDS: &[&str] = &[
    "好", "棒", "优秀", "精彩", "出色", "喜欢", "推荐", "经典", "震撼", "感动",
    "好看", "不错", "给力", "完美", "卓越", "杰出", "令人惊叹", "精彩绝伦", "引人入胜",
    "感人至深", "回味无穷", "值得一看", "佳作", "神作", "惊艳", "过瘾",
    "good", "great", "excellent", "amazing", "wonderful", "love", "loved", "masterpiece",
    "brilliant", "fantastic", "awesome", "best", "beautiful", "enjoyed", "recommend",
    "perfect", "stunning", "moving",
];

const NEGATIVE_WORDS: &[&str] = &[
    "差", "烂", "糟糕", "失望", "无聊", "难看", "垃圾", "浪费时间", "后悔", "差评",
    "不行", "不好", "无语", "无力吐槽", "毁三观", "烂片", "雷人", "狗血", "老套", "俗套",
    "尴尬", "出戏", "拖沓", "乏味",
    "bad", "terrible", "awful", "boring", "worst", "waste", "disappointing", "disappointed",
    "horrible", "poor", "dull", "hated", "stupid", "weak", "predictable", "overrated",
];

const INTENSIFIERS: &[&str] = &[
    "很", "非常", "太", "真", "超", "特别", "十分", "极其", "相当", "超级", "最", "极",
    "very", "really", "extremely", "absolutely", "totally", "incredibly",
];

const NEGATIONS: &[&str] = &[
    "不", "没", "没有", "别", "未", "毫无", "并不", "一点也不", "不太",
    "not", "never", "n't", "hardly", "without",
];

/// Keyword sets driving the scorer
///
/// Entries are lowercased, trimmed and de-duplicated (first occurrence wins).
#[derive(Debug, Clone)]
pub struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
    intensifiers: Vec<String>,
    negations: Vec<String>,
}

impl Lexicon {
    pub fn new<S: AsRef<str>>(
        positive: &[S],
        negative: &[S],
        intensifiers: &[S],
        negations: &[S],
    ) -> Self {
        Self {
            positive: normalize_words(positive),
            negative: normalize_words(negative),
            intensifiers: normalize_words(intensifiers),
            negations: normalize_words(negations),
        }
    }

    /// Built-in bilingual vocabulary
    pub fn builtin() -> Self {
        Self::new(POSITIVE_WORDS, NEGATIVE_WORDS, INTENSIFIERS, NEGATIONS)
    }

    /// Append extra polarity keywords (e.g. from configuration)
    pub fn with_extra_words<S: AsRef<str>>(mut self, positive: &[S], negative: &[S]) -> Self {
        for word in normalize_words(positive) {
            if !self.positive.contains(&word) {
                self.positive.push(word);
            }
        }
        for word in normalize_words(negative) {
            if !self.negative.contains(&word) {
                self.negative.push(word);
            }
        }
        self
    }

    /// Number of polarity keywords, the normalization denominator
    pub fn polarity_size(&self) -> usize {
        self.positive.len() + self.negative.len()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize_words<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    for word in words {
        let word = word.as_ref().trim().to_lowercase();
        if !word.is_empty() && !out.contains(&word) {
            out.push(word);
        }
    }
    out
}

/// Detailed scoring of one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Scalar sentiment (-1 to 1)
    #[serde(rename = "sentiment_score")]
    pub score: f64,
    /// Absolute value of the score
    pub intensity: f64,
    #[serde(rename = "sentiment")]
    pub label: SentimentLabel,
    /// Lexicon keywords found, in order of appearance
    pub keywords: Vec<String>,
    /// `min(intensity + 0.3, 1.0)`
    pub confidence: f64,
}

/// Tally of lexicon hits for one text
struct Tally {
    positive: f64,
    negative: f64,
    keywords: Vec<String>,
}

/// Lexicon sentiment scorer
///
/// Stateless apart from its lexicon; safe to share across tasks.
#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer {
    lexicon: Lexicon,
}

impl SentimentAnalyzer {
    /// Scorer with the built-in lexicon
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lexicon(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Sentiment score in [-1, 1]; empty text scores exactly 0.0
    pub fn analyze(&self, text: &str) -> f64 {
        self.score(&self.tally(text))
    }

    /// Score plus label, keywords and confidence
    pub fn analyze_detailed(&self, text: &str) -> SentimentResult {
        let tally = self.tally(text);
        let score = self.score(&tally);
        let intensity = score.abs();

        SentimentResult {
            score,
            intensity,
            label: SentimentLabel::from_score(score),
            keywords: tally.keywords,
            confidence: (intensity + 0.3).min(1.0),
        }
    }

    /// Element-wise [`analyze`](Self::analyze), order preserved
    pub fn batch_analyze<S: AsRef<str>>(&self, texts: &[S]) -> Vec<f64> {
        texts.iter().map(|t| self.analyze(t.as_ref())).collect()
    }

    fn score(&self, tally: &Tally) -> f64 {
        let total = tally.positive - tally.negative;
        if total == 0.0 {
            return 0.0;
        }

        let size = self.lexicon.polarity_size();
        if size == 0 {
            return 0.0;
        }

        let normalized = total / size as f64;
        (normalized * AMPLIFICATION).clamp(-1.0, 1.0)
    }

    fn tally(&self, text: &str) -> Tally {
        let mut tally = Tally {
            positive: 0.0,
            negative: 0.0,
            keywords: Vec::new(),
        };

        if text.trim().is_empty() {
            return tally;
        }

        let lower = text.to_lowercase();
        let mut hits: Vec<(usize, &str)> = Vec::new();

        for word in &self.lexicon.positive {
            if let Some(pos) = lower.find(word.as_str()) {
                tally.positive += self.contribution(&lower, pos);
                hits.push((pos, word.as_str()));
            }
        }
        for word in &self.lexicon.negative {
            if let Some(pos) = lower.find(word.as_str()) {
                tally.negative += self.contribution(&lower, pos);
                hits.push((pos, word.as_str()));
            }
        }

        hits.sort_by_key(|&(pos, _)| pos);
        tally.keywords = hits.into_iter().map(|(_, w)| w.to_string()).collect();
        tally
    }

    /// Tally contribution of a keyword starting at byte offset `pos`
    fn contribution(&self, lower: &str, pos: usize) -> f64 {
        let window = preceding_window(lower, pos);

        if self.is_negated(&window) {
            return -1.0;
        }

        if self.lexicon.intensifiers.iter().any(|i| window.contains(i.as_str())) {
            1.0 + INTENSIFIER_BONUS
        } else {
            1.0
        }
    }

    fn is_negated(&self, window: &str) -> bool {
        self.lexicon.negations.iter().any(|negation| {
            window.rfind(negation.as_str()).is_some_and(|at| {
                let remaining = window[at + negation.len()..].chars().count();
                remaining <= negation.chars().count() + NEGATION_SLACK
            })
        })
    }
}

/// Up to [`WINDOW_CHARS`] characters ending right before byte offset `pos`
fn preceding_window(text: &str, pos: usize) -> String {
    let prefix = &text[..pos];
    let start = prefix
        .char_indices()
        .rev()
        .nth(WINDOW_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    prefix[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_exactly_neutral() {
        let analyzer = SentimentAnalyzer::new();
        assert_eq!(analyzer.analyze(""), 0.0);
        assert_eq!(analyzer.analyze("   \n"), 0.0);
    }

    #[test]
    fn test_no_lexicon_hits_is_neutral() {
        let analyzer = SentimentAnalyzer::new();
        assert_eq!(analyzer.analyze("一般"), 0.0);
        assert_eq!(analyzer.analyze("the film runs two hours"), 0.0);
    }

    #[test]
    fn test_polarity() {
        let analyzer = SentimentAnalyzer::new();
        assert!(analyzer.analyze("太棒了，非常精彩") > 0.1);
        assert!(analyzer.analyze("很差，浪费时间") < -0.1);
        assert!(analyzer.analyze("A brilliant, moving masterpiece") > 0.1);
        assert!(analyzer.analyze("boring and predictable") < -0.1);
    }

    #[test]
    fn test_mirrored_texts_cancel() {
        let analyzer = SentimentAnalyzer::new();
        let positive = analyzer.analyze("太棒了，非常精彩");
        let negative = analyzer.analyze("很差，浪费时间");
        assert!((positive + negative).abs() < 1e-12);
    }

    #[test]
    fn test_negation_flips_keyword() {
        let analyzer = SentimentAnalyzer::new();
        assert!(analyzer.analyze("不精彩") < 0.0);
        assert!(analyzer.analyze("not great") < 0.0);
    }

    #[test]
    fn test_distant_negation_is_ignored() {
        let lexicon = Lexicon::new(&["精彩"], &["差"], &["很"], &["不"]);
        let analyzer = SentimentAnalyzer::with_lexicon(lexicon);
        // "不" is followed by four characters before the keyword
        assert!(analyzer.analyze("不过剧情还算精彩") > 0.0);
    }

    #[test]
    fn test_intensifier_bonus() {
        let lexicon = Lexicon::new(&["精彩"], &["差"], &["非常"], &["不"]);
        let analyzer = SentimentAnalyzer::with_lexicon(lexicon);
        // both texts clamp to 1.0 with a two-word lexicon, so compare tallies
        let plain = analyzer.tally("精彩");
        let boosted = analyzer.tally("非常精彩");
        assert_eq!(plain.positive, 1.0);
        assert_eq!(boosted.positive, 1.5);
    }

    #[test]
    fn test_normalization_and_amplification() {
        let lexicon = Lexicon::new(
            &["a1", "a2", "a3", "a4", "a5"],
            &["b1", "b2", "b3", "b4", "b5", "b6", "b7", "b8", "b9", "b10", "b11", "b12", "b13", "b14", "b15"],
            &["very"],
            &["not"],
        );
        let analyzer = SentimentAnalyzer::with_lexicon(lexicon);
        // one positive hit: 1 / 20 * 12 = 0.6
        assert!((analyzer.analyze("a1") - 0.6).abs() < 1e-12);
        // two positive hits clamp at 1.0
        assert_eq!(analyzer.analyze("a1 a2"), 1.0);
    }

    #[test]
    fn test_score_stays_in_range() {
        let analyzer = SentimentAnalyzer::new();
        let texts = [
            "好 棒 优秀 精彩 出色 喜欢 推荐 经典 震撼 感动 完美 神作",
            "差 烂 糟糕 失望 无聊 难看 垃圾 后悔 烂片 雷人 狗血 老套",
            "😀🎬 ??? <>",
            "不不不不不不不不好",
        ];
        for text in texts {
            let score = analyzer.analyze(text);
            assert!((-1.0..=1.0).contains(&score), "{} out of range for {}", score, text);
        }
    }

    #[test]
    fn test_analyze_detailed_is_derived_view() {
        let analyzer = SentimentAnalyzer::new();
        let text = "剧情精彩，但结尾很老套";
        let detailed = analyzer.analyze_detailed(text);

        assert_eq!(detailed.score, analyzer.analyze(text));
        assert_eq!(detailed.intensity, detailed.score.abs());
        assert_eq!(detailed.label, SentimentLabel::from_score(detailed.score));
        assert_eq!(detailed.confidence, (detailed.intensity + 0.3).min(1.0));
        assert_eq!(detailed.keywords, vec!["精彩".to_string(), "老套".to_string()]);
    }

    #[test]
    fn test_batch_analyze_preserves_order() {
        let analyzer = SentimentAnalyzer::new();
        let texts = ["很差", "", "非常精彩"];
        let scores = analyzer.batch_analyze(&texts);
        assert_eq!(scores.len(), 3);
        assert!(scores[0] < 0.0);
        assert_eq!(scores[1], 0.0);
        assert!(scores[2] > 0.0);
    }

    #[test]
    fn test_extra_words_extend_lexicon() {
        let base = Lexicon::builtin();
        let size = base.polarity_size();
        let extended = base.with_extra_words(&["封神", "好"], &["劝退"]);
        assert_eq!(extended.polarity_size(), size + 2);

        let analyzer = SentimentAnalyzer::with_lexicon(extended);
        assert!(analyzer.analyze("封神") > 0.1);
        assert!(analyzer.analyze("劝退") < -0.1);
    }

    #[test]
    fn test_preceding_window_counts_characters() {
        assert_eq!(preceding_window("一二三四五六七八九十好", 30), "三四五六七八九十");
        assert_eq!(preceding_window("很好", 3), "很");
        assert_eq!(preceding_window("好", 0), "");
    }
}
