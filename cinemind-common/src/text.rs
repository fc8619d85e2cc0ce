//! Text cleanup and summary helpers
//!
//! Used by the catalog adapter (review cleanup before scoring), the request
//! normalizer (title/year extraction) and the presentation layer (word
//! counts, highlight quotes, markdown export).

/// Punctuation kept by [`clean_text`] besides letters, digits and CJK ideographs
const KEPT_PUNCTUATION: &str = "，。！？：；“”‘’（）【】《》…—.,!?'-";

/// Sentence terminators recognised by [`split_sentences`]
const SENTENCE_TERMINATORS: [char; 4] = ['。', '！', '？', '\n'];

/// Words that mark a sentence as an opinion worth quoting
const EVALUATIVE_WORDS: [&str; 20] = [
    "精彩", "优秀", "出色", "震撼", "感动", "经典", "推荐", "糟糕", "失望", "无聊",
    "难看", "雷人", "狗血", "老套", "创新", "突破", "惊喜", "惊艳", "完美", "失败",
];

/// Quote delimiters searched by [`extract_quotes`]
const QUOTE_PAIRS: [(char, char); 4] = [('"', '"'), ('“', '”'), ('『', '』'), ('「', '」')];

const MAX_QUOTES: usize = 5;

/// Brackets around a release year in a title
const YEAR_BRACKETS: [(char, char); 2] = [('(', ')'), ('（', '）')];

/// CJK Unified Ideographs range used throughout the crate
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Clean raw review or synopsis text
///
/// Decodes common HTML entities, strips tags, drops characters outside the
/// whitelist and collapses whitespace runs to single spaces.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let decoded = unescape_entities(text);
    let untagged = strip_tags(&decoded);

    let filtered: String = untagged
        .chars()
        .filter(|&c| {
            is_cjk(c) || c.is_ascii_alphanumeric() || c.is_whitespace() || KEPT_PUNCTUATION.contains(c)
        })
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Remove `<tag>` markup; a `<` not followed by a letter, `/` or `!` is text
fn strip_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_tag {
            in_tag = c != '>';
            continue;
        }
        let opens_tag = c == '<'
            && chars
                .peek()
                .is_some_and(|next| next.is_ascii_alphabetic() || matches!(next, '/' | '!'));
        if opens_tag {
            in_tag = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Extract a movie title from free text
///
/// Recognises `《标题》`, `电影：标题`, `影片：标题` and `标题 电影`; falls
/// back to the trimmed input.
pub fn extract_movie_title(text: &str) -> String {
    if let Some(start) = text.find('《') {
        let rest = &text[start + '《'.len_utf8()..];
        if let Some(end) = rest.find('》') {
            let title = rest[..end].trim();
            if !title.is_empty() {
                return title.to_string();
            }
        }
    }

    for marker in ["电影", "影片"] {
        if let Some(pos) = text.find(marker) {
            let after = &text[pos + marker.len()..];
            if let Some(label) = after.strip_prefix(':').or_else(|| after.strip_prefix('：')) {
                let title: String = label
                    .trim_start()
                    .chars()
                    .take_while(|c| !matches!(c, '，' | '。' | '！' | '？' | '\n'))
                    .collect();
                if !title.trim().is_empty() {
                    return title.trim().to_string();
                }
            }
        }
    }

    for marker in ["电影", "影片"] {
        if let Some(pos) = text.find(marker) {
            let before = text[..pos].trim();
            if !before.is_empty() && !before.contains('《') && !before.contains('》') {
                return before.to_string();
            }
        }
    }

    text.trim().to_string()
}

/// First standalone year between 1900 and 2099 embedded in the text
///
/// The four digits must not touch another ASCII letter or digit, so
/// "12019" and "A2024" carry no year.
pub fn extract_year(text: &str) -> Option<i32> {
    let bytes = text.as_bytes();
    let standalone = |b: Option<&u8>| !b.is_some_and(u8::is_ascii_alphanumeric);

    (0..bytes.len().saturating_sub(3)).find_map(|i| {
        let before = i.checked_sub(1).and_then(|j| bytes.get(j));
        if standalone(before) && standalone(bytes.get(i + 4)) {
            text.get(i..i + 4).and_then(leading_year)
        } else {
            None
        }
    })
}

/// Release year written into a title, and the title without it
///
/// Only `(1993)`, `（1993）` or a year right after `《…》` count; a bare
/// trailing number such as "Blade Runner 2049" is part of the title.
pub fn split_title_year(text: &str) -> Option<(String, i32)> {
    for (open, close) in YEAR_BRACKETS {
        let mut offset = 0;
        while let Some(found) = text[offset..].find(open) {
            let inner_start = offset + found + open.len_utf8();
            let inner = &text[inner_start..];
            if let Some(year) = leading_year(inner) {
                if inner[4..].starts_with(close) {
                    let end = inner_start + 4 + close.len_utf8();
                    let title = format!("{}{}", &text[..offset + found], &text[end..]);
                    return Some((title.trim().to_string(), year));
                }
            }
            offset = inner_start;
        }
    }

    let close = text.rfind('》')? + '》'.len_utf8();
    let rest = text[close..].trim_start();
    let year = leading_year(rest)?;
    if rest[4..].starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return None;
    }
    let title = format!("{}{}", &text[..close], &rest[4..]);
    Some((title.trim().to_string(), year))
}

/// Year in 1900-2099 spelled by the first four bytes
fn leading_year(text: &str) -> Option<i32> {
    let digits = text.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = digits.parse().ok()?;
    (1900..=2099).contains(&year).then_some(year)
}

/// Split Chinese text into trimmed, non-empty sentences
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(|c| SENTENCE_TERMINATORS.contains(&c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Leading-sentence summary of at most `max_length` characters
///
/// Whole sentences are taken while they fit; otherwise the text is truncated
/// with an ellipsis.
pub fn summarize_text(text: &str, max_length: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let truncated = || format!("{}...", text.chars().take(max_length).collect::<String>());

    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return truncated();
    }

    let mut summary = String::new();
    let mut summary_len = 0;
    for sentence in &sentences {
        let sentence_len = sentence.chars().count();
        if summary_len + sentence_len > max_length {
            break;
        }
        summary.push_str(sentence);
        summary.push('。');
        summary_len += sentence_len + 1;
    }

    if summary.is_empty() {
        return truncated();
    }
    summary.trim().to_string()
}

/// Word count: CJK characters plus latin words
pub fn count_words(text: &str) -> usize {
    let cjk = text.chars().filter(|&c| is_cjk(c)).count();
    let latin = text
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .count();
    cjk + latin
}

/// Quoted passages and evaluative sentences, at most five
pub fn extract_quotes(text: &str) -> Vec<String> {
    let mut quotes: Vec<String> = Vec::new();

    for (open, close) in QUOTE_PAIRS {
        let mut rest = text;
        while let Some(start) = rest.find(open) {
            let after = &rest[start + open.len_utf8()..];
            match after.find(close) {
                Some(end) if end > 0 => {
                    quotes.push(after[..end].to_string());
                    rest = &after[end + close.len_utf8()..];
                }
                Some(end) => rest = &after[end + close.len_utf8()..],
                None => break,
            }
        }
    }

    for sentence in split_sentences(text) {
        if EVALUATIVE_WORDS.iter().any(|w| sentence.contains(w)) && !quotes.contains(&sentence) {
            quotes.push(sentence);
        }
    }

    quotes.truncate(MAX_QUOTES);
    quotes
}

/// Markdown rendering of a generated review
pub fn format_review(content: &str, title: &str, rating: f64) -> String {
    format!("# 《{}》影评\n\n**综合评分：{}/10**\n\n{}", title, rating, content)
}
