// Text Processing Service
// Sentence splitting, word tokenization and light normalization shared by the tools

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{4e00}-\u{9fff}]|[\p{L}\p{N}&&[^\u{4e00}-\u{9fff}]]+(?:['\u{2019}]\p{L}+)*").unwrap()
});
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{3000}\u{00A0}]").unwrap());
static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\x0C\x0B]+").unwrap());

/// Normalize quotes and whitespace.
/// Dashes are left alone: the detector reads them as a human signal.
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut s = text
        .replace('\u{201c}', "\"")
        .replace('\u{201d}', "\"")
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'");

    s = SPACE_RE.replace_all(&s, " ").to_string();
    s = s.replace("\r\n", "\n").replace('\r', "\n");
    s = HSPACE_RE.replace_all(&s, " ").to_string();

    s = s.lines()
        .map(|ln| ln.trim())
        .collect::<Vec<_>>()
        .join("\n");

    s.trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSpan {
    pub text: String,
    /// UTF-8 byte offset into the source text.
    pub start: usize,
    /// UTF-8 byte offset, end-exclusive.
    pub end: usize,
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '\u{2026}' | '。' | '！' | '？')
}

fn is_closing_quote(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '\u{201d}' | '\u{2019}' | ')')
}

fn push_span(text: &str, start: usize, end: usize, out: &mut Vec<SentenceSpan>) {
    let slice = &text[start..end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = slice.len() - slice.trim_start().len();
    out.push(SentenceSpan {
        text: trimmed.to_string(),
        start: start + lead,
        end: start + lead + trimmed.len(),
    });
}

/// Split text into sentences with offset tracking.
///
/// A run of terminators (`.`, `!`, `?`, ellipsis) ends a sentence when it is
/// followed by whitespace, a closing quote, or the end of the text. The
/// terminators stay attached to the sentence, and `3.14` is never split.
pub fn split_sentences(text: &str) -> Vec<SentenceSpan> {
    let mut spans = Vec::new();
    if text.trim().is_empty() {
        return spans;
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut seg_start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (_, ch) = chars[i];
        if !is_terminator(ch) {
            i += 1;
            continue;
        }

        // Decimal numbers
        if ch == '.'
            && i > 0
            && i + 1 < chars.len()
            && chars[i - 1].1.is_ascii_digit()
            && chars[i + 1].1.is_ascii_digit()
        {
            i += 1;
            continue;
        }

        let mut j = i;
        while j + 1 < chars.len() && is_terminator(chars[j + 1].1) {
            j += 1;
        }

        let next = chars.get(j + 1).map(|&(_, c)| c);
        let boundary = match next {
            None => true,
            Some(c) => c.is_whitespace() || is_closing_quote(c),
        };
        if !boundary {
            i = j + 1;
            continue;
        }

        let mut last = j;
        if let Some(c) = next {
            if is_closing_quote(c) {
                last = j + 1;
            }
        }
        let (pos, c) = chars[last];
        let end = pos + c.len_utf8();
        push_span(text, seg_start, end, &mut spans);
        seg_start = end;
        i = last + 1;
    }

    if seg_start < text.len() {
        push_span(text, seg_start, text.len(), &mut spans);
    }

    spans
}

/// Lowercased word tokens (CJK characters count as one token each).
pub fn word_tokens(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Type-token ratio over lowercased word tokens, 0.0 for empty text.
pub fn lexical_diversity(text: &str) -> f64 {
    let tokens = word_tokens(text);
    if tokens.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = tokens.iter().map(|t| t.as_str()).collect();
    unique.len() as f64 / tokens.len() as f64
}

/// Cheap script-based language guess used when the caller does not send one.
pub fn detect_language(text: &str) -> String {
    let mut han = 0usize;
    let mut kana = 0usize;
    let mut cyrillic = 0usize;
    let mut total = 0usize;

    for c in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        match c {
            '\u{4e00}'..='\u{9fff}' => han += 1,
            '\u{3040}'..='\u{30ff}' => kana += 1,
            '\u{0400}'..='\u{04ff}' => cyrillic += 1,
            _ => {}
        }
    }

    if total == 0 {
        return "en".to_string();
    }
    let ratio = |n: usize| n as f64 / total as f64;
    if ratio(kana) > 0.1 {
        "ja".to_string()
    } else if ratio(han) > 0.3 {
        "zh".to_string()
    } else if ratio(cyrillic) > 0.3 {
        "ru".to_string()
    } else {
        "en".to_string()
    }
}

/// Single-line preview for log lines.
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation() {
        let input = "Hello\u{201c}World\u{201d}  it\u{2019}s   fine";
        assert_eq!(normalize_punctuation(input), "Hello\"World\" it's fine");
    }

    #[test]
    fn test_normalize_keeps_em_dash() {
        assert_eq!(normalize_punctuation("wait \u{2014} what"), "wait \u{2014} what");
    }

    #[test]
    fn test_split_sentences_keeps_terminators() {
        let spans = split_sentences("First one. Second one! Third?");
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["First one.", "Second one!", "Third?"]);
    }

    #[test]
    fn test_split_sentences_offsets_point_into_source() {
        let text = "  Alpha beta.   Gamma delta!  ";
        for span in split_sentences(text) {
            assert_eq!(&text[span.start..span.end], span.text);
        }
    }

    #[test]
    fn test_split_sentences_decimal_and_ellipsis() {
        let spans = split_sentences("Pi is 3.14 roughly... Right?");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Pi is 3.14 roughly...");
        assert_eq!(spans[1].text, "Right?");
    }

    #[test]
    fn test_split_sentences_without_terminator() {
        let spans = split_sentences("no punctuation at all");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end, "no punctuation at all".len());
    }

    #[test]
    fn test_split_sentences_closing_quote() {
        let spans = split_sentences("He said \"stop.\" Then left.");
        assert_eq!(spans[0].text, "He said \"stop.\"");
        assert_eq!(spans[1].text, "Then left.");
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n ").is_empty());
    }

    #[test]
    fn test_word_tokens_contractions_and_cjk() {
        assert_eq!(word_tokens("It's OK"), vec!["it's", "ok"]);
        assert_eq!(word_tokens("你好 world"), vec!["你", "好", "world"]);
    }

    #[test]
    fn test_lexical_diversity() {
        assert_eq!(lexical_diversity(""), 0.0);
        assert!((lexical_diversity("the the the the") - 0.25).abs() < 1e-9);
        assert!((lexical_diversity("one two three") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("Hello there"), "en");
        assert_eq!(detect_language("这是一个测试"), "zh");
        assert_eq!(detect_language("Привет мир"), "ru");
        assert_eq!(detect_language(""), "en");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("a\nb", 10), "a b");
    }
}
