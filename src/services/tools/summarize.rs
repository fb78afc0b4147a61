// Summarizer
// Model summary with an extractive word-frequency fallback

use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{Engine, SummarizeResponse};
use crate::services::providers::CompletionService;
use crate::services::text_processor::{split_sentences, word_count, word_tokens};

use super::{ask_model, is_stopword, non_empty};

const MAX_KEY_POINTS: usize = 5;
const LOCAL_KEY_POINTS: usize = 3;

const SUMMARIZE_SYSTEM_PROMPT: &str = r#"You summarize text faithfully without adding facts.
Return JSON only: {"summary": "...", "keyPoints": ["...", "..."]}"#;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

impl SummaryLength {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "short" => Self::Short,
            "long" => Self::Long,
            _ => Self::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }

    /// Sentences kept by the extractive summary.
    pub fn sentence_count(&self) -> usize {
        match self {
            Self::Short => 2,
            Self::Medium => 3,
            Self::Long => 5,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SummaryFormat {
    Paragraph,
    Bullets,
}

impl SummaryFormat {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "bullets" | "bullet" | "list" => Self::Bullets,
            _ => Self::Paragraph,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Bullets => "bullets",
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SummaryReply {
    summary: Option<String>,
    key_points: Vec<String>,
}

/// Summary words over source words, two decimals.
fn compression_ratio(source: &str, summary: &str) -> f64 {
    let total = word_count(source);
    if total == 0 {
        return 0.0;
    }
    let ratio = word_count(summary) as f64 / total as f64;
    (ratio * 100.0).round() / 100.0
}

fn render(sentences: &[String], format: SummaryFormat) -> String {
    match format {
        SummaryFormat::Paragraph => sentences.join(" "),
        SummaryFormat::Bullets => sentences
            .iter()
            .map(|s| format!("- {}", s))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Extractive summary: sentences are scored by the mean corpus frequency of
/// their content words; the top ones are returned in their original order.
pub fn summarize_locally(
    text: &str,
    length: SummaryLength,
    format: SummaryFormat,
) -> (String, Vec<String>, f64) {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return (String::new(), Vec::new(), 0.0);
    }

    let mut frequency: HashMap<String, usize> = HashMap::new();
    for token in word_tokens(text) {
        if !is_stopword(&token) {
            *frequency.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let content: Vec<String> = word_tokens(&s.text)
                .into_iter()
                .filter(|t| !is_stopword(t))
                .collect();
            let total: usize = content.iter().filter_map(|t| frequency.get(t)).sum();
            let score = if content.is_empty() {
                0.0
            } else {
                total as f64 / content.len() as f64
            };
            (idx, score)
        })
        .collect();
    // Highest score first, earlier sentence wins ties
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let key_points: Vec<String> = ranked
        .iter()
        .take(LOCAL_KEY_POINTS)
        .map(|(idx, _)| sentences[*idx].text.clone())
        .collect();

    let mut chosen: Vec<usize> = ranked
        .iter()
        .take(length.sentence_count())
        .map(|(idx, _)| *idx)
        .collect();
    chosen.sort_unstable();
    let picked: Vec<String> = chosen.iter().map(|&idx| sentences[idx].text.clone()).collect();

    let summary = render(&picked, format);
    let ratio = compression_ratio(text, &summary);
    (summary, key_points, ratio)
}

pub async fn summarize(
    completer: Option<&dyn CompletionService>,
    text: &str,
    length: SummaryLength,
    format: SummaryFormat,
) -> SummarizeResponse {
    let user_prompt = format!(
        "Length: {} (about {} sentences)\nFormat: {}\n\nText:\n{}",
        length.as_str(),
        length.sentence_count(),
        format.as_str(),
        text
    );

    if let Some(reply) = ask_model::<SummaryReply>(completer, "summarize", SUMMARIZE_SYSTEM_PROMPT, &user_prompt).await {
        if let Some(summary) = non_empty(reply.summary) {
            let key_points = reply
                .key_points
                .into_iter()
                .filter_map(|p| non_empty(Some(p)))
                .take(MAX_KEY_POINTS)
                .collect();
            return SummarizeResponse {
                compression_ratio: compression_ratio(text, &summary),
                summary,
                key_points,
                engine: Engine::Model,
            };
        }
    }

    let (summary, key_points, compression_ratio) = summarize_locally(text, length, format);
    SummarizeResponse {
        summary,
        key_points,
        compression_ratio,
        engine: Engine::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = "Solar power is growing fast. Solar panels are cheaper every year. \
        My cat sleeps all day. Cheaper solar panels mean more solar power on roofs. \
        The weather was nice.";

    #[test]
    fn test_length_and_format_parsing() {
        assert_eq!(SummaryLength::from_str("SHORT"), SummaryLength::Short);
        assert_eq!(SummaryLength::from_str(""), SummaryLength::Medium);
        assert_eq!(SummaryLength::Long.sentence_count(), 5);
        assert_eq!(SummaryFormat::from_str("bullets"), SummaryFormat::Bullets);
        assert_eq!(SummaryFormat::from_str("prose"), SummaryFormat::Paragraph);
    }

    #[test]
    fn test_extractive_picks_central_sentences_in_order() {
        let (summary, key_points, ratio) =
            summarize_locally(ARTICLE, SummaryLength::Short, SummaryFormat::Paragraph);
        assert!(summary.contains("Solar"));
        assert!(!summary.contains("cat"));
        assert!(!summary.contains("weather"));
        assert_eq!(key_points.len(), 3);
        assert!(ratio > 0.0 && ratio < 1.0);

        let first = summary.find("Solar").unwrap();
        let later = summary.rfind("solar").unwrap();
        assert!(first < later);
    }

    #[test]
    fn test_bullets_format() {
        let (summary, _, _) = summarize_locally(ARTICLE, SummaryLength::Short, SummaryFormat::Bullets);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.starts_with("- ")));
    }

    #[test]
    fn test_short_text_kept_whole() {
        let (summary, _, ratio) =
            summarize_locally("Only one sentence here.", SummaryLength::Long, SummaryFormat::Paragraph);
        assert_eq!(summary, "Only one sentence here.");
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn test_empty_text() {
        let (summary, points, ratio) = summarize_locally("   ", SummaryLength::Medium, SummaryFormat::Paragraph);
        assert!(summary.is_empty());
        assert!(points.is_empty());
        assert_eq!(ratio, 0.0);
    }

    #[tokio::test]
    async fn test_summarize_without_model() {
        let resp = summarize(None, ARTICLE, SummaryLength::Medium, SummaryFormat::Paragraph).await;
        assert_eq!(resp.engine, Engine::Local);
        assert!(!resp.summary.is_empty());
    }
}
