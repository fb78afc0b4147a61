// Text Utilities
// Each tool asks the completion model for a JSON reply and falls back to a
// local generator when no model is configured or the reply is unusable.

pub mod paraphrase;
pub mod grammar;
pub mod summarize;
pub mod plagiarism;
pub mod humanize;
pub mod citation;
pub mod translate;

pub use paraphrase::{paraphrase, paraphrase_locally, ParaphraseMode};
pub use grammar::{check_grammar, check_grammar_locally};
pub use summarize::{summarize, summarize_locally, SummaryFormat, SummaryLength};
pub use plagiarism::{check_plagiarism, fabricate_sources};
pub use humanize::{humanize, humanize_locally, Tone};
pub use citation::{format_citation, generate_citation, CitationStyle, SourceType};
pub use translate::{translate, translate_locally, normalize_language};

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::models::WordChange;
use crate::services::providers::{parse_json_reply, CompletionService};

static TOOL_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\p{L}+(?:['\u{2019}]\p{L}+)?\b").unwrap());
static SENTENCE_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[.!?]\s+)(\p{Ll})").unwrap());
static LOOSE_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+([,.;:!?])").unwrap());

pub(crate) const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he",
    "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "it's", "just", "more",
    "most", "my", "no", "not", "of", "on", "one", "or", "our", "out", "she", "so", "some",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "to", "up", "was", "we", "were", "what", "when", "which", "who", "will", "with", "would",
    "you", "your",
];

pub(crate) fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Ask the model for a JSON reply of type `T`.
/// `None` when no model is configured, the call fails, or the reply does not parse.
pub(crate) async fn ask_model<T: DeserializeOwned>(
    completer: Option<&dyn CompletionService>,
    tool: &str,
    system: &str,
    user: &str,
) -> Option<T> {
    let completer = completer?;
    match completer.complete(system, user).await {
        Ok(result) => match parse_json_reply::<T>(&result.content) {
            Ok(reply) => {
                info!(
                    "[TOOLS] {} reply from {} latency_ms={}",
                    tool,
                    completer.label(),
                    result.latency_ms
                );
                Some(reply)
            }
            Err(e) => {
                warn!("[TOOLS] {} reply unusable, using local fallback: {}", tool, e);
                None
            }
        },
        Err(e) => {
            warn!("[TOOLS] {} model call failed, using local fallback: {}", tool, e);
            None
        }
    }
}

/// Trimmed, non-empty string from an optional model field.
pub(crate) fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a; stable across builds and toolchains.
fn stable_hash(text: &str) -> u64 {
    text.bytes()
        .fold(FNV_OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

/// Deterministic RNG per input so local fallbacks are reproducible.
pub(crate) fn seeded_rng(text: &str) -> StdRng {
    StdRng::seed_from_u64(stable_hash(text))
}

pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Carry the capitalization of `original` over to `replacement`.
pub(crate) fn match_case(original: &str, replacement: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return replacement.to_uppercase();
    }
    if original.chars().next().map_or(false, char::is_uppercase) {
        capitalize_first(replacement)
    } else {
        replacement.to_string()
    }
}

/// Replace words via `lookup` (called with the lowercased word), keeping case.
pub(crate) fn rewrite_words<F>(text: &str, mut lookup: F) -> (String, Vec<WordChange>)
where
    F: FnMut(&str) -> Option<String>,
{
    let mut changes = Vec::new();
    let out = TOOL_WORD_RE.replace_all(text, |caps: &Captures| {
        let word = &caps[0];
        match lookup(&word.to_lowercase().replace('\u{2019}', "'")) {
            Some(rep) => {
                let rep = match_case(word, &rep);
                changes.push(WordChange {
                    original: word.to_string(),
                    replacement: rep.clone(),
                });
                rep
            }
            None => word.to_string(),
        }
    });
    (out.into_owned(), changes)
}

/// Apply `(phrase, replacement)` rules in order, word-bounded and case-insensitive.
pub(crate) fn apply_phrase_rules(
    text: &str,
    rules: &[(Regex, &'static str)],
) -> (String, Vec<WordChange>) {
    let mut changes = Vec::new();
    let mut current = text.to_string();
    for (re, replacement) in rules {
        let next = re
            .replace_all(&current, |caps: &Captures| {
                let rep = match_case(&caps[0], replacement);
                changes.push(WordChange {
                    original: caps[0].to_string(),
                    replacement: rep.clone(),
                });
                rep
            })
            .into_owned();
        current = next;
    }
    (current, changes)
}

pub(crate) fn phrase_rule(phrase: &str) -> Regex {
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&format!(r"(?i)\b{}\b", body)).unwrap()
}

/// Collapse doubled spaces, drop spaces before punctuation, and capitalize
/// the first letter of every sentence.
pub(crate) fn tidy_text(text: &str) -> String {
    let s = LOOSE_SPACE_RE.replace_all(text.trim(), " ");
    let s = SPACE_BEFORE_PUNCT_RE.replace_all(&s, "$1");
    SENTENCE_START_RE
        .replace_all(&s, |caps: &Captures| {
            format!("{}{}", &caps[1], caps[2].to_uppercase())
        })
        .into_owned()
}
