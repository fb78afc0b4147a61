// Grammar Checker
// Model proofreading with a rule-table fallback

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::models::{Engine, GrammarIssue, GrammarResponse};
use crate::services::providers::CompletionService;

use super::{ask_model, match_case, non_empty, phrase_rule};

const MAX_ISSUES: usize = 50;
const PENALTY_PER_ISSUE: u32 = 5;

const GRAMMAR_SYSTEM_PROMPT: &str = r#"You are a careful proofreader. Fix grammar, spelling and punctuation without changing the author's voice.
Return JSON only: {"correctedText": "...", "issues": [{"kind": "grammar|spelling|punctuation|style", "message": "...", "original": "...", "suggestion": "..."}], "score": 0-100}"#;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct GrammarReply {
    corrected_text: Option<String>,
    issues: Vec<ModelIssue>,
    score: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ModelIssue {
    kind: Option<String>,
    message: String,
    original: String,
    suggestion: String,
}

static MISSPELLINGS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("alot", "a lot"),
        ("could of", "could have"),
        ("should of", "should have"),
        ("would of", "would have"),
        ("irregardless", "regardless"),
        ("definately", "definitely"),
        ("seperate", "separate"),
        ("recieve", "receive"),
        ("occured", "occurred"),
        ("untill", "until"),
        ("wich", "which"),
        ("teh", "the"),
    ]
    .into_iter()
    .map(|(wrong, right)| (phrase_rule(wrong), right))
    .collect()
});

static LOWERCASE_I_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bi\b").unwrap());
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{L}+").unwrap());
static DOUBLE_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());
static SPACE_BEFORE_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+([,.;:!?])").unwrap());
static MISSING_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\p{L})").unwrap());
static SENTENCE_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[.!?]\s+)(\p{Ll})").unwrap());

// Doubled words that are usually intentional.
const ALLOWED_REPEATS: &[&str] = &["had", "that"];
const ABBREVIATIONS: &[&str] = &["i.e.", "e.g.", "etc.", "vs.", "cf.", "mr.", "mrs.", "ms.", "dr."];

/// A byte-range replacement in the submitted text.
#[derive(Debug, Clone)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
    kind: &'static str,
    message: &'static str,
    original: String,
    suggestion: String,
}

impl Edit {
    fn replace(text: &str, start: usize, end: usize, replacement: String, kind: &'static str, message: &'static str) -> Self {
        Self {
            start,
            end,
            original: text[start..end].to_string(),
            suggestion: replacement.clone(),
            replacement,
            kind,
            message,
        }
    }
}

fn collect_edits(text: &str) -> Vec<Edit> {
    let mut edits = Vec::new();

    for m in LOWERCASE_I_RE.find_iter(text) {
        if text[m.end()..].starts_with('.') {
            continue; // "i.e."
        }
        edits.push(Edit::replace(text, m.start(), m.end(), "I".to_string(), "capitalization", "The pronoun \"I\" is always capitalized."));
    }

    for (re, right) in MISSPELLINGS.iter() {
        for m in re.find_iter(text) {
            let fixed = match_case(m.as_str(), right);
            edits.push(Edit::replace(text, m.start(), m.end(), fixed, "spelling", "Common misspelling."));
        }
    }

    let words: Vec<_> = WORD_RE.find_iter(text).collect();
    for pair in words.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        let gap = &text[prev.end()..cur.start()];
        let lower = prev.as_str().to_lowercase();
        if !gap.is_empty()
            && gap.chars().all(char::is_whitespace)
            && lower == cur.as_str().to_lowercase()
            && !ALLOWED_REPEATS.contains(&lower.as_str())
        {
            edits.push(Edit::replace(text, prev.start(), cur.end(), prev.as_str().to_string(), "repetition", "Repeated word."));
        }
    }

    for m in DOUBLE_SPACE_RE.find_iter(text) {
        // Spaces before punctuation belong to the punctuation rule below
        if text[m.end()..].starts_with(|c: char| ",.;:!?".contains(c)) {
            continue;
        }
        edits.push(Edit::replace(text, m.start(), m.end(), " ".to_string(), "spacing", "Multiple spaces between words."));
    }

    for caps in SPACE_BEFORE_PUNCT_RE.captures_iter(text) {
        let (whole, punct) = match (caps.get(0), caps.get(1)) {
            (Some(w), Some(p)) => (w, p),
            _ => continue,
        };
        edits.push(Edit {
            start: whole.start(),
            end: punct.start(),
            replacement: String::new(),
            kind: "punctuation",
            message: "Remove the space before punctuation.",
            original: whole.as_str().to_string(),
            suggestion: punct.as_str().to_string(),
        });
    }

    for caps in MISSING_SPACE_RE.captures_iter(text) {
        let (Some(whole), Some(letter)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        edits.push(Edit {
            start: whole.start(),
            end: whole.start() + 1,
            replacement: ", ".to_string(),
            kind: "punctuation",
            message: "Add a space after the comma.",
            original: whole.as_str().to_string(),
            suggestion: format!(", {}", letter.as_str()),
        });
    }

    edits
}

// Second pass, run on the output of `collect_edits`.
fn sentence_start_edits(text: &str) -> Vec<Edit> {
    let mut edits = Vec::new();
    for caps in SENTENCE_START_RE.captures_iter(text) {
        let (Some(whole), Some(letter)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.as_str().starts_with('.') && follows_abbreviation(text, whole.start()) {
            continue;
        }
        edits.push(Edit::replace(
            text,
            letter.start(),
            letter.end(),
            letter.as_str().to_uppercase(),
            "capitalization",
            "Sentences start with a capital letter.",
        ));
    }
    edits
}

fn follows_abbreviation(text: &str, period_at: usize) -> bool {
    let token = text[..=period_at]
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .to_lowercase();
    ABBREVIATIONS.contains(&token.as_str())
}

/// Drop edits that overlap an earlier one. Stable sort keeps rule order for
/// edits at the same position.
fn resolve_overlaps(mut edits: Vec<Edit>) -> Vec<Edit> {
    edits.sort_by_key(|e| (e.start, e.end));
    let mut kept: Vec<Edit> = Vec::with_capacity(edits.len());
    let mut claimed_until = 0;
    for edit in edits {
        if !kept.is_empty() && edit.start < claimed_until {
            continue;
        }
        claimed_until = edit.end;
        kept.push(edit);
    }
    kept
}

fn apply_edits(text: &str, edits: &[Edit]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in edits {
        out.push_str(&text[cursor..edit.start]);
        out.push_str(&edit.replacement);
        cursor = edit.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn score_for(issue_count: usize) -> u32 {
    100 - (issue_count as u32).saturating_mul(PENALTY_PER_ISSUE).min(100)
}

/// Rule-based proofreading. Returns the corrected text, the issues found
/// (offsets refer to the submitted text) and a score.
pub fn check_grammar_locally(text: &str) -> (String, Vec<GrammarIssue>, u32) {
    let edits = resolve_overlaps(collect_edits(text));
    let partial = apply_edits(text, &edits);
    // Capitalization offsets point into the partially corrected text, so they are left out
    let capitals = resolve_overlaps(sentence_start_edits(&partial));
    let corrected = apply_edits(&partial, &capitals);

    let issues: Vec<GrammarIssue> = edits
        .into_iter()
        .map(|e| (e, true))
        .chain(capitals.into_iter().map(|e| (e, false)))
        .take(MAX_ISSUES)
        .map(|(e, known)| GrammarIssue {
            kind: e.kind.to_string(),
            message: e.message.to_string(),
            offset: known.then_some(e.start),
            original: e.original,
            suggestion: e.suggestion,
        })
        .collect();
    let score = score_for(issues.len());
    (corrected, issues, score)
}

fn validate_reply(text: &str, reply: GrammarReply) -> Option<GrammarResponse> {
    let corrected_text = non_empty(reply.corrected_text)?;
    let issues: Vec<GrammarIssue> = reply
        .issues
        .into_iter()
        .filter(|i| !i.original.trim().is_empty() || !i.suggestion.trim().is_empty())
        .take(MAX_ISSUES)
        .map(|i| {
            let offset = (!i.original.is_empty()).then(|| text.find(&i.original)).flatten();
            GrammarIssue {
                kind: non_empty(i.kind).unwrap_or_else(|| "grammar".to_string()),
                message: i.message.trim().to_string(),
                original: i.original,
                suggestion: i.suggestion,
                offset,
            }
        })
        .collect();
    let score = match reply.score {
        Some(s) if s.is_finite() => s.round().clamp(0.0, 100.0) as u32,
        _ => score_for(issues.len()),
    };
    Some(GrammarResponse {
        corrected_text,
        issues,
        score,
        engine: Engine::Model,
    })
}

pub async fn check_grammar(
    completer: Option<&dyn CompletionService>,
    text: &str,
    language: Option<&str>,
) -> GrammarResponse {
    let user_prompt = format!(
        "Language: {}\n\nProofread this text:\n{}",
        language.unwrap_or("auto"),
        text
    );

    if let Some(reply) = ask_model::<GrammarReply>(completer, "grammar", GRAMMAR_SYSTEM_PROMPT, &user_prompt).await {
        if let Some(resp) = validate_reply(text, reply) {
            return resp;
        }
    }

    let (corrected_text, issues, score) = check_grammar_locally(text);
    GrammarResponse {
        corrected_text,
        issues,
        score,
        engine: Engine::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_scores_full() {
        let (out, issues, score) = check_grammar_locally("This sentence is fine. So is this one.");
        assert_eq!(out, "This sentence is fine. So is this one.");
        assert!(issues.is_empty());
        assert_eq!(score, 100);
    }

    #[test]
    fn test_rule_table() {
        let text = "i think alot of people could of done it.  they  went home ,then left.";
        let (out, issues, score) = check_grammar_locally(text);
        assert_eq!(out, "I think a lot of people could have done it. They went home, then left.");
        assert_eq!(issues.len(), 8);
        assert_eq!(score, 60);

        let alot = issues.iter().find(|i| i.original == "alot").unwrap();
        assert_eq!(alot.suggestion, "a lot");
        assert_eq!(alot.offset, Some(8));
        assert_eq!(issues[0].kind, "capitalization");
    }

    #[test]
    fn test_repeated_word() {
        let (out, issues, _) = check_grammar_locally("We went to the the store.");
        assert_eq!(out, "We went to the store.");
        assert_eq!(issues[0].kind, "repetition");
        assert_eq!(issues[0].original, "the the");

        let (out, _, _) = check_grammar_locally("He had had enough.");
        assert_eq!(out, "He had had enough.");
    }

    #[test]
    fn test_spaces_before_comma_removed_entirely() {
        let (out, issues, _) = check_grammar_locally("They went home  ,then left.");
        assert_eq!(out, "They went home, then left.");
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.kind == "punctuation"));
    }

    #[test]
    fn test_ie_not_capitalized() {
        let (out, _, _) = check_grammar_locally("Use a tool, i.e. a hammer.");
        assert_eq!(out, "Use a tool, i.e. a hammer.");
    }

    #[test]
    fn test_score_floor() {
        assert_eq!(score_for(0), 100);
        assert_eq!(score_for(3), 85);
        assert_eq!(score_for(40), 0);
    }

    #[test]
    fn test_model_reply_validation() {
        let reply: GrammarReply = serde_json::from_str(
            r#"{"correctedText": " It is fine. ", "issues": [{"message": "verb", "original": "are", "suggestion": "is"}], "score": 140}"#,
        )
        .unwrap();
        let resp = validate_reply("It are fine.", reply).unwrap();
        assert_eq!(resp.corrected_text, "It is fine.");
        assert_eq!(resp.score, 100);
        assert_eq!(resp.issues[0].kind, "grammar");
        assert_eq!(resp.issues[0].offset, Some(3));

        let empty: GrammarReply = serde_json::from_str(r#"{"correctedText": "  "}"#).unwrap();
        assert!(validate_reply("x", empty).is_none());
    }

    #[tokio::test]
    async fn test_check_grammar_without_model() {
        let resp = check_grammar(None, "teh end", None).await;
        assert_eq!(resp.engine, Engine::Local);
        assert_eq!(resp.corrected_text, "The end");
    }
}
