// Paraphraser
// Model rewrite with a synonym-table fallback

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{Engine, ParaphraseResponse, WordChange};
use crate::services::providers::CompletionService;

use super::{apply_phrase_rules, ask_model, non_empty, phrase_rule, rewrite_words, seeded_rng, tidy_text};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ParaphraseMode {
    Standard,
    Fluency,
    Formal,
    Simple,
    Creative,
    Shorten,
}

impl ParaphraseMode {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "fluency" => Self::Fluency,
            "formal" => Self::Formal,
            "simple" => Self::Simple,
            "creative" => Self::Creative,
            "shorten" => Self::Shorten,
            _ => Self::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Fluency => "fluency",
            Self::Formal => "formal",
            Self::Simple => "simple",
            Self::Creative => "creative",
            Self::Shorten => "shorten",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Standard => "Reword the text naturally while keeping its meaning and length.",
            Self::Fluency => "Improve flow and fix awkward phrasing with minimal changes.",
            Self::Formal => "Rewrite in a formal, professional register without contractions.",
            Self::Simple => "Rewrite using plain, everyday words and short sentences.",
            Self::Creative => "Rewrite expressively with fresh wording and varied sentences.",
            Self::Shorten => "Rewrite more concisely, removing filler while keeping every point.",
        }
    }
}

const PARAPHRASE_SYSTEM_PROMPT: &str = r#"You are a paraphrasing assistant. Follow the mode instruction and keep the author's meaning.
Return JSON only: {"paraphrasedText": "...", "changes": [{"original": "...", "replacement": "..."}]}"#;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ParaphraseReply {
    paraphrased_text: Option<String>,
    changes: Vec<WordChange>,
}

const SYNONYMS: &[(&str, &[&str])] = &[
    ("important", &["significant", "essential", "key"]),
    ("big", &["large", "sizable", "major"]),
    ("small", &["little", "modest", "compact"]),
    ("good", &["solid", "fine", "strong"]),
    ("bad", &["poor", "weak"]),
    ("help", &["assist", "support"]),
    ("show", &["reveal", "demonstrate"]),
    ("shows", &["reveals", "demonstrates"]),
    ("make", &["create", "produce"]),
    ("get", &["obtain", "gain"]),
    ("start", &["begin", "launch"]),
    ("quick", &["fast", "rapid"]),
    ("easy", &["simple", "effortless"]),
    ("hard", &["difficult", "tough"]),
    ("many", &["numerous", "several"]),
    ("often", &["frequently", "regularly"]),
    ("think", &["believe", "reckon"]),
    ("need", &["require"]),
    ("try", &["attempt"]),
    ("change", &["alter", "modify"]),
    ("idea", &["concept", "notion"]),
    ("problem", &["issue", "challenge"]),
    ("result", &["outcome"]),
    ("method", &["approach", "technique"]),
    ("very", &["highly", "really"]),
    ("happy", &["glad", "pleased"]),
    ("buy", &["purchase"]),
    ("answer", &["response", "reply"]),
];

fn synonyms(word: &str) -> Option<&'static [&'static str]> {
    SYNONYMS.iter().find(|(w, _)| *w == word).map(|(_, s)| *s)
}

static SIMPLE_WORDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("utilize", "use"),
        ("utilise", "use"),
        ("demonstrate", "show"),
        ("numerous", "many"),
        ("approximately", "about"),
        ("commence", "start"),
        ("facilitate", "help"),
        ("subsequently", "later"),
        ("therefore", "so"),
        ("purchase", "buy"),
        ("sufficient", "enough"),
        ("assist", "help"),
        ("endeavor", "try"),
        ("obtain", "get"),
        ("additional", "more"),
    ])
});

static FORMAL_WORDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("don't", "do not"),
        ("doesn't", "does not"),
        ("didn't", "did not"),
        ("can't", "cannot"),
        ("won't", "will not"),
        ("isn't", "is not"),
        ("aren't", "are not"),
        ("wasn't", "was not"),
        ("couldn't", "could not"),
        ("shouldn't", "should not"),
        ("wouldn't", "would not"),
        ("it's", "it is"),
        ("i'm", "i am"),
        ("you're", "you are"),
        ("we're", "we are"),
        ("they're", "they are"),
        ("i've", "i have"),
        ("we've", "we have"),
        ("let's", "let us"),
        ("gonna", "going to"),
        ("wanna", "want to"),
        ("kids", "children"),
        ("okay", "acceptable"),
        ("get", "obtain"),
        ("lots", "many"),
    ])
});

static SHORTEN_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (phrase_rule("due to the fact that"), "because"),
        (phrase_rule("in order to"), "to"),
        (phrase_rule("at this point in time"), "now"),
        (phrase_rule("in spite of the fact that"), "although"),
        (phrase_rule("for the purpose of"), "for"),
    ]
});

static FILLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\b(?:very|really|basically|actually|just|quite|totally|simply|literally)\b,?").unwrap()
});

/// Local rewrite for `mode`. Creative mode picks synonyms at random with a
/// generator seeded from the text; the other modes are fully deterministic.
pub fn paraphrase_locally(text: &str, mode: ParaphraseMode) -> (String, Vec<WordChange>) {
    match mode {
        ParaphraseMode::Formal => rewrite_words(text, |w| FORMAL_WORDS.get(w).map(|r| r.to_string())),
        ParaphraseMode::Simple => rewrite_words(text, |w| SIMPLE_WORDS.get(w).map(|r| r.to_string())),
        ParaphraseMode::Shorten => {
            let (phrased, mut changes) = apply_phrase_rules(text, &SHORTEN_RULES);
            for m in FILLER_RE.find_iter(&phrased) {
                changes.push(WordChange {
                    original: m.as_str().trim().trim_end_matches(',').to_string(),
                    replacement: String::new(),
                });
            }
            let stripped = FILLER_RE.replace_all(&phrased, "");
            (tidy_text(&stripped), changes)
        }
        ParaphraseMode::Creative => {
            let mut rng = seeded_rng(text);
            rewrite_words(text, |w| {
                synonyms(w)
                    .and_then(|choices| choices.choose(&mut rng))
                    .map(|r| r.to_string())
            })
        }
        ParaphraseMode::Standard | ParaphraseMode::Fluency => {
            rewrite_words(text, |w| synonyms(w).map(|choices| choices[0].to_string()))
        }
    }
}

pub async fn paraphrase(
    completer: Option<&dyn CompletionService>,
    text: &str,
    mode: ParaphraseMode,
) -> ParaphraseResponse {
    let user_prompt = format!(
        "Mode: {}\nInstruction: {}\n\nText:\n{}",
        mode.as_str(),
        mode.instruction(),
        text
    );

    if let Some(reply) =
        ask_model::<ParaphraseReply>(completer, "paraphrase", PARAPHRASE_SYSTEM_PROMPT, &user_prompt).await
    {
        if let Some(paraphrased_text) = non_empty(reply.paraphrased_text) {
            let changes = reply
                .changes
                .into_iter()
                .filter(|c| !c.original.trim().is_empty())
                .take(100)
                .collect();
            return ParaphraseResponse {
                paraphrased_text,
                mode: mode.as_str().to_string(),
                changes,
                engine: Engine::Model,
            };
        }
    }

    let (paraphrased_text, changes) = paraphrase_locally(text, mode);
    ParaphraseResponse {
        paraphrased_text,
        mode: mode.as_str().to_string(),
        changes,
        engine: Engine::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!(ParaphraseMode::from_str(" Formal "), ParaphraseMode::Formal);
        assert_eq!(ParaphraseMode::from_str("unknown"), ParaphraseMode::Standard);
        assert_eq!(ParaphraseMode::Shorten.as_str(), "shorten");
    }

    #[test]
    fn test_standard_uses_first_synonym() {
        let (out, changes) = paraphrase_locally("This is a big problem.", ParaphraseMode::Standard);
        assert_eq!(out, "This is a large issue.");
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_formal_expands_contractions() {
        let (out, _) = paraphrase_locally("I'm sure we can't stop. Don't worry.", ParaphraseMode::Formal);
        assert_eq!(out, "I am sure we cannot stop. Do not worry.");
    }

    #[test]
    fn test_simple_mode() {
        let (out, _) = paraphrase_locally("We utilize numerous tools.", ParaphraseMode::Simple);
        assert_eq!(out, "We use many tools.");
    }

    #[test]
    fn test_shorten_mode() {
        let (out, changes) = paraphrase_locally(
            "Really, we just left in order to rest due to the fact that it was very late.",
            ParaphraseMode::Shorten,
        );
        assert_eq!(out, "We left to rest because it was late.");
        assert!(changes.iter().any(|c| c.original.eq_ignore_ascii_case("really")));
    }

    #[test]
    fn test_creative_is_reproducible() {
        let text = "A big idea can help many people start.";
        let a = paraphrase_locally(text, ParaphraseMode::Creative);
        let b = paraphrase_locally(text, ParaphraseMode::Creative);
        assert_eq!(a, b);
        assert_ne!(a.0, text);
    }

    #[tokio::test]
    async fn test_paraphrase_without_model() {
        let resp = paraphrase(None, "A quick answer.", ParaphraseMode::Standard).await;
        assert_eq!(resp.engine, Engine::Local);
        assert_eq!(resp.paraphrased_text, "A fast response.");
        assert_eq!(resp.mode, "standard");
    }
}
