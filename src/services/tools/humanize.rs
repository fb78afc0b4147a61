// Humanizer
// Rewrites stiff, transition-heavy prose into a natural register

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::models::{Engine, HumanizeResponse};
use crate::services::detection::classify;
use crate::services::providers::CompletionService;

use super::{apply_phrase_rules, ask_model, non_empty, phrase_rule, tidy_text};

const HUMANIZE_SYSTEM_PROMPT: &str = r#"You rewrite text so it reads like a person wrote it: varied sentence length, plain transitions, no filler phrases. Keep every fact.
Return JSON only: {"humanizedText": "..."}"#;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Tone {
    Casual,
    Friendly,
    Professional,
}

impl Tone {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "friendly" => Self::Friendly,
            "professional" | "formal" => Self::Professional,
            _ => Self::Casual,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Friendly => "friendly",
            Self::Professional => "professional",
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct HumanizeReply {
    humanized_text: Option<String>,
}

fn rules(table: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    table.iter().map(|(from, to)| (phrase_rule(from), *to)).collect()
}

// Longer phrases come first so "it is important to note that" wins over "it is".
static TRANSITION_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    rules(&[
        ("it is important to note that", "keep in mind that"),
        ("it is worth noting that", "note that"),
        ("in conclusion", "all in all"),
        ("to summarize", "in short"),
        ("in summary", "in short"),
        ("furthermore", "plus"),
        ("moreover", "also"),
        ("additionally", "also"),
        ("in addition", "also"),
        ("as a result", "so"),
        ("consequently", "so"),
        ("therefore", "so"),
        ("thus", "so"),
        ("hence", "so"),
        ("nevertheless", "still"),
        ("nonetheless", "still"),
        ("ultimately", "in the end"),
        ("notably", "especially"),
        ("delve into", "dig into"),
        ("utilizes", "uses"),
        ("utilize", "use"),
        ("leverage", "use"),
        ("facilitate", "help"),
        ("paramount", "key"),
        ("multifaceted", "complex"),
    ])
});

static CONTRACTION_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    rules(&[
        ("do not", "don't"),
        ("does not", "doesn't"),
        ("did not", "didn't"),
        ("cannot", "can't"),
        ("can not", "can't"),
        ("will not", "won't"),
        ("is not", "isn't"),
        ("are not", "aren't"),
        ("it is", "it's"),
        ("that is", "that's"),
        ("we are", "we're"),
        ("they are", "they're"),
        ("you are", "you're"),
        ("i am", "I'm"),
    ])
});

static FRIENDLY_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    rules(&[
        ("it is necessary to", "you'll need to"),
        ("you must", "you'll want to"),
    ])
});

/// Local rewrite. Professional tone keeps full forms; the other tones also
/// contract common verb pairs.
pub fn humanize_locally(text: &str, tone: Tone) -> String {
    let mut out = text.to_string();
    if tone == Tone::Friendly {
        out = apply_phrase_rules(&out, &FRIENDLY_RULES).0;
    }
    out = apply_phrase_rules(&out, &TRANSITION_RULES).0;
    if tone != Tone::Professional {
        out = apply_phrase_rules(&out, &CONTRACTION_RULES).0;
    }
    tidy_text(&out)
}

pub async fn humanize(completer: Option<&dyn CompletionService>, text: &str, tone: Tone) -> HumanizeResponse {
    let score_before = classify(text).overall_score;
    let user_prompt = format!("Tone: {}\n\nText:\n{}", tone.as_str(), text);

    let (humanized_text, engine) =
        match ask_model::<HumanizeReply>(completer, "humanize", HUMANIZE_SYSTEM_PROMPT, &user_prompt)
            .await
            .and_then(|r| non_empty(r.humanized_text))
        {
            Some(rewritten) => (rewritten, Engine::Model),
            None => (humanize_locally(text, tone), Engine::Local),
        };

    HumanizeResponse {
        score_after: classify(&humanized_text).overall_score,
        humanized_text,
        tone: tone.as_str().to_string(),
        score_before,
        engine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_transitions_and_contracts() {
        let out = humanize_locally(
            "Furthermore, it is important to note that we cannot utilize this. Therefore, it is done.",
            Tone::Casual,
        );
        assert_eq!(out, "Plus, keep in mind that we can't use this. So, it's done.");
    }

    #[test]
    fn test_professional_keeps_full_forms() {
        let out = humanize_locally("Moreover, it is not ready. We do not know.", Tone::Professional);
        assert_eq!(out, "Also, it is not ready. We do not know.");
    }

    #[test]
    fn test_friendly_tone() {
        let out = humanize_locally("You must restart. It is necessary to wait.", Tone::Friendly);
        assert_eq!(out, "You'll want to restart. You'll need to wait.");
    }

    #[test]
    fn test_tone_parsing() {
        assert_eq!(Tone::from_str("Friendly"), Tone::Friendly);
        assert_eq!(Tone::from_str("formal"), Tone::Professional);
        assert_eq!(Tone::from_str(""), Tone::Casual);
    }

    #[tokio::test]
    async fn test_scores_do_not_increase() {
        let text = "Furthermore, the results are clear. Moreover, the data is consistent. \
                    Additionally, the method is sound. Consequently, we proceed. In conclusion, it works.";
        let resp = humanize(None, text, Tone::Casual).await;
        assert_eq!(resp.engine, Engine::Local);
        assert_eq!(resp.tone, "casual");
        assert!(resp.score_after <= resp.score_before);
    }
}
