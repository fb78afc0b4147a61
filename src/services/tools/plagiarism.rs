// Plagiarism Checker
// Model source lookup with a seeded mock-source fallback

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{Engine, PlagiarismResponse, PlagiarismSource};
use crate::services::providers::CompletionService;
use crate::services::text_processor::{preview, split_sentences, word_count, word_tokens};

use super::{ask_model, capitalize_first, is_stopword, non_empty, seeded_rng};

/// Texts shorter than this never get mock sources.
const MIN_WORDS_FOR_SOURCES: usize = 20;
const MAX_MOCK_SOURCES: usize = 3;
const MAX_SOURCES: usize = 10;
const MATCHED_TEXT_CHARS: usize = 160;

const PLAGIARISM_SYSTEM_PROMPT: &str = r#"You estimate how original a text is and list likely published sources that overlap with it.
Do not invent certainty: low overlap is the normal case.
Return JSON only: {"originalityScore": 0-100, "plagiarismScore": 0-100, "sources": [{"title": "...", "url": "...", "similarity": 0-100, "matchedText": "..."}]}"#;

const TITLE_TEMPLATES: &[&str] = &[
    "Understanding {}: A Practical Guide",
    "The Complete Guide to {}",
    "{} Explained",
    "What Everyone Should Know About {}",
    "A Short History of {}",
    "Rethinking {} in Practice",
];

const SOURCE_DOMAINS: &[&str] = &[
    "en.wikipedia.org/wiki",
    "medium.com",
    "www.britannica.com/topic",
    "www.researchgate.net/publication",
    "scholar.archive.org",
    "www.sciencedirect.com/topics",
];

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PlagiarismReply {
    originality_score: Option<f64>,
    plagiarism_score: Option<f64>,
    sources: Vec<ModelSource>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ModelSource {
    title: String,
    url: String,
    similarity: f64,
    matched_text: String,
}

fn clamp_score(value: f64) -> u32 {
    if value.is_finite() {
        value.round().clamp(0.0, 100.0) as u32
    } else {
        0
    }
}

/// Most frequent content words longer than three characters, first
/// occurrence breaking ties.
fn keywords(text: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (pos, token) in word_tokens(text).into_iter().enumerate() {
        if token.chars().count() <= 3 || is_stopword(&token) {
            continue;
        }
        counts.entry(token).or_insert((0, pos)).0 += 1;
    }
    let mut ranked: Vec<(String, usize, usize)> =
        counts.into_iter().map(|(w, (n, first))| (w, n, first)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.into_iter().take(limit).map(|(w, _, _)| w).collect()
}

fn slug(words: &str) -> String {
    words
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn scores_for(sources: &[PlagiarismSource]) -> (u32, u32) {
    let plagiarism = sources.iter().map(|s| s.similarity).max().unwrap_or(0);
    (100 - plagiarism, plagiarism)
}

/// Plausible-looking sources derived from the text's keywords and sentences.
/// The generator is seeded from the text, so the same input always yields the
/// same sources, sorted by similarity, highest first.
pub fn fabricate_sources(text: &str) -> Vec<PlagiarismSource> {
    if word_count(text) < MIN_WORDS_FOR_SOURCES {
        return Vec::new();
    }

    let mut rng = seeded_rng(text);
    let count = rng.gen_range(0..=MAX_MOCK_SOURCES);
    let topics = keywords(text, 5);
    let sentences = split_sentences(text);

    let mut sources: Vec<PlagiarismSource> = (0..count)
        .map(|i| {
            let topic = topics
                .get(i % topics.len().max(1))
                .cloned()
                .unwrap_or_else(|| "writing".to_string());
            let template = TITLE_TEMPLATES.choose(&mut rng).copied().unwrap_or("{}");
            let domain = SOURCE_DOMAINS.choose(&mut rng).copied().unwrap_or("example.org");
            let matched_text = sentences
                .choose(&mut rng)
                .map(|s| preview(&s.text, MATCHED_TEXT_CHARS))
                .unwrap_or_default();
            PlagiarismSource {
                title: template.replace("{}", &capitalize_first(&topic)),
                url: format!("https://{}/{}-{}", domain, slug(&topic), rng.gen_range(1000..10000)),
                similarity: rng.gen_range(5..=35),
                matched_text,
            }
        })
        .collect();

    sources.sort_by(|a, b| b.similarity.cmp(&a.similarity));
    sources
}

fn validate_reply(reply: PlagiarismReply) -> Option<PlagiarismResponse> {
    if reply.originality_score.is_none() && reply.plagiarism_score.is_none() {
        return None;
    }

    let mut sources: Vec<PlagiarismSource> = reply
        .sources
        .into_iter()
        .filter_map(|s| {
            Some(PlagiarismSource {
                title: non_empty(Some(s.title))?,
                url: s.url.trim().to_string(),
                similarity: clamp_score(s.similarity),
                matched_text: s.matched_text.trim().to_string(),
            })
        })
        .take(MAX_SOURCES)
        .collect();
    sources.sort_by(|a, b| b.similarity.cmp(&a.similarity));

    let (_, derived_plagiarism) = scores_for(&sources);
    let plagiarism_score = reply.plagiarism_score.map(clamp_score).unwrap_or_else(|| {
        reply
            .originality_score
            .map(|o| 100 - clamp_score(o))
            .unwrap_or(derived_plagiarism)
    });
    let originality_score = reply
        .originality_score
        .map(clamp_score)
        .unwrap_or(100 - plagiarism_score.min(100));

    Some(PlagiarismResponse {
        originality_score,
        plagiarism_score,
        sources,
        engine: Engine::Model,
    })
}

pub async fn check_plagiarism(completer: Option<&dyn CompletionService>, text: &str) -> PlagiarismResponse {
    let user_prompt = format!("Check this text for overlap with published sources:\n\n{}", text);

    if let Some(reply) =
        ask_model::<PlagiarismReply>(completer, "plagiarism", PLAGIARISM_SYSTEM_PROMPT, &user_prompt).await
    {
        if let Some(resp) = validate_reply(reply) {
            return resp;
        }
    }

    let sources = fabricate_sources(text);
    let (originality_score, plagiarism_score) = scores_for(&sources);
    PlagiarismResponse {
        originality_score,
        plagiarism_score,
        sources,
        engine: Engine::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_TEXT: &str = "Renewable energy adoption keeps accelerating across many regions. \
        Solar installations and wind farms now supply a meaningful share of electricity. \
        Energy storage remains the main obstacle for grids that rely on renewable energy, \
        although battery prices continue to fall every single year.";

    #[test]
    fn test_short_text_has_no_sources() {
        assert!(fabricate_sources("Too short to match anything.").is_empty());
    }

    #[test]
    fn test_fabrication_is_deterministic_and_bounded() {
        let a = fabricate_sources(LONG_TEXT);
        let b = fabricate_sources(LONG_TEXT);
        assert_eq!(a, b);
        assert!(a.len() <= MAX_MOCK_SOURCES);
        for s in &a {
            assert!((5..=35).contains(&s.similarity));
            assert!(s.url.starts_with("https://"));
            assert!(!s.title.is_empty());
            assert!(LONG_TEXT.contains(s.matched_text.trim_end_matches("...")));
        }
        assert!(a.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_keywords_rank_by_frequency() {
        let words = keywords(LONG_TEXT, 2);
        assert_eq!(words, vec!["energy", "renewable"]);
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Energy, Storage!"), "energy-storage");
    }

    #[test]
    fn test_scores_complement() {
        let sources = vec![PlagiarismSource {
            title: "t".into(),
            url: "u".into(),
            similarity: 30,
            matched_text: "m".into(),
        }];
        assert_eq!(scores_for(&sources), (70, 30));
        assert_eq!(scores_for(&[]), (100, 0));
    }

    #[test]
    fn test_model_reply_validation() {
        let reply: PlagiarismReply = serde_json::from_str(
            r#"{"plagiarismScore": 140, "sources": [{"title": " ", "similarity": 50}, {"title": "Real", "url": "https://x", "similarity": 12.4}]}"#,
        )
        .unwrap();
        let resp = validate_reply(reply).unwrap();
        assert_eq!(resp.plagiarism_score, 100);
        assert_eq!(resp.originality_score, 0);
        assert_eq!(resp.sources.len(), 1);
        assert_eq!(resp.sources[0].similarity, 12);

        let empty: PlagiarismReply = serde_json::from_str(r#"{"sources": []}"#).unwrap();
        assert!(validate_reply(empty).is_none());
    }

    #[tokio::test]
    async fn test_check_without_model() {
        let resp = check_plagiarism(None, LONG_TEXT).await;
        assert_eq!(resp.engine, Engine::Local);
        assert_eq!(resp.originality_score + resp.plagiarism_score, 100);
    }
}
