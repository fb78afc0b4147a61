// Indicator Pattern Table
// Named detectors for the conservative heuristic: pattern name -> compiled regex

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What a match of the pattern is evidence of.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Formal transitions and stock phrasing typical of generated text.
    Ai,
    /// Fillers, contractions and other casual-speech markers.
    Human,
    /// `?`, ellipsis, em dash.
    CasualPunctuation,
    /// Laughter, emoticons, doubled punctuation.
    CasualMarker,
}

pub struct IndicatorPattern {
    pub name: &'static str,
    pub kind: IndicatorKind,
    regex: Regex,
}

impl IndicatorPattern {
    pub fn count(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl std::fmt::Debug for IndicatorPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorPattern")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("regex", &self.regex.as_str())
            .finish()
    }
}

/// Word-bounded, case-insensitive alternation over a phrase list.
/// Spaces inside a phrase match any run of whitespace.
fn phrases(name: &'static str, kind: IndicatorKind, list: &[&str]) -> IndicatorPattern {
    let alt = list
        .iter()
        .map(|p| {
            p.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");
    IndicatorPattern {
        name,
        kind,
        regex: Regex::new(&format!(r"(?i)\b(?:{alt})\b")).unwrap(),
    }
}

fn raw(name: &'static str, kind: IndicatorKind, pattern: &str) -> IndicatorPattern {
    IndicatorPattern {
        name,
        kind,
        regex: Regex::new(pattern).unwrap(),
    }
}

static PATTERN_TABLE: Lazy<Vec<IndicatorPattern>> = Lazy::new(|| {
    use IndicatorKind::*;
    vec![
        // AI indicators
        phrases(
            "additive_transition",
            Ai,
            &["furthermore", "moreover", "additionally", "in addition"],
        ),
        phrases(
            "causal_transition",
            Ai,
            &["consequently", "therefore", "thus", "hence", "accordingly", "as a result"],
        ),
        phrases(
            "concluding_phrase",
            Ai,
            &["in conclusion", "to summarize", "in summary", "to conclude", "ultimately"],
        ),
        phrases(
            "contrastive_transition",
            Ai,
            &["nevertheless", "nonetheless", "conversely", "on the other hand"],
        ),
        phrases(
            "emphatic_hedge",
            Ai,
            &[
                "it is important to note",
                "it is worth noting",
                "it should be noted",
                "notably",
            ],
        ),
        phrases(
            "formal_vocabulary",
            Ai,
            &["delve", "leverage", "utilize", "facilitate", "paramount", "multifaceted"],
        ),
        // Human indicators
        phrases(
            "filler",
            Human,
            &[
                "i mean", "you know", "like", "kinda", "sorta", "basically", "literally",
                "whatever", "honestly", "anyway",
            ],
        ),
        raw(
            "contraction",
            Human,
            r"(?i)\b\p{L}+['\u{2019}](?:s|re|ve|ll|d|t|m)\b",
        ),
        phrases(
            "informal_word",
            Human,
            &["gonna", "wanna", "gotta", "yeah", "nah", "ok", "okay", "stuff"],
        ),
        phrases(
            "personal_hedge",
            Human,
            &["i think", "i guess", "i suppose", "maybe", "probably"],
        ),
        // Casual punctuation
        raw("question_mark", CasualPunctuation, r"\?"),
        raw("ellipsis", CasualPunctuation, r"\.\.\.|\u{2026}"),
        raw("em_dash", CasualPunctuation, r"\u{2014}"),
        // Casual markers
        raw(
            "laughter",
            CasualMarker,
            r"(?i)\b(?:lol|lmao|rofl|ha(?:ha)+|he(?:he)+)\b",
        ),
        raw("emoticon", CasualMarker, r"(?:^|\s)[:;]-?(?:[)(]|[DPp]\b)"),
        raw("repeated_punctuation", CasualMarker, r"!{2,}|\?!|!\?"),
    ]
});

/// The full table, in declaration order.
pub fn patterns() -> &'static [IndicatorPattern] {
    &PATTERN_TABLE
}

pub fn patterns_of(kind: IndicatorKind) -> impl Iterator<Item = &'static IndicatorPattern> {
    PATTERN_TABLE.iter().filter(move |p| p.kind == kind)
}

pub fn lookup(name: &str) -> Option<&'static IndicatorPattern> {
    PATTERN_TABLE.iter().find(|p| p.name == name)
}

/// Total number of matches over every pattern of `kind`.
pub fn count_kind(text: &str, kind: IndicatorKind) -> usize {
    patterns_of(kind).map(|p| p.count(text)).sum()
}

pub fn has_kind(text: &str, kind: IndicatorKind) -> bool {
    patterns_of(kind).any(|p| p.is_match(text))
}

/// Names of every pattern that matches `text`, sorted and unique.
pub fn matched_labels(text: &str) -> Vec<String> {
    let mut labels: Vec<String> = PATTERN_TABLE
        .iter()
        .filter(|p| p.is_match(text))
        .map(|p| p.name.to_string())
        .collect();
    labels.sort();
    labels.dedup();
    labels
}
