// Heuristic Text Classifier
// Conservative, human-favoring AI-content scoring used when no model answer is available.

use crate::models::{AnalysisResult, DetailedAnalysis, SentenceScore};
use crate::services::text_processor::{lexical_diversity, split_sentences, word_tokens};

use super::patterns::{count_kind, has_kind, matched_labels, IndicatorKind};

/// Only the first sentences of a text are scored and returned.
pub const MAX_SENTENCES: usize = 20;
/// A sentence is highlighted only strictly above this probability.
pub const HIGHLIGHT_THRESHOLD: u32 = 80;

/// Sentence scoring weights. The same table is used at every call site.
#[derive(Debug, Clone, Copy)]
pub struct SentenceWeights {
    pub base: i32,
    pub per_ai_indicator: i32,
    pub per_human_indicator: i32,
    pub casual_punctuation_penalty: i32,
    pub casual_marker_penalty: i32,
}

pub const SENTENCE_WEIGHTS: SentenceWeights = SentenceWeights {
    base: 10,
    per_ai_indicator: 15,
    per_human_indicator: 25,
    casual_punctuation_penalty: 20,
    casual_marker_penalty: 30,
};

/// Document-level bucket scores after the conservative bounds are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub overall_score: u32,
    pub ai_generated: u32,
    pub ai_refined: u32,
    pub human_written: u32,
}

pub fn count_human_indicators(text: &str) -> usize {
    count_kind(text, IndicatorKind::Human)
}

pub fn count_ai_indicators(text: &str) -> usize {
    count_kind(text, IndicatorKind::Ai)
}

/// AI probability of a single sentence, 0-100.
pub fn score_sentence(sentence: &str) -> u32 {
    let w = SENTENCE_WEIGHTS;
    let ai = count_ai_indicators(sentence) as i32;
    let human = count_human_indicators(sentence) as i32;

    let mut score = w.base + w.per_ai_indicator * ai - w.per_human_indicator * human;
    if has_kind(sentence, IndicatorKind::CasualPunctuation) {
        score -= w.casual_punctuation_penalty;
    }
    if has_kind(sentence, IndicatorKind::CasualMarker) {
        score -= w.casual_marker_penalty;
    }
    score.clamp(0, 100) as u32
}

pub fn annotate_sentence(sentence: &str) -> SentenceScore {
    let ai_probability = score_sentence(sentence);
    SentenceScore {
        text: sentence.to_string(),
        ai_probability,
        patterns: matched_labels(sentence),
        highlighted: ai_probability > HIGHLIGHT_THRESHOLD,
    }
}

/// Apply the conservative bounds to raw bucket scores.
///
/// `humanWritten` is floored at 80 before clamping, `overallScore` is capped at
/// 20, and when the two AI buckets together exceed 30 they are rescaled to 30.
/// Final ranges: overall 0-30, generated 0-25, refined 0-15, human 70-100.
pub fn conservative_scores(ai_generated: i32, ai_refined: i32) -> ScoreBreakdown {
    let mut generated = ai_generated.max(0);
    let mut refined = ai_refined.max(0);

    let human = (100 - generated - refined).max(80);
    let overall = ((generated + refined) / 2).min(20);

    let total = generated + refined;
    if total > 30 {
        generated = (generated as f64 * 30.0 / total as f64).round() as i32;
        refined = 30 - generated;
    }

    ScoreBreakdown {
        overall_score: overall.clamp(0, 30) as u32,
        ai_generated: generated.clamp(0, 25) as u32,
        ai_refined: refined.clamp(0, 15) as u32,
        human_written: human.clamp(70, 100) as u32,
    }
}

/// Raw buckets from document-wide indicator counts, before the bounds.
fn indicator_buckets(ai: usize, human: usize) -> (i32, i32) {
    let ai = ai as i32;
    if ai > 3 && human < 2 {
        ((ai * 5).min(30), 0)
    } else if ai > 1 && human < 3 {
        (0, (ai * 3).min(15))
    } else {
        (0, 0)
    }
}

pub fn classify(text: &str) -> AnalysisResult {
    let sentences: Vec<SentenceScore> = split_sentences(text)
        .iter()
        .take(MAX_SENTENCES)
        .map(|s| annotate_sentence(&s.text))
        .collect();

    let ai = count_ai_indicators(text);
    let human = count_human_indicators(text);
    let (generated, refined) = indicator_buckets(ai, human);
    let scores = conservative_scores(generated, refined);
    let detailed_analysis = detailed_analysis(text, &sentences, ai, human);

    AnalysisResult {
        overall_score: scores.overall_score,
        ai_generated: scores.ai_generated,
        ai_refined: scores.ai_refined,
        human_written: scores.human_written,
        sentences,
        detailed_analysis,
    }
}

fn to_percent(value: f64) -> u32 {
    value.round().clamp(0.0, 100.0) as u32
}

/// Per-dimension breakdown shown next to the bucket scores.
pub fn detailed_analysis(
    text: &str,
    sentences: &[SentenceScore],
    ai_indicators: usize,
    human_indicators: usize,
) -> DetailedAnalysis {
    if sentences.is_empty() || word_tokens(text).is_empty() {
        return DetailedAnalysis::default();
    }

    let vocabulary = to_percent(lexical_diversity(text) * 100.0);

    // Sentence rhythm: varied lengths read as human
    let lengths: Vec<f64> = sentences
        .iter()
        .map(|s| word_tokens(&s.text).len() as f64)
        .collect();
    let syntax = if lengths.len() < 2 {
        50
    } else {
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        let var = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
        let cv = if mean > 0.0 { var.sqrt() / mean } else { 0.0 };
        to_percent(50.0 + cv * 100.0)
    };

    let coherence = (60 + 5 * ai_indicators.min(8) as u32).min(100);

    let mean_prob = sentences.iter().map(|s| s.ai_probability as f64).sum::<f64>()
        / sentences.len() as f64;
    let creativity = to_percent(100.0 - mean_prob + 2.0 * human_indicators as f64);

    DetailedAnalysis {
        vocabulary,
        syntax,
        coherence,
        creativity,
    }
}
