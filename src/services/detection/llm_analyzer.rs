// LLM Analyzer
// Model-backed AI-content detection with validation and heuristic fallback

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{AnalysisResult, DetailedAnalysis, DetectResponse, Engine, SentenceScore};
use crate::services::providers::{parse_json_reply, CompletionService, ProviderError};
use crate::services::text_processor::{detect_language, preview, word_count};

use super::heuristic::{classify, conservative_scores, HIGHLIGHT_THRESHOLD, MAX_SENTENCES};
use super::highlight::highlight_matches;

const DETECTION_SYSTEM_PROMPT: &str = r#"You are an expert reviewer of writing provenance. Decide how much of the given text was generated by an AI model, refined by one, or written by a person.

Be conservative: ordinary, plain or slightly formal writing is human. Only report AI involvement when the evidence is strong and repeated.

Return JSON only, with these fields:
- aiGenerated: integer 0-100, share of text that reads as generated
- aiRefined: integer 0-100, share that reads as human text polished by AI
- humanWritten: integer 0-100
- sentences: array of up to 20 objects {"text": exact sentence from the input, "aiProbability": integer 0-100, "patterns": array of short labels}
- detailedAnalysis: {"vocabulary": 0-100, "syntax": 0-100, "coherence": 0-100, "creativity": 0-100}"#;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ModelAnalysis {
    ai_generated: f64,
    ai_refined: f64,
    sentences: Vec<ModelSentence>,
    detailed_analysis: Option<ModelDetailed>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ModelSentence {
    text: String,
    ai_probability: f64,
    patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ModelDetailed {
    vocabulary: Option<f64>,
    syntax: Option<f64>,
    coherence: Option<f64>,
    creativity: Option<f64>,
}

fn percent(value: f64) -> u32 {
    if value.is_finite() {
        value.round().clamp(0.0, 100.0) as u32
    } else {
        0
    }
}

fn validate_sentences(raw: Vec<ModelSentence>) -> Vec<SentenceScore> {
    raw.into_iter()
        .filter(|s| !s.text.trim().is_empty())
        .take(MAX_SENTENCES)
        .map(|s| {
            let ai_probability = percent(s.ai_probability);
            let mut patterns: Vec<String> = s
                .patterns
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            patterns.sort();
            patterns.dedup();
            SentenceScore {
                text: s.text.trim().to_string(),
                ai_probability,
                patterns,
                highlighted: ai_probability > HIGHLIGHT_THRESHOLD,
            }
        })
        .collect()
}

/// Clamp a model reply into an `AnalysisResult` under the same conservative
/// bounds the heuristic uses; gaps are filled from `local`.
fn validate_model_analysis(reply: ModelAnalysis, local: AnalysisResult) -> AnalysisResult {
    let scores = conservative_scores(
        percent(reply.ai_generated) as i32,
        percent(reply.ai_refined) as i32,
    );

    let mut sentences = validate_sentences(reply.sentences);
    if sentences.is_empty() {
        sentences = local.sentences;
    }

    let fallback = local.detailed_analysis;
    let detailed_analysis = match reply.detailed_analysis {
        Some(d) => DetailedAnalysis {
            vocabulary: d.vocabulary.map(percent).unwrap_or(fallback.vocabulary),
            syntax: d.syntax.map(percent).unwrap_or(fallback.syntax),
            coherence: d.coherence.map(percent).unwrap_or(fallback.coherence),
            creativity: d.creativity.map(percent).unwrap_or(fallback.creativity),
        },
        None => fallback,
    };

    AnalysisResult {
        overall_score: scores.overall_score,
        ai_generated: scores.ai_generated,
        ai_refined: scores.ai_refined,
        human_written: scores.human_written,
        sentences,
        detailed_analysis,
    }
}

/// Ask the model for an analysis. Errors are returned, not swallowed.
pub async fn analyze_with_model(
    completer: &dyn CompletionService,
    text: &str,
) -> Result<AnalysisResult, ProviderError> {
    let user_prompt = format!("Analyze the following text and return JSON:\n\n{}", text);
    let result = completer.complete(DETECTION_SYSTEM_PROMPT, &user_prompt).await?;
    info!(
        "[LLM_ANALYZER] reply from {} latency_ms={}",
        completer.label(),
        result.latency_ms
    );
    let reply: ModelAnalysis = parse_json_reply(&result.content)?;
    Ok(validate_model_analysis(reply, classify(text)))
}

/// Model analysis when available, heuristic otherwise. Never fails.
pub async fn analyze_text(
    completer: Option<&dyn CompletionService>,
    text: &str,
) -> (AnalysisResult, Engine) {
    let Some(completer) = completer else {
        info!("[LLM_ANALYZER] no API key configured, using heuristic classifier");
        return (classify(text), Engine::Local);
    };

    match analyze_with_model(completer, text).await {
        Ok(analysis) => (analysis, Engine::Model),
        Err(e) => {
            warn!(
                "[LLM_ANALYZER] model analysis failed, using heuristic classifier: {} (text: {})",
                e,
                preview(text, 40)
            );
            (classify(text), Engine::Local)
        }
    }
}

/// Full detection payload: analysis plus word count, language and highlights.
pub async fn detect_text(
    completer: Option<&dyn CompletionService>,
    text: &str,
    language: Option<&str>,
) -> DetectResponse {
    let request_id = Uuid::new_v4().to_string();
    let (analysis, engine) = analyze_text(completer, text).await;
    let highlighted_text = highlight_matches(text, &analysis.sentences);
    let language = language
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| detect_language(text));

    info!(
        request_id = %request_id,
        engine = ?engine,
        overall = analysis.overall_score,
        human = analysis.human_written,
        "detection.completed"
    );

    DetectResponse {
        word_count: word_count(text),
        language,
        highlighted_text,
        engine,
        request_id,
        analysis,
    }
}
