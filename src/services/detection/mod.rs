// Detection Module
// AI-content detection organized into specialized submodules:
// - patterns: named indicator table (pattern name -> detector)
// - heuristic: conservative local classifier
// - highlight: marks flagged sentences in the original text
// - llm_analyzer: model-backed detection with heuristic fallback

pub mod patterns;
pub mod heuristic;
pub mod highlight;
pub mod llm_analyzer;

pub use patterns::{matched_labels, patterns, IndicatorKind, IndicatorPattern};
pub use heuristic::{
    annotate_sentence,
    classify,
    conservative_scores,
    count_ai_indicators,
    count_human_indicators,
    score_sentence,
    ScoreBreakdown,
    HIGHLIGHT_THRESHOLD,
    MAX_SENTENCES,
};
pub use highlight::{highlight_matches, HIGHLIGHT_MARKER};
pub use llm_analyzer::{analyze_text, analyze_with_model, detect_text};
