// Writing Tools Data Models
// Wire types for the detector and the text utilities (camelCase JSON)

use serde::{Deserialize, Serialize};

// ============ Detection ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceScore {
    pub text: String,
    pub ai_probability: u32,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub highlighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub vocabulary: u32,
    pub syntax: u32,
    pub coherence: u32,
    pub creativity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: u32,
    pub ai_generated: u32,
    pub ai_refined: u32,
    pub human_written: u32,
    pub sentences: Vec<SentenceScore>,
    pub detailed_analysis: DetailedAnalysis,
}

/// Which path produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Model,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub word_count: usize,
    pub language: String,
    pub highlighted_text: String,
    pub engine: Engine,
    pub request_id: String,
}

// ============ Paraphrase ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordChange {
    pub original: String,
    pub replacement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseResponse {
    pub paraphrased_text: String,
    pub mode: String,
    pub changes: Vec<WordChange>,
    pub engine: Engine,
}

// ============ Grammar ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GrammarRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarIssue {
    pub kind: String,
    pub message: String,
    pub original: String,
    pub suggestion: String,
    /// UTF-8 byte offset of `original` in the submitted text, when known.
    #[serde(default)]
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarResponse {
    pub corrected_text: String,
    pub issues: Vec<GrammarIssue>,
    pub score: u32,
    pub engine: Engine,
}

// ============ Summarize ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    pub summary: String,
    pub key_points: Vec<String>,
    pub compression_ratio: f64,
    pub engine: Engine,
}

// ============ Plagiarism ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismSource {
    pub title: String,
    pub url: String,
    pub similarity: u32,
    pub matched_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismResponse {
    pub originality_score: u32,
    pub plagiarism_score: u32,
    pub sources: Vec<PlagiarismSource>,
    pub engine: Engine,
}

// ============ Humanize ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeResponse {
    pub humanized_text: String,
    pub tone: String,
    /// Detector `overallScore` before and after rewriting.
    pub score_before: u32,
    pub score_after: u32,
    pub engine: Engine,
}

// ============ Citation ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CitationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub pages: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub accessed: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationResponse {
    pub citation: String,
    pub in_text_citation: String,
    pub style: String,
    pub engine: Engine,
}

// ============ Translate ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
    #[serde(default)]
    pub source_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub engine: Engine,
}

// ============ Health ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_configured: bool,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_response_flattens_analysis() {
        let resp = DetectResponse {
            analysis: AnalysisResult {
                overall_score: 5,
                ai_generated: 0,
                ai_refined: 10,
                human_written: 90,
                sentences: vec![],
                detailed_analysis: DetailedAnalysis::default(),
            },
            word_count: 3,
            language: "en".to_string(),
            highlighted_text: "a b c".to_string(),
            engine: Engine::Local,
            request_id: "id".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["humanWritten"], 90);
        assert_eq!(json["aiRefined"], 10);
        assert_eq!(json["wordCount"], 3);
        assert_eq!(json["engine"], "local");
        assert!(json["detailedAnalysis"]["vocabulary"].is_number());
    }

    #[test]
    fn test_requests_tolerate_missing_fields() {
        let req: DetectRequest = serde_json::from_str("{}").unwrap();
        assert!(req.text.is_none());
        let req: CitationRequest = serde_json::from_str(r#"{"title":"T"}"#).unwrap();
        assert!(req.authors.is_empty());
        let req: TranslateRequest =
            serde_json::from_str(r#"{"text":"hi","targetLanguage":"es"}"#).unwrap();
        assert_eq!(req.target_language.as_deref(), Some("es"));
    }
}
