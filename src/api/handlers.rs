// HTTP Handlers
// One handler per tool; provider failures never surface as errors here

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use crate::models::*;
use crate::services::detection::detect_text;
use crate::services::text_processor::word_count;
use crate::services::tools::{
    check_grammar, check_plagiarism, generate_citation, humanize, paraphrase, summarize, translate,
    ParaphraseMode, SummaryFormat, SummaryLength, Tone,
};

use super::error::ApiError;
use super::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Trimmed value of a required string field; blank counts as missing.
fn require(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("Missing required field: {}", field))),
    }
}

fn option_or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default)
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_configured: state.completer.is_some(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn detect(
    State(state): State<AppState>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> ApiResult<DetectResponse> {
    let Json(req) = payload?;
    let text = require(req.text, "text")?;
    Ok(Json(detect_text(state.completer(), &text, req.language.as_deref()).await))
}

pub async fn paraphrase_text(
    State(state): State<AppState>,
    payload: Result<Json<ParaphraseRequest>, JsonRejection>,
) -> ApiResult<ParaphraseResponse> {
    let Json(req) = payload?;
    let text = require(req.text, "text")?;
    let mode = ParaphraseMode::from_str(option_or(&req.mode, "standard"));
    info!("[API] paraphrase mode={} words={}", mode.as_str(), word_count(&text));
    Ok(Json(paraphrase(state.completer(), &text, mode).await))
}

pub async fn grammar(
    State(state): State<AppState>,
    payload: Result<Json<GrammarRequest>, JsonRejection>,
) -> ApiResult<GrammarResponse> {
    let Json(req) = payload?;
    let text = require(req.text, "text")?;
    Ok(Json(check_grammar(state.completer(), &text, req.language.as_deref()).await))
}

pub async fn summarize_text(
    State(state): State<AppState>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> ApiResult<SummarizeResponse> {
    let Json(req) = payload?;
    let text = require(req.text, "text")?;
    let length = SummaryLength::from_str(option_or(&req.length, "medium"));
    let format = SummaryFormat::from_str(option_or(&req.format, "paragraph"));
    info!(
        "[API] summarize length={} format={} words={}",
        length.as_str(),
        format.as_str(),
        word_count(&text)
    );
    Ok(Json(summarize(state.completer(), &text, length, format).await))
}

pub async fn plagiarism(
    State(state): State<AppState>,
    payload: Result<Json<PlagiarismRequest>, JsonRejection>,
) -> ApiResult<PlagiarismResponse> {
    let Json(req) = payload?;
    let text = require(req.text, "text")?;
    Ok(Json(check_plagiarism(state.completer(), &text).await))
}

pub async fn humanize_text(
    State(state): State<AppState>,
    payload: Result<Json<HumanizeRequest>, JsonRejection>,
) -> ApiResult<HumanizeResponse> {
    let Json(req) = payload?;
    let text = require(req.text, "text")?;
    let tone = Tone::from_str(option_or(&req.tone, "casual"));
    Ok(Json(humanize(state.completer(), &text, tone).await))
}

pub async fn citation(
    State(state): State<AppState>,
    payload: Result<Json<CitationRequest>, JsonRejection>,
) -> ApiResult<CitationResponse> {
    let Json(req) = payload?;
    require(req.title.clone(), "title")?;
    Ok(Json(generate_citation(state.completer(), &req).await))
}

pub async fn translate_text(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> ApiResult<TranslateResponse> {
    let Json(req) = payload?;
    let text = require(req.text, "text")?;
    let target = require(req.target_language, "targetLanguage")?;
    info!("[API] translate target={} words={}", target.trim(), word_count(&text));
    Ok(Json(
        translate(state.completer(), &text, &target, req.source_language.as_deref()).await,
    ))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
