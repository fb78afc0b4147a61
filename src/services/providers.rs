// Completion Provider Service
// OpenAI-compatible chat completions behind the CompletionService trait

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::config_store::{AppConfig, ProviderConfig, ProxyConfig};

pub const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Environment variables checked for the API key, in order.
const API_KEY_ENV: [&str; 2] = ["WRITING_TOOLS_API_KEY", "OPENAI_API_KEY"];

static REASONING_JSON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// A text-completion backend: one system prompt, one user prompt, one reply.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<ChatResult, ProviderError>;

    /// `name:model` label used in logs.
    fn label(&self) -> String;
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    reasoning_content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
    reasoning_content: Option<String>,
}

pub struct ProviderClient {
    client: Client,
    url: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    temperature: f64,
    json_mode: bool,
}

impl ProviderClient {
    pub fn new(
        settings: &ProviderConfig,
        proxy: Option<&ProxyConfig>,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let mut builder = Client::builder().timeout(Duration::from_secs(settings.timeout_secs));
        if let Some(proxy) = proxy.filter(|p| p.enabled) {
            if let Some(url) = proxy.https.as_deref().or(proxy.http.as_deref()) {
                builder = builder.proxy(reqwest::Proxy::all(url)?);
            }
        }

        Ok(Self {
            client: builder.build()?,
            url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            json_mode: settings.json_mode,
        })
    }

    /// Build a client from the loaded config, or `None` when no key is configured.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, ProviderError> {
        match get_api_key(config) {
            Some(key) => Self::new(&config.provider, config.proxy.as_ref(), key).map(Some),
            None => Ok(None),
        }
    }

    async fn call_chat_api(&self, system: &str, user: &str) -> Result<ChatResult, ProviderError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            response_format: if self.json_mode {
                Some(ResponseFormat {
                    r#type: "json_object".to_string(),
                })
            } else {
                None
            },
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let message = data
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref());

        let mut content = message
            .and_then(|m| m.content.clone())
            .filter(|c| !c.trim().is_empty());

        let reasoning = message
            .and_then(|m| m.reasoning_content.clone())
            .or(data.reasoning_content);

        // Some compatible servers put the JSON answer in the reasoning channel
        if content.is_none() {
            if let Some(ref r) = reasoning {
                if let Some(m) = REASONING_JSON_RE.find(r) {
                    content = Some(m.as_str().to_string());
                }
            }
        }

        let content = content.ok_or(ProviderError::MissingContent)?;

        Ok(ChatResult {
            content,
            latency_ms,
            reasoning,
        })
    }
}

#[async_trait]
impl CompletionService for ProviderClient {
    async fn complete(&self, system: &str, user: &str) -> Result<ChatResult, ProviderError> {
        self.call_chat_api(system, user).await
    }

    fn label(&self) -> String {
        format!("openai-compatible:{}", self.model)
    }
}

/// Get API key from environment or config file
pub fn get_api_key(config: &AppConfig) -> Option<String> {
    for key in API_KEY_ENV {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }

    config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

/// Extract the outermost JSON object from a model reply.
pub fn extract_json(content: &str) -> Result<&str, ProviderError> {
    let content = content.trim();
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&content[start..=end]),
        (Some(_), _) => Err(ProviderError::JsonError("Invalid JSON response".to_string())),
        _ => Err(ProviderError::JsonError("No JSON in response".to_string())),
    }
}

/// Parse a model reply into `T`, tolerating prose or code fences around the object.
pub fn parse_json_reply<T: DeserializeOwned>(content: &str) -> Result<T, ProviderError> {
    let json_str = extract_json(content)?;
    serde_json::from_str::<T>(json_str).map_err(|e| ProviderError::JsonError(e.to_string()))
}
