//! LLM Client: the single point of entry for all model calls in the screener.
//!
//! ARCHITECTURAL RULE: No other module may talk to a model server directly.
//! Agents depend on the `StructuredLlm` trait; `LlmClient` is the production
//! implementation.
//!
//! Two wire formats are supported:
//! - Ollama (`POST {base}/api/chat`, `format: "json"`) for local models
//! - OpenAI-compatible (`POST {base}/chat/completions`, `json_object` response format)
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use prompts::{JSON_ONLY_REMINDER, JSON_OUTPUT_SUFFIX};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM returned JSON that is not an object")]
    NotAnObject,

    #[error("The {0} provider requires an api_key")]
    MissingApiKey(LlmProvider),
}

/// Which backend serves completions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    #[serde(alias = "local")]
    Ollama,
    #[serde(alias = "openai-compatible", alias = "cloud")]
    OpenAi,
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Ollama => f.write_str("ollama"),
            LlmProvider::OpenAi => f.write_str("openai"),
        }
    }
}

/// Connection settings for `LlmClient`, derived from `Config`.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub max_json_attempts: u32,
}

impl LlmSettings {
    /// Full URL of the chat endpoint for the configured provider.
    pub fn endpoint(&self) -> String {
        let default_base = match self.provider {
            LlmProvider::Ollama => DEFAULT_OLLAMA_URL,
            LlmProvider::OpenAi => DEFAULT_OPENAI_URL,
        };
        let base = self
            .api_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(default_base)
            .trim_end_matches('/');

        match self.provider {
            LlmProvider::Ollama => format!("{base}/api/chat"),
            LlmProvider::OpenAi => format!("{base}/chat/completions"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: Option<ResponseMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI nests the message under `error.message`; Ollama sends `error` as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Nested { error: ApiErrorDetail },
    Flat { error: String },
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait seam used by the extraction agents
// ────────────────────────────────────────────────────────────────────────────

/// A model that can answer a prompt, and by extension return a JSON object.
#[async_trait]
pub trait StructuredLlm: Send + Sync {
    /// Sends one prompt and returns the raw text content of the reply.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;

    /// How many times `complete_json` asks before giving up on invalid JSON.
    fn max_json_attempts(&self) -> u32 {
        1
    }

    /// Asks for a JSON object, re-asking when the reply does not parse.
    async fn complete_json(&self, prompt: &str, system: &str) -> Result<Value, LlmError> {
        let prompt = format!("{prompt}\n\n{JSON_OUTPUT_SUFFIX}");
        let system = format!("{system}\n{JSON_ONLY_REMINDER}");
        let attempts = self.max_json_attempts().max(1);

        let mut last_error = None;
        for attempt in 1..=attempts {
            let text = self.complete(&prompt, &system).await?;
            match parse_json_object(&text) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("LLM reply {attempt}/{attempts} was not a JSON object: {e}");
                    debug!("Raw reply was: ---{text}---");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(LlmError::EmptyContent))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Production client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by the pipeline.
/// Wraps either backend with retry logic on rate limits and server errors.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
    endpoint: String,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        if settings.provider == LlmProvider::OpenAi
            && settings.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(LlmError::MissingApiKey(settings.provider));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let endpoint = settings.endpoint();

        Ok(Self {
            client,
            settings,
            endpoint,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn provider(&self) -> LlmProvider {
        self.settings.provider
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Makes a raw call to the configured backend and returns the reply text.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let body = build_request_body(&self.settings, prompt, system)?;

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(&self.endpoint).json(&body);
            if let Some(key) = self.settings.api_key.as_deref() {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            let text = response.text().await?;

            if !status.is_success() {
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(&text),
                });
            }

            let content = parse_completion(self.settings.provider, &text)?;
            debug!(
                "LLM ({}) call succeeded: {} chars returned",
                self.settings.model,
                content.len()
            );
            return Ok(content);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl StructuredLlm for LlmClient {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.call(prompt, system).await
    }

    fn max_json_attempts(&self) -> u32 {
        self.settings.max_json_attempts
    }
}

/// Exponential backoff before retry `attempt`: 1s, 2s, 4s...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << attempt.saturating_sub(1)))
}

/// Builds the provider-specific JSON request body.
fn build_request_body(
    settings: &LlmSettings,
    prompt: &str,
    system: &str,
) -> Result<Value, LlmError> {
    let messages = vec![
        ChatMessage {
            role: "system",
            content: system,
        },
        ChatMessage {
            role: "user",
            content: prompt,
        },
    ];

    let body = match settings.provider {
        LlmProvider::Ollama => serde_json::to_value(OllamaRequest {
            model: &settings.model,
            messages,
            stream: false,
            format: "json",
        })?,
        LlmProvider::OpenAi => serde_json::to_value(OpenAiRequest {
            model: &settings.model,
            messages,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        })?,
    };

    Ok(body)
}

/// Extracts the trimmed reply text from a successful response body.
fn parse_completion(provider: LlmProvider, body: &str) -> Result<String, LlmError> {
    let content = match provider {
        LlmProvider::Ollama => {
            let response: OllamaResponse = serde_json::from_str(body)?;
            debug!(
                "Ollama usage: prompt_eval_count={:?}, eval_count={:?}",
                response.prompt_eval_count, response.eval_count
            );
            response.message.and_then(|m| m.content)
        }
        LlmProvider::OpenAi => {
            let response: OpenAiResponse = serde_json::from_str(body)?;
            if let Some(usage) = &response.usage {
                debug!(
                    "OpenAI usage: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }
            response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
        }
    };

    let content = content.map(|c| c.trim().to_string()).unwrap_or_default();
    if content.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(content)
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody::Nested { error }) => error.message,
        Ok(ApiErrorBody::Flat { error }) => error,
        Err(_) => body.to_string(),
    }
}

/// Parses model output as a JSON object, tolerating markdown code fences.
pub fn parse_json_object(text: &str) -> Result<Value, LlmError> {
    let value: Value = serde_json::from_str(strip_json_fences(text))?;
    if !value.is_object() {
        return Err(LlmError::NotAnObject);
    }
    Ok(value)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
