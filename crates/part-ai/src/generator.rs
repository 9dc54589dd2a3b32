use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub endpoint: String,
    pub max_attempts: usize,
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_attempts: 3,
            temperature: 0.2,
        }
    }
}

/// One round-trip to the generator.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub system_prompt: &'a str,
    pub user_prompt: &'a str,
    /// Output of the previous attempt, when this is a retry.
    pub previous_output: Option<&'a str>,
    /// Why the previous output was rejected.
    pub feedback: &'a [String],
    pub attempt: usize,
}

/// Free-text to program collaborator. Local or remote, the core does not care.
pub trait LanguageModel {
    fn generate(&mut self, request: GenerationRequest<'_>) -> Result<String, String>;
}

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("response has no message content")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Blocking client for an Ollama server's `/api/chat` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::blocking::Client,
    config: GenerationConfig,
}

impl OllamaClient {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.endpoint.trim_end_matches('/'))
    }

    fn request_body(&self, request: &GenerationRequest<'_>) -> serde_json::Value {
        let mut messages = vec![
            json!({"role": "system", "content": request.system_prompt}),
            json!({"role": "user", "content": request.user_prompt}),
        ];
        if let Some(previous) = request.previous_output {
            messages.push(json!({"role": "assistant", "content": previous}));
            messages.push(json!({
                "role": "user",
                "content": format!(
                    "That answer was rejected: {}. Reply again following the output format.",
                    request.feedback.join("; ")
                ),
            }));
        }
        json!({
            "model": self.config.model,
            "messages": messages,
            "stream": false,
            "options": {"temperature": self.config.temperature},
        })
    }

    pub fn chat(&self, request: &GenerationRequest<'_>) -> Result<String, GeneratorError> {
        let url = self.chat_url();
        debug!(%url, model = %self.config.model, attempt = request.attempt, "sending chat request");

        let response = self
            .http
            .post(&url)
            .json(&self.request_body(request))
            .send()
            .map_err(|source| GeneratorError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(%url, %status, "generator returned an error status");
            return Err(GeneratorError::Status { url, status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|source| GeneratorError::Transport { url, source })?;
        let content = parsed
            .message
            .map(|message| message.content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GeneratorError::EmptyResponse)?;
        Ok(content)
    }
}

impl LanguageModel for OllamaClient {
    fn generate(&mut self, request: GenerationRequest<'_>) -> Result<String, String> {
        self.chat(&request).map_err(|err| err.to_string())
    }
}
