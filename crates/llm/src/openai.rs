//! An OpenAI-compatible `ChatCompleter` implementation (§6: the abstract
//! contract ships one concrete adapter so the pipeline has something to run
//! against). Grounded in the teacher's `OpenAIBackend`/`OpenAIConfig`
//! (generalized here to a plain `{base_url, api_key, model}` trio per §6,
//! since the subtitle contract has no Azure/organization surface).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use subtitle_core::{
    ChatCompleter, ChatOptions, CompletionResult, Message, PipelineError, Result, Role,
};

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(60),
        }
    }
}

pub struct OpenAiChatCompleter {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiChatCompleter {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Llm {
                retryable: false,
                message: e.to_string(),
            })?;
        Ok(Self { config, client })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn execute(&self, request: &OpenAiChatRequest) -> Result<OpenAiChatResponse> {
        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| PipelineError::Llm {
                retryable: true,
                message: format!("network error: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let retryable = status.as_u16() == 429 || status.is_server_error();
            return Err(PipelineError::Llm {
                retryable,
                message: format!("http {status}: {body}"),
            });
        }

        response.json().await.map_err(|e| PipelineError::Llm {
            retryable: false,
            message: format!("invalid response json: {e}"),
        })
    }
}

#[async_trait]
impl ChatCompleter for OpenAiChatCompleter {
    async fn complete(&self, messages: &[Message], options: ChatOptions) -> Result<CompletionResult> {
        let request = OpenAiChatRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(OpenAiMessage::from).collect(),
            temperature: options.temperature,
        };

        let mut backoff = Duration::from_millis(200);
        let mut last_error = None;

        for attempt in 0..=options.max_retries {
            if options.abort_signal.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            if attempt > 0 {
                tracing::warn!(attempt, ?backoff, "retrying chat completion");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute(&request).await {
                Ok(response) => {
                    let choice = response
                        .choices
                        .into_iter()
                        .next()
                        .ok_or_else(|| PipelineError::Llm {
                            retryable: false,
                            message: "no choices in response".into(),
                        })?;
                    let tokens_used = response
                        .usage
                        .map(|u| u.total_tokens)
                        .unwrap_or(0);
                    return Ok(CompletionResult {
                        content: choice.message.content,
                        tokens_used,
                    });
                }
                Err(e @ PipelineError::Llm { retryable: true, .. }) => {
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(PipelineError::Llm {
            retryable: true,
            message: "exhausted retries".into(),
        }))
    }
}

#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&Message> for OpenAiMessage {
    fn from(m: &Message) -> Self {
        Self {
            role: match m.role {
                Role::System => "system".to_string(),
                Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            content: m.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    total_tokens: u64,
}
