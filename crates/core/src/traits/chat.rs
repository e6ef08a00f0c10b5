//! `ChatCompleter` capability (§6, used by C6 and C8).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::traits::cancel::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_retries: u32,
    pub abort_signal: CancellationToken,
}

#[derive(Debug, Clone)]
pub struct CompletionResult {
    pub content: String,
    pub tokens_used: u64,
}

/// A chat-completion-capable language model. Implementations own transport,
/// auth, and retry/backoff; the contract only names the single call the
/// pipeline depends on.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        options: ChatOptions,
    ) -> Result<CompletionResult>;
}
