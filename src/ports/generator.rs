use async_trait::async_trait;

use crate::helper::error_chain_fmt;

/// One chat-completion turn: fixed system instruction, single user message,
/// pinned decoding parameters.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Chat-completion provider. Returns the raw text of the first choice;
/// interpreting (or distrusting) that text is the caller's business.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GeneratorError>;

    /// Model identifier reported in responses for observability
    fn model_name(&self) -> &str;
}

#[derive(thiserror::Error)]
pub enum GeneratorError {
    #[error("Generation provider is not configured: {0}")]
    MissingCredentials(String),
    #[error("Generation provider error: {0}")]
    Provider(String),
    #[error("Failed to reach generation provider: {0}")]
    Transport(#[from] reqwest::Error),
}

impl std::fmt::Debug for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
