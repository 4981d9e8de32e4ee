use async_trait::async_trait;

use crate::helper::error_chain_fmt;

/// Turns a query text into a fixed-dimension vector usable as a
/// similarity-search key. The vector is never persisted by this service.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;

    /// Model identifier reported in responses for observability
    fn model_name(&self) -> &str;
}

#[derive(thiserror::Error)]
pub enum EmbedderError {
    #[error("Embedding provider is not configured: {0}")]
    MissingCredentials(String),
    #[error("Embedding provider error: {0}")]
    Provider(String),
    #[error("Failed to reach embedding provider: {0}")]
    Transport(#[from] reqwest::Error),
}

impl std::fmt::Debug for EmbedderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
