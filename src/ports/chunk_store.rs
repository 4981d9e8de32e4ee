use async_trait::async_trait;

use crate::domain::entities::document_match::DocumentMatch;
use crate::helper::error_chain_fmt;

/// Parameters of a single nearest-chunks lookup.
///
/// An absent scope filter means "unscoped": it matches every chunk.
#[derive(Debug, Clone)]
pub struct ChunkSearch {
    pub embedding: Vec<f32>,
    pub match_threshold: f64,
    pub match_count: u32,
    pub org_id: Option<String>,
    pub project_id: Option<String>,
    pub vertical_id: Option<String>,
}

/// Vector-indexed document-chunk store, read-only from this service's
/// perspective. Results come back ordered by descending similarity as the
/// store returns them.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    async fn find_nearest(
        &self,
        search: &ChunkSearch,
    ) -> Result<Vec<DocumentMatch>, ChunkStoreError>;
}

#[derive(thiserror::Error)]
pub enum ChunkStoreError {
    #[error("Document store is not configured: {0}")]
    MissingCredentials(String),
    #[error("Document store error: {0}")]
    Store(String),
    #[error("Failed to reach document store: {0}")]
    Transport(#[from] reqwest::Error),
}

impl std::fmt::Debug for ChunkStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
