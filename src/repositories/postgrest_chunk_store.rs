use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};

use crate::configuration::VectorStoreSettings;
use crate::domain::entities::document_match::DocumentMatch;
use crate::ports::{ChunkSearch, ChunkStore, ChunkStoreError};

/// Name of the stored procedure performing the nearest-chunks lookup
const MATCH_FUNCTION: &str = "match_baikal_documents";

/// Chunk store backed by a PostgREST RPC endpoint over a pgvector-indexed
/// table. The service only ever calls the match function, it never writes.
pub struct PostgrestChunkStore {
    client: reqwest::Client,
    url: Option<String>,
    service_key: Option<Secret<String>>,
}

impl PostgrestChunkStore {
    pub fn new(settings: &VectorStoreSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: settings.url.clone(),
            service_key: settings.service_key.clone(),
        }
    }
}

#[async_trait]
impl ChunkStore for PostgrestChunkStore {
    #[tracing::instrument(
        name = "Searching nearest chunks",
        skip(self, search),
        fields(match_count = search.match_count, match_threshold = search.match_threshold)
    )]
    async fn find_nearest(
        &self,
        search: &ChunkSearch,
    ) -> Result<Vec<DocumentMatch>, ChunkStoreError> {
        let url = self.url.as_ref().ok_or_else(|| {
            ChunkStoreError::MissingCredentials("no URL for the document store".into())
        })?;
        let service_key = self.service_key.as_ref().ok_or_else(|| {
            ChunkStoreError::MissingCredentials("no service key for the document store".into())
        })?;

        let response = self
            .client
            .post(format!("{url}/rest/v1/rpc/{MATCH_FUNCTION}"))
            .header("apikey", service_key.expose_secret())
            .bearer_auth(service_key.expose_secret())
            .json(&serde_json::json!({
                "query_embedding": search.embedding,
                "match_threshold": search.match_threshold,
                "match_count": search.match_count,
                "filter_org_id": search.org_id,
                "filter_project_id": search.project_id,
                "filter_vertical_id": search.vertical_id,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(ChunkStoreError::Store(format!("{status}: {message}")));
        }

        // Rows arrive ordered by descending similarity, kept as-is
        response
            .json::<Vec<DocumentMatch>>()
            .await
            .map_err(|e| ChunkStoreError::Store(format!("invalid match rows: {e}")))
    }
}
