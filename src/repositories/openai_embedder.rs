use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::configuration::ProviderSettings;
use crate::ports::{Embedder, EmbedderError};

/// Embedding client for any OpenAI-compatible `/embeddings` endpoint
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<Secret<String>>,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: settings.api_base.clone(),
            api_key: settings.api_key.clone(),
            model: settings.embedding_model.clone(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    #[tracing::instrument(name = "Generating query embedding", skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        // Checked per request, so a missing key is a request-time
        // configuration error rather than a startup crash
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            EmbedderError::MissingCredentials("no API key for the embedding provider".into())
        })?;

        let response = self
            .client
            .post(format!("{}/embeddings", self.api_base))
            .bearer_auth(api_key.expose_secret())
            .json(&serde_json::json!({
                "model": self.model,
                "input": text,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedderError::Provider(format!("{status}: {message}")));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbedderError::Provider(format!("invalid embeddings payload: {e}")))?;

        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbedderError::Provider("embeddings response carried no data".into()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
