use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::configuration::ProviderSettings;
use crate::ports::{CompletionRequest, Generator, GeneratorError};

/// Chat-completion client for any OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<Secret<String>>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: settings.api_base.clone(),
            api_key: settings.api_key.clone(),
            model: settings.generation_model.clone(),
        }
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    #[tracing::instrument(name = "Calling chat-completion provider", skip(self, request))]
    async fn complete(&self, request: CompletionRequest) -> Result<String, GeneratorError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            GeneratorError::MissingCredentials("no API key for the generation provider".into())
        })?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(api_key.expose_secret())
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": request.system },
                    { "role": "user", "content": request.user },
                ],
                "temperature": request.temperature,
                "max_tokens": request.max_tokens,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Provider(format!("{status}: {message}")));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Provider(format!("invalid completion payload: {e}")))?;

        // An empty reply is not a provider error: the pipeline substitutes
        // its own fixed fallback string
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}
