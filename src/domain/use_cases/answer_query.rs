use std::sync::Arc;

use tracing::info;

use crate::configuration::RetrievalSettings;
use crate::domain::context::{assemble_context, ContextBudget};
use crate::domain::entities::knowledge::{classify_knowledge, KnowledgeType};
use crate::domain::entities::source::Source;
use crate::helper::error_chain_fmt;
use crate::ports::{
    ChunkSearch, ChunkStore, ChunkStoreError, CompletionRequest, Embedder, EmbedderError,
    Generator, GeneratorError,
};

/// Grounding instruction: the answer may only use the supplied context
const LIBRARIAN_SYSTEM_PROMPT: &str = "Tu es Léa, l'assistante documentaire des conducteurs de travaux. \
Réponds à la question en t'appuyant EXCLUSIVEMENT sur le contexte documentaire fourni. \
N'utilise jamais de connaissances extérieures. \
Si le contexte ne permet pas de répondre, dis-le explicitement. \
Réponds de manière concise et professionnelle, et cite les documents utilisés quand c'est possible.";

/// Returned without any generation call when the search comes back empty
const NO_DOCUMENTS_RESPONSE: &str =
    "Je n'ai trouvé aucun document pertinent pour répondre à cette question.";

/// Returned when the generation provider answers with empty content
const EMPTY_GENERATION_RESPONSE: &str =
    "Je n'ai pas pu générer de réponse à partir des documents trouvés.";

#[derive(Debug, Clone)]
pub struct AnswerQueryRequest {
    /// Trimmed, non-empty (the handler validates it)
    pub query: String,
    pub org_id: Option<String>,
    pub project_id: Option<String>,
    pub vertical_id: Option<String>,
    pub match_threshold: f64,
    pub match_count: u32,
}

/// Terminal artifact of the pipeline, serialized as-is by the handler
#[derive(Debug)]
pub struct AnswerResult {
    pub response: String,
    pub sources: Vec<Source>,
    pub knowledge_type: KnowledgeType,
    pub documents_found: usize,
    pub model: String,
    pub embedding_model: String,
}

/// The retrieval-augmented answering pipeline:
/// embed, search, assemble a bounded context, classify provenance, generate.
///
/// No retry at any step: an upstream failure propagates immediately.
pub struct AnswerQueryUseCase {
    embedder: Arc<dyn Embedder>,
    chunk_store: Arc<dyn ChunkStore>,
    generator: Arc<dyn Generator>,
    settings: RetrievalSettings,
}

impl AnswerQueryUseCase {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        chunk_store: Arc<dyn ChunkStore>,
        generator: Arc<dyn Generator>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            embedder,
            chunk_store,
            generator,
            settings,
        }
    }

    pub fn default_match_threshold(&self) -> f64 {
        self.settings.default_match_threshold
    }

    pub fn default_match_count(&self) -> u32 {
        self.settings.default_match_count
    }

    #[tracing::instrument(
        name = "Answering query from document base",
        skip(self, request),
        fields(query = %request.query, project_id = ?request.project_id, org_id = ?request.org_id)
    )]
    pub async fn execute(
        &self,
        request: AnswerQueryRequest,
    ) -> Result<AnswerResult, AnswerQueryError> {
        let embedding = self.embedder.embed(&request.query).await?;

        let matches = self
            .chunk_store
            .find_nearest(&ChunkSearch {
                embedding,
                match_threshold: request.match_threshold,
                match_count: request.match_count,
                org_id: request.org_id.clone(),
                project_id: request.project_id.clone(),
                vertical_id: request.vertical_id.clone(),
            })
            .await?;

        info!(documents_found = matches.len(), "Similarity search done");

        // No grounding material: answering would be ungrounded, so no
        // generation call is spent at all.
        if matches.is_empty() {
            return Ok(AnswerResult {
                response: NO_DOCUMENTS_RESPONSE.into(),
                sources: vec![],
                knowledge_type: KnowledgeType::None,
                documents_found: 0,
                model: self.generator.model_name().into(),
                embedding_model: self.embedder.model_name().into(),
            });
        }

        let context = assemble_context(
            &matches,
            &ContextBudget {
                max_chars: self.settings.max_context_chars,
                min_partial_chars: self.settings.min_partial_chars,
            },
        );

        // Citations cover every match, including chunks the truncated
        // context blob left out.
        let sources: Vec<Source> = matches.iter().map(Source::from_match).collect();
        let knowledge_type = classify_knowledge(
            request.org_id.as_deref(),
            request.project_id.as_deref(),
            &matches,
        );

        let answer = self
            .generator
            .complete(CompletionRequest {
                system: LIBRARIAN_SYSTEM_PROMPT.into(),
                user: format!(
                    "Contexte documentaire:\n{context}\n\nQuestion: {}",
                    request.query
                ),
                temperature: self.settings.answer_temperature,
                max_tokens: self.settings.answer_max_tokens,
            })
            .await?;

        let response = if answer.trim().is_empty() {
            EMPTY_GENERATION_RESPONSE.into()
        } else {
            answer
        };

        Ok(AnswerResult {
            response,
            sources,
            knowledge_type,
            documents_found: matches.len(),
            model: self.generator.model_name().into(),
            embedding_model: self.embedder.model_name().into(),
        })
    }
}

#[derive(thiserror::Error)]
pub enum AnswerQueryError {
    #[error(transparent)]
    EmbedderError(#[from] EmbedderError),
    #[error(transparent)]
    ChunkStoreError(#[from] ChunkStoreError),
    #[error(transparent)]
    GeneratorError(#[from] GeneratorError),
}

impl std::fmt::Debug for AnswerQueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
