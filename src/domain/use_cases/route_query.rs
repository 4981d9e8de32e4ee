use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entities::routing::RoutingDecision;
use crate::ports::{CompletionRequest, Generator, GeneratorError};

/// Fixed instruction constraining the model to a 2-field JSON object
const ROUTER_SYSTEM_PROMPT: &str = "Tu es le routeur de l'assistant Léa pour les conducteurs de travaux. \
Analyse la question et choisis le spécialiste le plus adapté. \
Réponds UNIQUEMENT avec un objet JSON de la forme \
{\"destination\": \"BIBLIOTHECAIRE\" | \"ANALYSTE\", \"reasoning\": \"...\"}. \
BIBLIOTHECAIRE: questions sur les normes, les documents, les procédures chantier. \
ANALYSTE: calculs, métrés, estimations de quantités ou de coûts. \
Aucun autre texte que l'objet JSON.";

/// Classifies a query towards one of the two downstream specialists with a
/// single constrained-generation call. No knowledge lookup.
pub struct RouteQueryUseCase {
    generator: Arc<dyn Generator>,
    max_tokens: u32,
}

impl RouteQueryUseCase {
    pub fn new(generator: Arc<dyn Generator>, max_tokens: u32) -> Self {
        Self {
            generator,
            max_tokens,
        }
    }

    /// `query` is expected trimmed and non-empty (the handler validates it).
    ///
    /// An unparseable model reply is not an error: it degrades to
    /// [`RoutingDecision::fallback`], logged at WARN so silent misrouting
    /// stays observable.
    #[tracing::instrument(name = "Routing query to a specialist", skip(self))]
    pub async fn execute(&self, query: &str) -> Result<RoutingDecision, GeneratorError> {
        let raw = self
            .generator
            .complete(CompletionRequest {
                system: ROUTER_SYSTEM_PROMPT.into(),
                user: query.into(),
                // Greedy decoding: only a short JSON object is expected
                temperature: 0.0,
                max_tokens: self.max_tokens,
            })
            .await?;

        let decision = match RoutingDecision::parse(&raw) {
            Ok(decision) => decision,
            Err(error) => {
                warn!(?error, raw, "Unparseable routing reply, using fallback decision");
                RoutingDecision::fallback()
            }
        };

        info!(destination = ?decision.destination, "Routed query");
        Ok(decision)
    }
}
