use serde::{Deserialize, Serialize};

/// The two downstream specialists the router can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    /// Retrieval specialist, answers from the document base. Default on fallback.
    #[serde(rename = "BIBLIOTHECAIRE")]
    Bibliothecaire,
    /// Quantity/estimation specialist
    #[serde(rename = "ANALYSTE")]
    Analyste,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub destination: Destination,
    pub reasoning: String,
}

impl RoutingDecision {
    /// Default decision when the model reply cannot be parsed.
    ///
    /// Availability over correctness: a routing error degrades to the
    /// retrieval specialist instead of surfacing a 500 to the end user.
    pub fn fallback() -> Self {
        Self {
            destination: Destination::Bibliothecaire,
            reasoning: "fallback".into(),
        }
    }

    /// Parses the raw (trimmed) model reply as a 2-field JSON object.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw.trim())
    }
}
