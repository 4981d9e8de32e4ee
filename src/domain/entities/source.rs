use serde::Serialize;

use crate::domain::entities::document_match::DocumentMatch;

/// Maximum number of characters of chunk content exposed in a citation preview
pub const PREVIEW_MAX_CHARS: usize = 150;

/// User-facing citation derived from a retrieved chunk, one per match,
/// in the original match order.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub document_id: Option<String>,
    pub document_name: String,
    pub chunk_id: String,
    /// Similarity rounded to 2 decimals
    pub score: f64,
    pub content_preview: String,
}

impl Source {
    pub fn from_match(m: &DocumentMatch) -> Self {
        let document_name = m
            .metadata
            .filename
            .clone()
            .or_else(|| m.metadata.source_file.clone())
            .unwrap_or_else(|| "Document inconnu".to_string());

        let mut content_preview: String = m.content.chars().take(PREVIEW_MAX_CHARS).collect();
        if m.content.chars().count() > PREVIEW_MAX_CHARS {
            content_preview.push_str("...");
        }

        Self {
            document_id: m.metadata.document_id.clone(),
            document_name,
            chunk_id: m.id.clone(),
            score: (m.similarity * 100.0).round() / 100.0,
            content_preview,
        }
    }
}
