use serde::Deserialize;

/// A document chunk retrieved from the vector store for a single request.
///
/// Read-only to the pipeline: the store produces it, the pipeline derives
/// the context blob, the citations and the knowledge type from it.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentMatch {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: ChunkMetadata,
    /// Similarity in [0, 1], higher = more relevant. Trusted as returned by
    /// the store: the pipeline never re-sorts nor clamps it.
    pub similarity: f64,
}

/// Typed view of the chunk metadata persisted alongside each embedding.
///
/// Every field is optional: chunks ingested before a metadata field existed
/// simply lack it, and the fallback chains below absorb the gap.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkMetadata {
    pub filename: Option<String>,
    pub source_file: Option<String>,
    pub document_id: Option<String>,
    pub org_id: Option<String>,
    #[serde(default)]
    pub target_projects: Vec<String>,
}

impl DocumentMatch {
    /// Document name used in the context-blob header: filename, then
    /// source_file, then a fixed placeholder.
    pub fn header_document_name(&self) -> &str {
        self.metadata
            .filename
            .as_deref()
            .or(self.metadata.source_file.as_deref())
            .unwrap_or("inconnu")
    }
}
