use serde::Serialize;

use crate::domain::entities::document_match::DocumentMatch;

/// Coarse provenance label for the chunks used to answer a query.
///
/// Surfaced to the UI so tenant-private knowledge can be visually
/// distinguished from globally shared knowledge. It never gates which chunks
/// feed the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeType {
    None,
    Project,
    Organization,
    Shared,
}

/// First matching rule wins: project, then organization, then shared.
pub fn classify_knowledge(
    org_id: Option<&str>,
    project_id: Option<&str>,
    matches: &[DocumentMatch],
) -> KnowledgeType {
    if matches.is_empty() {
        return KnowledgeType::None;
    }

    if let Some(project_id) = project_id {
        if matches
            .iter()
            .any(|m| m.metadata.target_projects.iter().any(|p| p == project_id))
        {
            return KnowledgeType::Project;
        }
    }

    if let Some(org_id) = org_id {
        if matches
            .iter()
            .any(|m| m.metadata.org_id.as_deref() == Some(org_id))
        {
            return KnowledgeType::Organization;
        }
    }

    KnowledgeType::Shared
}
