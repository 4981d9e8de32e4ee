use crate::domain::entities::document_match::DocumentMatch;

/// Marker appended when a chunk had to be cut to fit under the cap
pub const TRUNCATION_MARKER: &str = "\n[...]";

const BLOCK_DELIMITER: &str = "\n---\n";

/// Size limits for the context blob fed to the generation model.
///
/// The cap bounds generation cost and latency, it is not a data-correctness
/// requirement: citations are still derived from every match.
#[derive(Debug, Clone, Copy)]
pub struct ContextBudget {
    /// Hard cap on the assembled context, in characters
    pub max_chars: usize,
    /// Minimum room left under the cap for a partial chunk to be worth appending
    pub min_partial_chars: usize,
}

/// Concatenates the matched chunks, in search order, into a single bounded
/// text blob.
///
/// Each chunk contributes a delimiter line, a bracketed document-name header
/// and its content. Concatenation stops at the first chunk whose block would
/// push the blob over `budget.max_chars`; if at least `budget.min_partial_chars`
/// of room remain, a prefix of that block is appended and terminated by
/// [`TRUNCATION_MARKER`], otherwise the blob ends at the last whole block.
pub fn assemble_context(matches: &[DocumentMatch], budget: &ContextBudget) -> String {
    let marker_chars = TRUNCATION_MARKER.chars().count();

    let mut context = String::new();
    let mut used_chars = 0usize;

    for m in matches {
        let block = format!(
            "{BLOCK_DELIMITER}[Document: {}]\n{}\n",
            m.header_document_name(),
            m.content
        );
        let block_chars = block.chars().count();

        if used_chars + block_chars <= budget.max_chars {
            context.push_str(&block);
            used_chars += block_chars;
            continue;
        }

        let room = budget.max_chars - used_chars;
        if room >= budget.min_partial_chars && room > marker_chars {
            context.extend(block.chars().take(room - marker_chars));
            context.push_str(TRUNCATION_MARKER);
        }
        break;
    }

    context
}
