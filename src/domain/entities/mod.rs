pub mod document_match;
pub mod knowledge;
pub mod routing;
pub mod source;
