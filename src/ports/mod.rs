pub mod chunk_store;
pub mod embedder;
pub mod generator;

pub use chunk_store::*;
pub use embedder::*;
pub use generator::*;
