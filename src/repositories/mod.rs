pub mod openai_embedder;
pub mod openai_generator;
pub mod postgrest_chunk_store;
