// Embeddings module
// Handles content chunking and the Ollama embedding/generation client

pub mod chunking;
pub mod ollama;

pub use chunking::{ChunkingConfig, estimate_token_count, split_text};
pub use ollama::{DEFAULT_EMBEDDING_DIMENSION, OllamaClient};
