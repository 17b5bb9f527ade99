// Vector database module
// LanceDB-backed persistent index over embedded document chunks

pub mod lancedb;

pub use lancedb::{ChunkMetadata, EmbeddingRecord, ScoredChunk, VectorStore};
