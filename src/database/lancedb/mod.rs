// LanceDB vector database module
// Handles vector storage and similarity search for embedded chunks


pub mod vector_store;

use serde::{Deserialize, Serialize};

use crate::loader::{Document, DocumentMetadata};

pub use vector_store::{ScoredChunk, VectorStore};

/// Embedding record stored in LanceDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Unique identifier for this record
    pub id: String,
    /// The vector embedding
    pub vector: Vec<f32>,
    /// Metadata about the chunk this embedding represents
    pub metadata: ChunkMetadata,
}

/// Metadata for a chunk stored alongside its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Path of the source file
    pub source: String,
    /// Page or slide index within the source, if any
    pub page: Option<u32>,
    /// Index of the chunk within its unit, if produced by the splitter
    pub chunk_index: Option<u32>,
    /// The actual text content of the chunk
    pub content: String,
    /// Estimated token count of the chunk
    pub token_count: u32,
    /// Timestamp when this record was created
    pub created_at: String,
}

impl From<ChunkMetadata> for Document {
    #[inline]
    fn from(metadata: ChunkMetadata) -> Self {
        Self {
            content: metadata.content,
            metadata: DocumentMetadata {
                source: metadata.source,
                page: metadata.page,
                chunk_index: metadata.chunk_index,
            },
        }
    }
}
