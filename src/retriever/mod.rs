
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::database::lancedb::{ScoredChunk, VectorStore};

/// Configuration for retrieval
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks returned per query
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    #[inline]
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Thin query façade over the vector store, decoupling answer generation
/// from the concrete index.
pub struct Retriever {
    store: Arc<VectorStore>,
    top_k: usize,
}

impl Retriever {
    #[inline]
    pub fn new(store: Arc<VectorStore>, config: &RetrievalConfig) -> Self {
        Self {
            store,
            top_k: config.top_k,
        }
    }

    /// Find the stored chunks most relevant to the query, best first.
    #[inline]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        debug!("Retrieving top {} chunks for query", self.top_k);
        self.store.similarity_search(query, self.top_k).await
    }
}
