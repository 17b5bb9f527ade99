
use std::io::Write;
use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use crate::Result;
use crate::database::lancedb::ScoredChunk;
use crate::embeddings::OllamaClient;
use crate::retriever::Retriever;

/// Composes retrieval with answer generation: retrieved chunks become the
/// context block of a fixed instruction template, and the generation model
/// answers the question against it.
pub struct AnswerChain {
    retriever: Retriever,
    client: Arc<OllamaClient>,
}

/// Join retrieved chunk texts into a single context block
#[inline]
pub fn format_documents(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.document.content.as_str())
        .join("\n\n")
}

fn system_prompt(context: &str) -> String {
    format!(
        "Using the following documents, help answer questions as a teacher would help a \
         student. Remember to only answer the question they asked: {context}"
    )
}

impl AnswerChain {
    #[inline]
    pub fn new(retriever: Retriever, client: Arc<OllamaClient>) -> Self {
        Self { retriever, client }
    }

    /// Answer a question against the indexed documents, streaming the
    /// model's tokens into `sink` and returning the collected answer.
    /// Failures from retrieval or generation propagate untouched.
    #[inline]
    pub async fn answer(&self, question: &str, sink: &mut (dyn Write + Send)) -> Result<String> {
        let context_chunks = self.retriever.retrieve(question).await?;
        debug!("Answering with {} context chunks", context_chunks.len());

        let context = format_documents(&context_chunks);
        self.client
            .generate(question, Some(&system_prompt(&context)), sink)
    }
}
