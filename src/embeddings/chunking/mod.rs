
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AskDocsError, Result};

/// Separator ladder tried from coarsest to finest. Once no separator is
/// left, a piece is atomic and is emitted even if it exceeds the budget.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " "];

/// Configuration for splitting document text into retrieval chunks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in estimated tokens
    pub max_chunk_size: usize,
    /// Trailing tokens of a closed chunk carried into the next one
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkingConfig {
    /// Validate the chunking parameters. The overlap must leave room for new
    /// content in every chunk, otherwise splitting cannot make progress.
    #[inline]
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(AskDocsError::Config(
                "max_chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.chunk_overlap >= self.max_chunk_size {
            return Err(AskDocsError::Config(format!(
                "chunk_overlap ({}) must be smaller than max_chunk_size ({})",
                self.chunk_overlap, self.max_chunk_size
            )));
        }

        Ok(())
    }
}

/// Split text into chunks of at most `max_chunk_size` estimated tokens,
/// trying coarse separators first and recursing into finer ones for pieces
/// that do not fit. Adjacent chunks share `chunk_overlap` trailing tokens.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>> {
    config.validate()?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chunks: Vec<String> = split_recursive(text, SEPARATORS, config)
        .into_iter()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect();

    debug!(
        "Split {} chars into {} chunks (max {} tokens, overlap {})",
        text.len(),
        chunks.len(),
        config.max_chunk_size,
        config.chunk_overlap
    );

    Ok(chunks)
}

fn split_recursive(text: &str, separators: &[&str], config: &ChunkingConfig) -> Vec<String> {
    if estimate_token_count(text) <= config.max_chunk_size {
        return vec![text.to_string()];
    }

    let Some((separator, finer)) = separators.split_first() else {
        // Atomic run with no separator left; emitted oversized.
        return vec![text.to_string()];
    };

    if !text.contains(separator) {
        return split_recursive(text, finer, config);
    }

    // Separators stay attached to the preceding piece so that re-joining
    // chunks reconstructs the source text.
    let pieces: Vec<&str> = text.split_inclusive(separator).collect();
    merge_pieces(&pieces, finer, config)
}

/// Greedily accumulate pieces into chunks, recursing into any single piece
/// that exceeds the budget on its own.
///
/// Word and punctuation counts are tracked incrementally instead of
/// re-estimating each candidate piece, so the budget check always matches
/// what `estimate_token_count` would report for the accumulated chunk.
/// Every piece except the last ends in its separator's whitespace, which
/// keeps the incremental word counts exact.
fn merge_pieces(pieces: &[&str], finer: &[&str], config: &ChunkingConfig) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_counts = TokenCounts::default();

    for piece in pieces {
        let piece_counts = TokenCounts::of(piece);

        if piece_counts.estimate() > config.max_chunk_size {
            if !current.trim().is_empty() {
                chunks.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current_counts = TokenCounts::default();
            chunks.extend(split_recursive(piece, finer, config));
            continue;
        }

        if current_counts.plus(&piece_counts).estimate() > config.max_chunk_size
            && !current.trim().is_empty()
        {
            let overlap = extract_overlap_text(&current, config.chunk_overlap);
            chunks.push(std::mem::take(&mut current));

            if !overlap.is_empty() {
                current.push_str(&overlap);
                current.push(' ');
            }
            current_counts = TokenCounts::of(&current);
        }

        current.push_str(piece);
        current_counts = current_counts.plus(&piece_counts);
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Extract overlap text from the end of a chunk
fn extract_overlap_text(content: &str, overlap_tokens: usize) -> String {
    if overlap_tokens == 0 {
        return String::new();
    }

    let words: Vec<&str> = content.split_whitespace().collect();
    let word_count = (overlap_tokens as f64 * 0.75) as usize; // Rough word-to-token ratio

    if words.len() <= word_count {
        return String::new();
    }

    words[words.len() - word_count..].join(" ")
}

#[derive(Debug, Clone, Copy, Default)]
struct TokenCounts {
    words: usize,
    puncts: usize,
}

impl TokenCounts {
    fn of(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            puncts: text.chars().filter(|c| c.is_ascii_punctuation()).count(),
        }
    }

    fn plus(&self, other: &Self) -> Self {
        Self {
            words: self.words + other.words,
            puncts: self.puncts + other.puncts,
        }
    }

    fn estimate(&self) -> usize {
        (self.puncts as f64).mul_add(0.1, self.words as f64 / 0.75) as usize
    }
}

/// Estimate token count using a simple heuristic
/// This is a rough approximation - actual tokenization would be more accurate
#[inline]
pub fn estimate_token_count(text: &str) -> usize {
    // Rough heuristic: 1 token ≈ 0.75 words for English text
    // Add extra tokens for punctuation and special characters
    TokenCounts::of(text).estimate()
}
