//! Document loading and format dispatch.
//!
//! Each supported format is resolved to an [`InputFormat`] once, from the
//! file extension, and routed to a loader that produces raw text units with
//! provenance metadata. Every unit then goes through the shared splitter,
//! except PDF pages, which arrive pre-split from the page-aware loader and
//! are used as retrieval units directly.

#[cfg(test)]
mod tests;

mod markdown;
mod pdf;
mod pptx;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::embeddings::chunking::{ChunkingConfig, split_text};
use crate::{AskDocsError, Result};

/// A unit of ingested text plus where it came from. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Provenance carried through chunking into the vector store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Source file path
    pub source: String,
    /// Page (PDF) or slide (PPTX) index, 0-based
    pub page: Option<u32>,
    /// Index of this chunk within its unit, assigned by the splitter
    pub chunk_index: Option<u32>,
}

impl Document {
    #[inline]
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata {
                source: source.into(),
                page: None,
                chunk_index: None,
            },
        }
    }
}

/// Supported input formats, resolved once at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Pdf,
    Markdown,
    Pptx,
    PlainText,
}

impl InputFormat {
    /// Detect the format from the file extension, case-insensitively.
    /// Unrecognized extensions are treated as plain text.
    #[inline]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("md" | "markdown") => Self::Markdown,
            Some("pptx") => Self::Pptx,
            _ => Self::PlainText,
        }
    }
}

/// Load a file into retrieval-ready documents: dispatch on format, then
/// split each raw unit to the configured chunk budget.
#[inline]
pub fn load_documents(path: &Path, chunking: &ChunkingConfig) -> Result<Vec<Document>> {
    let format = InputFormat::from_path(path);
    debug!("Loading {} as {:?}", path.display(), format);

    let units = match format {
        InputFormat::Pdf => pdf::load_pdf(path)?,
        InputFormat::Markdown => markdown::load_markdown(path)?,
        InputFormat::Pptx => pptx::load_pptx(path)?,
        InputFormat::PlainText => load_plain_text(path)?,
    };

    let documents = assemble(format, units, chunking)?;
    debug!(
        "Loaded {} documents from {}",
        documents.len(),
        path.display()
    );
    Ok(documents)
}

/// Apply the shared splitter to loader output. PDF pages are already split
/// along page boundaries and pass through untouched.
fn assemble(
    format: InputFormat,
    units: Vec<Document>,
    chunking: &ChunkingConfig,
) -> Result<Vec<Document>> {
    match format {
        InputFormat::Pdf => Ok(units),
        InputFormat::Markdown | InputFormat::Pptx | InputFormat::PlainText => {
            chunk_units(units, chunking)
        }
    }
}

fn chunk_units(units: Vec<Document>, chunking: &ChunkingConfig) -> Result<Vec<Document>> {
    let mut documents = Vec::new();

    for unit in units {
        let chunks = split_text(&unit.content, chunking)?;
        for (index, chunk) in chunks.into_iter().enumerate() {
            documents.push(Document {
                content: chunk,
                metadata: DocumentMetadata {
                    chunk_index: Some(index as u32),
                    ..unit.metadata.clone()
                },
            });
        }
    }

    Ok(documents)
}

fn load_plain_text(path: &Path) -> Result<Vec<Document>> {
    let content = fs::read_to_string(path).map_err(|e| AskDocsError::load(path, e))?;

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![Document::new(content, path.display().to_string())])
}
