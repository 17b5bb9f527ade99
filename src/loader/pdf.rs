use std::fs;
use std::path::Path;

use tracing::debug;

use crate::{AskDocsError, Result};

use super::Document;

/// Load a PDF as one text unit per page, tagged with its 0-based page
/// index. Pages with no extractable text (scanned or image-only) are
/// skipped.
pub fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    let bytes = fs::read(path).map_err(|e| AskDocsError::load(path, e))?;

    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| AskDocsError::load(path, anyhow::anyhow!("PDF extraction failed: {}", e)))?;

    let source = path.display().to_string();
    let documents: Vec<Document> = pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| {
            let mut document = Document::new(text.trim().to_string(), source.clone());
            document.metadata.page = Some(index as u32);
            document
        })
        .collect();

    debug!(
        "Extracted {} text pages from {}",
        documents.len(),
        path.display()
    );

    Ok(documents)
}
