use std::path::Path;

use pptx_to_md::{ParserConfig, PptxContainer};
use tracing::debug;

use crate::{AskDocsError, Result};

use super::Document;

/// Load a PPTX deck as one text unit per slide, tagged with its 0-based
/// slide index.
pub fn load_pptx(path: &Path) -> Result<Vec<Document>> {
    let config = ParserConfig::builder()
        .extract_images(false)
        .include_slide_number_as_comment(true)
        .build();

    let mut container = PptxContainer::open(path, config)
        .map_err(|e| AskDocsError::load(path, anyhow::anyhow!("Failed to open PPTX: {}", e)))?;

    let slides = container
        .parse_all()
        .map_err(|e| AskDocsError::load(path, anyhow::anyhow!("Failed to parse slides: {}", e)))?;

    let source = path.display().to_string();
    let documents: Vec<Document> = slides
        .into_iter()
        .enumerate()
        .filter_map(|(index, slide)| {
            slide.convert_to_md().and_then(|markdown| {
                let text = super::markdown::extract_text(&markdown);
                (!text.is_empty()).then(|| {
                    let mut document = Document::new(text, source.clone());
                    document.metadata.page = Some(index as u32);
                    document
                })
            })
        })
        .collect();

    debug!(
        "Extracted {} slides from {}",
        documents.len(),
        path.display()
    );

    Ok(documents)
}
