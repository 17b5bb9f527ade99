use std::fs;
use std::path::Path;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::{AskDocsError, Result};

use super::Document;

/// Load a Markdown file as a single text unit with the markup stripped.
pub fn load_markdown(path: &Path) -> Result<Vec<Document>> {
    let raw = fs::read_to_string(path).map_err(|e| AskDocsError::load(path, e))?;
    let text = extract_text(&raw);

    if text.is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![Document::new(text, path.display().to_string())])
}

/// Walk the Markdown event stream and keep the readable text, preserving
/// paragraph boundaries so the splitter can use them.
pub(super) fn extract_text(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut text = String::new();

    for event in parser {
        match event {
            Event::Text(content) | Event::Code(content) => text.push_str(&content),
            Event::SoftBreak | Event::HardBreak => text.push('\n'),
            Event::Start(Tag::CodeBlock(_)) => text.push('\n'),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock) => {
                text.push_str("\n\n");
            }
            Event::End(TagEnd::Item) => text.push('\n'),
            _ => {}
        }
    }

    text.trim().to_string()
}
