use super::*;
use std::io::Write;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = fs::File::create(&path).expect("should create file");
    file.write_all(contents.as_bytes())
        .expect("should write file");
    path
}

#[test]
fn format_detection_by_extension() {
    assert_eq!(InputFormat::from_path(Path::new("a.pdf")), InputFormat::Pdf);
    assert_eq!(InputFormat::from_path(Path::new("a.PDF")), InputFormat::Pdf);
    assert_eq!(
        InputFormat::from_path(Path::new("notes.md")),
        InputFormat::Markdown
    );
    assert_eq!(
        InputFormat::from_path(Path::new("notes.Markdown")),
        InputFormat::Markdown
    );
    assert_eq!(
        InputFormat::from_path(Path::new("deck.pptx")),
        InputFormat::Pptx
    );
    assert_eq!(
        InputFormat::from_path(Path::new("readme.txt")),
        InputFormat::PlainText
    );
    assert_eq!(
        InputFormat::from_path(Path::new("main.rs")),
        InputFormat::PlainText
    );
    assert_eq!(
        InputFormat::from_path(Path::new("no_extension")),
        InputFormat::PlainText
    );
}

#[test]
fn plain_text_file_loads_as_one_chunk() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = write_file(&dir, "notes.txt", "A short note about parrots.");

    let documents =
        load_documents(&path, &ChunkingConfig::default()).expect("load should succeed");

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].content, "A short note about parrots.");
    assert_eq!(documents[0].metadata.source, path.display().to_string());
    assert_eq!(documents[0].metadata.page, None);
    assert_eq!(documents[0].metadata.chunk_index, Some(0));
}

#[test]
fn long_plain_text_is_chunked_in_order() {
    let dir = TempDir::new().expect("should create temp dir");
    let text = "Sentences about the habitat of the rock parrot follow here. ".repeat(30);
    let path = write_file(&dir, "long.txt", &text);

    let config = ChunkingConfig {
        max_chunk_size: 60,
        chunk_overlap: 0,
    };
    let documents = load_documents(&path, &config).expect("load should succeed");

    assert!(documents.len() > 1);
    for (i, document) in documents.iter().enumerate() {
        assert_eq!(document.metadata.chunk_index, Some(i as u32));
    }
}

#[test]
fn empty_file_yields_no_documents() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = write_file(&dir, "empty.txt", "");

    let documents =
        load_documents(&path, &ChunkingConfig::default()).expect("load should succeed");
    assert!(documents.is_empty());
}

#[test]
fn missing_file_fails_with_load_error() {
    let result = load_documents(
        Path::new("/definitely/not/here.txt"),
        &ChunkingConfig::default(),
    );

    match result {
        Err(AskDocsError::Load { path, .. }) => {
            assert_eq!(path, Path::new("/definitely/not/here.txt"));
        }
        other => panic!("expected Load error, got {:?}", other.map(|d| d.len())),
    }
}

#[test]
fn markdown_markup_is_stripped() {
    let markdown = "# Heading\n\nSome *emphasized* text with a [link](https://example.com).\n\n\
                    - first item\n- second item\n\n```rust\nlet x = 1;\n```\n";
    let text = markdown::extract_text(markdown);

    assert!(text.contains("Heading"));
    assert!(text.contains("Some emphasized text with a link."));
    assert!(text.contains("first item"));
    assert!(text.contains("let x = 1;"));
    assert!(!text.contains('#'));
    assert!(!text.contains('*'));
    assert!(!text.contains("]("));
}

#[test]
fn markdown_file_loads_without_markup() {
    let dir = TempDir::new().expect("should create temp dir");
    let path = write_file(
        &dir,
        "notes.md",
        "# Rock Parrot\n\nDescribed by John Gould in 1841.\n",
    );

    let documents =
        load_documents(&path, &ChunkingConfig::default()).expect("load should succeed");

    assert_eq!(documents.len(), 1);
    assert!(documents[0].content.contains("Rock Parrot"));
    assert!(documents[0].content.contains("Described by John Gould"));
    assert!(!documents[0].content.contains('#'));
}

#[test]
fn pdf_pages_bypass_the_splitter() {
    // Units shaped the way the PDF loader produces them: one per page.
    let long_page = "Plenty of page text repeated to exceed a small budget. ".repeat(20);
    let units: Vec<Document> = (0..5)
        .map(|page| {
            let mut document = Document::new(long_page.clone(), "report.pdf");
            document.metadata.page = Some(page);
            document
        })
        .collect();

    let tiny = ChunkingConfig {
        max_chunk_size: 10,
        chunk_overlap: 0,
    };
    let documents = assemble(InputFormat::Pdf, units.clone(), &tiny).expect("assemble");

    // Pages pass through untouched, one document per page.
    assert_eq!(documents, units);
    let pages: Vec<Option<u32>> = documents.iter().map(|d| d.metadata.page).collect();
    assert_eq!(
        pages,
        vec![Some(0), Some(1), Some(2), Some(3), Some(4)]
    );

    // The same units under any other format would have been split.
    let chunked = assemble(InputFormat::PlainText, units, &tiny).expect("assemble");
    assert!(chunked.len() > 5);
}
