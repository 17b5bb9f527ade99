#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

//! End-to-end ingestion and retrieval tests against a real LanceDB index,
//! using a deterministic offline embedding so no Ollama instance is needed.

use askdocs::config::{Config, OllamaConfig};
use askdocs::database::lancedb::{ChunkMetadata, EmbeddingRecord, VectorStore};
use askdocs::embeddings::chunking::{ChunkingConfig, estimate_token_count};
use askdocs::embeddings::OllamaClient;
use askdocs::loader::{Document, load_documents};
use std::fs;
use tempfile::TempDir;
use uuid::Uuid;

const DIMENSION: usize = 16;

fn create_test_config() -> (Config, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config {
        ollama: OllamaConfig {
            embedding_dimension: DIMENSION as u32,
            ..OllamaConfig::default()
        },
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    (config, temp_dir)
}

async fn open_store(config: &Config) -> VectorStore {
    let client = OllamaClient::new(&config.ollama).expect("should create client");
    VectorStore::open(config, None, client)
        .await
        .expect("should open vector store")
}

/// Deterministic bag-of-words embedding: identical text maps to an
/// identical vector, so self-similarity searches rank exactly.
fn fake_embedding(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; DIMENSION];
    for word in text.split_whitespace() {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in word.to_lowercase().bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        vector[(hash % DIMENSION as u64) as usize] += 1.0;
    }

    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

fn records_for(documents: &[Document]) -> Vec<EmbeddingRecord> {
    documents
        .iter()
        .map(|document| EmbeddingRecord {
            id: Uuid::new_v4().to_string(),
            vector: fake_embedding(&document.content),
            metadata: ChunkMetadata {
                source: document.metadata.source.clone(),
                page: document.metadata.page,
                chunk_index: document.metadata.chunk_index,
                content: document.content.clone(),
                token_count: estimate_token_count(&document.content) as u32,
                created_at: "2024-01-01T00:00:00Z".to_string(),
            },
        })
        .collect()
}

#[tokio::test]
async fn ingest_search_round_trip() {
    let (config, _temp_dir) = create_test_config();

    let docs_dir = TempDir::new().expect("should create docs dir");
    let parrots = docs_dir.path().join("parrots.txt");
    fs::write(
        &parrots,
        "The rock parrot is a small grass parrot native to Australia.\n\n\
         It nests in burrows or rocky crevices mostly on offshore islands.\n\n\
         Seeds of grasses and succulent plants form the bulk of its diet.",
    )
    .expect("should write file");

    let chunking = ChunkingConfig {
        max_chunk_size: 20,
        chunk_overlap: 0,
    };
    let documents = load_documents(&parrots, &chunking).expect("should load documents");
    assert!(documents.len() > 1, "expected the file to split");

    let mut store = open_store(&config).await;
    store
        .insert_records(records_for(&documents))
        .await
        .expect("should insert records");

    // Querying with a chunk's exact text must rank that chunk first.
    let needle = &documents[1];
    let results = store
        .search_vector(&fake_embedding(&needle.content), 3)
        .await
        .expect("should search");

    assert!(!results.is_empty());
    assert_eq!(results[0].document.content, needle.content);
    assert!(results[0].distance < 1e-5);
    assert_eq!(results[0].document.metadata.source, parrots.display().to_string());
}

#[tokio::test]
async fn repeated_ingestion_accumulates() {
    let (config, _temp_dir) = create_test_config();

    let docs_dir = TempDir::new().expect("should create docs dir");
    let first = docs_dir.path().join("first.txt");
    let second = docs_dir.path().join("second.txt");
    fs::write(&first, "Notes about glaciers and mountain weather patterns.")
        .expect("should write file");
    fs::write(&second, "Entirely different content about sailing the southern ocean.")
        .expect("should write file");

    let chunking = ChunkingConfig::default();
    let mut store = open_store(&config).await;

    for path in [&first, &second] {
        let documents = load_documents(path, &chunking).expect("should load documents");
        store
            .insert_records(records_for(&documents))
            .await
            .expect("should insert records");
    }

    let count = store.count_chunks().await.expect("should count");
    assert_eq!(count, 2);
}

#[tokio::test]
async fn index_persists_across_reopen() {
    let (config, _temp_dir) = create_test_config();

    let docs_dir = TempDir::new().expect("should create docs dir");
    let notes = docs_dir.path().join("notes.txt");
    fs::write(&notes, "A persistent fact worth remembering.").expect("should write file");

    let documents =
        load_documents(&notes, &ChunkingConfig::default()).expect("should load documents");

    {
        let mut store = open_store(&config).await;
        store
            .insert_records(records_for(&documents))
            .await
            .expect("should insert records");
    }

    // A fresh connection to the same path restores the prior state.
    let store = open_store(&config).await;
    assert_eq!(store.count_chunks().await.expect("should count"), 1);

    let results = store
        .search_vector(&fake_embedding("A persistent fact worth remembering."), 1)
        .await
        .expect("should search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.content, "A persistent fact worth remembering.");
}

#[tokio::test]
async fn empty_index_searches_cleanly() {
    let (config, _temp_dir) = create_test_config();
    let store = open_store(&config).await;

    let results = store
        .similarity_search("anything at all", 3)
        .await
        .expect("empty search should succeed");
    assert!(results.is_empty());
}
