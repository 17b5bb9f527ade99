
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ChunkMetadata, EmbeddingRecord};
use crate::config::Config;
use crate::embeddings::chunking::estimate_token_count;
use crate::embeddings::ollama::OllamaClient;
use crate::loader::Document;
use crate::{AskDocsError, Result};

const TABLE_NAME: &str = "chunks";
const MODEL_MARKER_FILE: &str = "embedding_model.json";

/// Persistent vector index over embedded chunks, backed by LanceDB.
///
/// The store owns the embedding client: every chunk inserted and every query
/// searched goes through the same model, which keeps the embedding space
/// consistent across the lifetime of a persisted index.
pub struct VectorStore {
    connection: Connection,
    db_path: PathBuf,
    vector_dimension: Option<usize>,
    client: OllamaClient,
}

/// Search result from vector similarity search, most relevant first
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub document: Document,
    pub similarity_score: f32,
    pub distance: f32,
}

/// Marker persisted beside the dataset recording which embedding model
/// produced the stored vectors. Reopening with a different model corrupts
/// ranking silently, so it is refused instead.
#[derive(Debug, Serialize, Deserialize)]
struct ModelMarker {
    model: String,
    dimension: u32,
}

impl VectorStore {
    /// Open or create a vector store. An explicit `persist_path` overrides
    /// the config-derived default location; prior data at the path is
    /// reopened, otherwise the store starts empty.
    #[inline]
    pub async fn open(
        config: &Config,
        persist_path: Option<&Path>,
        client: OllamaClient,
    ) -> Result<Self> {
        let db_path =
            persist_path.map_or_else(|| config.vector_database_path(), Path::to_path_buf);
        debug!("Initializing LanceDB at path: {:?}", db_path);

        std::fs::create_dir_all(&db_path).map_err(|e| {
            AskDocsError::Database(format!("Failed to create vector database directory: {}", e))
        })?;

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        let mut store = Self {
            connection,
            db_path,
            vector_dimension: None,
            client,
        };

        store.check_model_marker()?;
        store.initialize_table(config.ollama.embedding_dimension as usize).await?;

        info!("Vector store initialized at {:?}", store.db_path);
        Ok(store)
    }

    /// Embed and append documents. Cumulative: repeated calls grow the
    /// table, they never replace prior contents.
    #[inline]
    pub async fn insert(&mut self, documents: &[Document]) -> Result<()> {
        if documents.is_empty() {
            debug!("No documents to insert");
            return Ok(());
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.client.embed_batch(&texts)?;

        let created_at = Utc::now().to_rfc3339();
        let records: Vec<EmbeddingRecord> = documents
            .iter()
            .zip(embeddings)
            .map(|(document, vector)| EmbeddingRecord {
                id: Uuid::new_v4().to_string(),
                vector,
                metadata: ChunkMetadata {
                    source: document.metadata.source.clone(),
                    page: document.metadata.page,
                    chunk_index: document.metadata.chunk_index,
                    content: document.content.clone(),
                    token_count: estimate_token_count(&document.content) as u32,
                    created_at: created_at.clone(),
                },
            })
            .collect();

        self.insert_records(records).await
    }

    /// Append pre-embedded records to the table.
    #[inline]
    pub async fn insert_records(&mut self, records: Vec<EmbeddingRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        debug!("Storing batch of {} records", records.len());

        let vector_dim = records[0].vector.len();
        if self.vector_dimension != Some(vector_dim) {
            if self.count_chunks().await? > 0 {
                return Err(AskDocsError::Database(format!(
                    "Vector dimension {} does not match existing table dimension {:?}",
                    vector_dim, self.vector_dimension
                )));
            }
            info!(
                "Vector dimension changed from {:?} to {}, recreating empty table",
                self.vector_dimension, vector_dim
            );
            self.recreate_table_with_dimension(vector_dim).await?;
            self.vector_dimension = Some(vector_dim);
        }

        let record_batch = self.create_record_batch(&records)?;

        let table = self.open_table().await?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to insert records: {}", e)))?;

        self.write_model_marker(vector_dim)?;

        info!("Stored {} records", records.len());
        Ok(())
    }

    /// Find the `k` chunks most similar to the query text, embedding the
    /// query with the same model used at insertion time. An empty store
    /// yields an empty result.
    #[inline]
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if self.count_chunks().await? == 0 {
            debug!("Similarity search on empty store");
            return Ok(Vec::new());
        }

        let query_vector = self.client.embed(query)?;
        self.search_vector(&query_vector, k).await
    }

    /// Nearest-neighbor search with an already-computed query vector.
    #[inline]
    pub async fn search_vector(&self, query_vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        debug!("Searching for similar vectors with limit: {}", k);

        if self.count_chunks().await? == 0 {
            return Ok(Vec::new());
        }

        let table = self.open_table().await?;

        let results = table
            .vector_search(query_vector)
            .map_err(|e| AskDocsError::Database(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(k)
            .execute()
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to execute search: {}", e)))?;

        self.parse_search_results_stream(results).await
    }

    /// Get the total number of chunks stored
    #[inline]
    pub async fn count_chunks(&self) -> Result<u64> {
        let table = self.open_table().await?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    /// Directory this store persists to
    #[inline]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn open_table(&self) -> Result<lancedb::table::Table> {
        self.connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to open table: {}", e)))
    }

    /// Initialize the chunks table, detecting the vector dimension from an
    /// existing table or creating an empty one with the configured default.
    async fn initialize_table(&mut self, default_dimension: usize) -> Result<()> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to list tables: {}", e)))?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            match self.detect_existing_vector_dimension().await {
                Ok(dim) => {
                    debug!("Detected existing vector dimension: {}", dim);
                    self.vector_dimension = Some(dim);
                }
                Err(e) => {
                    warn!("Could not detect vector dimension from existing table: {}", e);
                    self.vector_dimension = Some(default_dimension);
                }
            }
            return Ok(());
        }

        debug!(
            "Creating chunks table with {} dimensions (recreated on first insert if the embedding model disagrees)",
            default_dimension
        );

        let schema = create_schema(default_dimension);
        self.connection
            .create_empty_table(TABLE_NAME, schema)
            .execute()
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to create table: {}", e)))?;

        self.vector_dimension = Some(default_dimension);
        Ok(())
    }

    /// Detect vector dimension from the existing table schema
    async fn detect_existing_vector_dimension(&self) -> Result<usize> {
        let table = self.open_table().await?;

        let schema = table
            .schema()
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to get table schema: {}", e)))?;

        for field in schema.fields() {
            if field.name() == "vector" {
                if let DataType::FixedSizeList(_, size) = field.data_type() {
                    return Ok(*size as usize);
                }
            }
        }

        Err(AskDocsError::Database(
            "Could not find vector column or determine dimension".to_string(),
        ))
    }

    /// Recreate the (empty) table with a new vector dimension
    async fn recreate_table_with_dimension(&self, vector_dim: usize) -> Result<()> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to list tables: {}", e)))?;

        if table_names.contains(&TABLE_NAME.to_string()) {
            self.connection
                .drop_table(TABLE_NAME)
                .await
                .map_err(|e| AskDocsError::Database(format!("Failed to drop table: {}", e)))?;
        }

        let schema = create_schema(vector_dim);
        self.connection
            .create_empty_table(TABLE_NAME, schema)
            .execute()
            .await
            .map_err(|e| {
                AskDocsError::Database(format!("Failed to create table with new dimensions: {}", e))
            })?;

        Ok(())
    }

    /// Refuse to reopen an index that was built with a different embedding
    /// model than the one currently configured.
    fn check_model_marker(&self) -> Result<()> {
        let marker_path = self.db_path.join(MODEL_MARKER_FILE);
        if !marker_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(&marker_path)
            .map_err(|e| AskDocsError::Database(format!("Failed to read model marker: {}", e)))?;
        let marker: ModelMarker = serde_json::from_str(&content)
            .map_err(|e| AskDocsError::Database(format!("Failed to parse model marker: {}", e)))?;

        if marker.model != self.client.embedding_model() {
            return Err(AskDocsError::Database(format!(
                "Index at {:?} was built with embedding model '{}' but '{}' is configured; \
                 mixing embedding spaces would corrupt ranking",
                self.db_path,
                marker.model,
                self.client.embedding_model()
            )));
        }

        Ok(())
    }

    fn write_model_marker(&self, dimension: usize) -> Result<()> {
        let marker_path = self.db_path.join(MODEL_MARKER_FILE);
        if marker_path.exists() {
            return Ok(());
        }

        let marker = ModelMarker {
            model: self.client.embedding_model().to_string(),
            dimension: dimension as u32,
        };
        let content = serde_json::to_string_pretty(&marker)
            .map_err(|e| AskDocsError::Database(format!("Failed to serialize marker: {}", e)))?;
        std::fs::write(&marker_path, content)
            .map_err(|e| AskDocsError::Database(format!("Failed to write model marker: {}", e)))?;

        Ok(())
    }

    /// Create a RecordBatch from embedding records
    fn create_record_batch(&self, records: &[EmbeddingRecord]) -> Result<RecordBatch> {
        let len = records.len();
        let vector_dim = self
            .vector_dimension
            .ok_or_else(|| AskDocsError::Database("Vector dimension not set".to_string()))?;

        let mut ids = Vec::with_capacity(len);
        let mut sources = Vec::with_capacity(len);
        let mut pages = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut token_counts = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);

        for record in records {
            ids.push(record.id.as_str());
            sources.push(record.metadata.source.as_str());
            pages.push(record.metadata.page);
            chunk_indices.push(record.metadata.chunk_index);
            contents.push(record.metadata.content.as_str());
            token_counts.push(record.metadata.token_count);
            created_ats.push(record.metadata.created_at.as_str());
        }

        let schema = create_schema(vector_dim);

        // Create vector array using FixedSizeListArray
        let mut flat_values = Vec::with_capacity(len * vector_dim);
        for record in records {
            flat_values.extend_from_slice(&record.vector);
        }
        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(field, vector_dim as i32, Arc::new(values_array), None)
                .map_err(|e| {
                    AskDocsError::Database(format!("Failed to create vector array: {}", e))
                })?;

        let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(sources)),
            Arc::new(UInt32Array::from(pages)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(contents)),
            Arc::new(UInt32Array::from(token_counts)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| AskDocsError::Database(format!("Failed to create record batch: {}", e)))
    }

    /// Parse search results from the LanceDB stream into scored chunks
    async fn parse_search_results_stream(
        &self,
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<ScoredChunk>> {
        let mut scored = Vec::new();

        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| AskDocsError::Database(format!("Failed to read result stream: {}", e)))?
        {
            scored.extend(parse_search_batch(&batch)?);
        }

        debug!("Parsed {} search results from stream", scored.len());
        Ok(scored)
    }
}

/// Create the Arrow schema with the specified vector dimension
fn create_schema(vector_dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, false)),
                vector_dim as i32,
            ),
            false,
        ),
        Field::new("source", DataType::Utf8, false),
        Field::new("page", DataType::UInt32, true),
        Field::new("chunk_index", DataType::UInt32, true),
        Field::new("content", DataType::Utf8, false),
        Field::new("token_count", DataType::UInt32, false),
        Field::new("created_at", DataType::Utf8, false),
    ]))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AskDocsError::Database(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| AskDocsError::Database(format!("Invalid {} column type", name)))
}

fn u32_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a UInt32Array> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AskDocsError::Database(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| AskDocsError::Database(format!("Invalid {} column type", name)))
}

/// Parse a single record batch from search results
fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<ScoredChunk>> {
    let mut scored = Vec::new();
    let num_rows = batch.num_rows();

    let sources = string_column(batch, "source")?;
    let pages = u32_column(batch, "page")?;
    let chunk_indices = u32_column(batch, "chunk_index")?;
    let contents = string_column(batch, "content")?;
    let token_counts = u32_column(batch, "token_count")?;
    let created_ats = string_column(batch, "created_at")?;

    // Distance scores are appended by LanceDB when present
    let distances = batch
        .column_by_name("_distance")
        .map(|col| col.as_any().downcast_ref::<Float32Array>());

    for row in 0..num_rows {
        let metadata = ChunkMetadata {
            source: sources.value(row).to_string(),
            page: (!pages.is_null(row)).then(|| pages.value(row)),
            chunk_index: (!chunk_indices.is_null(row)).then(|| chunk_indices.value(row)),
            content: contents.value(row).to_string(),
            token_count: token_counts.value(row),
            created_at: created_ats.value(row).to_string(),
        };

        let distance = distances
            .flatten()
            .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

        // Convert distance to similarity score (higher is better)
        let similarity_score = 1.0 - distance;

        scored.push(ScoredChunk {
            document: metadata.into(),
            similarity_score,
            distance,
        });
    }

    Ok(scored)
}
