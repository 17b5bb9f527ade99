#[cfg(test)]
mod tests;

use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::AskDocsError;
use crate::config::OllamaConfig;

pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 768;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Client for a local Ollama instance, covering both the embedding model
/// used at indexing/search time and the generation model used to answer
/// questions.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: Url,
    embedding_model: String,
    generation_model: String,
    batch_size: u32,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    model: String,
    #[serde(rename = "input")]
    inputs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
}

/// One NDJSON line of a streamed `/api/generate` response
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: Option<u64>,
    pub digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

impl OllamaClient {
    #[inline]
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let base_url = config
            .ollama_url()
            .context("Failed to generate Ollama URL from config")?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            embedding_model: config.embedding_model.clone(),
            generation_model: config.generation_model.clone(),
            batch_size: config.batch_size,
            agent,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Name of the model embeddings are generated with. Stored alongside the
    /// vector index so that mixed embedding spaces are caught on reopen.
    #[inline]
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Test connection to the Ollama server and verify model availability
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        debug!("Performing health check for Ollama at {}", self.base_url);

        self.ping().context("Server ping failed")?;
        self.validate_models().context("Model validation failed")?;

        info!(
            "Health check passed for Ollama server at {} with models {} / {}",
            self.base_url, self.embedding_model, self.generation_model
        );
        Ok(())
    }

    /// Ping the Ollama server to check if it's responsive
    #[inline]
    pub fn ping(&self) -> Result<()> {
        let url = self
            .base_url
            .join("/api/tags")
            .context("Failed to build ping URL")?;

        debug!("Pinging Ollama server at {}", url);

        self.make_request_with_retry(|| {
            self.agent
                .get(url.as_str())
                .call()
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .context("Failed to ping Ollama server")?;

        debug!("Server ping successful");
        Ok(())
    }

    /// Validate that both configured models are available
    #[inline]
    pub fn validate_models(&self) -> Result<()> {
        let models = self.list_models().context("Failed to list models")?;

        for wanted in [&self.embedding_model, &self.generation_model] {
            if !models.iter().any(|m| &m.name == wanted) {
                let available: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
                warn!("Model {} not found. Available models: {:?}", wanted, available);
                return Err(anyhow::anyhow!(
                    "Model '{}' is not available. Available models: {:?}",
                    wanted,
                    available
                ));
            }
        }

        debug!("Models {} and {} are available", self.embedding_model, self.generation_model);
        Ok(())
    }

    /// List all available models
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self
            .base_url
            .join("/api/tags")
            .context("Failed to build models URL")?;

        debug!("Fetching available models from {}", url);

        let response_text = self
            .make_request_with_retry(|| {
                self.agent
                    .get(url.as_str())
                    .call()
                    .and_then(|mut resp| resp.body_mut().read_to_string())
            })
            .context("Failed to fetch models")?;

        let models_response: ModelsResponse =
            serde_json::from_str(&response_text).context("Failed to parse models response")?;

        debug!("Found {} models", models_response.models.len());
        Ok(models_response.models)
    }

    /// Generate an embedding for a single text input
    #[inline]
    pub fn embed(&self, text: &str) -> crate::Result<Vec<f32>> {
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: self.embedding_model.clone(),
            prompt: text.to_string(),
        };

        let request_json = serde_json::to_string(&request).map_err(|e| {
            AskDocsError::Embedding(format!("Failed to serialize embedding request: {}", e))
        })?;

        let response_text = self.post_embed_request(&request_json)?;
        let response: EmbedResponse = serde_json::from_str(&response_text).map_err(|e| {
            AskDocsError::Embedding(format!("Failed to parse embedding response: {}", e))
        })?;

        debug!(
            "Generated embedding with {} dimensions",
            response.embedding.len()
        );
        Ok(response.embedding)
    }

    /// Generate embeddings for multiple text inputs using batch processing
    #[inline]
    pub fn embed_batch(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut results = Vec::with_capacity(texts.len());

        // Process in batches to avoid overwhelming the server
        for batch in texts.chunks(self.batch_size as usize) {
            let batch_results = self.embed_single_batch(batch)?;
            results.extend(batch_results);
        }

        debug!("Generated {} embeddings total", results.len());
        Ok(results)
    }

    fn embed_single_batch(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        if texts.len() == 1 {
            // Use single embedding API for single text
            return Ok(vec![self.embed(&texts[0])?]);
        }

        let request = BatchEmbedRequest {
            model: self.embedding_model.clone(),
            inputs: texts.to_vec(),
        };

        let request_json = serde_json::to_string(&request).map_err(|e| {
            AskDocsError::Embedding(format!("Failed to serialize batch embedding request: {}", e))
        })?;

        let response_text = self.post_embed_request(&request_json)?;

        let batch_response: BatchEmbedResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                AskDocsError::Embedding(format!("Failed to parse batch embedding response: {}", e))
            })?;

        if batch_response.embeddings.len() != texts.len() {
            return Err(AskDocsError::Embedding(format!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                batch_response.embeddings.len()
            )));
        }

        Ok(batch_response.embeddings)
    }

    fn post_embed_request(&self, request_json: &str) -> crate::Result<String> {
        let url = self
            .base_url
            .join("/api/embed")
            .map_err(|e| AskDocsError::Embedding(format!("Failed to build embedding URL: {}", e)))?;

        self.make_request_with_retry(|| {
            self.agent
                .post(url.as_str())
                .header("Content-Type", "application/json")
                .send(request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })
        .map_err(|e| AskDocsError::Embedding(format!("Failed to generate embedding: {}", e)))
    }

    /// Answer a prompt with the generation model, streaming tokens into
    /// `sink` as they arrive and returning the collected output. Generation
    /// is single-shot: any failure propagates without retry.
    #[inline]
    pub fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        sink: &mut (dyn Write + Send),
    ) -> crate::Result<String> {
        let url = self
            .base_url
            .join("/api/generate")
            .map_err(|e| AskDocsError::Generation(format!("Failed to build generate URL: {}", e)))?;

        let request = GenerateRequest {
            model: self.generation_model.clone(),
            prompt: prompt.to_string(),
            system: system.map(str::to_string),
            stream: true,
        };

        let request_json = serde_json::to_string(&request).map_err(|e| {
            AskDocsError::Generation(format!("Failed to serialize generate request: {}", e))
        })?;

        debug!(
            "Requesting generation from model {} ({} prompt chars)",
            self.generation_model,
            prompt.len()
        );

        let mut response = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .map_err(|e| AskDocsError::Generation(format!("Generation request failed: {}", e)))?;

        let reader = BufReader::new(response.body_mut().as_reader());
        let mut output = String::new();

        for line in reader.lines() {
            let line = line
                .map_err(|e| AskDocsError::Generation(format!("Failed to read stream: {}", e)))?;
            if line.trim().is_empty() {
                continue;
            }

            let chunk: GenerateChunk = serde_json::from_str(&line).map_err(|e| {
                AskDocsError::Generation(format!("Failed to parse stream chunk: {}", e))
            })?;

            if let Some(error) = chunk.error {
                return Err(AskDocsError::Generation(error));
            }

            if !chunk.response.is_empty() {
                sink.write_all(chunk.response.as_bytes())
                    .and_then(|()| sink.flush())
                    .map_err(AskDocsError::Io)?;
                output.push_str(&chunk.response);
            }

            if chunk.done {
                break;
            }
        }

        debug!("Generation produced {} chars", output.len());
        Ok(output)
    }

    fn make_request_with_retry<F>(&self, mut request_fn: F) -> Result<String>
    where
        F: FnMut() -> Result<String, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("HTTP request attempt {}/{}", attempt, self.retry_attempts);

            match request_fn() {
                Ok(response_text) => {
                    debug!("Request succeeded on attempt {}", attempt);
                    return Ok(response_text);
                }
                Err(error) => {
                    let should_retry = match &error {
                        ureq::Error::StatusCode(status) => {
                            if *status >= 500 {
                                warn!(
                                    "Server error (status {}), attempt {}/{}",
                                    status, attempt, self.retry_attempts
                                );
                                true // Retry server errors
                            } else {
                                warn!("Client error (status {}), not retrying", status);
                                return Err(anyhow::anyhow!("Client error: HTTP {}", status));
                            }
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                            true // Retry transport errors
                        }
                        _ => {
                            warn!("Non-retryable error: {}", error);
                            false // Don't retry other errors
                        }
                    };

                    if !should_retry {
                        return Err(anyhow::anyhow!("Non-retryable error: {}", error));
                    }

                    last_error = Some(anyhow::anyhow!("Request error: {}", error));

                    // Wait before retry (exponential backoff)
                    if attempt < self.retry_attempts {
                        let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000;
                        let delay = Duration::from_millis(delay_ms);
                        debug!("Waiting {:?} before retry", delay);
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        error!("All retry attempts failed for request to {}", self.base_url);

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Request failed after retries")))
    }
}
