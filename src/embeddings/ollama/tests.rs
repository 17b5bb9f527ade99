use super::*;
use crate::config::OllamaConfig;

#[test]
fn client_configuration() {
    let config = OllamaConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        embedding_model: "test-embed".to_string(),
        generation_model: "test-generate".to_string(),
        batch_size: 128,
        embedding_dimension: 768,
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.embedding_model, "test-embed");
    assert_eq!(client.generation_model, "test-generate");
    assert_eq!(client.batch_size, 128);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn client_builder_methods() {
    let config = OllamaConfig::default();
    let client = OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5);

    // Note: timeout is part of the agent configuration
    assert_eq!(client.retry_attempts, 5);
}

#[test]
fn generate_chunk_parsing() {
    let chunk: GenerateChunk =
        serde_json::from_str(r#"{"response":"The rock","done":false}"#).expect("should parse");
    assert_eq!(chunk.response, "The rock");
    assert!(!chunk.done);
    assert!(chunk.error.is_none());

    let done: GenerateChunk = serde_json::from_str(
        r#"{"response":"","done":true,"total_duration":12345,"eval_count":42}"#,
    )
    .expect("should parse with extra fields");
    assert!(done.done);

    let failed: GenerateChunk =
        serde_json::from_str(r#"{"error":"model not found"}"#).expect("should parse error line");
    assert_eq!(failed.error.as_deref(), Some("model not found"));
}

#[test]
fn batch_embed_request_serialization() {
    let request = BatchEmbedRequest {
        model: "test-embed".to_string(),
        inputs: vec!["first".to_string(), "second".to_string()],
    };

    let json = serde_json::to_string(&request).expect("should serialize");
    assert!(json.contains(r#""input":["first","second"]"#));
}

#[test]
fn empty_batch_is_a_no_op() {
    let config = OllamaConfig::default();
    let client = OllamaClient::new(&config).expect("Failed to create client");

    // No texts means no network traffic at all.
    let embeddings = client.embed_batch(&[]).expect("empty batch should succeed");
    assert!(embeddings.is_empty());
}
