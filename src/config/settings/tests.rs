use super::*;
use crate::retriever::RetrievalConfig;
use tempfile::TempDir;

#[test]
fn default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text:latest");
    assert_eq!(config.ollama.generation_model, "mistral:latest");
    assert_eq!(config.chunking.max_chunk_size, 1000);
    assert_eq!(config.chunking.chunk_overlap, 200);
    assert_eq!(config.retrieval.top_k, 4);
}

#[test]
fn load_without_config_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config::load_from(temp_dir.path()).expect("load should succeed");

    assert_eq!(config.base_dir, temp_dir.path());
    assert_eq!(config.ollama, OllamaConfig::default());
}

#[test]
fn save_and_reload_round_trip() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config {
        ollama: OllamaConfig {
            host: "ollama.internal".to_string(),
            port: 4242,
            ..OllamaConfig::default()
        },
        chunking: crate::embeddings::ChunkingConfig {
            max_chunk_size: 512,
            chunk_overlap: 64,
        },
        retrieval: RetrievalConfig { top_k: 8 },
        base_dir: temp_dir.path().to_path_buf(),
    };

    config.save().expect("save should succeed");

    let reloaded = Config::load_from(temp_dir.path()).expect("load should succeed");
    assert_eq!(reloaded, config);
}

#[test]
fn invalid_protocol_is_rejected() {
    let config = Config {
        ollama: OllamaConfig {
            protocol: "ftp".to_string(),
            ..OllamaConfig::default()
        },
        ..Config::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));
}

#[test]
fn empty_model_is_rejected() {
    let config = Config {
        ollama: OllamaConfig {
            generation_model: "  ".to_string(),
            ..OllamaConfig::default()
        },
        ..Config::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::InvalidModel(_))));
}

#[test]
fn oversized_overlap_is_rejected() {
    let config = Config {
        chunking: crate::embeddings::ChunkingConfig {
            max_chunk_size: 100,
            chunk_overlap: 150,
        },
        ..Config::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::OverlapTooLarge(150, 100))
    ));
}

#[test]
fn zero_top_k_is_rejected() {
    let config = Config {
        retrieval: RetrievalConfig { top_k: 0 },
        ..Config::default()
    };

    assert!(matches!(config.validate(), Err(ConfigError::InvalidTopK(0))));
}

#[test]
fn invalid_config_fails_to_save() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config {
        ollama: OllamaConfig {
            batch_size: 0,
            ..OllamaConfig::default()
        },
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };

    assert!(config.save().is_err());
    assert!(!config.config_file_path().exists());
}

#[test]
fn paths_are_rooted_at_base_dir() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };

    assert_eq!(
        config.config_file_path(),
        temp_dir.path().join("config.toml")
    );
    assert_eq!(
        config.vector_database_path(),
        temp_dir.path().join("vectors")
    );
}
