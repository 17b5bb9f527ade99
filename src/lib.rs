use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AskDocsError>;

#[derive(Error, Debug)]
pub enum AskDocsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl AskDocsError {
    /// Wrap a loader failure with the path it occurred on.
    #[inline]
    pub fn load(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Load {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub mod chain;
pub mod commands;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod loader;
pub mod retriever;
