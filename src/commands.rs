use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::chain::AnswerChain;
use crate::config::Config;
use crate::database::lancedb::VectorStore;
use crate::embeddings::OllamaClient;
use crate::loader::load_documents;
use crate::retriever::Retriever;

/// Ingest the given files into a vector index, then answer a question
/// about them. With no `--question`, prompts on stdin.
#[inline]
pub async fn run(
    paths: &[PathBuf],
    question: Option<String>,
    top_k: Option<usize>,
    db: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(top_k)?;
    let client = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;

    let mut store = VectorStore::open(&config, db.as_deref(), client.clone())
        .await
        .context("Failed to open vector store")?;

    for path in paths {
        ingest_file(path, &config, &mut store).await?;
    }

    let question = match question {
        Some(question) => question,
        None => prompt_for_question()?,
    };

    answer_question(&question, &config, store, &client).await
}

/// Answer a question against an existing persisted index.
#[inline]
pub async fn ask(question: &str, top_k: Option<usize>, db: Option<PathBuf>) -> Result<()> {
    let config = load_config(top_k)?;
    let client = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;

    let store = VectorStore::open(&config, db.as_deref(), client.clone())
        .await
        .context("Failed to open vector store")?;

    let count = store.count_chunks().await?;
    if count == 0 {
        println!(
            "The index at {} is empty. Use 'askdocs run <file>' to ingest documents first.",
            store.db_path().display()
        );
        return Ok(());
    }

    answer_question(question, &config, store, &client).await
}

/// Show connectivity and index status.
#[inline]
pub async fn show_status() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("{}", style("📊 askdocs Status").bold());
    println!();

    println!("{}", style("Ollama:").bold().yellow());
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!(
                    "  ✅ Connected ({}:{})",
                    config.ollama.host, config.ollama.port
                );
                println!("  Embedding model: {}", config.ollama.embedding_model);
                println!("  Generation model: {}", config.ollama.generation_model);
            }
            Err(e) => {
                println!("  ⚠️  Reachable but unhealthy: {}", e);
            }
        },
        Err(e) => {
            println!("  ❌ Failed to create client: {}", e);
        }
    }

    println!();
    println!("{}", style("Vector index:").bold().yellow());
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match VectorStore::open(&config, None, client).await {
            Ok(store) => {
                println!("  ✅ Open at {}", store.db_path().display());
                match store.count_chunks().await {
                    Ok(count) => println!("  Chunks indexed: {}", count),
                    Err(e) => println!("  ⚠️  Could not count chunks: {}", e),
                }
            }
            Err(e) => {
                println!("  ❌ Failed to open: {}", e);
            }
        },
        Err(e) => {
            println!("  ❌ {}", e);
        }
    }

    println!();
    println!("Config file: {}", config.config_file_path().display());

    Ok(())
}

fn load_config(top_k: Option<usize>) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(top_k) = top_k {
        config.retrieval.top_k = top_k;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

async fn ingest_file(path: &Path, config: &Config, store: &mut VectorStore) -> Result<()> {
    info!("Ingesting {}", path.display());

    let documents = load_documents(path, &config.chunking)?;
    if documents.is_empty() {
        println!("No text content found in {}", path.display());
        return Ok(());
    }

    println!(
        "Indexing {} chunks from {}",
        documents.len(),
        path.display()
    );

    let bar = ProgressBar::new(documents.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} chunks")
            .context("Invalid progress bar template")?,
    );

    for batch in documents.chunks(config.ollama.batch_size as usize) {
        store.insert(batch).await?;
        bar.inc(batch.len() as u64);
    }
    bar.finish_and_clear();

    println!("Indexed {}", path.display());
    Ok(())
}

fn prompt_for_question() -> Result<String> {
    println!("Enter question: ");

    let mut question = String::new();
    std::io::stdin()
        .read_line(&mut question)
        .context("Failed to read question from stdin")?;

    Ok(question.trim().to_string())
}

async fn answer_question(
    question: &str,
    config: &Config,
    store: VectorStore,
    client: &OllamaClient,
) -> Result<()> {
    let retriever = Retriever::new(Arc::new(store), &config.retrieval);
    let chain = AnswerChain::new(retriever, Arc::new(client.clone()));

    // Tokens stream to stdout as they arrive; the collected answer is
    // printed afterwards under the output banner.
    let mut stdout = std::io::stdout();
    let answer = chain.answer(question, &mut stdout).await?;

    writeln!(stdout)?;
    writeln!(stdout)?;
    writeln!(stdout, "===== output =====")?;
    writeln!(stdout, "{answer}")?;
    writeln!(stdout)?;

    Ok(())
}
