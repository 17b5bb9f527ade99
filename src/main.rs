use std::path::PathBuf;

use askdocs::Result;
use askdocs::commands::{ask, run, show_status};
use askdocs::config::{run_interactive_config, show_config};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "askdocs")]
#[command(about = "Retrieval-augmented question answering over local documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest documents and answer a question about them
    Run {
        /// Files to ingest (.pdf, .md, .pptx, anything else as plain text)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Question to answer; prompts on stdin when omitted
        #[arg(long)]
        question: Option<String>,
        /// Number of chunks retrieved per query
        #[arg(long)]
        top_k: Option<usize>,
        /// Vector index directory (defaults to the config directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Answer a question against an already-built index
    Ask {
        /// Question to answer
        question: String,
        /// Number of chunks retrieved per query
        #[arg(long)]
        top_k: Option<usize>,
        /// Vector index directory (defaults to the config directory)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Configure Ollama connection and chunking settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Show Ollama connectivity and index status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            paths,
            question,
            top_k,
            db,
        } => {
            run(&paths, question, top_k, db).await?;
        }
        Commands::Ask {
            question,
            top_k,
            db,
        } => {
            ask(&question, top_k, db).await?;
        }
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}
