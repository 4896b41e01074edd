//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "docseek",
    version,
    author = "neur0map",
    about = "Ingest documents and retrieve relevant passages",
    long_about = "docseek chunks text documents, embeds the chunks locally, keeps an exact \
                  vector index on disk, and answers questions from the closest passages."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/docseek/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk, embed and index text documents
    Ingest {
        /// Text or markdown files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Retrieve the closest passages for a query
    Query {
        /// Search query text
        query: String,

        /// Maximum number of results to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Answer a question from retrieved passages
    Ask {
        /// Question to ask
        question: String,

        /// Number of context chunks to retrieve
        #[arg(short = 'n', long)]
        context_size: Option<usize>,
    },

    /// Show corpus size and artifact locations
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
