use docseek::answer::{truncate_context, AnswerGenerator, ExtractiveAnswerer};
use docseek::chunking::{chunk_document, load_text, persist_chunks};
use docseek::cli::{Cli, Commands, ConfigAction};
use docseek::config::Settings;
use docseek::error::{DocseekError, Result};
use docseek::RetrievalEngine;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Ingest { files } => {
            cmd_ingest(cli.config, &files)?;
        }
        Commands::Query { query, limit, json } => {
            cmd_query(cli.config, &query, limit, json)?;
        }
        Commands::Ask {
            question,
            context_size,
        } => {
            cmd_ask(cli.config, &question, context_size)?;
        }
        Commands::Status => {
            cmd_status(cli.config)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "docseek=debug" } else { "docseek=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_target(false).init();
}

fn cmd_ingest(config_path: Option<PathBuf>, files: &[PathBuf]) -> Result<()> {
    let settings = load_settings(config_path)?;
    let engine = RetrievalEngine::from_settings(&settings)?;
    let processed_dir = settings.storage.processed_path();

    for file in files {
        let text = load_text(file)?;
        let source = file.display().to_string();
        let records = chunk_document(
            &source,
            &text,
            settings.chunking.size,
            settings.chunking.overlap,
        )?;

        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        persist_chunks(&records, &processed_dir.join(format!("{}.json", stem)))?;

        let count = records.len();
        let added = engine.add_documents(records)?;
        println!("✓ Embedded {} chunks from {} ({} indexed)", count, source, added);
    }

    Ok(())
}

fn cmd_query(
    config_path: Option<PathBuf>,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let settings = load_settings(config_path)?;
    let engine = RetrievalEngine::from_settings(&settings)?;
    let hits = engine.search(query, limit.unwrap_or(settings.retrieval.top_k))?;

    if json {
        let out = serde_json::to_string_pretty(&hits).map_err(|e| DocseekError::Json {
            source: e,
            context: "Failed to serialize search results".to_string(),
        })?;
        println!("{}", out);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No matching passages");
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{}. [{}] {} (distance {:.4})",
            rank + 1,
            hit.record.id,
            hit.record.source,
            hit.distance
        );
        println!("   {}", hit.record.text);
    }

    Ok(())
}

fn cmd_ask(config_path: Option<PathBuf>, question: &str, context_size: Option<usize>) -> Result<()> {
    let settings = load_settings(config_path)?;
    let engine = RetrievalEngine::from_settings(&settings)?;
    let hits = engine.search(question, context_size.unwrap_or(settings.retrieval.top_k))?;

    let context: Vec<String> = hits.into_iter().map(|h| h.record.text).collect();
    let context = truncate_context(&context, settings.answer.max_context_tokens);

    let answer = ExtractiveAnswerer::new().generate_answer(question, &context)?;
    println!("{}", answer);

    Ok(())
}

fn cmd_status(config_path: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config_path)?;
    let engine = RetrievalEngine::from_settings(&settings)?;
    let stats = engine.stats()?;

    println!("docseek status");
    println!("==============");
    println!("\nChunks:     {}", stats.rows);
    match stats.dimension {
        Some(dim) => println!("Dimension:  {}", dim),
        None => println!("Dimension:  (not established)"),
    }
    println!("Sources:    {}", stats.sources);
    println!(
        "Embedder:   {}",
        engine.embedder().model_name().unwrap_or("unavailable")
    );
    println!("\nIndex:      {}", engine.paths().index.display());
    println!("Metadata:   {}", engine.paths().metadata.display());

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = load_settings(config_path)?;
            let out = toml::to_string_pretty(&settings)?;
            println!("{}", out);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Settings::default_path()?,
            };
            let settings = Settings::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", settings.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Settings::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| DocseekError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let mut settings = Settings::default();
            settings.storage.data_dir = Settings::default_data_dir()?;
            settings.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_settings(config_path: Option<PathBuf>) -> Result<Settings> {
    let path = match config_path {
        Some(path) => path,
        None => Settings::default_path()?,
    };

    let mut settings = if path.exists() {
        Settings::load(&path)?
    } else {
        tracing::warn!(
            "Config file not found, using defaults. Run 'docseek config init' to create one."
        );
        let mut settings = Settings::default();
        settings.apply_env_overrides();
        docseek::config::ConfigValidator::validate(&settings)?;
        settings
    };

    settings.storage.data_dir = expand_path(&settings.storage.data_dir)?;
    Ok(settings)
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| DocseekError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| DocseekError::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
