//! Configuration management for docseek
//!
//! Settings are loaded from TOML, patched from `DOCSEEK_*` environment
//! variables, validated, and then passed explicitly to whatever composes the
//! retrieval engine.

use crate::error::{DocseekError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Current configuration schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub storage: StorageConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub answer: AnswerConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Where the corpus artifacts live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    /// Index artifact, relative paths resolve against `data_dir`
    pub index_file: PathBuf,
    /// Metadata artifact, relative paths resolve against `data_dir`
    pub metadata_file: PathBuf,
    /// Directory for per-document processed chunk JSON
    pub processed_dir: PathBuf,
}

impl StorageConfig {
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(&self.index_file)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.data_dir.join(&self.processed_dir)
    }
}

/// Chunker window configuration, measured in whitespace tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub size: usize,
    pub overlap: usize,
}

/// Embedding backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "fastembed", "hash" or "none"
    pub backend: String,
    pub model: String,
    pub batch_size: usize,
    /// Only used by the hash backend
    #[serde(default = "default_hash_dimension")]
    pub hash_dimension: usize,
}

fn default_hash_dimension() -> usize {
    8
}

/// Query-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Candidates requested from the index per wanted result
    pub overfetch_factor: usize,
}

/// Answer step configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    /// Token budget for retrieved context handed to the answerer
    pub max_context_tokens: usize,
}

impl Settings {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DocseekError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DocseekError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut settings: Settings = toml::from_str(&content)?;

        settings.apply_env_overrides();
        ConfigValidator::validate(&settings)?;

        Ok(settings)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| DocseekError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: DOCSEEK_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("DOCSEEK_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "CHUNKING__SIZE" => self.chunking.size = parse_value(path, value)?,
            "CHUNKING__OVERLAP" => self.chunking.overlap = parse_value(path, value)?,
            "STORAGE__DATA_DIR" => self.storage.data_dir = PathBuf::from(value),
            "EMBEDDING__BACKEND" => self.embedding.backend = value.to_string(),
            "EMBEDDING__MODEL" => self.embedding.model = value.to_string(),
            "EMBEDDING__BATCH_SIZE" => self.embedding.batch_size = parse_value(path, value)?,
            "RETRIEVAL__TOP_K" => self.retrieval.top_k = parse_value(path, value)?,
            "ANSWER__MAX_CONTEXT_TOKENS" => {
                self.answer.max_context_tokens = parse_value(path, value)?
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DocseekError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("docseek").join("config.toml"))
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| DocseekError::Config("Cannot determine home directory".to_string()))?;

        Ok(home_dir.join(".docseek"))
    }

    /// Settings rooted at `data_dir`, everything else default
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let mut settings = Self::default();
        settings.storage.data_dir = data_dir.into();
        settings
    }
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| DocseekError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("~/.docseek"),
                index_file: PathBuf::from("vectorstore/index.bin"),
                metadata_file: PathBuf::from("vectorstore/metadata.json"),
                processed_dir: PathBuf::from("processed"),
            },
            chunking: ChunkingConfig {
                size: 800,
                overlap: 200,
            },
            embedding: EmbeddingConfig {
                backend: "fastembed".to_string(),
                model: "all-MiniLM-L6-v2".to_string(),
                batch_size: 32,
                hash_dimension: default_hash_dimension(),
            },
            retrieval: RetrievalConfig {
                top_k: 3,
                overfetch_factor: 2,
            },
            answer: AnswerConfig {
                max_context_tokens: 3000,
            },
        }
    }
}
