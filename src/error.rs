use std::path::PathBuf;
use thiserror::Error;

/// Main error type for docseek
#[derive(Error, Debug)]
pub enum DocseekError {
    /// Caller supplied an unusable parameter (e.g. a zero chunk size)
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Vector width differs from the dimension fixed by the corpus
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// No embedding capability is configured
    #[error("Embedding backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Persisted artifacts are unreadable or disagree with each other
    #[error("Corrupt corpus state at {path}: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DocseekError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptState {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error reports damaged persisted state
    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Self::CorruptState { .. })
    }
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for docseek operations
pub type Result<T> = std::result::Result<T, DocseekError>;
