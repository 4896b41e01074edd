//! The embedding port used by both ingestion and query paths

use super::{EmbeddingError, EmbeddingProvider, FastEmbedProvider, HashEmbeddingProvider};
use crate::config::EmbeddingConfig;
use crate::error::{DocseekError, Result};
use ndarray::Array2;
use std::sync::Arc;
use tracing::{debug, warn};

/// Dimension reported when no backend is configured (all-MiniLM-L6-v2)
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

const DEFAULT_BATCH_SIZE: usize = 32;

/// Wraps an optional [`EmbeddingProvider`] and produces `(n, D)` matrices.
///
/// Inputs are trimmed and blank ones dropped before the backend sees them.
/// An embedder without a backend still answers blank input with a zero-row
/// matrix, and fails with [`EmbeddingError::Unavailable`] otherwise.
#[derive(Clone)]
pub struct Embedder {
    provider: Option<Arc<dyn EmbeddingProvider>>,
    batch_size: usize,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider: Some(provider),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// An embedder with no backend; every non-blank call fails
    pub fn unavailable() -> Self {
        Self {
            provider: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Build the backend named by `embedding.backend`.
    ///
    /// A fastembed model that fails to load is logged and leaves the embedder
    /// without a backend, so callers see `BackendUnavailable` at use time.
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let embedder = match config.backend.as_str() {
            "fastembed" => match FastEmbedProvider::new(&config.model) {
                Ok(provider) => Self::new(Arc::new(provider)),
                Err(e) => {
                    warn!("Failed to load embedding model {}: {}", config.model, e);
                    Self::unavailable()
                }
            },
            "hash" => Self::new(Arc::new(HashEmbeddingProvider::new(config.hash_dimension))),
            "none" => Self::unavailable(),
            other => {
                return Err(DocseekError::invalid_config(format!(
                    "unknown embedding backend '{}'",
                    other
                )))
            }
        };
        Ok(embedder.with_batch_size(config.batch_size))
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Backend dimension, or [`DEFAULT_EMBEDDING_DIM`] without a backend
    pub fn dimension(&self) -> usize {
        self.provider
            .as_ref()
            .map(|p| p.dimension())
            .unwrap_or(DEFAULT_EMBEDDING_DIM)
    }

    pub fn model_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.model_name())
    }

    /// Embed the non-blank texts, in order, as one row each.
    pub fn embed<S: AsRef<str>>(&self, texts: &[S]) -> std::result::Result<Array2<f32>, EmbeddingError> {
        let filtered: Vec<String> = texts
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        if filtered.is_empty() {
            return Ok(Array2::zeros((0, self.dimension())));
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            EmbeddingError::Unavailable(
                "configure an embedding backend (fastembed or hash)".to_string(),
            )
        })?;
        let dimension = provider.dimension();

        let mut data = Vec::with_capacity(filtered.len() * dimension);
        for batch in filtered.chunks(self.batch_size) {
            let vectors = provider.embed_batch(batch)?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::GenerationError(format!(
                    "Embedding count mismatch: expected {}, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            for vector in vectors {
                if vector.len() != dimension {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: dimension,
                        actual: vector.len(),
                    });
                }
                data.extend(vector);
            }
            debug!("Embedded batch of {} texts", batch.len());
        }

        Array2::from_shape_vec((filtered.len(), dimension), data)
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))
    }
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("model", &self.model_name())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
