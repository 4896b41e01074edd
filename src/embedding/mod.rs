//! Embedding port
//!
//! - `EmbeddingProvider` trait for backends
//! - `FastEmbedProvider` for local embedding (all-MiniLM-L6-v2, 384-dim)
//! - `HashEmbeddingProvider`, deterministic, for tests
//! - `Embedder`, the port the retrieval engine talks to

mod embedder;
mod hashing;
mod provider;

pub use embedder::{Embedder, DEFAULT_EMBEDDING_DIM};
pub use hashing::HashEmbeddingProvider;
pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};

use crate::error::DocseekError;

impl From<EmbeddingError> for DocseekError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Unavailable(msg) | EmbeddingError::InitializationError(msg) => {
                DocseekError::BackendUnavailable(msg)
            }
            EmbeddingError::DimensionMismatch { expected, actual } => {
                DocseekError::DimensionMismatch { expected, actual }
            }
            EmbeddingError::GenerationError(msg) => {
                DocseekError::Other(anyhow::anyhow!("Embedding generation failed: {}", msg))
            }
        }
    }
}
