//! Similarity index: append-only, exact nearest neighbour, persisted as one artifact

pub mod artifact;
mod flat;

pub use flat::{Neighbor, VectorIndex, VectorIndexError};

use crate::error::DocseekError;

impl From<VectorIndexError> for DocseekError {
    fn from(err: VectorIndexError) -> Self {
        match err {
            VectorIndexError::InvalidDimension { expected, actual } => {
                DocseekError::DimensionMismatch { expected, actual }
            }
            VectorIndexError::InvalidVector(msg) => {
                DocseekError::Other(anyhow::anyhow!("Invalid vector: {}", msg))
            }
        }
    }
}
