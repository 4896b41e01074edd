//! Retrieval: the engine that ties embedding, index and metadata together,
//! plus query-time deduplication.

mod deduplication;
mod engine;

pub use deduplication::{normalize_whitespace, Deduplicator};
pub use engine::RetrievalEngine;

use crate::chunking::ChunkRecord;
use serde::{Deserialize, Serialize};

/// A retrieved chunk and its squared L2 distance to the query (lower is closer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub record: ChunkRecord,
    pub distance: f32,
}

/// Snapshot of corpus size, taken under one lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Vectors in the index
    pub rows: usize,
    /// Records in the metadata store; always equal to `rows`
    pub records: usize,
    /// Fixed vector dimension, `None` before the first ingestion
    pub dimension: Option<usize>,
    /// Distinct `source` values
    pub sources: usize,
}
