//! docseek - document retrieval engine
//!
//! Splits raw text into overlapping chunks, embeds them, keeps an exact
//! nearest-neighbour index aligned row-for-row with the chunk metadata,
//! persists both across restarts, and serves deduplicated ranked passages
//! for a downstream answer step.

pub mod answer;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod retrieval;
pub mod storage;

pub use chunking::{chunk_text, ChunkRecord};
pub use error::{DocseekError, Result};
pub use retrieval::{RetrievalEngine, SearchHit};
