//! Turning a source document into chunk records

use super::chunk_text;
use crate::error::{DocseekError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A unit of retrievable text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// `<source stem>_<ordinal>`; uniqueness is up to the caller
    pub id: String,
    /// Literal chunk content
    pub text: String,
    /// Originating document (file path or logical tag)
    pub source: String,
}

impl ChunkRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: source.into(),
        }
    }
}

/// Chunk a document and derive ids from the source's file stem and ordinal.
pub fn chunk_document(
    source: &str,
    text: &str,
    size: usize,
    overlap: usize,
) -> Result<Vec<ChunkRecord>> {
    let stem = Path::new(source)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source);

    let records = chunk_text(text, size, overlap)?
        .into_iter()
        .enumerate()
        .map(|(idx, chunk)| ChunkRecord::new(format!("{}_{}", stem, idx), chunk, source))
        .collect();

    Ok(records)
}

/// Write one document's chunk records as pretty JSON, creating parent dirs.
pub fn persist_chunks(records: &[ChunkRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| DocseekError::Io {
            source: e,
            context: format!("Failed to create directory: {}", parent.display()),
        })?;
    }

    let json = serde_json::to_string_pretty(records).map_err(|e| DocseekError::Json {
        source: e,
        context: "Failed to serialize chunk records".to_string(),
    })?;

    fs::write(path, json).map_err(|e| DocseekError::Io {
        source: e,
        context: format!("Failed to write processed chunks: {}", path.display()),
    })
}

/// Read a UTF-8 text document
pub fn load_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| DocseekError::Io {
        source: e,
        context: format!("Failed to read document: {}", path.display()),
    })
}
