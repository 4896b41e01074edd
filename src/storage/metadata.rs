//! Ordered chunk metadata, parallel to the vector index rows

use super::write_atomic;
use crate::chunking::ChunkRecord;
use crate::error::{DocseekError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const FORMAT_VERSION: u32 = 1;

/// Append-only sequence of chunk records; position `i` describes index row `i`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataStore {
    records: Vec<ChunkRecord>,
}

#[derive(Serialize)]
struct MetadataFileRef<'a> {
    format_version: u32,
    count: usize,
    records: &'a [ChunkRecord],
}

#[derive(Deserialize)]
struct MetadataFile {
    format_version: u32,
    count: usize,
    records: Vec<ChunkRecord>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records in order
    pub fn append<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = ChunkRecord>,
    {
        self.records.extend(records);
    }

    /// Record at ordinal position `row`
    pub fn get(&self, row: usize) -> Option<&ChunkRecord> {
        self.records.get(row)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.records.iter()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Serialize to the self-describing JSON artifact
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let file = MetadataFileRef {
            format_version: FORMAT_VERSION,
            count: self.records.len(),
            records: &self.records,
        };
        serde_json::to_vec(&file).map_err(|e| DocseekError::Json {
            source: e,
            context: "Failed to serialize chunk metadata".to_string(),
        })
    }

    /// Parse the JSON artifact; `path` is only used in error reports.
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self> {
        let file: MetadataFile = serde_json::from_slice(bytes)
            .map_err(|e| DocseekError::corrupt(path, format!("unreadable metadata: {}", e)))?;

        if file.format_version != FORMAT_VERSION {
            return Err(DocseekError::corrupt(
                path,
                format!("unsupported metadata format version {}", file.format_version),
            ));
        }
        if file.count != file.records.len() {
            return Err(DocseekError::corrupt(
                path,
                format!(
                    "metadata declares {} records but holds {}",
                    file.count,
                    file.records.len()
                ),
            ));
        }

        Ok(Self {
            records: file.records,
        })
    }

    /// Write the metadata artifact via temp file + rename
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_bytes()?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| DocseekError::Io {
            source: e,
            context: format!("Failed to read metadata artifact: {}", path.display()),
        })?;
        Self::from_bytes(&bytes, path)
    }
}
