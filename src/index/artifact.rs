//! On-disk form of the vector index
//!
//! Layout (little-endian):
//! `"DSIX"` | version u32 | dimension u32 | rows u64 | rows*dimension f32 | blake3(all previous bytes)

use super::VectorIndex;
use crate::error::{DocseekError, Result};
use crate::storage::write_atomic;
use std::path::Path;

const MAGIC: &[u8; 4] = b"DSIX";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;
const DIGEST_LEN: usize = 32;

/// Serialize the index into its artifact bytes
pub fn encode(index: &VectorIndex) -> Vec<u8> {
    let data = index.as_slice();
    let mut bytes = Vec::with_capacity(HEADER_LEN + data.len() * 4 + DIGEST_LEN);

    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(index.dimension().unwrap_or(0) as u32).to_le_bytes());
    bytes.extend_from_slice(&(index.len() as u64).to_le_bytes());
    for value in data {
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    let digest = blake3::hash(&bytes);
    bytes.extend_from_slice(digest.as_bytes());
    bytes
}

/// Parse artifact bytes; `path` is only used in error reports.
pub fn decode(bytes: &[u8], path: &Path) -> Result<VectorIndex> {
    let corrupt = |reason: String| DocseekError::corrupt(path, reason);

    if bytes.len() < HEADER_LEN + DIGEST_LEN {
        return Err(corrupt(format!("truncated index artifact ({} bytes)", bytes.len())));
    }

    let (body, digest) = bytes.split_at(bytes.len() - DIGEST_LEN);
    if blake3::hash(body).as_bytes() != digest {
        return Err(corrupt("index checksum mismatch".to_string()));
    }

    if &body[0..4] != MAGIC {
        return Err(corrupt("not an index artifact".to_string()));
    }
    let version = read_u32(&body[4..8]);
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported index format version {}", version)));
    }
    let dimension = read_u32(&body[8..12]) as usize;
    let rows = read_u64(&body[12..20]) as usize;

    if dimension == 0 && rows != 0 {
        return Err(corrupt(format!("index declares {} rows of zero width", rows)));
    }

    let payload = &body[HEADER_LEN..];
    let expected = rows
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| corrupt("index header overflows".to_string()))?;
    if payload.len() != expected {
        return Err(corrupt(format!(
            "index declares {} rows of {} but holds {} bytes of vector data",
            rows,
            dimension,
            payload.len()
        )));
    }

    let data: Vec<f32> = payload
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    VectorIndex::from_parts(dimension, data).map_err(|e| corrupt(e.to_string()))
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

impl VectorIndex {
    /// Write the index artifact via temp file + rename
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &encode(self))
    }

    /// Read an index artifact written by [`VectorIndex::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| DocseekError::Io {
            source: e,
            context: format!("Failed to read index artifact: {}", path.display()),
        })?;
        decode(&bytes, path)
    }
}
