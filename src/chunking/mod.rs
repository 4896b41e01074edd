//! Whitespace-token chunking with a sliding, overlapping window

mod document;

pub use document::{chunk_document, load_text, persist_chunks, ChunkRecord};

use crate::error::{DocseekError, Result};

/// Split `text` into windows of `size` whitespace tokens that share
/// `overlap` tokens with their predecessor.
///
/// `overlap >= size` is clamped to `size - 1` so the window always moves
/// forward. The last window may be shorter than `size`; it is emitted once
/// and iteration stops there.
///
/// # Errors
/// `InvalidConfig` when `size` is zero.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    if size == 0 {
        return Err(DocseekError::invalid_config("chunk size must be positive"));
    }
    let overlap = if overlap >= size { size - 1 } else { overlap };
    let stride = size - overlap;

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < tokens.len() {
        let end = (start + size).min(tokens.len());
        let chunk = tokens[start..end].join(" ");
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        if end == tokens.len() {
            break;
        }
        start += stride;
    }

    Ok(chunks)
}
