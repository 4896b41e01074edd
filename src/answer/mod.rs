//! Answer generation seam
//!
//! The language-model client lives outside this crate; it plugs in through
//! [`AnswerGenerator`]. [`ExtractiveAnswerer`] is the offline implementation
//! that stitches an answer together from the retrieved chunks.

use crate::error::Result;
use ahash::AHashSet;

/// Reply used when retrieval produced no context at all
pub const NO_CONTEXT_ANSWER: &str = "No relevant information found in the documents.";

const OFFLINE_NOTE: &str = "(Extractive answer assembled from retrieved passages)";
const MAX_CONTEXT_CHUNKS: usize = 4;
const MAX_CHUNK_CHARS: usize = 400;
const MIN_TAIL_TOKENS: usize = 100;
const EARLY_WINDOW_CHARS: usize = 200;

pub trait AnswerGenerator: Send + Sync {
    /// Answer `query` using only `context`
    fn generate_answer(&self, query: &str, context: &[String]) -> Result<String>;
}

/// Rough token count: four characters per token
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Trim retrieved chunks to fit a prompt budget.
///
/// Keeps at most four chunks, clips each to 400 characters, and stops once
/// `max_tokens` is reached. A chunk that would overflow is clipped to the
/// remaining budget when more than 100 tokens remain, otherwise dropped.
pub fn truncate_context(chunks: &[String], max_tokens: usize) -> Vec<String> {
    let mut kept = Vec::new();
    let mut total = 0;

    for (i, chunk) in chunks.iter().enumerate() {
        if i >= MAX_CONTEXT_CHUNKS || total >= max_tokens {
            break;
        }

        let text = if chunk.chars().count() > MAX_CHUNK_CHARS {
            let mut clipped: String = chunk.chars().take(MAX_CHUNK_CHARS).collect();
            clipped.push_str("...");
            clipped
        } else {
            chunk.clone()
        };

        let tokens = estimate_tokens(&text);
        if total + tokens > max_tokens {
            let remaining = max_tokens - total;
            if remaining > MIN_TAIL_TOKENS {
                kept.push(text.chars().take(remaining * 4).collect());
            }
            break;
        }

        kept.push(text);
        total += tokens;
    }

    kept
}

/// Keyword-overlap answerer that needs no model
#[derive(Debug, Clone, Default)]
pub struct ExtractiveAnswerer;

impl ExtractiveAnswerer {
    pub fn new() -> Self {
        Self
    }

    fn query_words(query: &str) -> AHashSet<String> {
        query
            .to_lowercase()
            .split_whitespace()
            .filter(|w| w.chars().count() > 2)
            .map(|w| w.trim_matches(|c: char| ".,!?;:".contains(c)).to_string())
            .filter(|w| !w.is_empty())
            .collect()
    }

    fn score(chunk: &str, words: &AHashSet<String>) -> f32 {
        let lower = chunk.to_lowercase();
        let early: String = lower.chars().take(EARLY_WINDOW_CHARS).collect();

        let matches = words.iter().filter(|w| lower.contains(w.as_str())).count();
        let bonus = if words.iter().any(|w| early.contains(w.as_str())) {
            2.0
        } else {
            1.0
        };
        matches as f32 * bonus
    }
}

impl AnswerGenerator for ExtractiveAnswerer {
    fn generate_answer(&self, query: &str, context: &[String]) -> Result<String> {
        if context.is_empty() {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        let words = Self::query_words(query);
        let mut scored: Vec<(f32, &str)> = context
            .iter()
            .map(|c| (Self::score(c, &words), c.as_str()))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut top: Vec<&str> = scored
            .iter()
            .take(3)
            .filter(|(score, _)| *score > 0.0)
            .map(|(_, chunk)| *chunk)
            .collect();
        if top.is_empty() {
            top.push(context[0].as_str());
        }

        let combined = top.join(" ");
        let sentences: Vec<&str> = combined.split(". ").collect();

        let mut relevant: Vec<&str> = Vec::new();
        for sentence in &sentences {
            let lower = sentence.to_lowercase();
            if words.iter().any(|w| lower.contains(w.as_str())) || relevant.len() < 2 {
                relevant.push(sentence.trim());
            }
            if relevant.len() >= 4 {
                break;
            }
        }
        if relevant.is_empty() {
            relevant = sentences.iter().take(3).map(|s| s.trim()).collect();
        }

        let mut summary = relevant.join(". ");
        if !summary.ends_with('.') {
            summary.push('.');
        }

        tracing::debug!("Extractive answer built from {} chunks", top.len());
        Ok(format!("{}\n\n{}", summary, OFFLINE_NOTE))
    }
}
