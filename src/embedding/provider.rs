//! Embedding backends
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("No embedding backend configured: {0}")]
    Unavailable(String),

    #[error("Model initialization failed: {0}")]
    InitializationError(String),

    #[error("Embedding generation failed: {0}")]
    GenerationError(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A backend that turns text into fixed-width vectors.
///
/// Inputs arrive already trimmed and non-empty; implementations return one
/// vector per input, in order.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for multiple texts
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Local models the FastEmbed backend can load, with their output width
const SUPPORTED_MODELS: &[(&str, usize)] = &[
    ("all-MiniLM-L6-v2", 384),
    ("bge-small-en-v1.5", 384),
    ("bge-base-en-v1.5", 768),
];

fn resolve_model(name: &str) -> Option<(EmbeddingModel, usize)> {
    let model = match name.to_ascii_lowercase().as_str() {
        "all-minilm-l6-v2" => EmbeddingModel::AllMiniLML6V2,
        "bge-small-en-v1.5" => EmbeddingModel::BGESmallENV15,
        "bge-base-en-v1.5" => EmbeddingModel::BGEBaseENV15,
        _ => return None,
    };
    SUPPORTED_MODELS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, dim)| (model, *dim))
}

/// Sentence-embedding backend running an ONNX model in-process.
///
/// Weights are fetched into the Hugging Face cache on first use, after that
/// no network access is needed.
pub struct FastEmbedProvider {
    model: Arc<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl FastEmbedProvider {
    pub fn new(model_name: &str) -> Result<Self, EmbeddingError> {
        let (embedding_model, dimension) = resolve_model(model_name).ok_or_else(|| {
            let known: Vec<&str> = SUPPORTED_MODELS.iter().map(|(name, _)| *name).collect();
            EmbeddingError::InitializationError(format!(
                "unknown embedding model '{}' (known: {})",
                model_name,
                known.join(", ")
            ))
        })?;

        tracing::info!("Loading embedding model {} ({} dims)", model_name, dimension);

        let model = TextEmbedding::try_new(
            InitOptions::new(embedding_model).with_show_download_progress(false),
        )
        .map_err(|e| EmbeddingError::InitializationError(e.to_string()))?;

        Ok(Self {
            model: Arc::new(model),
            model_name: model_name.to_string(),
            dimension,
        })
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self
            .model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?;

        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: bad.len(),
            });
        }

        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_lists_alternatives() {
        match FastEmbedProvider::new("word2vec") {
            Err(EmbeddingError::InitializationError(msg)) => {
                assert!(msg.contains("word2vec"));
                assert!(msg.contains("bge-small-en-v1.5"));
            }
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("word2vec should not resolve"),
        }
    }

    #[test]
    fn test_model_names_resolve_case_insensitively() {
        assert_eq!(resolve_model("ALL-MiniLM-L6-v2").map(|(_, d)| d), Some(384));
        assert_eq!(resolve_model("bge-base-en-v1.5").map(|(_, d)| d), Some(768));
        assert!(resolve_model("bge-large").is_none());
    }

    #[test]
    #[ignore] // Requires model download
    fn test_default_model_shape() {
        let provider = FastEmbedProvider::new("all-MiniLM-L6-v2").unwrap();
        assert_eq!(provider.dimension(), 384);

        let texts = vec!["Prime the pump.".to_string(), "Drain the tank.".to_string()];
        let vectors = provider.embed_batch(&texts).unwrap();
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 384));
    }

    #[test]
    #[ignore] // Requires model download
    fn test_paraphrase_is_closer_than_unrelated() {
        let provider = FastEmbedProvider::new("all-MiniLM-L6-v2").unwrap();
        let texts = vec![
            "Replace the water filter twice a year.".to_string(),
            "Swap out the filter every six months.".to_string(),
            "The invoice is due on Friday.".to_string(),
        ];
        let v = provider.embed_batch(&texts).unwrap();

        let dist = |a: &[f32], b: &[f32]| -> f32 {
            a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
        };
        assert!(dist(&v[0], &v[1]) < dist(&v[0], &v[2]));
    }
}
