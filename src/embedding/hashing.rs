/// Deterministic embedding provider for tests and offline smoke runs
use super::{EmbeddingError, EmbeddingProvider};

/// Derives a vector from the text's code-point sum.
///
/// Component `i` is `(seed + i) mod 97` where `seed` is the sum of the
/// text's code points mod 997. Identical text always maps to an identical
/// vector, which is all the ingestion and dedup paths need.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimension: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let seed = text.chars().map(|c| c as u64).sum::<u64>() % 997;
        (0..self.dimension as u64)
            .map(|i| ((seed + i) % 97) as f32)
            .collect()
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(8)
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let provider = HashEmbeddingProvider::new(4);
        // 'a' = 97 -> seed 97 -> components 0, 1, 2, 3
        assert_eq!(provider.vector_for("a"), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_deterministic_and_sized() {
        let provider = HashEmbeddingProvider::default();
        let texts = vec!["rapid brown fox".to_string(), "slow blue whale".to_string()];

        let first = provider.embed_batch(&texts).unwrap();
        let second = provider.embed_batch(&texts).unwrap();

        assert_eq!(first, second);
        assert!(first.iter().all(|v| v.len() == 8));
        assert_ne!(first[0], first[1]);
    }
}
