use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::application::interfaces::EmbeddingProvider;
use crate::domain::DomainError;

/// Deterministic, dependency-free stand-in for a real embedding model:
/// hashes the input text to a seed and draws a unit vector from it, so the
/// same text always yields the same vector without calling out to a
/// network service. Used by default wiring and in tests.
pub struct MockEmbedding {
    name: String,
    dimension: usize,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self {
            name: "mock-embedding".to_string(),
            dimension: 384,
        }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            name: "mock-embedding".to_string(),
            dimension,
        }
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for x in &mut vector {
                *x /= magnitude;
            }
        }
        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports_prefixes(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn probe_dimension(&self) -> Result<usize, DomainError> {
        Ok(self.dimension)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        debug!(count = texts.len(), "generating mock embeddings");
        Ok(texts.iter().map(|t| self.generate(t)).collect())
    }

    async fn embed_single(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.generate(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedding_consistency() {
        let provider = MockEmbedding::new();
        let a = provider.embed_single("hello world").await.unwrap();
        let b = provider.embed_single("hello world").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_mock_embedding_dimension() {
        let provider = MockEmbedding::with_dimension(128);
        let v = provider.embed_single("test").await.unwrap();
        assert_eq!(v.len(), 128);
    }

    #[tokio::test]
    async fn test_mock_embedding_normalized() {
        let provider = MockEmbedding::new();
        let v = provider.embed_single("test").await.unwrap();
        let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.001);
    }
}
