use serde::{Deserialize, Serialize};

/// A dense vector tied to the id of the record (code chunk or history
/// chunk) it was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    record_id: String,
    vector: Vec<f32>,
    model: String,
}

impl Embedding {
    pub fn new(record_id: String, vector: Vec<f32>, model: String) -> Self {
        Self {
            record_id,
            vector,
            model,
        }
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    pub fn is_zero(&self) -> bool {
        self.vector.iter().all(|v| *v == 0.0)
    }

    pub fn magnitude(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    /// Cosine similarity; a zero vector on either side yields `0.0`, never `NaN`.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        cosine_similarity(&self.vector, &other.vector)
    }
}

/// Cosine similarity between two raw vectors. Mismatched lengths or a zero
/// vector both yield `0.0` rather than `NaN` or a panic.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Describes the embedding model backing a [`crate::EmbeddingService`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    model_name: String,
    dimensions: usize,
    supports_prefixes: bool,
}

impl EmbeddingConfig {
    pub fn new(model_name: String, dimensions: usize, supports_prefixes: bool) -> Self {
        Self {
            model_name,
            dimensions,
            supports_prefixes,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn supports_prefixes(&self) -> bool {
        self.supports_prefixes
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: "mock-embedding".to_string(),
            dimensions: 384,
            supports_prefixes: true,
        }
    }
}

/// `search_document: ` / `search_query: ` markers (§6, bit-stable).
pub const DOCUMENT_PREFIX: &str = "search_document: ";
pub const QUERY_PREFIX: &str = "search_query: ";

/// Progressive character-truncation ladder for the embedding retry path (§5).
pub const TRUNCATION_LADDER: [usize; 4] = [8000, 4000, 2000, 500];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_creation() {
        let embedding = Embedding::new(
            "chunk-1".to_string(),
            vec![0.5, 0.5, 0.5, 0.5],
            "test-model".to_string(),
        );

        assert_eq!(embedding.record_id(), "chunk-1");
        assert_eq!(embedding.dimensions(), 4);
        assert_eq!(embedding.model(), "test-model");
    }

    #[test]
    fn test_magnitude() {
        let embedding = Embedding::new("chunk".to_string(), vec![3.0, 4.0], "test".to_string());
        assert!((embedding.magnitude() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity() {
        let e1 = Embedding::new("a".to_string(), vec![1.0, 0.0], "m".to_string());
        let e2 = Embedding::new("b".to_string(), vec![1.0, 0.0], "m".to_string());
        let e3 = Embedding::new("c".to_string(), vec![0.0, 1.0], "m".to_string());

        assert!((e1.cosine_similarity(&e2) - 1.0).abs() < 0.001);
        assert!((e1.cosine_similarity(&e3)).abs() < 0.001);
    }

    #[test]
    fn test_zero_vector_never_nan() {
        let zero = vec![0.0; 8];
        let other = vec![1.0; 8];
        let score = cosine_similarity(&zero, &other);
        assert_eq!(score, 0.0);
        assert!(!score.is_nan());
    }

    #[test]
    fn test_mismatched_length_yields_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }
}
