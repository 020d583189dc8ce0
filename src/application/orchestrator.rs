use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::application::interfaces::EmbeddingProvider;
use crate::domain::{
    DomainError, Embedding, CodeChunk, HistoryChunk, DOCUMENT_PREFIX, QUERY_PREFIX,
    TRUNCATION_LADDER,
};

/// Wraps an opaque [`EmbeddingProvider`] with the bounded-concurrency,
/// binary-split-retry, truncation-ladder, zero-vector-fallback contract of
/// §5. The provider itself stays a thin external port; everything in this
/// file is pure orchestration logic and is fully testable with a
/// deliberately-flaky provider double.
pub struct EmbeddingOrchestrator {
    provider: Arc<dyn EmbeddingProvider>,
    concurrency: usize,
    fallback_count: AtomicUsize,
}

impl EmbeddingOrchestrator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
            fallback_count: AtomicUsize::new(0),
        }
    }

    /// Count of inputs that exhausted the truncation ladder and fell back
    /// to a zero vector, since this orchestrator was constructed.
    pub fn fallback_count(&self) -> usize {
        self.fallback_count.load(Ordering::Relaxed)
    }

    pub async fn embed_code_chunks(
        &self,
        chunks: &[CodeChunk],
    ) -> Result<Vec<Embedding>, DomainError> {
        let texts: Vec<String> = chunks
            .iter()
            .map(|c| self.prefixed(c.content()))
            .collect();
        let vectors = self.embed_texts(&texts).await?;
        Ok(chunks
            .iter()
            .zip(vectors)
            .map(|(c, v)| Embedding::new(c.id().to_string(), v, self.provider.name().to_string()))
            .collect())
    }

    pub async fn embed_history_chunks(
        &self,
        chunks: &[HistoryChunk],
    ) -> Result<Vec<Embedding>, DomainError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text().to_string()).collect();
        let vectors = self.embed_texts(&texts).await?;
        Ok(chunks
            .iter()
            .zip(vectors)
            .map(|(c, v)| Embedding::new(c.id().to_string(), v, self.provider.name().to_string()))
            .collect())
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        let text = if self.provider.supports_prefixes() {
            format!("{QUERY_PREFIX}{query}")
        } else {
            query.to_string()
        };
        self.embed_one(&text).await
    }

    fn prefixed(&self, content: &str) -> String {
        if self.provider.supports_prefixes() {
            format!("{DOCUMENT_PREFIX}{content}")
        } else {
            content.to_string()
        }
    }

    /// Embeds `texts` preserving order, splitting the batch across a
    /// semaphore-bounded pool of concurrent provider calls.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let chunk_size = texts.len().div_ceil(self.concurrency).max(1);
        let mut handles = Vec::new();

        for (offset, slice) in texts.chunks(chunk_size).enumerate() {
            let start = offset * chunk_size;
            let slice = slice.to_vec();
            let semaphore = semaphore.clone();
            let provider = self.provider.clone();
            handles.push(async move {
                let _permit = semaphore.acquire().await.expect("semaphore not closed");
                let vectors = Self::embed_batch_with_retry(provider.as_ref(), &slice).await;
                (start, vectors)
            });
        }

        let results = futures_util::future::join_all(handles).await;
        let dimension = self.provider.probe_dimension().await.unwrap_or(0);
        let mut out: Vec<Vec<f32>> = vec![vec![0.0; dimension]; texts.len()];
        let mut fallbacks = 0usize;
        for (start, (vectors, batch_fallbacks)) in
            results.into_iter().map(|(s, (v, f))| (s, (v, f)))
        {
            fallbacks += batch_fallbacks;
            for (i, vector) in vectors.into_iter().enumerate() {
                out[start + i] = vector;
            }
        }
        if fallbacks > 0 {
            self.fallback_count.fetch_add(fallbacks, Ordering::Relaxed);
            warn!(
                fallbacks,
                "embedding batch fell back to zero vectors for some inputs"
            );
        }
        Ok(out)
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        match self.provider.embed_single(text).await {
            Ok(v) => Ok(v),
            Err(e) => {
                debug!(error = %e, "embed_single failed, falling back to batch retry path");
                let (mut vectors, _) =
                    Self::embed_batch_with_retry(self.provider.as_ref(), &[text.to_string()])
                        .await;
                Ok(vectors.pop().unwrap_or_default())
            }
        }
    }

    /// Binary-split retry: on batch failure, halve and retry each half; a
    /// single item still failing walks the truncation ladder; exhausting
    /// the ladder emits a zero vector and counts as a fallback. Returns
    /// `(vectors, fallback_count)` with `vectors.len() == texts.len()`,
    /// order preserved.
    fn embed_batch_with_retry<'a>(
        provider: &'a dyn EmbeddingProvider,
        texts: &'a [String],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = (Vec<Vec<f32>>, usize)> + Send + 'a>>
    {
        Box::pin(async move {
            if texts.is_empty() {
                return (Vec::new(), 0);
            }

            match provider.embed_batch(texts).await {
                Ok(vectors) if vectors.len() == texts.len() => (vectors, 0),
                _ if texts.len() == 1 => Self::embed_single_with_truncation(provider, &texts[0]).await,
                _ => {
                    let mid = texts.len() / 2;
                    let (left, right) = texts.split_at(mid);
                    let (mut left_vecs, left_fb) =
                        Self::embed_batch_with_retry(provider, left).await;
                    let (right_vecs, right_fb) =
                        Self::embed_batch_with_retry(provider, right).await;
                    left_vecs.extend(right_vecs);
                    (left_vecs, left_fb + right_fb)
                }
            }
        })
    }

    async fn embed_single_with_truncation(
        provider: &dyn EmbeddingProvider,
        text: &str,
    ) -> (Vec<Vec<f32>>, usize) {
        for &limit in TRUNCATION_LADDER.iter() {
            let truncated: String = text.chars().take(limit).collect();
            if let Ok(vector) = provider.embed_single(&truncated).await {
                return (vec![vector], 0);
            }
        }
        let dimension = provider.probe_dimension().await.unwrap_or(0);
        (vec![vec![0.0; dimension]], 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;

    struct FlakyProvider {
        dimension: usize,
        fail_below_len: usize,
        calls: AtomicU32,
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky-test-provider"
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
            self.calls.fetch_add(1, Ordering::Relaxed);
            if texts.len() > self.fail_below_len {
                return Err(DomainError::embedding("simulated batch failure"));
            }
            Ok(texts.iter().map(|_| vec![1.0; self.dimension]).collect())
        }

        async fn embed_single(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
            Ok(vec![1.0; self.dimension])
        }
    }

    #[tokio::test]
    async fn test_order_preserved_across_split() {
        let provider = Arc::new(FlakyProvider {
            dimension: 4,
            fail_below_len: 2,
            calls: AtomicU32::new(0),
        });
        let orchestrator = EmbeddingOrchestrator::new(provider, 1);
        let texts: Vec<String> = (0..8).map(|i| format!("text-{i}")).collect();
        let vectors = orchestrator.embed_texts(&texts).await.unwrap();
        assert_eq!(vectors.len(), 8);
        assert!(vectors.iter().all(|v| v.len() == 4));
    }

    #[tokio::test]
    async fn test_zero_vector_fallback_on_persistent_failure() {
        struct AlwaysFails;

        #[async_trait]
        impl EmbeddingProvider for AlwaysFails {
            fn name(&self) -> &str {
                "always-fails"
            }
            fn supports_prefixes(&self) -> bool {
                false
            }
            async fn health_check(&self) -> Result<(), DomainError> {
                Ok(())
            }
            async fn probe_dimension(&self) -> Result<usize, DomainError> {
                Ok(3)
            }
            async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
                Err(DomainError::embedding("always fails"))
            }
            async fn embed_single(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
                Err(DomainError::embedding("always fails"))
            }
        }

        let orchestrator = EmbeddingOrchestrator::new(Arc::new(AlwaysFails), 2);
        let vectors = orchestrator
            .embed_texts(&["one".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![0.0; 3]]);
        assert_eq!(orchestrator.fallback_count(), 1);
    }
}
