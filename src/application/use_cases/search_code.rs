use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::application::interfaces::VectorStore;
use crate::application::orchestrator::EmbeddingOrchestrator;
use crate::domain::{CodeSearchQuery, CodeSearchResult, DomainError};

/// Embeds a natural-language query and similarity-searches the chunk table
/// (§4.5 `search`).
pub struct SearchCodeUseCase {
    orchestrator: Arc<EmbeddingOrchestrator>,
    store: Arc<dyn VectorStore>,
}

impl SearchCodeUseCase {
    pub fn new(orchestrator: Arc<EmbeddingOrchestrator>, store: Arc<dyn VectorStore>) -> Self {
        Self { orchestrator, store }
    }

    pub async fn execute(
        &self,
        query: &CodeSearchQuery,
    ) -> Result<Vec<CodeSearchResult>, DomainError> {
        let started = Instant::now();
        let vector = self.orchestrator.embed_query(query.query()).await?;
        let results = self
            .store
            .search(&vector, query.limit(), query.file_filter())
            .await?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            hits = results.len(),
            "code search complete"
        );
        Ok(results)
    }
}
