use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::application::interfaces::VectorStore;
use crate::application::orchestrator::EmbeddingOrchestrator;
use crate::domain::{DomainError, GitSearchQuery, HistorySearchResult};

/// Embeds a natural-language query and similarity-searches the history
/// table under the query's ANDed structured clauses (§4.5
/// `search_git_history`).
pub struct SearchHistoryUseCase {
    orchestrator: Arc<EmbeddingOrchestrator>,
    store: Arc<dyn VectorStore>,
}

impl SearchHistoryUseCase {
    pub fn new(orchestrator: Arc<EmbeddingOrchestrator>, store: Arc<dyn VectorStore>) -> Self {
        Self { orchestrator, store }
    }

    pub async fn execute(
        &self,
        query: &GitSearchQuery,
    ) -> Result<Vec<HistorySearchResult>, DomainError> {
        let started = Instant::now();
        let vector = self.orchestrator.embed_query(query.query()).await?;
        let results = self
            .store
            .search_git_history(&vector, query.limit(), query.clauses())
            .await?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            hits = results.len(),
            "git history search complete"
        );
        Ok(results)
    }
}
