use std::sync::Arc;

use chrono::Utc;

use crate::application::classifier::{classify, Strategy, StructuredGitField};
use crate::application::interfaces::VectorStore;
use crate::application::orchestrator::EmbeddingOrchestrator;
use crate::domain::{CodeSearchResult, DomainError, GitFilterClause, HistorySearchResult};

/// Combined code+history explanation for a natural-language query,
/// routed through the query classifier (§4.8 "Query classifier").
#[derive(Debug, Clone, Default)]
pub struct ExplainResult {
    pub strategy: String,
    pub code_results: Vec<CodeSearchResult>,
    pub history_results: Vec<HistorySearchResult>,
}

pub struct ExplainUseCase {
    orchestrator: Arc<EmbeddingOrchestrator>,
    store: Arc<dyn VectorStore>,
}

impl ExplainUseCase {
    pub fn new(orchestrator: Arc<EmbeddingOrchestrator>, store: Arc<dyn VectorStore>) -> Self {
        Self { orchestrator, store }
    }

    pub async fn execute(&self, query: &str, limit: usize) -> Result<ExplainResult, DomainError> {
        let classified = classify(query, Utc::now().date_naive());

        match classified.strategy {
            Strategy::Vector => {
                let vector = self.orchestrator.embed_query(query).await?;
                let code_results = self.store.search(&vector, limit, None).await?;
                let history_results = self
                    .store
                    .search_git_history(&vector, limit, &[])
                    .await?;
                Ok(ExplainResult {
                    strategy: "vector".to_string(),
                    code_results,
                    history_results,
                })
            }
            Strategy::TemporalVector { after } => {
                let vector = self.orchestrator.embed_query(query).await?;
                let after_dt = after
                    .and_hms_opt(0, 0, 0)
                    .expect("midnight is a valid time")
                    .and_utc();
                let clauses = vec![GitFilterClause::DateAfter(after_dt)];
                let history_results = self
                    .store
                    .search_git_history(&vector, limit, &clauses)
                    .await?;
                Ok(ExplainResult {
                    strategy: "temporal_vector".to_string(),
                    code_results: Vec::new(),
                    history_results,
                })
            }
            Strategy::StructuredGit { field } => {
                let vector = self.orchestrator.embed_query(query).await?;
                let clause = match field {
                    StructuredGitField::FileChanged(path) => GitFilterClause::FilePath(path),
                    StructuredGitField::Author(author) => GitFilterClause::Author(author),
                };
                let history_results = self
                    .store
                    .search_git_history(&vector, limit, &[clause])
                    .await?;
                Ok(ExplainResult {
                    strategy: "structured_git".to_string(),
                    code_results: Vec::new(),
                    history_results,
                })
            }
            Strategy::Blame { file, .. } => {
                let vector = self.orchestrator.embed_query(query).await?;
                let clauses = vec![GitFilterClause::FilePath(file)];
                let history_results = self
                    .store
                    .search_git_history(&vector, limit, &clauses)
                    .await?;
                Ok(ExplainResult {
                    strategy: "blame".to_string(),
                    code_results: Vec::new(),
                    history_results,
                })
            }
            Strategy::Pickaxe { search_string } => {
                let vector = self.orchestrator.embed_query(&search_string).await?;
                let history_results = self
                    .store
                    .search_git_history(&vector, limit, &[])
                    .await?;
                Ok(ExplainResult {
                    strategy: "pickaxe".to_string(),
                    code_results: Vec::new(),
                    history_results,
                })
            }
        }
    }
}
