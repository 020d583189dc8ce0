use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::interfaces::{CommitExtractor, EmbeddingProvider, ParserService, VectorStore};
use crate::application::orchestrator::EmbeddingOrchestrator;
use crate::application::use_cases::{
    AssessUseCase, ExplainUseCase, FileProfileUseCase, IndexCodeUseCase, IndexHistoryUseCase,
    SearchCodeUseCase, SearchHistoryUseCase,
};
use crate::connector::adapter::{
    DuckdbVectorStore, GitCliCommitExtractor, InMemoryVectorRepository, MockEmbedding,
    TreeSitterParserService,
};
use crate::domain::DomainError;

const DEFAULT_CONCURRENCY: usize = 3;
const STORE_DIR_NAME: &str = ".cortex-recall";
const STORE_FILE_NAME: &str = "store.duckdb";

pub struct ContainerConfig {
    pub repo_path: PathBuf,
    /// Use an in-process, non-persistent vector store instead of DuckDB.
    /// Mirrors the teacher's own `memory_storage` escape hatch for tests
    /// and short-lived sessions.
    pub memory_storage: bool,
    pub concurrency: usize,
}

impl ContainerConfig {
    /// Resolves the target repository the way every command and MCP tool
    /// call does (§6): an explicit path, else `CORTEX_RECALL_REPO`, else
    /// the current working directory.
    pub fn resolve(repo: Option<String>, memory_storage: bool) -> Result<Self, DomainError> {
        let repo_path = match repo {
            Some(path) => PathBuf::from(path),
            None => match std::env::var("CORTEX_RECALL_REPO") {
                Ok(path) => PathBuf::from(path),
                Err(_) => std::env::current_dir().map_err(|e| {
                    DomainError::configuration(format!("cannot resolve current directory: {e}"))
                })?,
            },
        };

        Ok(Self {
            repo_path,
            memory_storage,
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    fn store_path(&self) -> PathBuf {
        self.repo_path.join(STORE_DIR_NAME).join(STORE_FILE_NAME)
    }
}

/// Dependency-injection root (§2 C11): wires the parser, embedding
/// orchestrator, vector store, and commit extractor behind the seven use
/// cases the CLI and MCP surfaces share.
pub struct Container {
    config: ContainerConfig,
    parser: Arc<dyn ParserService>,
    orchestrator: Arc<EmbeddingOrchestrator>,
    store: Arc<dyn VectorStore>,
    extractor: Arc<dyn CommitExtractor>,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self, DomainError> {
        let parser: Arc<dyn ParserService> = Arc::new(TreeSitterParserService::new());
        let embedding_provider: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbedding::new());
        let orchestrator = Arc::new(EmbeddingOrchestrator::new(
            embedding_provider,
            config.concurrency,
        ));
        let extractor: Arc<dyn CommitExtractor> = Arc::new(GitCliCommitExtractor::new());

        let store: Arc<dyn VectorStore> = if config.memory_storage {
            Arc::new(InMemoryVectorRepository::new())
        } else {
            let store_path = config.store_path();
            if let Some(parent) = store_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DomainError::configuration(format!("cannot create store directory: {e}"))
                })?;
            }
            Arc::new(DuckdbVectorStore::new(&store_path)?)
        };

        Ok(Self {
            config,
            parser,
            orchestrator,
            store,
            extractor,
        })
    }

    pub fn repo_path(&self) -> &Path {
        &self.config.repo_path
    }

    pub fn index_code_use_case(&self) -> IndexCodeUseCase {
        IndexCodeUseCase::new(
            self.parser.clone(),
            self.orchestrator.clone(),
            self.store.clone(),
        )
    }

    pub fn index_history_use_case(&self) -> IndexHistoryUseCase {
        IndexHistoryUseCase::new(
            self.extractor.clone(),
            self.orchestrator.clone(),
            self.store.clone(),
        )
    }

    pub fn search_code_use_case(&self) -> SearchCodeUseCase {
        SearchCodeUseCase::new(self.orchestrator.clone(), self.store.clone())
    }

    pub fn search_history_use_case(&self) -> SearchHistoryUseCase {
        SearchHistoryUseCase::new(self.orchestrator.clone(), self.store.clone())
    }

    pub fn explain_use_case(&self) -> ExplainUseCase {
        ExplainUseCase::new(self.orchestrator.clone(), self.store.clone())
    }

    pub fn assess_use_case(&self) -> AssessUseCase {
        AssessUseCase::new(self.store.clone())
    }

    pub fn file_profile_use_case(&self) -> FileProfileUseCase {
        FileProfileUseCase::new(self.store.clone())
    }
}
