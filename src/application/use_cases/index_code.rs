use std::path::Path;
use std::sync::Arc;

use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use crate::application::interfaces::{ParserService, VectorStore};
use crate::application::orchestrator::EmbeddingOrchestrator;
use crate::domain::{CodeChunk, DomainError};

#[derive(Debug, Clone, Default)]
pub struct IndexCodeSummary {
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub chunks_indexed: usize,
    pub fallback_embeddings: usize,
}

/// Walks a repository, chunks every file a [`ParserService`] supports,
/// embeds the result, and replaces the chunk rows for each touched file
/// (§4.1–§4.2, §4.5's `insert_chunks(..., replace_by_file=true)`).
pub struct IndexCodeUseCase {
    parser: Arc<dyn ParserService>,
    orchestrator: Arc<EmbeddingOrchestrator>,
    store: Arc<dyn VectorStore>,
}

impl IndexCodeUseCase {
    pub fn new(
        parser: Arc<dyn ParserService>,
        orchestrator: Arc<EmbeddingOrchestrator>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            parser,
            orchestrator,
            store,
        }
    }

    pub async fn execute(
        &self,
        repo_path: &Path,
        max_tokens: usize,
    ) -> Result<IndexCodeSummary, DomainError> {
        let mut summary = IndexCodeSummary::default();
        let mut chunks: Vec<CodeChunk> = Vec::new();

        for entry in WalkBuilder::new(repo_path)
            .hidden(true)
            .git_ignore(true)
            .build()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "failed to walk directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let rel_path = path
                .strip_prefix(repo_path)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");

            if !self.parser.supports(&rel_path) {
                continue;
            }

            let content = match tokio::fs::read_to_string(path).await {
                Ok(c) => c,
                Err(e) => {
                    debug!(file = %rel_path, error = %e, "skipping unreadable file");
                    summary.files_skipped += 1;
                    continue;
                }
            };

            match self.parser.chunk_file(&rel_path, &content, max_tokens) {
                Ok(file_chunks) => {
                    summary.files_indexed += 1;
                    chunks.extend(file_chunks);
                }
                Err(e) => {
                    warn!(file = %rel_path, error = %e, "failed to chunk file");
                    summary.files_skipped += 1;
                }
            }
        }

        let embeddings = self.orchestrator.embed_code_chunks(&chunks).await?;
        self.store.insert_chunks(&chunks, &embeddings, true).await?;

        summary.chunks_indexed = chunks.len();
        summary.fallback_embeddings = self.orchestrator.fallback_count();

        info!(
            files_indexed = summary.files_indexed,
            chunks_indexed = summary.chunks_indexed,
            "code indexing complete"
        );
        Ok(summary)
    }
}
