use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::commit_chunker::{chunk_commit, ChunkingOptions};
use crate::application::detectors::default_detectors;
use crate::application::interfaces::{CommitExtractor, VectorStore};
use crate::application::orchestrator::EmbeddingOrchestrator;
use crate::application::profile_builder::build_profiles;
use crate::domain::{DomainError, HistoryChunk};

const DIFF_MAX_LINES: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct IndexHistorySummary {
    pub commits_indexed: usize,
    pub chunks_indexed: usize,
    pub signals_detected: usize,
    pub profiles_built: usize,
    pub fallback_embeddings: usize,
}

/// Mines a repository's commit history end to end: extract → chunk →
/// embed → detect signals → build profiles → persist (§4.3–§4.7).
pub struct IndexHistoryUseCase {
    extractor: Arc<dyn CommitExtractor>,
    orchestrator: Arc<EmbeddingOrchestrator>,
    store: Arc<dyn VectorStore>,
    opts: ChunkingOptions,
}

impl IndexHistoryUseCase {
    pub fn new(
        extractor: Arc<dyn CommitExtractor>,
        orchestrator: Arc<EmbeddingOrchestrator>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            extractor,
            orchestrator,
            store,
            opts: ChunkingOptions::default(),
        }
    }

    pub async fn execute(&self, repo_path: &Path) -> Result<IndexHistorySummary, DomainError> {
        let raw_commits = self.extractor.extract_commits(repo_path).await?;

        let mut chunks: Vec<HistoryChunk> = Vec::new();
        for raw in &raw_commits {
            let mut file_diffs: HashMap<String, String> = HashMap::new();
            if self.opts.include_file_chunks {
                for file in &raw.files {
                    match self
                        .extractor
                        .get_file_diff(repo_path, &raw.sha, &file.path, DIFF_MAX_LINES)
                        .await
                    {
                        Ok(diff) => {
                            file_diffs.insert(file.path.clone(), diff);
                        }
                        Err(e) => {
                            warn!(sha = %raw.sha, file = %file.path, error = %e, "failed to fetch file diff");
                        }
                    }
                }
            }
            chunks.extend(chunk_commit(raw, &file_diffs, &self.opts));
        }

        let embeddings = self.orchestrator.embed_history_chunks(&chunks).await?;
        self.store.insert_history(&chunks, &embeddings).await?;

        let signals: Vec<_> = default_detectors()
            .iter()
            .flat_map(|d| d.detect(&chunks))
            .collect();
        self.store.replace_signals(&signals).await?;

        let profiles = build_profiles(&chunks, &signals);
        self.store.upsert_file_profiles(&profiles).await?;

        let summary = IndexHistorySummary {
            commits_indexed: raw_commits.len(),
            chunks_indexed: chunks.len(),
            signals_detected: signals.len(),
            profiles_built: profiles.len(),
            fallback_embeddings: self.orchestrator.fallback_count(),
        };
        info!(
            commits = summary.commits_indexed,
            signals = summary.signals_detected,
            profiles = summary.profiles_built,
            "history indexing complete"
        );
        Ok(summary)
    }
}
