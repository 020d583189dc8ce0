use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::interfaces::{StoreStats, VectorStore};
use crate::domain::{
    cosine_similarity, CodeChunk, CodeSearchResult, DomainError, Embedding, FileProfile,
    GitFilterClause, HistoryChunk, HistorySearchResult, SignalRecord,
};

/// In-memory [`VectorStore`] double used by tests and by `cortex-recall`'s
/// own dev-mode wiring when no on-disk store is configured. Mirrors the
/// DuckDB-backed adapter's contract without persistence.
#[derive(Default)]
pub struct InMemoryVectorRepository {
    chunks: Mutex<HashMap<String, (CodeChunk, Embedding)>>,
    history: Mutex<HashMap<String, (HistoryChunk, Embedding)>>,
    signals: Mutex<Vec<SignalRecord>>,
    profiles: Mutex<HashMap<String, FileProfile>>,
}

impl InMemoryVectorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorRepository {
    async fn insert_chunks(
        &self,
        chunks: &[CodeChunk],
        embeddings: &[Embedding],
        replace_by_file: bool,
    ) -> Result<(), DomainError> {
        let mut store = self.chunks.lock().await;

        if replace_by_file {
            let files: std::collections::HashSet<&str> =
                chunks.iter().map(|c| c.file_path()).collect();
            store.retain(|_, (chunk, _)| !files.contains(chunk.file_path()));
        }

        let by_id: HashMap<&str, &Embedding> =
            embeddings.iter().map(|e| (e.record_id(), e)).collect();
        for chunk in chunks {
            if let Some(embedding) = by_id.get(chunk.id()) {
                store.insert(chunk.id().to_string(), (chunk.clone(), (*embedding).clone()));
            }
        }
        debug!(count = chunks.len(), "inserted code chunks (in-memory)");
        Ok(())
    }

    async fn insert_history(
        &self,
        chunks: &[HistoryChunk],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError> {
        let mut store = self.history.lock().await;
        let by_id: HashMap<&str, &Embedding> =
            embeddings.iter().map(|e| (e.record_id(), e)).collect();
        for chunk in chunks {
            if let Some(embedding) = by_id.get(chunk.id()) {
                store.insert(chunk.id().to_string(), (chunk.clone(), (*embedding).clone()));
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        file_filter: Option<&str>,
    ) -> Result<Vec<CodeSearchResult>, DomainError> {
        let store = self.chunks.lock().await;
        let mut scored: Vec<CodeSearchResult> = store
            .values()
            .filter(|(chunk, _)| match file_filter {
                Some(prefix) => chunk.file_path().starts_with(prefix),
                None => true,
            })
            .map(|(chunk, embedding)| {
                let score = cosine_similarity(query_embedding, embedding.vector());
                CodeSearchResult::new(chunk.clone(), score)
            })
            .collect();
        scored.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn search_git_history(
        &self,
        query_embedding: &[f32],
        limit: usize,
        clauses: &[GitFilterClause],
    ) -> Result<Vec<HistorySearchResult>, DomainError> {
        let store = self.history.lock().await;
        let mut scored: Vec<HistorySearchResult> = store
            .values()
            .filter(|(chunk, _)| clauses.iter().all(|clause| matches_clause(chunk, clause)))
            .map(|(chunk, embedding)| {
                let score = cosine_similarity(query_embedding, embedding.vector());
                HistorySearchResult::new(chunk.clone(), score)
            })
            .collect();
        scored.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn delete_by_file_path(&self, file_path: &str) -> Result<u64, DomainError> {
        let mut store = self.chunks.lock().await;
        let before = store.len();
        store.retain(|_, (chunk, _)| chunk.file_path() != file_path);
        Ok((before - store.len()) as u64)
    }

    async fn replace_signals(&self, signals: &[SignalRecord]) -> Result<(), DomainError> {
        let mut store = self.signals.lock().await;
        *store = signals.to_vec();
        Ok(())
    }

    async fn upsert_file_profiles(&self, profiles: &[FileProfile]) -> Result<(), DomainError> {
        let mut store = self.profiles.lock().await;
        for profile in profiles {
            store.insert(profile.path().to_string(), profile.clone());
        }
        Ok(())
    }

    async fn get_file_profile(&self, path: &str) -> Result<Option<FileProfile>, DomainError> {
        Ok(self.profiles.lock().await.get(path).cloned())
    }

    async fn get_signals_covering(&self, path: &str) -> Result<Vec<SignalRecord>, DomainError> {
        Ok(self
            .signals
            .lock()
            .await
            .iter()
            .filter(|s| s.covers(path))
            .cloned()
            .collect())
    }

    async fn get_stats(&self) -> Result<StoreStats, DomainError> {
        let chunks = self.chunks.lock().await;
        let dimension = chunks.values().next().map(|(_, e)| e.dimensions());
        Ok(StoreStats {
            chunk_count: chunks.len() as u64,
            history_count: self.history.lock().await.len() as u64,
            signal_count: self.signals.lock().await.len() as u64,
            file_profile_count: self.profiles.lock().await.len() as u64,
            dimension,
        })
    }
}

fn matches_clause(chunk: &HistoryChunk, clause: &GitFilterClause) -> bool {
    match clause {
        GitFilterClause::DateAfter(after) => chunk.date() >= *after,
        GitFilterClause::DateBefore(before) => chunk.date() <= *before,
        GitFilterClause::Author(author) => chunk.author() == author,
        GitFilterClause::FilePath(path) => chunk.touches(path) || chunk.file_path() == Some(path.as_str()),
        GitFilterClause::CommitType(commit_type) => chunk.commit_type() == commit_type,
        GitFilterClause::DecisionClass(class) => chunk.decision_class() == *class,
    }
}
