use async_trait::async_trait;

use crate::domain::{
    CodeChunk, CodeSearchResult, DomainError, Embedding, FileProfile, GitFilterClause,
    HistoryChunk, HistorySearchResult, SignalRecord,
};

/// Row/dimension counts returned by [`VectorStore::get_stats`] (§4.5).
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub chunk_count: u64,
    pub history_count: u64,
    pub signal_count: u64,
    pub file_profile_count: u64,
    pub dimension: Option<usize>,
}

/// Embedding + metadata persistence with top-k filtered search over the
/// four logical tables (§4.5): chunks, history, signals, file_profiles.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Upserts chunks by id. When `replace_by_file` is set, every existing
    /// row whose `file_path` appears in this batch is deleted first, atomic
    /// with the insert (§5).
    async fn insert_chunks(
        &self,
        chunks: &[CodeChunk],
        embeddings: &[Embedding],
        replace_by_file: bool,
    ) -> Result<(), DomainError>;

    async fn insert_history(
        &self,
        chunks: &[HistoryChunk],
        embeddings: &[Embedding],
    ) -> Result<(), DomainError>;

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        file_filter: Option<&str>,
    ) -> Result<Vec<CodeSearchResult>, DomainError>;

    async fn search_git_history(
        &self,
        query_embedding: &[f32],
        limit: usize,
        clauses: &[GitFilterClause],
    ) -> Result<Vec<HistorySearchResult>, DomainError>;

    /// Exact-match delete; returns the number of chunk rows removed.
    async fn delete_by_file_path(&self, file_path: &str) -> Result<u64, DomainError>;

    /// Replaces all signals whose scope falls in the re-ingested range.
    async fn replace_signals(&self, signals: &[SignalRecord]) -> Result<(), DomainError>;

    async fn upsert_file_profiles(&self, profiles: &[FileProfile]) -> Result<(), DomainError>;

    async fn get_file_profile(&self, path: &str) -> Result<Option<FileProfile>, DomainError>;

    async fn get_signals_covering(&self, path: &str) -> Result<Vec<SignalRecord>, DomainError>;

    async fn get_stats(&self) -> Result<StoreStats, DomainError>;
}
