use serde::{Deserialize, Serialize};

use super::{CodeChunk, DecisionClass, HistoryChunk};

/// A single ranked hit from a similarity search, generic over the record
/// type (`CodeChunk` or `HistoryChunk`) so both search surfaces share one
/// result shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult<T> {
    item: T,
    score: f32,
}

impl<T> SearchResult<T> {
    pub fn new(item: T, score: f32) -> Self {
        Self { item, score }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn is_relevant(&self, threshold: f32) -> bool {
        self.score >= threshold
    }
}

pub type CodeSearchResult = SearchResult<CodeChunk>;
pub type HistorySearchResult = SearchResult<HistoryChunk>;

/// Query against the code-chunk table (§4.5 `search(vector, k, file_filter?)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSearchQuery {
    query: String,
    limit: usize,
    /// Literal path-prefix filter — never glob syntax (§9 open question a).
    file_filter: Option<String>,
}

impl CodeSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 10,
            file_filter: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_file_filter(mut self, filter: impl Into<String>) -> Self {
        self.file_filter = Some(filter.into());
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn file_filter(&self) -> Option<&str> {
        self.file_filter.as_deref()
    }
}

impl Default for CodeSearchQuery {
    fn default() -> Self {
        Self::new("")
    }
}

/// One ANDed clause of a structured git-history predicate (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GitFilterClause {
    DateAfter(chrono::DateTime<chrono::Utc>),
    DateBefore(chrono::DateTime<chrono::Utc>),
    Author(String),
    FilePath(String),
    CommitType(String),
    DecisionClass(DecisionClass),
}

/// Query against the history-chunk table (§4.5 `search_git_history`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GitSearchQuery {
    query: String,
    limit: usize,
    clauses: Vec<GitFilterClause>,
}

impl GitSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 10,
            clauses: Vec::new(),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_clause(mut self, clause: GitFilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clauses(&self) -> &[GitFilterClause] {
        &self.clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChunkType, Language};

    fn sample_chunk() -> CodeChunk {
        CodeChunk::new(
            "test.py".to_string(),
            None,
            None,
            ChunkType::Function,
            Language::Python,
            false,
            1,
            1,
            "def f(): pass".to_string(),
        )
    }

    #[test]
    fn test_search_result_relevance() {
        let result = SearchResult::new(sample_chunk(), 0.95);
        assert!(result.is_relevant(0.5));
        assert!(!result.is_relevant(0.99));
    }

    #[test]
    fn test_code_search_query_builder() {
        let q = CodeSearchQuery::new("auth logic")
            .with_limit(5)
            .with_file_filter("src/file-5");
        assert_eq!(q.limit(), 5);
        assert_eq!(q.file_filter(), Some("src/file-5"));
    }

    #[test]
    fn test_git_search_query_clauses() {
        let q = GitSearchQuery::new("billing fix")
            .with_clause(GitFilterClause::Author("ada".to_string()))
            .with_clause(GitFilterClause::CommitType("fix".to_string()));
        assert_eq!(q.clauses().len(), 2);
    }
}
