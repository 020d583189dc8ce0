use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::domain::DomainError;

/// Per-file stats for one commit, as reported by `git log --numstat` (§4.3).
#[derive(Debug, Clone)]
pub struct RawFileStat {
    pub path: String,
    pub additions: u32,
    pub deletions: u32,
}

/// One commit as read off the git log, before chunking (§4.3).
#[derive(Debug, Clone)]
pub struct RawCommit {
    pub sha: String,
    pub parents: Vec<String>,
    pub author: String,
    pub email: String,
    pub date: DateTime<Utc>,
    pub refs: String,
    pub subject: String,
    pub body: String,
    pub files: Vec<RawFileStat>,
}

impl RawCommit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Walks a repository's history into raw commit records, streaming one
/// commit at a time (§5: "a single commit is materialized at a time").
#[async_trait]
pub trait CommitExtractor: Send + Sync {
    async fn extract_commits(&self, repo_path: &Path) -> Result<Vec<RawCommit>, DomainError>;

    /// Unified diff for a single file at a single commit, truncated at
    /// `max_lines` with a trailing truncation marker when cut.
    async fn get_file_diff(
        &self,
        repo_path: &Path,
        sha: &str,
        file_path: &str,
        max_lines: usize,
    ) -> Result<String, DomainError>;
}
