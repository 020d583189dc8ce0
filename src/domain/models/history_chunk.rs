use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Coarse label for whether a commit represents an architectural choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionClass {
    Decision,
    Routine,
    Unknown,
}

impl DecisionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionClass::Decision => "decision",
            DecisionClass::Routine => "routine",
            DecisionClass::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "decision" => DecisionClass::Decision,
            "routine" => DecisionClass::Routine,
            _ => DecisionClass::Unknown,
        }
    }
}

/// Which facet of a commit a [`HistoryChunk`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryChunkType {
    CommitSummary,
    FileDiff,
    MergeGroup,
}

impl HistoryChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryChunkType::CommitSummary => "commit_summary",
            HistoryChunkType::FileDiff => "file_diff",
            HistoryChunkType::MergeGroup => "merge_group",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "file_diff" => HistoryChunkType::FileDiff,
            "merge_group" => HistoryChunkType::MergeGroup,
            _ => HistoryChunkType::CommitSummary,
        }
    }
}

impl std::fmt::Display for HistoryChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Computes a history chunk's fingerprint: first 64 bits of SHA-256 over
/// `sha || chunk_type || file_path`. `file_path` is the empty string for
/// `commit_summary`/`merge_group` chunks, which have no single owning file.
pub fn history_chunk_id(sha: &str, chunk_type: HistoryChunkType, file_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sha.as_bytes());
    hasher.update(chunk_type.as_str().as_bytes());
    hasher.update(file_path.as_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

/// One facet of a commit, addressable and independently embeddable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryChunk {
    id: String,
    chunk_type: HistoryChunkType,
    sha: String,
    author: String,
    email: String,
    date: DateTime<Utc>,
    subject: String,
    body: String,
    branch: String,
    commit_type: String,
    scope: Option<String>,
    files_changed: Vec<String>,
    additions: u32,
    deletions: u32,
    decision_class: DecisionClass,
    /// The file this chunk describes, when `chunk_type == FileDiff`.
    file_path: Option<String>,
    /// The embedding input; always begins with `search_document: `.
    text: String,
}

impl HistoryChunk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chunk_type: HistoryChunkType,
        sha: String,
        author: String,
        email: String,
        date: DateTime<Utc>,
        subject: String,
        body: String,
        branch: String,
        commit_type: String,
        scope: Option<String>,
        files_changed: Vec<String>,
        additions: u32,
        deletions: u32,
        decision_class: DecisionClass,
        file_path: Option<String>,
        text: String,
    ) -> Self {
        let id = history_chunk_id(&sha, chunk_type, file_path.as_deref().unwrap_or(""));
        Self {
            id,
            chunk_type,
            sha,
            author,
            email,
            date,
            subject,
            body,
            branch,
            commit_type,
            scope,
            files_changed,
            additions,
            deletions,
            decision_class,
            file_path,
            text,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chunk_type(&self) -> HistoryChunkType {
        self.chunk_type
    }

    pub fn sha(&self) -> &str {
        &self.sha
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn commit_type(&self) -> &str {
        &self.commit_type
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn files_changed(&self) -> &[String] {
        &self.files_changed
    }

    pub fn additions(&self) -> u32 {
        self.additions
    }

    pub fn deletions(&self) -> u32 {
        self.deletions
    }

    pub fn decision_class(&self) -> DecisionClass {
        self.decision_class
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_merge(&self) -> bool {
        self.chunk_type == HistoryChunkType::MergeGroup
    }

    pub fn touches(&self, path: &str) -> bool {
        self.files_changed.iter().any(|f| f == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_chunk_id_deterministic() {
        let a = history_chunk_id("abc123", HistoryChunkType::CommitSummary, "");
        let b = history_chunk_id("abc123", HistoryChunkType::CommitSummary, "");
        assert_eq!(a, b);
    }

    #[test]
    fn test_history_chunk_id_same_sha_same_type_same_file() {
        let a = history_chunk_id("abc123", HistoryChunkType::FileDiff, "src/lib.rs");
        let b = history_chunk_id("abc123", HistoryChunkType::FileDiff, "src/lib.rs");
        assert_eq!(a, b);
    }

    #[test]
    fn test_history_chunk_id_varies_by_chunk_type() {
        let summary = history_chunk_id("abc123", HistoryChunkType::CommitSummary, "");
        let merge = history_chunk_id("abc123", HistoryChunkType::MergeGroup, "");
        assert_ne!(summary, merge);
    }

    #[test]
    fn test_decision_class_roundtrip() {
        assert_eq!(DecisionClass::parse("decision"), DecisionClass::Decision);
        assert_eq!(DecisionClass::parse("bogus"), DecisionClass::Unknown);
    }
}
