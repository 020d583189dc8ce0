use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{
    CodeSearchResult, FileProfile, HistorySearchResult, PrimaryOwner, Warning,
};

fn default_limit() -> usize {
    10
}

/// Input for the `search` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchToolInput {
    /// Natural language query describing the code you're looking for.
    pub query: String,

    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Literal path-prefix filter, never glob syntax.
    pub file_filter: Option<String>,

    /// Repository to search. Defaults to the server's configured
    /// repository when omitted.
    pub repository: Option<String>,
}

/// Input for the `git_search` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GitSearchToolInput {
    pub query: String,

    #[serde(default = "default_limit")]
    pub limit: usize,

    pub author: Option<String>,
    pub file_path: Option<String>,
    pub commit_type: Option<String>,
    /// `decision` | `routine` | `unknown`.
    pub decision_class: Option<String>,
    /// RFC 3339 timestamp.
    pub date_after: Option<String>,
    /// RFC 3339 timestamp.
    pub date_before: Option<String>,

    pub repository: Option<String>,
}

/// Input for the `explain` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExplainToolInput {
    pub query: String,

    #[serde(default = "default_limit")]
    pub limit: usize,

    pub repository: Option<String>,
}

/// Input for the `assess` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AssessToolInput {
    pub files: Vec<String>,

    /// `feature` | `fix` | `refactor` | `chore`.
    pub change_type: Option<String>,

    pub repository: Option<String>,
}

/// Input for the `file_profile` tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FileProfileToolInput {
    pub path: String,

    pub repository: Option<String>,
}

/// A single code search hit.
#[derive(Debug, Serialize, JsonSchema)]
pub struct CodeSearchResultOutput {
    pub file_path: String,
    pub name: Option<String>,
    pub chunk_type: String,
    pub language: String,
    pub exported: bool,
    pub line_start: u32,
    pub line_end: u32,
    pub score: f32,
    pub content: String,
}

impl From<&CodeSearchResult> for CodeSearchResultOutput {
    fn from(result: &CodeSearchResult) -> Self {
        let chunk = result.item();
        Self {
            file_path: chunk.file_path().to_string(),
            name: chunk.name().map(String::from),
            chunk_type: chunk.chunk_type().as_str().to_string(),
            language: chunk.language().to_string(),
            exported: chunk.exported(),
            line_start: chunk.line_start(),
            line_end: chunk.line_end(),
            score: result.score(),
            content: chunk.content().to_string(),
        }
    }
}

/// A single git-history search hit.
#[derive(Debug, Serialize, JsonSchema)]
pub struct HistorySearchResultOutput {
    pub sha: String,
    pub author: String,
    pub email: String,
    pub date: DateTime<Utc>,
    pub subject: String,
    pub body: String,
    pub branch: String,
    pub commit_type: String,
    pub scope: Option<String>,
    pub files_changed: Vec<String>,
    pub additions: u32,
    pub deletions: u32,
    pub decision_class: String,
    pub score: f32,
}

impl From<&HistorySearchResult> for HistorySearchResultOutput {
    fn from(result: &HistorySearchResult) -> Self {
        let chunk = result.item();
        Self {
            sha: chunk.sha().to_string(),
            author: chunk.author().to_string(),
            email: chunk.email().to_string(),
            date: chunk.date(),
            subject: chunk.subject().to_string(),
            body: chunk.body().to_string(),
            branch: chunk.branch().to_string(),
            commit_type: chunk.commit_type().to_string(),
            scope: chunk.scope().map(String::from),
            files_changed: chunk.files_changed().to_vec(),
            additions: chunk.additions(),
            deletions: chunk.deletions(),
            decision_class: chunk.decision_class().as_str().to_string(),
            score: result.score(),
        }
    }
}

/// Combined result of the `explain` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ExplainToolOutput {
    pub strategy: String,
    pub code_results: Vec<CodeSearchResultOutput>,
    pub history_results: Vec<HistorySearchResultOutput>,
}

/// A single synthesized risk/stability warning.
#[derive(Debug, Serialize, JsonSchema)]
pub struct WarningOutput {
    pub category: String,
    pub severity: String,
    pub message: String,
    pub signal_ids: Vec<String>,
}

impl From<&Warning> for WarningOutput {
    fn from(warning: &Warning) -> Self {
        Self {
            category: warning.category().as_str().to_string(),
            severity: warning.severity().as_str().to_string(),
            message: warning.message().to_string(),
            signal_ids: warning.signal_ids().to_vec(),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct PrimaryOwnerOutput {
    pub author: String,
    pub percentage: f32,
    pub commits: u32,
    pub last_change: DateTime<Utc>,
}

impl From<&PrimaryOwner> for PrimaryOwnerOutput {
    fn from(owner: &PrimaryOwner) -> Self {
        Self {
            author: owner.author.clone(),
            percentage: owner.percentage,
            commits: owner.commits,
            last_change: owner.last_change,
        }
    }
}

/// Output of the `file_profile` tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FileProfileOutput {
    pub path: String,
    pub primary_owner: Option<PrimaryOwnerOutput>,
    pub contributor_count: u32,
    pub stability_score: f32,
    pub total_changes: u32,
    pub revert_count: u32,
    pub fix_after_feature_count: u32,
    pub change_frequency: String,
    pub risk_score: f32,
    pub last_modified: DateTime<Utc>,
    pub active_signal_ids: Vec<String>,
}

impl From<&FileProfile> for FileProfileOutput {
    fn from(profile: &FileProfile) -> Self {
        Self {
            path: profile.path().to_string(),
            primary_owner: profile.primary_owner().map(PrimaryOwnerOutput::from),
            contributor_count: profile.contributor_count(),
            stability_score: profile.stability_score(),
            total_changes: profile.total_changes(),
            revert_count: profile.revert_count(),
            fix_after_feature_count: profile.fix_after_feature_count(),
            change_frequency: profile.change_frequency().as_str().to_string(),
            risk_score: profile.risk_score(),
            last_modified: profile.last_modified(),
            active_signal_ids: profile.active_signal_ids().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChangeFrequency, FileProfile as DomainFileProfile};

    #[test]
    fn test_file_profile_output_conversion() {
        let profile = DomainFileProfile::new(
            "src/lib.rs".to_string(),
            None,
            2,
            80.0,
            10,
            0,
            0,
            ChangeFrequency::Weekly,
            20.0,
            Utc::now(),
            vec!["sig1".to_string()],
        );
        let output = FileProfileOutput::from(&profile);
        assert_eq!(output.path, "src/lib.rs");
        assert_eq!(output.change_frequency, "weekly");
        assert_eq!(output.active_signal_ids, vec!["sig1".to_string()]);
    }
}
