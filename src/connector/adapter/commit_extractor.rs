use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::process::Command;
use tracing::debug;

use crate::application::interfaces::{CommitExtractor, RawCommit, RawFileStat};
use crate::domain::DomainError;

const RECORD_SEP: char = '\u{1}';
const FIELD_SEP: char = '\u{0}';
const LOG_FORMAT: &str = "%x00%H%x00%P%x00%an%x00%ae%x00%aI%x00%D%x00%s%x00%b%x01";

/// Walks a repository's history by shelling out to the system `git`
/// binary (§4.3) — matching the teacher's existing preference for
/// process-based git access over an embedded libgit2 binding.
pub struct GitCliCommitExtractor;

impl GitCliCommitExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GitCliCommitExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_commit_block(block: &str) -> Option<RawCommit> {
    let mut fields = block.splitn(8, FIELD_SEP);
    let sha = fields.next()?.to_string();
    let parents = fields
        .next()?
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    let author = fields.next()?.to_string();
    let email = fields.next()?.to_string();
    let date = DateTime::parse_from_rfc3339(fields.next()?)
        .ok()?
        .with_timezone(&Utc);
    let refs = fields.next()?.to_string();
    let subject = fields.next()?.to_string();
    let rest = fields.next()?;

    let is_numstat_line = |line: &str| {
        line.matches('\t').count() == 2
            && line
                .split('\t')
                .next()
                .map(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '-'))
                .unwrap_or(false)
    };

    let mut body_lines = Vec::new();
    let mut stat_lines = Vec::new();
    let mut in_stat = false;
    for line in rest.lines() {
        in_stat = in_stat || is_numstat_line(line);
        if in_stat {
            stat_lines.push(line);
        } else {
            body_lines.push(line);
        }
    }
    let body = body_lines.join("\n").trim().to_string();
    let numstat = stat_lines;

    let files = numstat
        .iter()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            let additions = parts.next()?;
            let deletions = parts.next()?;
            let path = parts.next()?.to_string();
            Some(RawFileStat {
                path,
                additions: additions.parse().unwrap_or(0),
                deletions: deletions.parse().unwrap_or(0),
            })
        })
        .collect();

    Some(RawCommit {
        sha,
        parents,
        author,
        email,
        date,
        refs,
        subject,
        body,
        files,
    })
}

#[async_trait]
impl CommitExtractor for GitCliCommitExtractor {
    async fn extract_commits(&self, repo_path: &Path) -> Result<Vec<RawCommit>, DomainError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(repo_path)
            .arg("log")
            .arg("--no-color")
            .arg("--date=iso-strict")
            .arg(format!("--pretty=format:{LOG_FORMAT}"))
            .arg("--numstat")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DomainError::internal(format!("failed to spawn git: {e}")))?;

        if !output.status.success() {
            return Err(DomainError::internal(format!(
                "git log failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let commits: Vec<RawCommit> = stdout
            .split(RECORD_SEP)
            .map(|b| b.trim_start_matches('\n'))
            .filter(|b| !b.trim().is_empty())
            .filter_map(parse_commit_block)
            .collect();

        debug!(count = commits.len(), "extracted raw commits");
        Ok(commits)
    }

    async fn get_file_diff(
        &self,
        repo_path: &Path,
        sha: &str,
        file_path: &str,
        max_lines: usize,
    ) -> Result<String, DomainError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(repo_path)
            .arg("show")
            .arg("--no-color")
            .arg("--format=")
            .arg(sha)
            .arg("--")
            .arg(file_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DomainError::internal(format!("failed to spawn git: {e}")))?;

        if !output.status.success() {
            return Err(DomainError::internal(format!(
                "git show failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let diff = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = diff.lines().collect();
        if lines.len() <= max_lines {
            return Ok(diff.to_string());
        }
        let mut truncated: String = lines[..max_lines].join("\n");
        truncated.push_str("\n... [diff truncated]");
        Ok(truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commit_block_basic() {
        let block = format!(
            "sha1{FIELD_SEP}parent1{FIELD_SEP}Ada{FIELD_SEP}ada@example.com{FIELD_SEP}2026-01-15T00:00:00+00:00{FIELD_SEP}HEAD -> main{FIELD_SEP}fix: bug{FIELD_SEP}\n2\t1\tsrc/a.rs"
        );
        let commit = parse_commit_block(&block).expect("parses");
        assert_eq!(commit.sha, "sha1");
        assert_eq!(commit.subject, "fix: bug");
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.files[0].path, "src/a.rs");
        assert_eq!(commit.files[0].additions, 2);
    }

    #[test]
    fn test_parse_commit_block_with_body() {
        let block = format!(
            "sha2{FIELD_SEP}{FIELD_SEP}Ada{FIELD_SEP}ada@example.com{FIELD_SEP}2026-01-15T00:00:00+00:00{FIELD_SEP}{FIELD_SEP}feat: add thing{FIELD_SEP}Longer explanation here.\n\n3\t0\tsrc/b.rs"
        );
        let commit = parse_commit_block(&block).expect("parses");
        assert_eq!(commit.body, "Longer explanation here.");
        assert_eq!(commit.files[0].path, "src/b.rs");
    }
}
