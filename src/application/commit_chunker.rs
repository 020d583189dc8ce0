use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::application::interfaces::RawCommit;
use crate::domain::{DecisionClass, HistoryChunk, HistoryChunkType, DOCUMENT_PREFIX};

/// Controls which optional chunk kinds [`chunk_commit`] emits (§4.4).
#[derive(Debug, Clone, Copy)]
pub struct ChunkingOptions {
    pub include_file_chunks: bool,
    pub include_merge_groups: bool,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            include_file_chunks: true,
            include_merge_groups: true,
        }
    }
}

const ROUTINE_TYPES: &[&str] = &["docs", "style", "test", "chore", "ci"];
const DECISION_TYPES: &[&str] = &["feat", "fix", "refactor", "revert"];

fn conventional_commit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(feat|fix|refactor|docs|style|test|chore|perf|ci|build|revert)(\(([^)]+)\))?(!)?:\s",
        )
        .expect("valid regex")
    })
}

/// Extracts `(commit_type, scope, breaking)` from a subject matching the
/// conventional-commit grammar (§6, verbatim regex).
pub fn parse_conventional_commit(subject: &str) -> (String, Option<String>, bool) {
    match conventional_commit_re().captures(subject) {
        Some(caps) => {
            let commit_type = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            let scope = caps.get(3).map(|m| m.as_str().to_string());
            let breaking = caps.get(4).is_some();
            (commit_type, scope, breaking)
        }
        None => (String::new(), None, false),
    }
}

fn derive_branch(refs: &str, subject: &str) -> String {
    for entry in refs.split(',') {
        let entry = entry.trim();
        if entry.is_empty() || entry.starts_with("tag:") || entry.starts_with("HEAD ->") {
            continue;
        }
        return entry.to_string();
    }
    static FROM_RE: OnceLock<Regex> = OnceLock::new();
    let from_re =
        FROM_RE.get_or_init(|| Regex::new(r"(?i)from ([\w./-]+)").expect("valid regex"));
    if let Some(caps) = from_re.captures(subject) {
        return caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
    }
    String::new()
}

fn classify_decision(commit_type: &str, body: &str, files: &[String]) -> DecisionClass {
    if ROUTINE_TYPES.contains(&commit_type)
        && files
            .iter()
            .all(|f| f.starts_with("docs/") || f.contains("/test") || f.starts_with("test"))
    {
        DecisionClass::Routine
    } else if DECISION_TYPES.contains(&commit_type) && !body.trim().is_empty() {
        DecisionClass::Decision
    } else {
        DecisionClass::Unknown
    }
}

fn directories_affected(files: &[String]) -> Vec<String> {
    let mut dirs: BTreeSet<String> = BTreeSet::new();
    for file in files {
        if let Some(idx) = file.rfind('/') {
            dirs.insert(file[..idx].to_string());
        }
    }
    dirs.into_iter().collect()
}

/// Deterministically transforms one raw commit into 1–N [`HistoryChunk`]s.
/// Pure: all diff text must already be resolved into `file_diffs` by the
/// caller, since fetching a diff is I/O (§4.3) and this function is not.
pub fn chunk_commit(
    raw: &RawCommit,
    file_diffs: &HashMap<String, String>,
    opts: &ChunkingOptions,
) -> Vec<HistoryChunk> {
    let files: Vec<String> = raw.files.iter().map(|f| f.path.clone()).collect();
    let (commit_type, scope, _breaking) = parse_conventional_commit(&raw.subject);
    let branch = derive_branch(&raw.refs, &raw.subject);
    let decision_class = classify_decision(&commit_type, &raw.body, &files);
    let total_additions: u32 = raw.files.iter().map(|f| f.additions).sum();
    let total_deletions: u32 = raw.files.iter().map(|f| f.deletions).sum();

    let mut chunks = Vec::new();
    let is_trivial = raw.files.is_empty();

    if !raw.is_merge() && !is_trivial {
        let date_str = raw.date.format("%Y-%m-%d").to_string();
        let mut text = format!(
            "{DOCUMENT_PREFIX}Commit by {} on {}: \"{}\"",
            raw.author, date_str, raw.subject
        );
        if !raw.body.trim().is_empty() {
            text.push('\n');
            text.push_str(raw.body.trim());
        }
        text.push_str("\n\nFiles changed:\n");
        for file in &raw.files {
            text.push_str(&format!(
                "  {} (+{}/-{})\n",
                file.path, file.additions, file.deletions
            ));
        }
        let dirs = directories_affected(&files);
        if !dirs.is_empty() {
            text.push_str(&format!("Directories affected: {}\n", dirs.join(", ")));
        }

        chunks.push(HistoryChunk::new(
            HistoryChunkType::CommitSummary,
            raw.sha.clone(),
            raw.author.clone(),
            raw.email.clone(),
            raw.date,
            raw.subject.clone(),
            raw.body.clone(),
            branch.clone(),
            commit_type.clone(),
            scope.clone(),
            files.clone(),
            total_additions,
            total_deletions,
            decision_class,
            None,
            text,
        ));
    }

    if opts.include_file_chunks {
        for file in &raw.files {
            let text = match file_diffs.get(&file.path) {
                Some(diff) if !diff.trim().is_empty() => format!("{DOCUMENT_PREFIX}{diff}"),
                _ => format!(
                    "{DOCUMENT_PREFIX}{} changed (+{}/-{}) in {}",
                    file.path, file.additions, file.deletions, raw.sha
                ),
            };
            chunks.push(HistoryChunk::new(
                HistoryChunkType::FileDiff,
                raw.sha.clone(),
                raw.author.clone(),
                raw.email.clone(),
                raw.date,
                raw.subject.clone(),
                raw.body.clone(),
                branch.clone(),
                commit_type.clone(),
                scope.clone(),
                files.clone(),
                file.additions,
                file.deletions,
                decision_class,
                Some(file.path.clone()),
                text,
            ));
        }
    }

    if opts.include_merge_groups && raw.is_merge() {
        let text = format!(
            "{DOCUMENT_PREFIX}Merge of {} into {}: {} additions / {} deletions across {} files",
            raw.parents.join(", "),
            branch,
            total_additions,
            total_deletions,
            raw.files.len()
        );
        chunks.push(HistoryChunk::new(
            HistoryChunkType::MergeGroup,
            raw.sha.clone(),
            raw.author.clone(),
            raw.email.clone(),
            raw.date,
            raw.subject.clone(),
            raw.body.clone(),
            branch,
            commit_type,
            scope,
            files,
            total_additions,
            total_deletions,
            decision_class,
            None,
            text,
        ));
    }

    chunks
}
