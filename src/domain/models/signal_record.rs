use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The kind of pattern a [`SignalRecord`] documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    RevertPair,
    FixChain,
    ChurnHotspot,
    BreakingChange,
    AdoptionCycle,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::RevertPair => "revert_pair",
            SignalType::FixChain => "fix_chain",
            SignalType::ChurnHotspot => "churn_hotspot",
            SignalType::BreakingChange => "breaking_change",
            SignalType::AdoptionCycle => "adoption_cycle",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "fix_chain" => SignalType::FixChain,
            "churn_hotspot" => SignalType::ChurnHotspot,
            "breaking_change" => SignalType::BreakingChange,
            "adoption_cycle" => SignalType::AdoptionCycle,
            _ => SignalType::RevertPair,
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Caution,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Caution => "caution",
            Severity::Warning => "warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TemporalScope {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Computes a signal's fingerprint: first 64 bits of SHA-256 over
/// `type || ":".join(sorted contributing_shas)`. Sorting the shas first
/// makes the id invariant under permutation of the input.
pub fn signal_id(signal_type: SignalType, contributing_shas: &[String]) -> String {
    let mut sorted: Vec<&str> = contributing_shas.iter().map(|s| s.as_str()).collect();
    sorted.sort_unstable();
    let joined = sorted.join(":");

    let mut hasher = Sha256::new();
    hasher.update(signal_type.as_str().as_bytes());
    hasher.update(joined.as_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Returns the longest path-segment prefix common to every path, or `"."`
/// when the set is empty or shares nothing.
pub fn common_directory_scope<'a>(paths: impl IntoIterator<Item = &'a str>) -> String {
    let mut segments: Option<Vec<&str>> = None;
    for path in paths {
        let parts: Vec<&str> = path.split('/').collect();
        let dir_parts: &[&str] = if parts.len() > 1 {
            &parts[..parts.len() - 1]
        } else {
            &[]
        };
        segments = Some(match segments {
            None => dir_parts.to_vec(),
            Some(prev) => {
                let common_len = prev
                    .iter()
                    .zip(dir_parts.iter())
                    .take_while(|(a, b)| a == b)
                    .count();
                prev[..common_len].to_vec()
            }
        });
    }
    match segments {
        Some(parts) if !parts.is_empty() => parts.join("/"),
        _ => ".".to_string(),
    }
}

/// A detected pattern in commit history, with provenance back to the
/// commits that contributed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRecord {
    id: String,
    signal_type: SignalType,
    summary: String,
    severity: Severity,
    confidence: f32,
    directory_scope: String,
    temporal_scope: TemporalScope,
    contributing_shas: Vec<String>,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl SignalRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        signal_type: SignalType,
        summary: String,
        severity: Severity,
        confidence: f32,
        directory_scope: String,
        temporal_scope: TemporalScope,
        contributing_shas: Vec<String>,
        metadata: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = signal_id(signal_type, &contributing_shas);
        Self {
            id,
            signal_type,
            summary,
            severity,
            confidence: confidence.clamp(0.0, 1.0),
            directory_scope,
            temporal_scope,
            contributing_shas,
            metadata,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn directory_scope(&self) -> &str {
        &self.directory_scope
    }

    pub fn temporal_scope(&self) -> TemporalScope {
        self.temporal_scope
    }

    pub fn contributing_shas(&self) -> &[String] {
        &self.contributing_shas
    }

    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether `directory_scope` is a path-segment prefix of `path` (or is `"."`).
    pub fn covers(&self, path: &str) -> bool {
        if self.directory_scope == "." {
            return true;
        }
        path.starts_with(&self.directory_scope)
            && path[self.directory_scope.len()..]
                .chars()
                .next()
                .map(|c| c == '/')
                .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_id_invariant_under_permutation() {
        let a = signal_id(
            SignalType::RevertPair,
            &["bbb".to_string(), "aaa".to_string()],
        );
        let b = signal_id(
            SignalType::RevertPair,
            &["aaa".to_string(), "bbb".to_string()],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_signal_id_varies_by_type() {
        let a = signal_id(SignalType::RevertPair, &["aaa".to_string()]);
        let b = signal_id(SignalType::FixChain, &["aaa".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_common_directory_scope() {
        let paths = vec!["src/a/b.rs", "src/a/c.rs", "src/a/d/e.rs"];
        assert_eq!(common_directory_scope(paths), "src/a");
    }

    #[test]
    fn test_common_directory_scope_no_common_prefix() {
        let paths = vec!["src/a.rs", "docs/readme.md"];
        assert_eq!(common_directory_scope(paths), ".");
    }

    #[test]
    fn test_common_directory_scope_root_files() {
        let paths = vec!["a.rs", "b.rs"];
        assert_eq!(common_directory_scope(paths), ".");
    }

    #[test]
    fn test_covers_prefix() {
        let scope = common_directory_scope(vec!["src/a/b.rs"]);
        assert_eq!(scope, "src/a");
        let record = SignalRecord::new(
            SignalType::ChurnHotspot,
            "hot".to_string(),
            Severity::Warning,
            0.8,
            scope,
            TemporalScope {
                start: Utc::now(),
                end: Utc::now(),
            },
            vec!["sha1".to_string()],
            serde_json::json!({}),
            Utc::now(),
        );
        assert!(record.covers("src/a/b.rs"));
        assert!(record.covers("src/a/nested/c.rs"));
        assert!(!record.covers("src/other.rs"));
    }
}
