use crate::application::interfaces::SignalDetector;
use crate::domain::{
    common_directory_scope, HistoryChunk, HistoryChunkType, Severity, SignalRecord, SignalType,
    TemporalScope,
};

/// Flags commits carrying a conventional `!:` marker or a `BREAKING CHANGE:`
/// body token (§4.6).
pub struct BreakingChangeDetector;

impl SignalDetector for BreakingChangeDetector {
    fn name(&self) -> &'static str {
        "breaking_change_detector"
    }

    fn detect(&self, chunks: &[HistoryChunk]) -> Vec<SignalRecord> {
        chunks
            .iter()
            .filter(|c| c.chunk_type() == HistoryChunkType::CommitSummary)
            .filter(|c| is_breaking(c))
            .map(|c| {
                let scope =
                    common_directory_scope(c.files_changed().iter().map(|s| s.as_str()));
                SignalRecord::new(
                    SignalType::BreakingChange,
                    format!("\"{}\" introduces a breaking change", c.subject()),
                    Severity::Warning,
                    0.95,
                    scope,
                    TemporalScope {
                        start: c.date(),
                        end: c.date(),
                    },
                    vec![c.sha().to_string()],
                    serde_json::json!({ "commit_type": c.commit_type() }),
                    c.date(),
                )
            })
            .collect()
    }
}

fn is_breaking(chunk: &HistoryChunk) -> bool {
    let subject_marker = chunk.subject().contains("!:");
    let body_marker = chunk.body().contains("BREAKING CHANGE:");
    subject_marker || body_marker
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::domain::DecisionClass;

    fn summary(subject: &str, body: &str) -> HistoryChunk {
        HistoryChunk::new(
            HistoryChunkType::CommitSummary,
            "sha1".to_string(),
            "Ada".to_string(),
            "ada@example.com".to_string(),
            Utc::now(),
            subject.to_string(),
            body.to_string(),
            "main".to_string(),
            "refactor".to_string(),
            Some("store".to_string()),
            vec!["src/store.rs".to_string()],
            3,
            40,
            DecisionClass::Decision,
            None,
            "search_document: x".to_string(),
        )
    }

    #[test]
    fn test_subject_marker_detected() {
        let chunk = summary("refactor(store)!: drop legacy table", "");
        let signals = BreakingChangeDetector.detect(&[chunk]);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].severity(), Severity::Warning);
    }

    #[test]
    fn test_body_token_detected() {
        let chunk = summary("refactor(store): drop legacy table", "BREAKING CHANGE: removes v1 API");
        let signals = BreakingChangeDetector.detect(&[chunk]);
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn test_non_breaking_commit_ignored() {
        let chunk = summary("fix: typo", "");
        assert!(BreakingChangeDetector.detect(&[chunk]).is_empty());
    }
}
