use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::application::interfaces::SignalDetector;
use crate::domain::{
    common_directory_scope, DecisionClass, HistoryChunk, HistoryChunkType, Severity, SignalRecord,
    SignalType, TemporalScope,
};

fn reverts_commit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)reverts?\s+commit\s+([0-9a-f]{7,40})").expect("valid regex")
    })
}

fn revert_quote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)^revert\s+["'](.+)["']"#).expect("valid regex"))
}

fn mode_decision_class(a: DecisionClass, b: DecisionClass) -> DecisionClass {
    if a == b {
        a
    } else if a == DecisionClass::Decision || b == DecisionClass::Decision {
        DecisionClass::Decision
    } else {
        DecisionClass::Unknown
    }
}

/// Detects revert/original commit pairs (§4.6).
pub struct RevertDetector;

impl SignalDetector for RevertDetector {
    fn name(&self) -> &'static str {
        "revert_detector"
    }

    fn detect(&self, chunks: &[HistoryChunk]) -> Vec<SignalRecord> {
        let summaries: Vec<&HistoryChunk> = chunks
            .iter()
            .filter(|c| c.chunk_type() == HistoryChunkType::CommitSummary)
            .collect();

        let by_sha: HashMap<&str, &HistoryChunk> =
            summaries.iter().map(|c| (c.sha(), *c)).collect();
        let by_subject: HashMap<&str, &HistoryChunk> =
            summaries.iter().map(|c| (c.subject(), *c)).collect();

        let mut signals = Vec::new();

        for revert in &summaries {
            if !revert.subject().to_lowercase().contains("revert") {
                continue;
            }

            let haystack = format!("{} {}", revert.subject(), revert.body());
            let original = reverts_commit_re()
                .captures(&haystack)
                .and_then(|caps| caps.get(1))
                .and_then(|m| {
                    let candidate = m.as_str();
                    by_sha.get(candidate).copied().or_else(|| {
                        summaries
                            .iter()
                            .find(|c| c.sha().starts_with(candidate))
                            .copied()
                    })
                })
                .or_else(|| {
                    revert_quote_re()
                        .captures(revert.subject())
                        .and_then(|caps| caps.get(1))
                        .and_then(|m| by_subject.get(m.as_str()).copied())
                        .filter(|original| original.sha() != revert.sha())
                });

            let (contributing_shas, confidence, directory_scope, dominant, time_to_revert_days) =
                match original {
                    Some(original) => {
                        let scope = common_directory_scope(
                            original.files_changed().iter().map(|s| s.as_str()),
                        );
                        let days = (revert.date() - original.date()).num_days();
                        (
                            vec![original.sha().to_string(), revert.sha().to_string()],
                            0.9,
                            scope,
                            mode_decision_class(original.decision_class(), revert.decision_class()),
                            Some(days),
                        )
                    }
                    None => (
                        vec![revert.sha().to_string()],
                        0.6,
                        common_directory_scope(revert.files_changed().iter().map(|s| s.as_str())),
                        revert.decision_class(),
                        None,
                    ),
                };

            let mut metadata = serde_json::json!({
                "dominant_decision_class": dominant.as_str(),
            });
            if let Some(days) = time_to_revert_days {
                metadata["time_to_revert_days"] = serde_json::json!(days);
            }

            let summary = match original {
                Some(original) => format!(
                    "\"{}\" reverted \"{}\"",
                    revert.subject(),
                    original.subject()
                ),
                None => format!("\"{}\" appears to revert an untracked commit", revert.subject()),
            };

            signals.push(SignalRecord::new(
                SignalType::RevertPair,
                summary,
                Severity::Caution,
                confidence,
                directory_scope,
                TemporalScope {
                    start: original.map(|o| o.date()).unwrap_or(revert.date()).min(revert.date()),
                    end: original.map(|o| o.date()).unwrap_or(revert.date()).max(revert.date()),
                },
                contributing_shas,
                metadata,
                revert.date(),
            ));
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn summary_chunk(sha: &str, subject: &str, body: &str, date_offset_days: i64) -> HistoryChunk {
        let date = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(date_offset_days);
        HistoryChunk::new(
            HistoryChunkType::CommitSummary,
            sha.to_string(),
            "Ada".to_string(),
            "ada@example.com".to_string(),
            date,
            subject.to_string(),
            body.to_string(),
            "main".to_string(),
            String::new(),
            None,
            vec!["src/x.rs".to_string()],
            1,
            1,
            DecisionClass::Unknown,
            None,
            "search_document: x".to_string(),
        )
    }

    #[test]
    fn test_revert_pair_linked_via_body_reference() {
        let original = summary_chunk(
            "aaaa1111111111111111111111111111111111",
            "feat: add X",
            "",
            0,
        );
        let revert = summary_chunk(
            "bbbb2222222222222222222222222222222222",
            "Revert \"feat: add X\"",
            "This reverts commit aaaa1111111111111111111111111111111111.",
            3,
        );
        let signals = RevertDetector.detect(&[original, revert]);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type(), SignalType::RevertPair);
        assert_eq!(signals[0].confidence(), 0.9);
        assert_eq!(
            signals[0].metadata()["time_to_revert_days"].as_i64(),
            Some(3)
        );
    }

    #[test]
    fn test_no_revert_no_signal() {
        let a = summary_chunk("sha1", "feat: add X", "", 0);
        let signals = RevertDetector.detect(&[a]);
        assert!(signals.is_empty());
    }
}
