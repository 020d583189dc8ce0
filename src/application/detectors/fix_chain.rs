use crate::application::interfaces::SignalDetector;
use crate::domain::{
    common_directory_scope, HistoryChunk, HistoryChunkType, Severity, SignalRecord, SignalType,
    TemporalScope,
};

const WINDOW_DAYS: i64 = 14;

/// Detects a `feat:` commit followed by ≥2 `fix:` commits touching
/// overlapping files within a 14-day window (§4.6).
pub struct FixChainDetector;

impl SignalDetector for FixChainDetector {
    fn name(&self) -> &'static str {
        "fix_chain_detector"
    }

    fn detect(&self, chunks: &[HistoryChunk]) -> Vec<SignalRecord> {
        let mut summaries: Vec<&HistoryChunk> = chunks
            .iter()
            .filter(|c| c.chunk_type() == HistoryChunkType::CommitSummary)
            .collect();
        summaries.sort_by_key(|c| c.date());

        let mut signals = Vec::new();

        for (i, feat) in summaries.iter().enumerate() {
            if feat.commit_type() != "feat" {
                continue;
            }

            let window_end = feat.date() + chrono::Duration::days(WINDOW_DAYS);
            let fixes: Vec<&&HistoryChunk> = summaries[i + 1..]
                .iter()
                .take_while(|c| c.date() <= window_end)
                .filter(|c| {
                    c.commit_type() == "fix"
                        && c.files_changed()
                            .iter()
                            .any(|f| feat.files_changed().contains(f))
                })
                .collect();

            if fixes.len() < 2 {
                continue;
            }

            let last_fix_date = fixes.iter().map(|c| c.date()).max().unwrap_or(feat.date());
            let day_span = (last_fix_date - feat.date()).num_days();

            let mut contributing_shas = vec![feat.sha().to_string()];
            contributing_shas.extend(fixes.iter().map(|c| c.sha().to_string()));

            let all_files: Vec<&str> = feat
                .files_changed()
                .iter()
                .map(|s| s.as_str())
                .chain(fixes.iter().flat_map(|c| c.files_changed().iter().map(|s| s.as_str())))
                .collect();
            let directory_scope = common_directory_scope(all_files);

            signals.push(SignalRecord::new(
                SignalType::FixChain,
                format!(
                    "\"{}\" was followed by {} fix commits over {} days",
                    feat.subject(),
                    fixes.len(),
                    day_span
                ),
                Severity::Caution,
                0.8,
                directory_scope,
                TemporalScope {
                    start: feat.date(),
                    end: last_fix_date,
                },
                contributing_shas,
                serde_json::json!({
                    "feature_sha": feat.sha(),
                    "feature_subject": feat.subject(),
                    "fix_count": fixes.len(),
                    "day_span": day_span,
                }),
                last_fix_date,
            ));
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::domain::DecisionClass;

    fn summary(sha: &str, commit_type: &str, files: &[&str], day: i64) -> HistoryChunk {
        let date = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day);
        HistoryChunk::new(
            HistoryChunkType::CommitSummary,
            sha.to_string(),
            "Ada".to_string(),
            "ada@example.com".to_string(),
            date,
            format!("{commit_type}: change"),
            String::new(),
            "main".to_string(),
            commit_type.to_string(),
            None,
            files.iter().map(|s| s.to_string()).collect(),
            5,
            1,
            DecisionClass::Unknown,
            None,
            "search_document: x".to_string(),
        )
    }

    #[test]
    fn test_fix_chain_of_two_detected() {
        let feat = summary("f1", "feat", &["src/a.rs"], 0);
        let fix1 = summary("x1", "fix", &["src/a.rs"], 2);
        let fix2 = summary("x2", "fix", &["src/a.rs"], 5);
        let signals = FixChainDetector.detect(&[feat, fix1, fix2]);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].contributing_shas().len(), 3);
    }

    #[test]
    fn test_single_fix_does_not_trigger() {
        let feat = summary("f1", "feat", &["src/a.rs"], 0);
        let fix1 = summary("x1", "fix", &["src/a.rs"], 2);
        let signals = FixChainDetector.detect(&[feat, fix1]);
        assert!(signals.is_empty());
    }

    #[test]
    fn test_fix_outside_window_excluded() {
        let feat = summary("f1", "feat", &["src/a.rs"], 0);
        let fix1 = summary("x1", "fix", &["src/a.rs"], 2);
        let fix2 = summary("x2", "fix", &["src/a.rs"], 30);
        let signals = FixChainDetector.detect(&[feat, fix1, fix2]);
        assert!(signals.is_empty());
    }
}
