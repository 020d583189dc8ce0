use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::application::interfaces::SignalDetector;
use crate::domain::{HistoryChunk, HistoryChunkType, Severity, SignalRecord, SignalType, TemporalScope};

#[derive(Clone, Copy, PartialEq)]
enum Action {
    Add,
    Remove,
}

fn add_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:add|introduce|adopt)s?\s+([\w-]+)").expect("valid regex"))
}

fn remove_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:remove|drop|revert)s?\s+([\w-]+)").expect("valid regex"))
}

/// Flags a symbol or dependency introduced and removed at least twice
/// across distinct commits (§4.6). Heuristic by design (§9 open question
/// b) — only obvious, repeated add/remove token pairs are asserted in
/// tests, not ambiguous prose.
pub struct AdoptionCycleDetector;

impl SignalDetector for AdoptionCycleDetector {
    fn name(&self) -> &'static str {
        "adoption_cycle_detector"
    }

    fn detect(&self, chunks: &[HistoryChunk]) -> Vec<SignalRecord> {
        let mut events: HashMap<String, Vec<(DateTime<Utc>, String, Action)>> = HashMap::new();

        for chunk in chunks
            .iter()
            .filter(|c| c.chunk_type() == HistoryChunkType::CommitSummary)
        {
            if let Some(caps) = add_re().captures(chunk.subject()) {
                let token = caps[1].to_lowercase();
                events.entry(token).or_default().push((
                    chunk.date(),
                    chunk.sha().to_string(),
                    Action::Add,
                ));
            }
            if let Some(caps) = remove_re().captures(chunk.subject()) {
                let token = caps[1].to_lowercase();
                events.entry(token).or_default().push((
                    chunk.date(),
                    chunk.sha().to_string(),
                    Action::Remove,
                ));
            }
        }

        let mut signals = Vec::new();

        for (token, mut timeline) in events {
            timeline.sort_by_key(|(date, ..)| *date);
            let mut cycles = 0u32;
            let mut shas = Vec::new();
            let mut awaiting_remove = false;
            for (date, sha, action) in &timeline {
                match (action, awaiting_remove) {
                    (Action::Add, false) => {
                        awaiting_remove = true;
                        shas.push((sha.clone(), *date));
                    }
                    (Action::Remove, true) => {
                        cycles += 1;
                        awaiting_remove = false;
                        shas.push((sha.clone(), *date));
                    }
                    _ => {}
                }
            }

            if cycles < 2 {
                continue;
            }

            let contributing_shas: Vec<String> = shas.iter().map(|(s, _)| s.clone()).collect();
            let start = shas.first().map(|(_, d)| *d).unwrap_or_default();
            let end = shas.last().map(|(_, d)| *d).unwrap_or_default();

            signals.push(SignalRecord::new(
                SignalType::AdoptionCycle,
                format!("\"{token}\" was introduced and removed {cycles} times"),
                Severity::Info,
                0.5,
                ".".to_string(),
                TemporalScope { start, end },
                contributing_shas,
                serde_json::json!({ "token": token, "cycles": cycles }),
                end,
            ));
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::domain::DecisionClass;

    fn summary(sha: &str, subject: &str, day: i64) -> HistoryChunk {
        let date = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day);
        HistoryChunk::new(
            HistoryChunkType::CommitSummary,
            sha.to_string(),
            "Ada".to_string(),
            "ada@example.com".to_string(),
            date,
            subject.to_string(),
            String::new(),
            "main".to_string(),
            String::new(),
            None,
            vec![],
            1,
            1,
            DecisionClass::Unknown,
            None,
            "search_document: x".to_string(),
        )
    }

    #[test]
    fn test_obvious_adoption_cycle_detected() {
        let chunks = vec![
            summary("s1", "feat: add lodash dependency", 0),
            summary("s2", "fix: remove lodash dependency", 10),
            summary("s3", "feat: add lodash dependency again", 20),
            summary("s4", "chore: remove lodash dependency finally", 30),
        ];
        let signals = AdoptionCycleDetector.detect(&chunks);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].metadata()["cycles"].as_u64(), Some(2));
    }

    #[test]
    fn test_single_cycle_not_enough() {
        let chunks = vec![
            summary("s1", "feat: add lodash dependency", 0),
            summary("s2", "fix: remove lodash dependency", 10),
        ];
        assert!(AdoptionCycleDetector.detect(&chunks).is_empty());
    }
}
