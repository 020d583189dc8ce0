use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::domain::{
    ChangeFrequency, FileProfile, HistoryChunk, HistoryChunkType, PrimaryOwner, SignalRecord,
};

const FIX_AFTER_FEATURE_WINDOW_DAYS: i64 = 14;

struct FileHistory<'a> {
    path: &'a str,
    entries: Vec<&'a HistoryChunk>,
}

/// Aggregates per-file commit history into [`FileProfile`]s (§4.7). Takes
/// the already-detected signal set so `active_signal_ids` can be computed
/// without re-running detectors.
pub fn build_profiles(chunks: &[HistoryChunk], signals: &[SignalRecord]) -> Vec<FileProfile> {
    let mut by_file: HashMap<&str, Vec<&HistoryChunk>> = HashMap::new();
    for chunk in chunks
        .iter()
        .filter(|c| c.chunk_type() == HistoryChunkType::FileDiff)
    {
        if let Some(path) = chunk.file_path() {
            by_file.entry(path).or_default().push(chunk);
        }
    }

    let revert_shas: HashSet<&str> = signals
        .iter()
        .filter(|s| s.signal_type() == crate::domain::SignalType::RevertPair)
        .flat_map(|s| s.contributing_shas().iter().map(|s| s.as_str()))
        .collect();

    by_file
        .into_iter()
        .map(|(path, entries)| {
            build_one(
                FileHistory { path, entries },
                &revert_shas,
                signals,
            )
        })
        .collect()
}

fn build_one(history: FileHistory<'_>, revert_shas: &HashSet<&str>, signals: &[SignalRecord]) -> FileProfile {
    let FileHistory { path, mut entries } = history;
    entries.sort_by_key(|c| c.date());

    let distinct_shas: HashSet<&str> = entries.iter().map(|c| c.sha()).collect();
    let total_changes = distinct_shas.len() as u32;

    let mut commits_by_author: HashMap<&str, (u32, DateTime<Utc>)> = HashMap::new();
    let mut seen_shas: HashSet<&str> = HashSet::new();
    for entry in &entries {
        if seen_shas.insert(entry.sha()) {
            let slot = commits_by_author.entry(entry.author()).or_insert((0, entry.date()));
            slot.0 += 1;
            if entry.date() > slot.1 {
                slot.1 = entry.date();
            }
        }
    }
    let contributor_count = commits_by_author.len() as u32;

    let primary_owner = commits_by_author
        .iter()
        .max_by_key(|(_, (count, _))| *count)
        .and_then(|(author, (count, last_change))| {
            let percentage = (*count as f32 / total_changes.max(1) as f32) * 100.0;
            if percentage >= 50.0 {
                Some(PrimaryOwner {
                    author: author.to_string(),
                    percentage,
                    commits: *count,
                    last_change: *last_change,
                })
            } else {
                None
            }
        });

    let revert_count = entries
        .iter()
        .filter(|c| c.commit_type() == "revert" || revert_shas.contains(c.sha()))
        .map(|c| c.sha())
        .collect::<HashSet<_>>()
        .len() as u32;

    let feat_dates: Vec<DateTime<Utc>> = entries
        .iter()
        .filter(|c| c.commit_type() == "feat")
        .map(|c| c.date())
        .collect();
    let fix_after_feature_count = entries
        .iter()
        .filter(|c| c.commit_type() == "fix")
        .filter(|fix| {
            feat_dates.iter().any(|feat_date| {
                let delta = (fix.date() - *feat_date).num_days();
                (0..=FIX_AFTER_FEATURE_WINDOW_DAYS).contains(&delta)
            })
        })
        .map(|c| c.sha())
        .collect::<HashSet<_>>()
        .len() as u32;

    let mut distinct_dates: Vec<DateTime<Utc>> = entries.iter().map(|c| c.date()).collect();
    distinct_dates.dedup();
    let avg_interval_days = if distinct_dates.len() > 1 {
        let span = (distinct_dates[distinct_dates.len() - 1] - distinct_dates[0]).num_days() as f64;
        span / (distinct_dates.len() - 1) as f64
    } else {
        f64::MAX
    };
    let change_frequency = ChangeFrequency::from_avg_interval_days(avg_interval_days);

    let churn_penalty = (total_changes as f32 / 5.0).min(30.0);
    let stability_score = 100.0 - (3.0 * revert_count as f32 + 2.0 * fix_after_feature_count as f32 + churn_penalty).min(90.0);

    let sole_owner_penalty = primary_owner
        .as_ref()
        .filter(|o| o.percentage >= 70.0)
        .map(|_| 15.0)
        .unwrap_or(0.0);
    let risk_score = (100.0 - stability_score + sole_owner_penalty).clamp(0.0, 100.0);

    let last_modified = entries.last().map(|c| c.date()).unwrap_or_default();

    let active_signal_ids: Vec<String> = signals
        .iter()
        .filter(|s| s.covers(path))
        .map(|s| s.id().to_string())
        .collect();

    FileProfile::new(
        path.to_string(),
        primary_owner,
        contributor_count,
        stability_score,
        total_changes,
        revert_count,
        fix_after_feature_count,
        change_frequency,
        risk_score,
        last_modified,
        active_signal_ids,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::domain::DecisionClass;

    fn diff(sha: &str, author: &str, path: &str, commit_type: &str, day: i64) -> HistoryChunk {
        let date = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day);
        HistoryChunk::new(
            HistoryChunkType::FileDiff,
            sha.to_string(),
            author.to_string(),
            format!("{author}@example.com"),
            date,
            format!("{commit_type}: change"),
            String::new(),
            "main".to_string(),
            commit_type.to_string(),
            None,
            vec![path.to_string()],
            5,
            1,
            DecisionClass::Unknown,
            Some(path.to_string()),
            "search_document: x".to_string(),
        )
    }

    #[test]
    fn test_sole_owner_detected() {
        let chunks = vec![
            diff("s1", "Ada", "src/a.rs", "feat", 0),
            diff("s2", "Ada", "src/a.rs", "fix", 5),
        ];
        let profiles = build_profiles(&chunks, &[]);
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].is_sole_owned());
        assert_eq!(profiles[0].total_changes(), 2);
    }

    #[test]
    fn test_fix_after_feature_window() {
        let chunks = vec![
            diff("s1", "Ada", "src/a.rs", "feat", 0),
            diff("s2", "Ada", "src/a.rs", "fix", 10),
            diff("s3", "Ada", "src/a.rs", "fix", 40),
        ];
        let profiles = build_profiles(&chunks, &[]);
        assert_eq!(profiles[0].fix_after_feature_count(), 1);
    }
}
