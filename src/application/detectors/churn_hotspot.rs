use std::collections::HashMap;

use crate::application::interfaces::SignalDetector;
use crate::domain::{HistoryChunk, HistoryChunkType, Severity, SignalRecord, SignalType, TemporalScope};

const MIN_COUNT: usize = 10;
const MIN_SIGMA: f64 = 2.0;

/// Flags files with an outlier change count relative to the rest of the
/// indexed window (§4.6).
pub struct ChurnHotspotDetector;

impl SignalDetector for ChurnHotspotDetector {
    fn name(&self) -> &'static str {
        "churn_hotspot_detector"
    }

    fn detect(&self, chunks: &[HistoryChunk]) -> Vec<SignalRecord> {
        let mut by_file: HashMap<&str, Vec<&HistoryChunk>> = HashMap::new();
        for chunk in chunks
            .iter()
            .filter(|c| c.chunk_type() == HistoryChunkType::FileDiff)
        {
            if let Some(path) = chunk.file_path() {
                by_file.entry(path).or_default().push(chunk);
            }
        }

        if by_file.is_empty() {
            return Vec::new();
        }

        let counts: Vec<f64> = by_file.values().map(|v| v.len() as f64).collect();
        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        let variance =
            counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
        let stdev = variance.sqrt();

        let mut signals = Vec::new();

        for (path, mut entries) in by_file {
            let count = entries.len();
            if count < MIN_COUNT {
                continue;
            }
            let sigma = if stdev > 0.0 {
                (count as f64 - mean) / stdev
            } else {
                0.0
            };
            if sigma < MIN_SIGMA {
                continue;
            }

            entries.sort_by_key(|c| c.date());
            let start = entries.first().map(|c| c.date()).unwrap_or_default();
            let end = entries.last().map(|c| c.date()).unwrap_or_default();
            let mid_time = start + (end - start) / 2;
            let latter_share =
                entries.iter().filter(|c| c.date() > mid_time).count() as f64 / count as f64;
            let trend = if latter_share > 0.6 { "increasing" } else { "stable" };

            let shas: Vec<String> = entries.iter().map(|c| c.sha().to_string()).collect();

            signals.push(SignalRecord::new(
                SignalType::ChurnHotspot,
                format!("{path} changed {count} times ({trend} trend)"),
                Severity::Warning,
                (sigma / 4.0).clamp(0.0, 1.0),
                path.to_string(),
                TemporalScope { start, end },
                shas,
                serde_json::json!({
                    "count": count,
                    "sigma": sigma,
                    "trend": trend,
                }),
                end,
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

    fn file_diff(sha: &str, path: &str, day: i64) -> HistoryChunk {
        let date = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day);
        HistoryChunk::new(
            HistoryChunkType::FileDiff,
            sha.to_string(),
            "Ada".to_string(),
            "ada@example.com".to_string(),
            date,
            "fix: tweak".to_string(),
            String::new(),
            "main".to_string(),
            "fix".to_string(),
            None,
            vec![path.to_string()],
            1,
            1,
            DecisionClass::Unknown,
            Some(path.to_string()),
            "search_document: x".to_string(),
        )
    }

    #[test]
    fn test_hotspot_requires_min_count_and_sigma() {
        let mut chunks = Vec::new();
        for i in 0..3 {
            chunks.push(file_diff(&format!("quiet{i}"), "src/quiet.rs", i));
        }
        for i in 0..15 {
            chunks.push(file_diff(&format!("hot{i}"), "src/hot.rs", i));
        }
        let signals = ChurnHotspotDetector.detect(&chunks);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].directory_scope(), "src/hot.rs");
    }

    #[test]
    fn test_increasing_trend_from_temporal_skew() {
        let mut chunks = Vec::new();
        for i in 0..3 {
            chunks.push(file_diff(&format!("quiet{i}"), "src/quiet.rs", i));
        }
        for i in 0..3 {
            chunks.push(file_diff(&format!("early{i}"), "src/hot.rs", i));
        }
        for i in 0..12 {
            chunks.push(file_diff(&format!("late{i}"), "src/hot.rs", 20 + i));
        }
        let signals = ChurnHotspotDetector.detect(&chunks);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].metadata()["trend"], "increasing");
    }

    #[test]
    fn test_no_hotspot_when_uniform() {
        let mut chunks = Vec::new();
        for f in 0..5 {
            for i in 0..10 {
                chunks.push(file_diff(&format!("s{f}-{i}"), &format!("src/f{f}.rs"), i));
            }
        }
        let signals = ChurnHotspotDetector.detect(&chunks);
        assert!(signals.is_empty());
    }
}
