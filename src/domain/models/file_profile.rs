use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
    Rare,
}

impl ChangeFrequency {
    /// Classifies a file's `change_frequency` from its average inter-change
    /// interval in days, per §4.7.
    pub fn from_avg_interval_days(avg_days: f64) -> Self {
        if avg_days <= 2.0 {
            ChangeFrequency::Daily
        } else if avg_days <= 10.0 {
            ChangeFrequency::Weekly
        } else if avg_days <= 45.0 {
            ChangeFrequency::Monthly
        } else {
            ChangeFrequency::Rare
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Rare => "rare",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "daily" => ChangeFrequency::Daily,
            "weekly" => ChangeFrequency::Weekly,
            "monthly" => ChangeFrequency::Monthly,
            _ => ChangeFrequency::Rare,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryOwner {
    pub author: String,
    pub percentage: f32,
    pub commits: u32,
    pub last_change: DateTime<Utc>,
}

/// Per-file aggregate of commit history, used for risk/stability
/// judgments by the synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProfile {
    path: String,
    primary_owner: Option<PrimaryOwner>,
    contributor_count: u32,
    stability_score: f32,
    total_changes: u32,
    revert_count: u32,
    fix_after_feature_count: u32,
    change_frequency: ChangeFrequency,
    risk_score: f32,
    last_modified: DateTime<Utc>,
    active_signal_ids: Vec<String>,
}

impl FileProfile {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        path: String,
        primary_owner: Option<PrimaryOwner>,
        contributor_count: u32,
        stability_score: f32,
        total_changes: u32,
        revert_count: u32,
        fix_after_feature_count: u32,
        change_frequency: ChangeFrequency,
        risk_score: f32,
        last_modified: DateTime<Utc>,
        active_signal_ids: Vec<String>,
    ) -> Self {
        Self {
            path,
            primary_owner,
            contributor_count,
            stability_score: stability_score.clamp(0.0, 100.0),
            total_changes,
            revert_count,
            fix_after_feature_count,
            change_frequency,
            risk_score: risk_score.clamp(0.0, 100.0),
            last_modified,
            active_signal_ids,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn primary_owner(&self) -> Option<&PrimaryOwner> {
        self.primary_owner.as_ref()
    }

    pub fn contributor_count(&self) -> u32 {
        self.contributor_count
    }

    pub fn stability_score(&self) -> f32 {
        self.stability_score
    }

    pub fn total_changes(&self) -> u32 {
        self.total_changes
    }

    pub fn revert_count(&self) -> u32 {
        self.revert_count
    }

    pub fn fix_after_feature_count(&self) -> u32 {
        self.fix_after_feature_count
    }

    pub fn change_frequency(&self) -> ChangeFrequency {
        self.change_frequency
    }

    pub fn risk_score(&self) -> f32 {
        self.risk_score
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    pub fn active_signal_ids(&self) -> &[String] {
        &self.active_signal_ids
    }

    pub fn is_sole_owned(&self) -> bool {
        self.primary_owner
            .as_ref()
            .is_some_and(|o| o.percentage >= 70.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_frequency_thresholds() {
        assert_eq!(
            ChangeFrequency::from_avg_interval_days(1.0),
            ChangeFrequency::Daily
        );
        assert_eq!(
            ChangeFrequency::from_avg_interval_days(5.0),
            ChangeFrequency::Weekly
        );
        assert_eq!(
            ChangeFrequency::from_avg_interval_days(30.0),
            ChangeFrequency::Monthly
        );
        assert_eq!(
            ChangeFrequency::from_avg_interval_days(90.0),
            ChangeFrequency::Rare
        );
    }
}
