use crate::domain::{FileProfile, Severity, SignalRecord, Warning, WarningCategory};

/// The `assess` tool's optional hint, used only to boost the stability
/// threshold for refactor-shaped changes (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Feature,
    Fix,
    Refactor,
    Chore,
}

impl ChangeType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "feature" => Some(ChangeType::Feature),
            "fix" => Some(ChangeType::Fix),
            "refactor" => Some(ChangeType::Refactor),
            "chore" => Some(ChangeType::Chore),
            _ => None,
        }
    }
}

const STABILITY_MIN_CHANGES: u32 = 10;
const STABILITY_THRESHOLD: f32 = 50.0;
const STABILITY_THRESHOLD_REFACTOR_BOOST: f32 = 60.0;
const OWNERSHIP_THRESHOLD: f32 = 70.0;
const RISK_THRESHOLD: f32 = 70.0;

/// Combines per-file profiles and detected signals into ranked,
/// provenance-carrying warnings (§4.8). Pure and I/O-free; callers fetch
/// the profiles/signals first.
pub fn synthesize(
    profiles: &[FileProfile],
    signals: &[SignalRecord],
    change_type: Option<ChangeType>,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for profile in profiles {
        let stability_threshold = if change_type == Some(ChangeType::Refactor) {
            STABILITY_THRESHOLD_REFACTOR_BOOST
        } else {
            STABILITY_THRESHOLD
        };
        if profile.stability_score() < stability_threshold
            && profile.total_changes() >= STABILITY_MIN_CHANGES
        {
            warnings.push(Warning::new(
                WarningCategory::Stability,
                Severity::Warning,
                format!(
                    "{} has a low stability score ({:.0}/100) across {} changes",
                    profile.path(),
                    profile.stability_score(),
                    profile.total_changes()
                ),
                profile.active_signal_ids().to_vec(),
            ));
        }

        if let Some(owner) = profile.primary_owner() {
            if owner.percentage >= OWNERSHIP_THRESHOLD {
                warnings.push(Warning::new(
                    WarningCategory::Ownership,
                    Severity::Caution,
                    format!(
                        "{} is held by a single contributor ({}, {:.0}% of commits)",
                        profile.path(),
                        owner.author,
                        owner.percentage
                    ),
                    profile.active_signal_ids().to_vec(),
                ));
            }
        }

        if profile.risk_score() >= RISK_THRESHOLD {
            warnings.push(Warning::new(
                WarningCategory::Risk,
                Severity::Warning,
                format!(
                    "{} carries a high risk score ({:.0}/100)",
                    profile.path(),
                    profile.risk_score()
                ),
                profile.active_signal_ids().to_vec(),
            ));
        }
    }

    for signal in signals {
        warnings.push(Warning::new(
            WarningCategory::Pattern,
            signal.severity(),
            signal.summary().to_string(),
            vec![signal.id().to_string()],
        ));
    }

    warnings.sort_by(|a, b| b.severity().cmp(&a.severity()));
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::domain::{ChangeFrequency, PrimaryOwner, TemporalScope, SignalType};

    fn profile(path: &str, stability: f32, total_changes: u32, owner_pct: Option<f32>, risk: f32) -> FileProfile {
        let owner = owner_pct.map(|pct| PrimaryOwner {
            author: "Ada".to_string(),
            percentage: pct,
            commits: 5,
            last_change: Utc::now(),
        });
        FileProfile::new(
            path.to_string(),
            owner,
            1,
            stability,
            total_changes,
            0,
            0,
            ChangeFrequency::Monthly,
            risk,
            Utc::now(),
            vec![],
        )
    }

    #[test]
    fn test_stability_warning_requires_min_changes() {
        let profiles = vec![profile("src/a.rs", 30.0, 3, None, 0.0)];
        let warnings = synthesize(&profiles, &[], None);
        assert!(warnings.iter().all(|w| w.category() != WarningCategory::Stability));
    }

    #[test]
    fn test_stability_warning_fires() {
        let profiles = vec![profile("src/a.rs", 30.0, 12, None, 0.0)];
        let warnings = synthesize(&profiles, &[], None);
        assert!(warnings.iter().any(|w| w.category() == WarningCategory::Stability));
    }

    #[test]
    fn test_refactor_boosts_stability_threshold() {
        let profiles = vec![profile("src/a.rs", 55.0, 12, None, 0.0)];
        assert!(synthesize(&profiles, &[], None).is_empty());
        let boosted = synthesize(&profiles, &[], Some(ChangeType::Refactor));
        assert!(boosted.iter().any(|w| w.category() == WarningCategory::Stability));
    }

    #[test]
    fn test_ownership_warning() {
        let profiles = vec![profile("src/a.rs", 80.0, 5, Some(75.0), 0.0)];
        let warnings = synthesize(&profiles, &[], None);
        assert!(warnings.iter().any(|w| w.category() == WarningCategory::Ownership));
    }

    #[test]
    fn test_risk_warning() {
        let profiles = vec![profile("src/a.rs", 80.0, 5, None, 75.0)];
        let warnings = synthesize(&profiles, &[], None);
        assert!(warnings.iter().any(|w| w.category() == WarningCategory::Risk));
    }

    #[test]
    fn test_pattern_warning_per_signal() {
        let signal = SignalRecord::new(
            SignalType::RevertPair,
            "reverted after 3 days".to_string(),
            Severity::Warning,
            0.9,
            "src".to_string(),
            TemporalScope { start: Utc::now(), end: Utc::now() },
            vec!["sha1".to_string()],
            serde_json::json!({}),
            Utc::now(),
        );
        let warnings = synthesize(&[], &[signal.clone()], None);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].signal_ids(), &[signal.id().to_string()]);
    }
}
