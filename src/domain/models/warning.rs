use serde::{Deserialize, Serialize};

use super::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    Stability,
    Ownership,
    Pattern,
    Risk,
}

impl WarningCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCategory::Stability => "stability",
            WarningCategory::Ownership => "ownership",
            WarningCategory::Pattern => "pattern",
            WarningCategory::Risk => "risk",
        }
    }
}

/// A human-readable risk/stability judgment produced by the synthesizer,
/// carrying provenance back to the signals (if any) that justify it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    category: WarningCategory,
    severity: Severity,
    message: String,
    signal_ids: Vec<String>,
}

impl Warning {
    pub fn new(
        category: WarningCategory,
        severity: Severity,
        message: String,
        signal_ids: Vec<String>,
    ) -> Self {
        Self {
            category,
            severity,
            message,
            signal_ids,
        }
    }

    pub fn category(&self) -> WarningCategory {
        self.category
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn signal_ids(&self) -> &[String] {
        &self.signal_ids
    }

    pub fn has_provenance(&self) -> bool {
        !self.signal_ids.is_empty()
    }
}
