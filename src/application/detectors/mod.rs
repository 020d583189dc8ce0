mod adoption_cycle;
mod breaking_change;
mod churn_hotspot;
mod fix_chain;
mod revert;

pub use adoption_cycle::*;
pub use breaking_change::*;
pub use churn_hotspot::*;
pub use fix_chain::*;
pub use revert::*;

use crate::application::interfaces::SignalDetector;

/// The fixed-order detector set run by `IndexHistoryUseCase` (§4.6).
pub fn default_detectors() -> Vec<Box<dyn SignalDetector>> {
    vec![
        Box::new(RevertDetector),
        Box::new(FixChainDetector),
        Box::new(ChurnHotspotDetector),
        Box::new(BreakingChangeDetector),
        Box::new(AdoptionCycleDetector),
    ]
}
