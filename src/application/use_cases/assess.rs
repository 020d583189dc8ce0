use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::application::interfaces::VectorStore;
use crate::application::synthesizer::{synthesize, ChangeType};
use crate::domain::{DomainError, SignalRecord, Warning};

/// Fetches profiles and active signals for a set of files and synthesizes
/// ranked warnings (§4.8), as consumed by the `assess` tool.
pub struct AssessUseCase {
    store: Arc<dyn VectorStore>,
}

impl AssessUseCase {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub async fn execute(
        &self,
        files: &[String],
        change_type: Option<ChangeType>,
    ) -> Result<Vec<Warning>, DomainError> {
        let mut profiles = Vec::with_capacity(files.len());
        let mut signals: Vec<SignalRecord> = Vec::new();
        let mut seen_signal_ids: HashSet<String> = HashSet::new();

        for path in files {
            if let Some(profile) = self.store.get_file_profile(path).await? {
                for signal in self.store.get_signals_covering(path).await? {
                    if seen_signal_ids.insert(signal.id().to_string()) {
                        signals.push(signal);
                    }
                }
                profiles.push(profile);
            }
        }

        debug!(
            files = files.len(),
            profiles = profiles.len(),
            signals = signals.len(),
            "assembled assessment inputs"
        );

        Ok(synthesize(&profiles, &signals, change_type))
    }
}
