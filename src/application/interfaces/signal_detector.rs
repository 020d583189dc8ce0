use crate::domain::{HistoryChunk, SignalRecord};

/// One pure detection rule over the already-chunked history (§4.6).
/// Detectors never mutate inputs and never read the store; they only ever
/// see `commit_summary` and `file_diff` chunks.
pub trait SignalDetector: Send + Sync {
    fn name(&self) -> &'static str;

    fn detect(&self, chunks: &[HistoryChunk]) -> Vec<SignalRecord>;
}
