use anyhow::Result;

use crate::application::use_cases::IndexHistorySummary;

use super::super::Container;

pub struct IndexHistoryController<'a> {
    container: &'a Container,
}

impl<'a> IndexHistoryController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn index(&self) -> Result<String> {
        let use_case = self.container.index_history_use_case();
        let summary = use_case.execute(self.container.repo_path()).await?;
        Ok(self.format_summary(&summary))
    }

    fn format_summary(&self, summary: &IndexHistorySummary) -> String {
        format!(
            "Indexed {} commits ({} chunks, {} signals detected, {} profiles built, {} fallback embeddings)",
            summary.commits_indexed,
            summary.chunks_indexed,
            summary.signals_detected,
            summary.profiles_built,
            summary.fallback_embeddings
        )
    }
}
