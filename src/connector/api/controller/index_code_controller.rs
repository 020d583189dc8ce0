use anyhow::Result;

use crate::application::use_cases::IndexCodeSummary;

use super::super::Container;

pub struct IndexCodeController<'a> {
    container: &'a Container,
}

impl<'a> IndexCodeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn index(&self, max_tokens: usize) -> Result<String> {
        let use_case = self.container.index_code_use_case();
        let summary = use_case
            .execute(self.container.repo_path(), max_tokens)
            .await?;
        Ok(self.format_summary(&summary))
    }

    fn format_summary(&self, summary: &IndexCodeSummary) -> String {
        format!(
            "Indexed {} files ({} chunks, {} skipped, {} fallback embeddings)",
            summary.files_indexed,
            summary.chunks_indexed,
            summary.files_skipped,
            summary.fallback_embeddings
        )
    }
}
