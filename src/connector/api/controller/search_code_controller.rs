use anyhow::Result;

use crate::domain::CodeSearchResult;
use crate::domain::CodeSearchQuery;

use super::super::Container;

pub struct SearchCodeController<'a> {
    container: &'a Container,
}

impl<'a> SearchCodeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn search(
        &self,
        query: String,
        limit: usize,
        file_filter: Option<String>,
    ) -> Result<String> {
        let mut search_query = CodeSearchQuery::new(&query).with_limit(limit);
        if let Some(filter) = file_filter {
            search_query = search_query.with_file_filter(filter);
        }

        let use_case = self.container.search_code_use_case();
        let results = use_case.execute(&search_query).await?;

        Ok(self.format_results(&results))
    }

    fn format_results(&self, results: &[CodeSearchResult]) -> String {
        if results.is_empty() {
            return "No results found.".to_string();
        }

        let mut output = format!("Found {} results:\n\n", results.len());

        for (i, result) in results.iter().enumerate() {
            let chunk = result.item();
            output.push_str(&format!(
                "{}. {} (score: {:.3})\n",
                i + 1,
                chunk.location(),
                result.score()
            ));

            if let Some(name) = chunk.name() {
                output.push_str(&format!("   Symbol: {} ({})\n", name, chunk.chunk_type()));
            }

            let preview: String = chunk
                .content()
                .lines()
                .take(10)
                .map(|l| format!("   | {}", l))
                .collect::<Vec<_>>()
                .join("\n");
            output.push_str(&preview);
            output.push_str("\n\n");
        }

        output
    }
}
