use anyhow::Result;
use chrono::DateTime;

use crate::domain::{DecisionClass, GitFilterClause, GitSearchQuery, HistorySearchResult};

use super::super::Container;

#[allow(clippy::too_many_arguments)]
pub struct SearchHistoryController<'a> {
    container: &'a Container,
}

impl<'a> SearchHistoryController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn search(
        &self,
        query: String,
        limit: usize,
        author: Option<String>,
        file_path: Option<String>,
        commit_type: Option<String>,
        decision_class: Option<String>,
        date_after: Option<String>,
        date_before: Option<String>,
    ) -> Result<String> {
        let mut search_query = GitSearchQuery::new(&query).with_limit(limit);

        if let Some(author) = author {
            search_query = search_query.with_clause(GitFilterClause::Author(author));
        }
        if let Some(path) = file_path {
            search_query = search_query.with_clause(GitFilterClause::FilePath(path));
        }
        if let Some(commit_type) = commit_type {
            search_query = search_query.with_clause(GitFilterClause::CommitType(commit_type));
        }
        if let Some(class) = decision_class {
            search_query = search_query
                .with_clause(GitFilterClause::DecisionClass(DecisionClass::parse(&class)));
        }
        if let Some(after) = date_after {
            let dt = DateTime::parse_from_rfc3339(&after)
                .map_err(|e| anyhow::anyhow!("invalid --date-after: {e}"))?;
            search_query = search_query.with_clause(GitFilterClause::DateAfter(dt.into()));
        }
        if let Some(before) = date_before {
            let dt = DateTime::parse_from_rfc3339(&before)
                .map_err(|e| anyhow::anyhow!("invalid --date-before: {e}"))?;
            search_query = search_query.with_clause(GitFilterClause::DateBefore(dt.into()));
        }

        let use_case = self.container.search_history_use_case();
        let results = use_case.execute(&search_query).await?;

        Ok(self.format_results(&results))
    }

    fn format_results(&self, results: &[HistorySearchResult]) -> String {
        if results.is_empty() {
            return "No results found.".to_string();
        }

        let mut output = format!("Found {} results:\n\n", results.len());

        for (i, result) in results.iter().enumerate() {
            let chunk = result.item();
            output.push_str(&format!(
                "{}. {} {} by {} (score: {:.3})\n",
                i + 1,
                &chunk.sha()[..chunk.sha().len().min(10)],
                chunk.subject(),
                chunk.author(),
                result.score()
            ));
            output.push_str(&format!(
                "   {} | {} | +{} -{}\n\n",
                chunk.date().to_rfc3339(),
                chunk.chunk_type(),
                chunk.additions(),
                chunk.deletions()
            ));
        }

        output
    }
}
