use anyhow::Result;

use crate::application::use_cases::ExplainResult;

use super::super::Container;

pub struct ExplainController<'a> {
    container: &'a Container,
}

impl<'a> ExplainController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn explain(&self, query: String, limit: usize) -> Result<String> {
        let use_case = self.container.explain_use_case();
        let result = use_case.execute(&query, limit).await?;
        Ok(self.format_result(&result))
    }

    fn format_result(&self, result: &ExplainResult) -> String {
        let mut output = format!("Strategy: {}\n\n", result.strategy);

        if !result.code_results.is_empty() {
            output.push_str(&format!("Code results ({}):\n", result.code_results.len()));
            for r in &result.code_results {
                output.push_str(&format!(
                    "  {} (score: {:.3})\n",
                    r.item().location(),
                    r.score()
                ));
            }
            output.push('\n');
        }

        if !result.history_results.is_empty() {
            output.push_str(&format!(
                "History results ({}):\n",
                result.history_results.len()
            ));
            for r in &result.history_results {
                output.push_str(&format!(
                    "  {} {} by {} (score: {:.3})\n",
                    &r.item().sha()[..r.item().sha().len().min(10)],
                    r.item().subject(),
                    r.item().author(),
                    r.score()
                ));
            }
        }

        if result.code_results.is_empty() && result.history_results.is_empty() {
            output.push_str("No results found.");
        }

        output
    }
}
