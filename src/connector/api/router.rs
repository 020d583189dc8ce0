use anyhow::Result;

use crate::cli::Commands;

use super::container::Container;
use super::controller::{
    AssessController, ExplainController, FileProfileController, IndexCodeController,
    IndexHistoryController, SearchCodeController, SearchHistoryController,
};

pub struct Router<'a> {
    index_code_controller: IndexCodeController<'a>,
    index_history_controller: IndexHistoryController<'a>,
    search_code_controller: SearchCodeController<'a>,
    search_history_controller: SearchHistoryController<'a>,
    explain_controller: ExplainController<'a>,
    assess_controller: AssessController<'a>,
    file_profile_controller: FileProfileController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            index_code_controller: IndexCodeController::new(container),
            index_history_controller: IndexHistoryController::new(container),
            search_code_controller: SearchCodeController::new(container),
            search_history_controller: SearchHistoryController::new(container),
            explain_controller: ExplainController::new(container),
            assess_controller: AssessController::new(container),
            file_profile_controller: FileProfileController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::IndexCode { max_tokens } => self.index_code_controller.index(max_tokens).await,
            Commands::IndexHistory => self.index_history_controller.index().await,
            Commands::SearchCode {
                query,
                limit,
                file_filter,
            } => {
                self.search_code_controller
                    .search(query, limit, file_filter)
                    .await
            }
            Commands::SearchHistory {
                query,
                limit,
                author,
                file_path,
                commit_type,
                decision_class,
                date_after,
                date_before,
            } => {
                self.search_history_controller
                    .search(
                        query,
                        limit,
                        author,
                        file_path,
                        commit_type,
                        decision_class,
                        date_after,
                        date_before,
                    )
                    .await
            }
            Commands::Explain { query, limit } => self.explain_controller.explain(query, limit).await,
            Commands::Assess { files, change_type } => {
                self.assess_controller.assess(files, change_type).await
            }
            Commands::FileProfile { path } => self.file_profile_controller.show(path).await,
            Commands::Mcp { .. } => unreachable!("MCP command is handled separately in main"),
        }
    }
}
