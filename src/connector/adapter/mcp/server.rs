use std::sync::Arc;

use chrono::DateTime;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::tool;
use rmcp::tool_handler;
use rmcp::tool_router;
use rmcp::ErrorData as McpError;
use rmcp::ServerHandler;

use crate::application::synthesizer::ChangeType;
use crate::connector::api::{Container, ContainerConfig};
use crate::domain::{CodeSearchQuery, DecisionClass, GitFilterClause, GitSearchQuery};

use super::tools::{
    AssessToolInput, CodeSearchResultOutput, ExplainToolInput, ExplainToolOutput,
    FileProfileOutput, FileProfileToolInput, GitSearchToolInput, HistorySearchResultOutput,
    SearchToolInput, WarningOutput,
};

/// Server-side maximum for the number of results a single search can return.
const MAX_LIMIT: usize = 100;

/// MCP server exposing cortex-recall's search, classification, and
/// risk/stability synthesis as one tool per verb (§6).
#[derive(Clone)]
pub struct CortexRecallMcpServer {
    default_container: Arc<Container>,
    tool_router: ToolRouter<Self>,
}

impl CortexRecallMcpServer {
    pub fn new(default_container: Arc<Container>) -> Self {
        Self {
            default_container,
            tool_router: Self::tool_router(),
        }
    }

    /// Resolves which repository to query for this call. A `repository`
    /// override builds a fresh container against that path; otherwise the
    /// server's default container (resolved at startup per §6) is reused.
    fn container_for(&self, repository: Option<String>) -> Result<Arc<Container>, McpError> {
        match repository {
            None => Ok(self.default_container.clone()),
            Some(path) => {
                let config = ContainerConfig::resolve(Some(path), false)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                let container = Container::new(config)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                Ok(Arc::new(container))
            }
        }
    }
}

#[tool_router]
impl CortexRecallMcpServer {
    /// Semantic search over indexed code chunks. Describe what you're
    /// looking for in natural language and get back ranked function,
    /// class, and module fragments.
    #[tool(name = "search")]
    async fn search(&self, params: Parameters<SearchToolInput>) -> Result<CallToolResult, McpError> {
        let input = params.0;
        let container = self.container_for(input.repository)?;

        let mut query = CodeSearchQuery::new(&input.query).with_limit(input.limit.min(MAX_LIMIT));
        if let Some(filter) = input.file_filter {
            query = query.with_file_filter(filter);
        }

        let use_case = container.search_code_use_case();
        let results = use_case
            .execute(&query)
            .await
            .map_err(|e| McpError::internal_error(format!("search failed: {e}"), None))?;

        let outputs: Vec<CodeSearchResultOutput> = results.iter().map(Into::into).collect();
        let json = serde_json::to_string_pretty(&outputs)
            .map_err(|e| McpError::internal_error(format!("failed to serialize results: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Semantic search over indexed commit history, filtered by author,
    /// file path, commit type, decision class, and/or date range.
    #[tool(name = "git_search")]
    async fn git_search(
        &self,
        params: Parameters<GitSearchToolInput>,
    ) -> Result<CallToolResult, McpError> {
        let input = params.0;
        let container = self.container_for(input.repository)?;

        let mut query = GitSearchQuery::new(&input.query).with_limit(input.limit.min(MAX_LIMIT));
        if let Some(author) = input.author {
            query = query.with_clause(GitFilterClause::Author(author));
        }
        if let Some(path) = input.file_path {
            query = query.with_clause(GitFilterClause::FilePath(path));
        }
        if let Some(commit_type) = input.commit_type {
            query = query.with_clause(GitFilterClause::CommitType(commit_type));
        }
        if let Some(class) = input.decision_class {
            query = query.with_clause(GitFilterClause::DecisionClass(DecisionClass::parse(&class)));
        }
        if let Some(after) = input.date_after {
            let dt = DateTime::parse_from_rfc3339(&after)
                .map_err(|e| McpError::invalid_params(format!("invalid date_after: {e}"), None))?;
            query = query.with_clause(GitFilterClause::DateAfter(dt.into()));
        }
        if let Some(before) = input.date_before {
            let dt = DateTime::parse_from_rfc3339(&before)
                .map_err(|e| McpError::invalid_params(format!("invalid date_before: {e}"), None))?;
            query = query.with_clause(GitFilterClause::DateBefore(dt.into()));
        }

        let use_case = container.search_history_use_case();
        let results = use_case
            .execute(&query)
            .await
            .map_err(|e| McpError::internal_error(format!("git_search failed: {e}"), None))?;

        let outputs: Vec<HistorySearchResultOutput> = results.iter().map(Into::into).collect();
        let json = serde_json::to_string_pretty(&outputs)
            .map_err(|e| McpError::internal_error(format!("failed to serialize results: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Routes a natural-language question through the query classifier and
    /// returns whichever of code search or git history answers it.
    #[tool(name = "explain")]
    async fn explain(
        &self,
        params: Parameters<ExplainToolInput>,
    ) -> Result<CallToolResult, McpError> {
        let input = params.0;
        let container = self.container_for(input.repository)?;

        let use_case = container.explain_use_case();
        let result = use_case
            .execute(&input.query, input.limit.min(MAX_LIMIT))
            .await
            .map_err(|e| McpError::internal_error(format!("explain failed: {e}"), None))?;

        let output = ExplainToolOutput {
            strategy: result.strategy,
            code_results: result.code_results.iter().map(Into::into).collect(),
            history_results: result.history_results.iter().map(Into::into).collect(),
        };
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| McpError::internal_error(format!("failed to serialize result: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Synthesizes risk/stability warnings for a set of files about to be
    /// changed, from their persisted history profiles and active signals.
    #[tool(name = "assess")]
    async fn assess(&self, params: Parameters<AssessToolInput>) -> Result<CallToolResult, McpError> {
        let input = params.0;
        let container = self.container_for(input.repository)?;
        let change_type = input.change_type.as_deref().and_then(ChangeType::parse);

        let use_case = container.assess_use_case();
        let warnings = use_case
            .execute(&input.files, change_type)
            .await
            .map_err(|e| McpError::internal_error(format!("assess failed: {e}"), None))?;

        let outputs: Vec<WarningOutput> = warnings.iter().map(Into::into).collect();
        let json = serde_json::to_string_pretty(&outputs)
            .map_err(|e| McpError::internal_error(format!("failed to serialize warnings: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Fetches the persisted risk/stability profile for a single file.
    #[tool(name = "file_profile")]
    async fn file_profile(
        &self,
        params: Parameters<FileProfileToolInput>,
    ) -> Result<CallToolResult, McpError> {
        let input = params.0;
        let container = self.container_for(input.repository)?;

        let use_case = container.file_profile_use_case();
        let profile = use_case
            .execute(&input.path)
            .await
            .map_err(|e| McpError::internal_error(format!("file_profile failed: {e}"), None))?;

        let output = profile.as_ref().map(FileProfileOutput::from);
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| McpError::internal_error(format!("failed to serialize profile: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for CortexRecallMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Semantic code and git-history recall server. search finds code by \
                 description; git_search and explain surface relevant commits; assess and \
                 file_profile report risk/stability signals mined from commit history."
                    .into(),
            ),
        }
    }
}
