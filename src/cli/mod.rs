use clap::Subcommand;

/// Top-level verbs, one per use case (§2 C11) plus the MCP server mode.
#[derive(Subcommand)]
pub enum Commands {
    /// Walk the target repository and (re-)index its source files as code
    /// chunks.
    IndexCode {
        /// Token budget used for the small-file rule and truncation (§4.2).
        #[arg(long, default_value = "4000")]
        max_tokens: usize,
    },

    /// Mine the target repository's commit history into history chunks,
    /// signals, and per-file risk/stability profiles.
    IndexHistory,

    /// Semantic search over indexed code chunks.
    SearchCode {
        query: String,

        #[arg(long, default_value = "10")]
        limit: usize,

        /// Literal path-prefix filter, never glob syntax (§9).
        #[arg(long)]
        file_filter: Option<String>,
    },

    /// Semantic search over indexed commit history, with optional
    /// structured ANDed filters.
    SearchHistory {
        query: String,

        #[arg(long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        file_path: Option<String>,

        #[arg(long)]
        commit_type: Option<String>,

        /// `decision` | `routine` | `unknown`.
        #[arg(long)]
        decision_class: Option<String>,

        /// RFC 3339 timestamp; only history on or after this date.
        #[arg(long)]
        date_after: Option<String>,

        /// RFC 3339 timestamp; only history on or before this date.
        #[arg(long)]
        date_before: Option<String>,
    },

    /// Route a natural-language query through the query classifier (§4.8)
    /// and return whichever of code/history search answers it.
    Explain {
        query: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Synthesize risk/stability warnings for a set of files about to
    /// change.
    Assess {
        files: Vec<String>,

        /// `feature` | `fix` | `refactor` | `chore`.
        #[arg(long)]
        change_type: Option<String>,
    },

    /// Fetch the persisted risk/stability profile for a single file.
    FileProfile { path: String },

    /// Start the MCP (Model Context Protocol) server for integration with
    /// AI tools.
    Mcp {
        /// Run as an HTTP server on the given port instead of stdio.
        #[arg(long)]
        http: Option<u16>,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on
        /// all network interfaces.
        #[arg(long)]
        public: bool,
    },
}
