//! # Connector Layer
//!
//! External integrations implementing the application layer's ports:
//! parsing (tree-sitter), embeddings (pluggable provider), storage (DuckDB
//! or in-memory), commit extraction (git CLI), and the MCP server surface.

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
