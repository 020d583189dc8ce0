mod commit_extractor;
mod duckdb_vector_repository;
mod in_memory_vector_repository;
mod mcp;
mod mock_embedding;
mod parsing;

pub use commit_extractor::*;
pub use duckdb_vector_repository::*;
pub use in_memory_vector_repository::*;
pub use mcp::*;
pub use mock_embedding::*;
pub use parsing::*;
