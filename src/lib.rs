//! # Cortex Recall
//!
//! Semantic code and git-history indexing with risk/stability synthesis.
//!
//! ## Architecture
//!
//! The crate follows Domain-Driven Design layering:
//!
//! - `domain`: core models, errors, and value types — no external
//!   dependencies beyond serialization and hashing.
//! - `application`: use cases, ports (traits implemented by `connector`),
//!   and the pure detector/synthesizer/classifier logic.
//! - `connector`: adapters implementing the application's ports
//!   (tree-sitter, DuckDB, git CLI, MCP) plus the CLI-facing
//!   dependency-injection container.
//! - `cli`: argument parsing for the `cortex-recall` binary.

pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::*;
pub use cli::*;
pub use connector::*;
pub use domain::*;
