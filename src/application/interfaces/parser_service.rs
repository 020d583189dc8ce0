use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{CodeChunk, DomainError};

/// Per-language chunking policy (§4.2). Implementations are pure CPU-bound
/// code — parsing is never a suspension point (§9) — so this trait is
/// deliberately not `async`.
pub trait LanguagePlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// File extensions this plugin claims, without the leading dot.
    fn extensions(&self) -> &'static [&'static str];

    /// Whether `file_path` looks like a test file under this language's
    /// conventions (e.g. `*_test.py`, `__tests__/`, `*.spec.ts`).
    fn is_test_file(&self, file_path: &str) -> bool;

    /// Turns one file's content into a bounded set of addressable chunks,
    /// following the small-file rule, top-level-child walk, decorator
    /// unwrapping, and whole-file fallback common to every language.
    fn chunk_file(
        &self,
        file_path: &str,
        content: &str,
        max_tokens: usize,
    ) -> Result<Vec<CodeChunk>, DomainError>;
}

/// Resolves a file path to its plugin in O(1) by extension, per §4.2's
/// "plugin registry maps extension → plugin" requirement. No inheritance
/// hierarchy — a flat map dispatched by tag, per §9's "dynamic dispatch
/// over plugins" guidance.
#[derive(Default)]
pub struct PluginRegistry {
    by_extension: HashMap<&'static str, Arc<dyn LanguagePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            by_extension: HashMap::new(),
        }
    }

    pub fn register(&mut self, plugin: Arc<dyn LanguagePlugin>) {
        for ext in plugin.extensions() {
            self.by_extension.insert(ext, plugin.clone());
        }
    }

    pub fn resolve(&self, file_path: &str) -> Option<Arc<dyn LanguagePlugin>> {
        let ext = std::path::Path::new(file_path)
            .extension()
            .and_then(|e| e.to_str())?;
        self.by_extension.get(ext).cloned()
    }

    pub fn is_test_file(&self, file_path: &str) -> bool {
        self.resolve(file_path)
            .is_some_and(|plugin| plugin.is_test_file(file_path))
    }

    pub fn supports(&self, file_path: &str) -> bool {
        self.resolve(file_path).is_some()
    }
}

/// Parses source files into semantic chunks. Wraps a [`PluginRegistry`]
/// backed by the shared parser pool (§4.1) behind a DI-friendly port,
/// mirroring the teacher's existing parser port shape.
pub trait ParserService: Send + Sync {
    fn chunk_file(
        &self,
        file_path: &str,
        content: &str,
        max_tokens: usize,
    ) -> Result<Vec<CodeChunk>, DomainError>;

    fn is_test_file(&self, file_path: &str) -> bool;

    fn supports(&self, file_path: &str) -> bool;
}
