mod pool;
mod python;
mod typescript;

use std::sync::Arc;

use tree_sitter::Node;

use crate::application::interfaces::{ParserService, PluginRegistry};
use crate::domain::{ChunkType, CodeChunk, DomainError, Language};

pub use pool::{GrammarKind, ParserPool};
pub use python::PythonPlugin;
pub use typescript::TypeScriptPlugin;

/// Below this line count, a file is chunked whole rather than walked (§4.2
/// rule 1).
const SMALL_FILE_LINE_THRESHOLD: usize = 50;
/// Cap on prelude import lines folded into a chunk's header (§4.2 rule 4).
const MAX_IMPORT_LINES: usize = 10;

fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Truncates `content` to `max_tokens · 4` chars with a trailing marker
/// when it estimates over budget (§4.2 rule 5).
fn truncate_to_budget(content: String, max_tokens: usize) -> String {
    if estimate_tokens(&content) <= max_tokens {
        return content;
    }
    let max_chars = max_tokens * 4;
    let mut truncated: String = content.chars().take(max_chars).collect();
    truncated.push_str("\n... [chunk truncated]");
    truncated
}

/// The whole-file fallback chunk used for small files and for files whose
/// top-level walk yields nothing (§4.2 rules 1 and 3).
fn whole_file_chunk(file_path: &str, content: &str, language: Language) -> CodeChunk {
    let line_count = content.lines().count().max(1) as u32;
    CodeChunk::new(
        file_path.to_string(),
        None,
        None,
        ChunkType::Other,
        language,
        false,
        1,
        line_count,
        content.to_string(),
    )
}

/// Assembles a chunk's `content`: header line, up to [`MAX_IMPORT_LINES`]
/// prelude import lines, a blank separator, then the node's own source
/// text — truncated per the token budget (§4.2 rule 4).
fn assemble_content(
    file_path: &str,
    header_marker: &str,
    full_content: &str,
    is_import_line: fn(&str) -> bool,
    node_text: &str,
    max_tokens: usize,
) -> String {
    let mut out = format!("{header_marker} file: {file_path}\n");
    let imports: Vec<&str> = full_content
        .lines()
        .map(str::trim)
        .filter(|line| is_import_line(line))
        .take(MAX_IMPORT_LINES)
        .collect();
    if !imports.is_empty() {
        out.push('\n');
        for line in imports {
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push('\n');
    out.push_str(node_text);
    truncate_to_budget(out, max_tokens)
}

/// Result of classifying one top-level CST node: the chunk type to emit,
/// the name to use (if any), and whether the construct is exported.
type Classification = (ChunkType, Option<String>, bool);

/// Walks the direct children of `root`, emitting one [`CodeChunk`] per
/// classified construct (§4.2 rule 2), common across languages. Each
/// plugin supplies its own `classify` closure over CST node kinds.
#[allow(clippy::too_many_arguments)]
fn walk_top_level(
    file_path: &str,
    full_content: &str,
    language: Language,
    root: Node,
    header_marker: &str,
    is_import_line: fn(&str) -> bool,
    max_tokens: usize,
    classify: impl Fn(&Node, &str) -> Option<Classification>,
) -> Vec<CodeChunk> {
    let bytes = full_content.as_bytes();
    let mut chunks = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        let Some((chunk_type, name, exported)) = classify(&child, full_content) else {
            continue;
        };
        let name = match (chunk_type, name) {
            (ChunkType::Function, None) => Some("anonymous".to_string()),
            (_, n) => n,
        };
        let start_line = child.start_position().row as u32 + 1;
        let end_line = child.end_position().row as u32 + 1;
        let node_text = child.utf8_text(bytes).unwrap_or_default();
        let content = assemble_content(
            file_path,
            header_marker,
            full_content,
            is_import_line,
            node_text,
            max_tokens,
        );
        chunks.push(CodeChunk::new(
            file_path.to_string(),
            None,
            name,
            chunk_type,
            language,
            exported,
            start_line,
            end_line,
            content,
        ));
    }
    chunks
}

fn field_text(node: &Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(|s| s.to_string())
}

/// [`ParserService`] backed by the shared [`ParserPool`] and a registry of
/// [`crate::application::interfaces::LanguagePlugin`]s (§4.1–§4.2).
pub struct TreeSitterParserService {
    registry: PluginRegistry,
}

impl TreeSitterParserService {
    pub fn new() -> Self {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(PythonPlugin::new()));
        registry.register(Arc::new(TypeScriptPlugin::new()));
        Self { registry }
    }
}

impl Default for TreeSitterParserService {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserService for TreeSitterParserService {
    fn chunk_file(
        &self,
        file_path: &str,
        content: &str,
        max_tokens: usize,
    ) -> Result<Vec<CodeChunk>, DomainError> {
        match self.registry.resolve(file_path) {
            Some(plugin) => plugin.chunk_file(file_path, content, max_tokens),
            None => Err(DomainError::parse(format!(
                "no language plugin registered for {file_path}"
            ))),
        }
    }

    fn is_test_file(&self, file_path: &str) -> bool {
        self.registry.is_test_file(file_path)
    }

    fn supports(&self, file_path: &str) -> bool {
        self.registry.supports(file_path)
    }
}
