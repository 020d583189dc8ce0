use std::sync::OnceLock;

use regex::Regex;
use tree_sitter::Node;

use crate::application::interfaces::LanguagePlugin;
use crate::domain::{ChunkType, CodeChunk, DomainError, Language};

use super::{field_text, walk_top_level, whole_file_chunk, Classification, GrammarKind, ParserPool, SMALL_FILE_LINE_THRESHOLD};

fn test_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|/)(test_[^/]+\.py|[^/]+_test\.py)$").expect("valid regex")
    })
}

fn is_import_line(trimmed: &str) -> bool {
    trimmed.starts_with("import ") || trimmed.starts_with("from ")
}

/// A symbol whose name starts with `_` is a Python convention for
/// module-private; anything else counts as exported for `CodeChunk.exported`.
fn is_exported(name: Option<&str>) -> bool {
    name.map(|n| !n.starts_with('_')).unwrap_or(false)
}

fn classify_node(node: &Node, source: &str) -> Option<Classification> {
    match node.kind() {
        "function_definition" => {
            let name = field_text(node, "name", source);
            let exported = is_exported(name.as_deref());
            Some((ChunkType::Function, name, exported))
        }
        "class_definition" => {
            let name = field_text(node, "name", source);
            let exported = is_exported(name.as_deref());
            Some((ChunkType::Class, name, exported))
        }
        "decorated_definition" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .find(|c| matches!(c.kind(), "function_definition" | "class_definition"))?;
            let name = field_text(&inner, "name", source);
            let exported = is_exported(name.as_deref());
            Some((ChunkType::Decorator, name, exported))
        }
        _ => None,
    }
}

/// `.py` files (§4.2): small-file rule, top-level function/class/decorator
/// walk, `# file:` header.
pub struct PythonPlugin;

impl PythonPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePlugin for PythonPlugin {
    fn name(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn is_test_file(&self, file_path: &str) -> bool {
        test_file_re().is_match(file_path)
    }

    fn chunk_file(
        &self,
        file_path: &str,
        content: &str,
        max_tokens: usize,
    ) -> Result<Vec<CodeChunk>, DomainError> {
        if content.lines().count() < SMALL_FILE_LINE_THRESHOLD {
            return Ok(vec![whole_file_chunk(file_path, content, Language::Python)]);
        }

        let tree = ParserPool::parse(GrammarKind::Python, content)?;
        let chunks = walk_top_level(
            file_path,
            content,
            Language::Python,
            tree.root_node(),
            "#",
            is_import_line,
            max_tokens,
            classify_node,
        );

        if chunks.is_empty() {
            return Ok(vec![whole_file_chunk(file_path, content, Language::Python)]);
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize, body: &str) -> String {
        let mut out = String::new();
        for i in 0..n {
            out.push_str(&format!("# padding {i}\n"));
        }
        out.push_str(body);
        out
    }

    #[test]
    fn test_small_file_yields_single_other_chunk() {
        let plugin = PythonPlugin::new();
        let content = "def add(a, b):\n    return a + b\n";
        let chunks = plugin.chunk_file("math.py", content, 4000).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type(), ChunkType::Other);
        assert_eq!(chunks[0].line_start(), 1);
        assert!(chunks[0].content().starts_with("# file: "));
    }

    #[test]
    fn test_function_and_class_walked() {
        let body = "import os\n\ndef helper():\n    return os.getcwd()\n\n\nclass Widget:\n    def render(self):\n        pass\n";
        let content = lines(50, body);
        let plugin = PythonPlugin::new();
        let chunks = plugin.chunk_file("widgets.py", &content, 4000).unwrap();
        assert!(chunks.iter().any(|c| c.chunk_type() == ChunkType::Function && c.name() == Some("helper")));
        assert!(chunks.iter().any(|c| c.chunk_type() == ChunkType::Class && c.name() == Some("Widget")));
    }

    #[test]
    fn test_decorator_unwraps_inner_name() {
        let body = "@property\ndef value(self):\n    return self._v\n";
        let content = lines(50, body);
        let plugin = PythonPlugin::new();
        let chunks = plugin.chunk_file("props.py", &content, 4000).unwrap();
        assert!(chunks
            .iter()
            .any(|c| c.chunk_type() == ChunkType::Decorator && c.name() == Some("value")));
    }

    #[test]
    fn test_is_test_file_patterns() {
        let plugin = PythonPlugin::new();
        assert!(plugin.is_test_file("pkg/test_widgets.py"));
        assert!(plugin.is_test_file("pkg/widgets_test.py"));
        assert!(!plugin.is_test_file("pkg/widgets.py"));
    }

    #[test]
    fn test_private_function_not_exported() {
        let body = "def _helper():\n    pass\n";
        let content = lines(50, body);
        let plugin = PythonPlugin::new();
        let chunks = plugin.chunk_file("m.py", &content, 4000).unwrap();
        let func = chunks.iter().find(|c| c.name() == Some("_helper")).unwrap();
        assert!(!func.exported());
    }
}
