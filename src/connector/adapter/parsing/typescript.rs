use std::sync::OnceLock;

use regex::Regex;
use tree_sitter::Node;

use crate::application::interfaces::LanguagePlugin;
use crate::domain::{ChunkType, CodeChunk, DomainError, Language};

use super::{field_text, walk_top_level, whole_file_chunk, Classification, GrammarKind, ParserPool, SMALL_FILE_LINE_THRESHOLD};

fn test_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|/)(__tests__/.+|[^/]+\.(?:spec|test)\.[jt]sx?)$").expect("valid regex")
    })
}

fn is_import_line(trimmed: &str) -> bool {
    trimmed.starts_with("import ") || trimmed.starts_with("import(")
}

fn has_decorator_child(node: &Node) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == "decorator")
}

fn classify_node(node: &Node, source: &str) -> Option<Classification> {
    match node.kind() {
        "function_declaration" => {
            let name = field_text(node, "name", source);
            Some((ChunkType::Function, name, true))
        }
        "class_declaration" => {
            let name = field_text(node, "name", source);
            if has_decorator_child(node) {
                Some((ChunkType::Decorator, name, true))
            } else {
                Some((ChunkType::Class, name, true))
            }
        }
        "export_statement" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .find(|c| matches!(c.kind(), "function_declaration" | "class_declaration"))?;
            classify_node(&inner, source)
        }
        _ => None,
    }
}

fn grammar_for_extension(ext: &str) -> GrammarKind {
    match ext {
        "tsx" | "jsx" => GrammarKind::Tsx,
        _ => GrammarKind::TypeScript,
    }
}

fn extension_of(file_path: &str) -> &str {
    std::path::Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}

/// `.ts/.tsx/.js/.jsx/.mjs/.mts` files (§4.2): TSX grammar for `.tsx/.jsx`,
/// TS grammar otherwise, same top-level walk as Python with a `//` header.
pub struct TypeScriptPlugin;

impl TypeScriptPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypeScriptPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguagePlugin for TypeScriptPlugin {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "js", "jsx", "mjs", "mts"]
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
            return Ok(vec![whole_file_chunk(file_path, content, Language::TypeScript)]);
        }

        let grammar = grammar_for_extension(extension_of(file_path));
        let tree = ParserPool::parse(grammar, content)?;
        let chunks = walk_top_level(
            file_path,
            content,
            Language::TypeScript,
            tree.root_node(),
            "//",
            is_import_line,
            max_tokens,
            classify_node,
        );

        if chunks.is_empty() {
            return Ok(vec![whole_file_chunk(file_path, content, Language::TypeScript)]);
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
            out.push_str(&format!("// padding {i}\n"));
        }
        out.push_str(body);
        out
    }

    #[test]
    fn test_small_file_yields_single_other_chunk() {
        let plugin = TypeScriptPlugin::new();
        let content = "export function add(a: number, b: number) { return a + b; }\n";
        let chunks = plugin.chunk_file("math.ts", content, 4000).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type(), ChunkType::Other);
        assert!(chunks[0].content().starts_with("// file: "));
    }

    #[test]
    fn test_function_and_class_walked() {
        let body = "import { readFile } from 'fs';\n\nfunction helper() {\n  return 1;\n}\n\nclass Widget {\n  render() {}\n}\n";
        let content = lines(50, body);
        let plugin = TypeScriptPlugin::new();
        let chunks = plugin.chunk_file("widgets.ts", &content, 4000).unwrap();
        assert!(chunks
            .iter()
            .any(|c| c.chunk_type() == ChunkType::Function && c.name() == Some("helper")));
        assert!(chunks
            .iter()
            .any(|c| c.chunk_type() == ChunkType::Class && c.name() == Some("Widget")));
    }

    #[test]
    fn test_exported_class_unwrapped() {
        let body = "export class Service {\n  run() {}\n}\n";
        let content = lines(50, body);
        let plugin = TypeScriptPlugin::new();
        let chunks = plugin.chunk_file("service.ts", &content, 4000).unwrap();
        let class_chunk = chunks.iter().find(|c| c.name() == Some("Service")).unwrap();
        assert_eq!(class_chunk.chunk_type(), ChunkType::Class);
        assert!(class_chunk.exported());
    }

    #[test]
    fn test_tsx_extension_uses_tsx_grammar() {
        let body = "function Component() {\n  return null;\n}\n";
        let content = lines(50, body);
        let plugin = TypeScriptPlugin::new();
        let chunks = plugin.chunk_file("component.tsx", &content, 4000).unwrap();
        assert!(chunks.iter().any(|c| c.name() == Some("Component")));
    }

    #[test]
    fn test_is_test_file_patterns() {
        let plugin = TypeScriptPlugin::new();
        assert!(plugin.is_test_file("src/widget.spec.ts"));
        assert!(plugin.is_test_file("src/__tests__/widget.ts"));
        assert!(!plugin.is_test_file("src/widget.ts"));
    }
}
