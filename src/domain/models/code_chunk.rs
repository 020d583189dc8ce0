use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::Language;

/// The kind of top-level construct a [`CodeChunk`] was carved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Function,
    Class,
    Decorator,
    Other,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Function => "function",
            ChunkType::Class => "class",
            ChunkType::Decorator => "decorator",
            ChunkType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "function" => ChunkType::Function,
            "class" => ChunkType::Class,
            "decorator" => ChunkType::Decorator,
            _ => ChunkType::Other,
        }
    }
}

impl std::fmt::Display for ChunkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Computes the chunk fingerprint: the first 64 bits of SHA-256 over
/// `file_path || line_start || line_end`, rendered as 16 lowercase hex
/// chars. Stable across re-indexing as long as the chunk's span doesn't
/// move.
pub fn chunk_id(file_path: &str, line_start: u32, line_end: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_path.as_bytes());
    hasher.update(line_start.to_le_bytes());
    hasher.update(line_end.to_le_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

/// An addressable, semantically coherent fragment of source code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeChunk {
    id: String,
    file_path: String,
    package_name: Option<String>,
    name: Option<String>,
    chunk_type: ChunkType,
    language: Language,
    exported: bool,
    line_start: u32,
    line_end: u32,
    content: String,
}

impl CodeChunk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        file_path: String,
        package_name: Option<String>,
        name: Option<String>,
        chunk_type: ChunkType,
        language: Language,
        exported: bool,
        line_start: u32,
        line_end: u32,
        content: String,
    ) -> Self {
        let id = chunk_id(&file_path, line_start, line_end);
        Self {
            id,
            file_path,
            package_name,
            name,
            chunk_type,
            language,
            exported,
            line_start,
            line_end,
            content,
        }
    }

    /// Reconstitutes from persisted data (used by adapters).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: String,
        file_path: String,
        package_name: Option<String>,
        name: Option<String>,
        chunk_type: ChunkType,
        language: Language,
        exported: bool,
        line_start: u32,
        line_end: u32,
        content: String,
    ) -> Self {
        Self {
            id,
            file_path,
            package_name,
            name,
            chunk_type,
            language,
            exported,
            line_start,
            line_end,
            content,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn exported(&self) -> bool {
        self.exported
    }

    pub fn line_start(&self) -> u32 {
        self.line_start
    }

    pub fn line_end(&self) -> u32 {
        self.line_end
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn location(&self) -> String {
        format!("{}:{}-{}", self.file_path, self.line_start, self.line_end)
    }

    pub fn line_count(&self) -> u32 {
        self.line_end.saturating_sub(self.line_start) + 1
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.chunk_type, ChunkType::Function)
    }

    pub fn preview(&self, max_lines: usize) -> String {
        self.content
            .lines()
            .take(max_lines)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_is_deterministic() {
        let a = chunk_id("src/lib.rs", 10, 20);
        let b = chunk_id("src/lib.rs", 10, 20);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_chunk_id_matches_constructed_chunk() {
        let chunk = CodeChunk::new(
            "src/lib.rs".to_string(),
            None,
            Some("add".to_string()),
            ChunkType::Function,
            Language::Python,
            false,
            10,
            12,
            "def add(a, b):\n    return a + b".to_string(),
        );
        assert_eq!(chunk.id(), chunk_id("src/lib.rs", 10, 12));
    }

    #[test]
    fn test_chunk_id_varies_with_span() {
        let a = chunk_id("a.py", 1, 10);
        let b = chunk_id("a.py", 1, 11);
        assert_ne!(a, b);
    }

    #[test]
    fn test_location_format() {
        let chunk = CodeChunk::new(
            "test.py".to_string(),
            None,
            None,
            ChunkType::Other,
            Language::Python,
            false,
            5,
            10,
            "code".to_string(),
        );
        assert_eq!(chunk.location(), "test.py:5-10");
    }

    #[test]
    fn test_line_count() {
        let chunk = CodeChunk::new(
            "x.py".to_string(),
            None,
            None,
            ChunkType::Function,
            Language::Python,
            false,
            10,
            12,
            "x".to_string(),
        );
        assert_eq!(chunk.line_count(), 3);
    }
}
