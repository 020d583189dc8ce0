use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use tree_sitter::{Language as TsLanguage, Tree};

use crate::domain::DomainError;

/// Grammar variants the pool caches. Distinct from [`crate::domain::Language`]
/// because TypeScript's plugin needs two different grammars (plain TS vs
/// TSX) for one logical [`crate::domain::Language::TypeScript`] (§4.1: "
/// `.tsx/.jsx` use the TSX grammar, `.ts/.js/.mjs/.mts` the TS grammar").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarKind {
    Python,
    TypeScript,
    Tsx,
    JavaScript,
}

impl GrammarKind {
    pub fn name(&self) -> &'static str {
        match self {
            GrammarKind::Python => "python",
            GrammarKind::TypeScript => "typescript",
            GrammarKind::Tsx => "tsx",
            GrammarKind::JavaScript => "javascript",
        }
    }

    fn load(&self) -> TsLanguage {
        match self {
            GrammarKind::Python => tree_sitter_python::LANGUAGE.into(),
            GrammarKind::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            GrammarKind::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            GrammarKind::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

static TABLE: OnceLock<RwLock<HashMap<GrammarKind, TsLanguage>>> = OnceLock::new();

/// Process-wide cache of loaded grammar handles, behind a one-shot latch
/// per grammar (§4.1, §9 "global parser state"). `tree_sitter::Language` is
/// cheap to clone once loaded; the pool exists so concurrent callers never
/// race to load the same grammar twice.
pub struct ParserPool;

impl ParserPool {
    fn table() -> &'static RwLock<HashMap<GrammarKind, TsLanguage>> {
        TABLE.get_or_init(|| RwLock::new(HashMap::new()))
    }

    /// Returns the cached grammar for `kind`, loading it on first use.
    pub fn language(kind: GrammarKind) -> TsLanguage {
        if let Some(lang) = Self::table()
            .read()
            .expect("parser pool lock poisoned")
            .get(&kind)
        {
            return lang.clone();
        }
        let lang = kind.load();
        Self::table()
            .write()
            .expect("parser pool lock poisoned")
            .insert(kind, lang.clone());
        lang
    }

    /// Parses `content` with `kind`'s grammar. Never fails on malformed
    /// input (§4.1: "Parsing never throws ... the CST is best-effort") —
    /// only a missing/uninitializable grammar is an error, and that is
    /// fatal per §7.
    pub fn parse(kind: GrammarKind, content: &str) -> Result<Tree, DomainError> {
        let grammar = Self::language(kind);
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|e| DomainError::grammar_load(format!("{}: {e}", kind.name())))?;
        // tree-sitter returns `None` only on parser misconfiguration (timeout/
        // cancellation callback), never on malformed source; a bare `Tree` with
        // ERROR nodes is the best-effort CST the downstream walk expects.
        parser
            .parse(content, None)
            .ok_or_else(|| DomainError::grammar_load(format!("{}: parser not configured", kind.name())))
    }

    /// Clears the cached grammar table so tests/benchmarks can observe a
    /// fresh one-shot load (§9's `reset_for_benchmark` hook).
    pub fn reset_for_benchmark() {
        Self::table().write().expect("parser pool lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_succeeds() {
        let tree = ParserPool::parse(GrammarKind::Python, "def f():\n    pass\n").unwrap();
        assert_eq!(tree.root_node().kind(), "module");
    }

    #[test]
    fn test_parse_is_idempotent_across_calls() {
        ParserPool::reset_for_benchmark();
        let a = ParserPool::parse(GrammarKind::Python, "x = 1").unwrap();
        let b = ParserPool::parse(GrammarKind::Python, "x = 1").unwrap();
        assert_eq!(a.root_node().kind(), b.root_node().kind());
    }

    #[test]
    fn test_malformed_input_still_returns_best_effort_tree() {
        let tree = ParserPool::parse(GrammarKind::Python, "def f(:\n").unwrap();
        assert!(tree.root_node().has_error());
    }
}
