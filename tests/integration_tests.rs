//! End-to-end tests that exercise the parsing, history, and synthesis
//! pipelines together rather than in isolation.

use chrono::{NaiveDate, TimeZone, Utc};

use cortex_recall::{
    chunk_commit, classify, synthesize, AdoptionCycleDetector, BreakingChangeDetector,
    ChangeFrequency, ChangeType, ChunkType, ChunkingOptions, DecisionClass, FixChainDetector,
    Language, ParserService, PrimaryOwner, RawCommit, RawFileStat, RevertDetector,
    SignalDetector, Strategy, TreeSitterParserService, WarningCategory,
};

fn sample_py() -> String {
    std::fs::read_to_string(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.py"),
    )
    .expect("fixture readable")
}

fn sample_ts() -> String {
    std::fs::read_to_string(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample.ts"),
    )
    .expect("fixture readable")
}

#[test]
fn test_python_fixture_chunks_functions_class_and_decorator() {
    let parser = TreeSitterParserService::new();
    let content = sample_py();
    let chunks = parser
        .chunk_file("pkg/sample.py", &content, 4000)
        .expect("chunking succeeds");

    assert!(chunks.iter().any(|c| c.chunk_type() == ChunkType::Function && c.name() == Some("add")));
    assert!(chunks.iter().any(|c| c.chunk_type() == ChunkType::Class && c.name() == Some("Calculator")));
    assert!(chunks.iter().any(|c| c.chunk_type() == ChunkType::Decorator && c.name() == Some("value")));

    // `content` caps the import prelude at 10 lines even though the fixture
    // has far more than 10 import statements.
    let add_chunk = chunks
        .iter()
        .find(|c| c.name() == Some("add"))
        .expect("add chunk present");
    assert!(add_chunk.content().starts_with("# file: pkg/sample.py"));
    let import_lines = add_chunk
        .content()
        .lines()
        .filter(|l| l.trim_start().starts_with("import "))
        .count();
    assert!(import_lines <= 10);
}

#[test]
fn test_typescript_fixture_chunks_exported_and_unexported() {
    let parser = TreeSitterParserService::new();
    let content = sample_ts();
    let chunks = parser
        .chunk_file("pkg/sample.ts", &content, 4000)
        .expect("chunking succeeds");

    let add = chunks.iter().find(|c| c.name() == Some("add")).expect("add present");
    assert!(add.exported());
    assert_eq!(add.language(), Language::TypeScript);

    let helper = chunks.iter().find(|c| c.name() == Some("helper")).expect("helper present");
    assert!(!helper.exported());

    assert!(chunks.iter().any(|c| c.chunk_type() == ChunkType::Class && c.name() == Some("Service")));
}

#[test]
fn test_is_test_file_routes_through_registry() {
    let parser = TreeSitterParserService::new();
    assert!(parser.is_test_file("pkg/widgets_test.py"));
    assert!(parser.is_test_file("src/__tests__/widget.spec.ts"));
    assert!(!parser.is_test_file("src/widget.ts"));
}

fn raw_commit(sha: &str, subject: &str, body: &str, files: &[(&str, u32, u32)], day: i64) -> RawCommit {
    RawCommit {
        sha: sha.to_string(),
        parents: vec!["parent".to_string()],
        author: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(day),
        refs: String::new(),
        subject: subject.to_string(),
        body: body.to_string(),
        files: files
            .iter()
            .map(|(path, additions, deletions)| RawFileStat {
                path: path.to_string(),
                additions: *additions,
                deletions: *deletions,
            })
            .collect(),
    }
}

/// Feature, then a revert of an unrelated earlier bug fix, across a small
/// commit set — exercises commit chunking, revert detection, and fix-chain
/// detection together before profiles/warnings ever see the data.
#[test]
fn test_history_pipeline_detects_revert_and_fix_chain() {
    let opts = ChunkingOptions {
        include_file_chunks: true,
        include_merge_groups: true,
    };

    let commits = vec![
        raw_commit(
            "aaaa1111aaaa1111aaaa1111aaaa1111aaaa1111",
            "feat: add billing export",
            "",
            &[("src/billing.rs", 40, 0)],
            0,
        ),
        raw_commit("f001", "fix: billing export edge case", "", &[("src/billing.rs", 3, 1)], 2),
        raw_commit("f002", "fix: billing export rounding", "", &[("src/billing.rs", 2, 1)], 6),
        raw_commit(
            "bbbb2222bbbb2222bbbb2222bbbb2222bbbb2222",
            "Revert \"feat: add billing export\"",
            "This reverts commit aaaa1111aaaa1111aaaa1111aaaa1111aaaa1111.",
            &[("src/billing.rs", 0, 40)],
            10,
        ),
    ];

    let no_diffs = std::collections::HashMap::new();
    let history_chunks: Vec<_> = commits
        .iter()
        .flat_map(|c| chunk_commit(c, &no_diffs, &opts))
        .collect();
    assert!(history_chunks.iter().any(|c| c.file_path() == Some("src/billing.rs")));

    let detectors: Vec<Box<dyn SignalDetector>> = vec![
        Box::new(RevertDetector),
        Box::new(FixChainDetector),
        Box::new(BreakingChangeDetector),
        Box::new(AdoptionCycleDetector),
    ];
    let signals: Vec<_> = detectors.iter().flat_map(|d| d.detect(&history_chunks)).collect();

    assert!(signals
        .iter()
        .any(|s| s.signal_type() == cortex_recall::SignalType::RevertPair && s.confidence() > 0.8));
    assert!(signals
        .iter()
        .any(|s| s.signal_type() == cortex_recall::SignalType::FixChain));
}

#[test]
fn test_synthesizer_escalates_stability_warning_for_refactor() {
    let profile = cortex_recall::FileProfile::new(
        "src/billing.rs".to_string(),
        Some(PrimaryOwner {
            author: "Ada".to_string(),
            percentage: 80.0,
            commits: 8,
            last_change: Utc::now(),
        }),
        2,
        55.0,
        12,
        1,
        2,
        ChangeFrequency::Weekly,
        40.0,
        Utc::now(),
        vec![],
    );

    let calm = synthesize(&[profile.clone()], &[], None);
    assert!(calm.iter().all(|w| w.category() != WarningCategory::Stability));

    let refactor = synthesize(&[profile], &[], Some(ChangeType::Refactor));
    assert!(refactor.iter().any(|w| w.category() == WarningCategory::Stability));
}

#[test]
fn test_classifier_routes_recent_window_query() {
    let now = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
    let classified = classify("what changed recently in billing", now);
    match classified.strategy {
        Strategy::TemporalVector { after } => {
            let span = (now - after).num_days();
            assert!((29..=31).contains(&span));
        }
        other => panic!("expected TemporalVector, got {other:?}"),
    }
}

#[test]
fn test_decision_class_parse_round_trip() {
    assert_eq!(DecisionClass::parse("decision"), DecisionClass::Decision);
    assert_eq!(DecisionClass::parse("routine"), DecisionClass::Routine);
    assert_eq!(DecisionClass::parse("unknown"), DecisionClass::Unknown);
}
