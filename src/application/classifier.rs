use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// The search strategy a query should be routed to (§4.8 "Query classifier").
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Blame { file: String, line: Option<u32> },
    Pickaxe { search_string: String },
    TemporalVector { after: NaiveDate },
    StructuredGit { field: StructuredGitField },
    Vector,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructuredGitField {
    FileChanged(String),
    Author(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedQuery {
    pub strategy: Strategy,
    pub original_query: String,
}

fn blame_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^who wrote ([^\s]+)(?: line (\d+))?").expect("valid regex")
    })
}

fn pickaxe_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(?:when was|first introduced) ["']?([\w.:/\\-]+)["']? ?(?:introduced|added|removed)?"#)
            .expect("valid regex")
    })
}

fn recent_window_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)last (\d+) (day|week|month)s?|recently|in (\d{4})").expect("valid regex")
    })
}

fn file_changed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)what changed in ([^\s]+)").expect("valid regex"))
}

fn author_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)commits by ([\w.\- ]+)").expect("valid regex"))
}

/// Pure routing function — no I/O, per §4.8's explicit call-out. `now` is
/// threaded in rather than read from the clock so the five routing rules
/// stay deterministic under test.
pub fn classify(query: &str, now: NaiveDate) -> ClassifiedQuery {
    let trimmed = query.trim();

    if let Some(caps) = blame_re().captures(trimmed) {
        let file = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
        let line = caps.get(2).and_then(|m| m.as_str().parse().ok());
        return ClassifiedQuery {
            strategy: Strategy::Blame { file, line },
            original_query: query.to_string(),
        };
    }

    if let Some(caps) = pickaxe_re().captures(trimmed) {
        let search_string = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
        return ClassifiedQuery {
            strategy: Strategy::Pickaxe { search_string },
            original_query: query.to_string(),
        };
    }

    if let Some(caps) = recent_window_re().captures(trimmed) {
        let after = if let (Some(n), Some(unit)) = (caps.get(1), caps.get(2)) {
            let n: i64 = n.as_str().parse().unwrap_or(1);
            let days = match unit.as_str().to_lowercase().as_str() {
                "day" => n,
                "week" => n * 7,
                "month" => n * 30,
                _ => n,
            };
            now - Duration::days(days)
        } else if let Some(year) = caps.get(3) {
            let year: i32 = year.as_str().parse().unwrap_or_else(|_| now.year());
            NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(now)
        } else {
            // "recently" — a 30-day window.
            now - Duration::days(30)
        };
        return ClassifiedQuery {
            strategy: Strategy::TemporalVector { after },
            original_query: query.to_string(),
        };
    }

    if let Some(caps) = file_changed_re().captures(trimmed) {
        let file = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
        return ClassifiedQuery {
            strategy: Strategy::StructuredGit {
                field: StructuredGitField::FileChanged(file),
            },
            original_query: query.to_string(),
        };
    }

    if let Some(caps) = author_re().captures(trimmed) {
        let author = caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
        return ClassifiedQuery {
            strategy: Strategy::StructuredGit {
                field: StructuredGitField::Author(author),
            },
            original_query: query.to_string(),
        };
    }

    ClassifiedQuery {
        strategy: Strategy::Vector,
        original_query: query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_blame_routing() {
        let result = classify("who wrote src/lib.rs line 42", date(2026, 1, 1));
        assert_eq!(
            result.strategy,
            Strategy::Blame {
                file: "src/lib.rs".to_string(),
                line: Some(42)
            }
        );
    }

    #[test]
    fn test_pickaxe_routing() {
        let result = classify("when was foo_bar introduced", date(2026, 1, 1));
        assert!(matches!(result.strategy, Strategy::Pickaxe { .. }));
    }

    #[test]
    fn test_recently_30_day_window() {
        let now = date(2026, 7, 26);
        let result = classify("show me recently changed files", now);
        match result.strategy {
            Strategy::TemporalVector { after } => {
                let span = (now - after).num_days();
                assert!((29..=31).contains(&span));
            }
            other => panic!("expected TemporalVector, got {other:?}"),
        }
    }

    #[test]
    fn test_last_month_routing() {
        let now = date(2026, 7, 26);
        let result = classify("changes last month", now);
        match result.strategy {
            Strategy::TemporalVector { after } => {
                let span = (now - after).num_days();
                assert!((29..=31).contains(&span));
            }
            other => panic!("expected TemporalVector, got {other:?}"),
        }
    }

    #[test]
    fn test_structured_git_file() {
        let result = classify("what changed in src/main.rs", date(2026, 1, 1));
        assert_eq!(
            result.strategy,
            Strategy::StructuredGit {
                field: StructuredGitField::FileChanged("src/main.rs".to_string())
            }
        );
    }

    #[test]
    fn test_structured_git_author() {
        let result = classify("commits by Ada Lovelace", date(2026, 1, 1));
        assert_eq!(
            result.strategy,
            Strategy::StructuredGit {
                field: StructuredGitField::Author("Ada Lovelace".to_string())
            }
        );
    }

    #[test]
    fn test_default_vector() {
        let result = classify("how does authentication work", date(2026, 1, 1));
        assert_eq!(result.strategy, Strategy::Vector);
    }
}
