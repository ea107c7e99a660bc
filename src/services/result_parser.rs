//! Dual-format result parsing: free-text summaries and structured reports.
//!
//! Precedence: the structured report wins for per-test failure identity and
//! detail; the text summary wins for aggregate counts (report formats do not
//! reliably carry aggregate pass counts).

use std::path::Path;

use serde::Deserialize;

use crate::domain::models::{ExecutionSummary, FailureRecord, RunClassification};

// ---------------------------------------------------------------------------
// Text summary parsing
// ---------------------------------------------------------------------------

/// Markers that mean the environment failed before any test executed. Their
/// presence anywhere in the output is authoritative and suppresses count
/// extraction entirely.
const COLLECTION_FAILURE_MARKERS: [&str; 3] =
    ["SyntaxError", "collected 0 items", "ModuleNotFoundError"];

/// An aggregate summary plus how it was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedSummary {
    /// Aggregate pass/fail/error counts.
    pub summary: ExecutionSummary,
    /// How the counts were obtained; drives reward computation.
    pub classification: RunClassification,
}

/// Parse aggregate counts out of raw combined test-process output.
///
/// Environment-failure markers are checked first and short-circuit to
/// `{error: 1}`. Otherwise `passed`, `failed`, and `error` counts are
/// extracted independently from `<n> <keyword>` token pairs; a keyword with
/// no match defaults to 0. If that leaves a zero total despite non-empty
/// output, the result is forced to `{error: 1}` with
/// [`RunClassification::ParseAmbiguity`]: non-matching output must never
/// score as "zero activity, zero penalty".
pub fn parse_summary(raw: &str) -> ParsedSummary {
    if COLLECTION_FAILURE_MARKERS
        .iter()
        .any(|marker| raw.contains(marker))
    {
        return ParsedSummary {
            summary: ExecutionSummary::single_error(),
            classification: RunClassification::CollectionError,
        };
    }

    let summary = ExecutionSummary {
        passed: extract_count(raw, "passed").unwrap_or(0),
        failed: extract_count(raw, "failed").unwrap_or(0),
        error: extract_count(raw, "error").unwrap_or(0),
    };

    if summary.total() == 0 && !raw.is_empty() {
        return ParsedSummary {
            summary: ExecutionSummary::single_error(),
            classification: RunClassification::ParseAmbiguity,
        };
    }

    ParsedSummary {
        summary,
        classification: RunClassification::Normal,
    }
}

/// Find the first `<n> <keyword>` token pair in the text.
///
/// Tolerates trailing punctuation and plural forms, as in
/// `2 passed, 1 failed, 3 errors in 0.12s`. The count and keyword must sit
/// on the same line; a pair split across a line break is not recognized.
/// Real harness summaries always keep the pair on one line.
fn extract_count(text: &str, keyword: &str) -> Option<u32> {
    for line in text.lines() {
        let mut previous: Option<u32> = None;
        for token in line.split_whitespace() {
            if token.starts_with(keyword) {
                if let Some(count) = previous {
                    return Some(count);
                }
            }
            previous = token.parse::<u32>().ok();
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Structured report parsing
// ---------------------------------------------------------------------------

/// Structured report document written by the test harness.
#[derive(Debug, Deserialize)]
struct ReportDocument {
    #[serde(default)]
    tests: Vec<ReportTest>,
}

/// One per-test record in the structured report.
#[derive(Debug, Deserialize)]
struct ReportTest {
    name: String,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    failure: Option<ReportMarker>,
    #[serde(default)]
    error: Option<ReportMarker>,
}

/// A failure or error marker on a test record.
#[derive(Debug, Deserialize)]
struct ReportMarker {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Extract per-test failure detail from the structured report.
///
/// An absent report yields an empty list; a test case with both a failure and
/// an error marker contributes two records. Malformed or unreadable reports
/// degrade to an empty list with a warning rather than aborting the run.
pub async fn parse_structured_report(path: &Path) -> Vec<FailureRecord> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Failed to read structured report");
            return Vec::new();
        }
    };

    let document: ReportDocument = match serde_json::from_str(&contents) {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Malformed structured report");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for test in document.tests {
        for marker in [&test.failure, &test.error].into_iter().flatten() {
            records.push(FailureRecord {
                test_name: test.name.clone(),
                file: test.file.clone(),
                line: test.line,
                message: marker.message.clone(),
                trace: marker.text.clone(),
            });
        }
    }
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_standard_summary_line() {
        let parsed = parse_summary("==== 2 passed, 1 failed, 3 errors in 0.12s ====");
        assert_eq!(
            parsed.summary,
            ExecutionSummary {
                passed: 2,
                failed: 1,
                error: 3
            }
        );
        assert_eq!(parsed.classification, RunClassification::Normal);
    }

    #[test]
    fn missing_keywords_default_to_zero() {
        let parsed = parse_summary("5 passed in 0.03s");
        assert_eq!(
            parsed.summary,
            ExecutionSummary {
                passed: 5,
                failed: 0,
                error: 0
            }
        );
    }

    #[test]
    fn collection_markers_are_authoritative() {
        // "2 passed" appears, but the missing-module marker wins.
        let raw = "ModuleNotFoundError: No module named 'requests'\n2 passed in 0.01s";
        let parsed = parse_summary(raw);
        assert_eq!(parsed.summary, ExecutionSummary::single_error());
        assert_eq!(parsed.classification, RunClassification::CollectionError);
    }

    #[test]
    fn syntax_error_and_zero_collection_are_flagged() {
        for raw in ["SyntaxError: invalid syntax", "collected 0 items"] {
            let parsed = parse_summary(raw);
            assert_eq!(parsed.summary, ExecutionSummary::single_error());
            assert_eq!(parsed.classification, RunClassification::CollectionError);
        }
    }

    #[test]
    fn nonempty_unparsable_output_forces_error() {
        let parsed = parse_summary("something exploded in an unrecognized way");
        assert_eq!(parsed.summary, ExecutionSummary::single_error());
        assert_eq!(parsed.classification, RunClassification::ParseAmbiguity);
    }

    #[test]
    fn empty_output_is_not_ambiguous() {
        let parsed = parse_summary("");
        assert_eq!(parsed.summary, ExecutionSummary::default());
        assert_eq!(parsed.classification, RunClassification::Normal);
    }

    #[test]
    fn extract_count_requires_preceding_number() {
        assert_eq!(extract_count("all tests passed", "passed"), None);
        assert_eq!(extract_count("7 passed", "passed"), Some(7));
    }

    #[test]
    fn count_and_keyword_must_share_a_line() {
        assert_eq!(extract_count("7\npassed", "passed"), None);
    }

    #[test]
    fn huge_counts_do_not_overflow_the_total() {
        // Counts near u32::MAX come from untrusted output; the total must
        // saturate, not wrap into the zero-total override.
        let parsed = parse_summary("4000000000 passed, 3000000000 failed in 1.0s");
        assert_eq!(parsed.summary.passed, 4_000_000_000);
        assert_eq!(parsed.summary.failed, 3_000_000_000);
        assert_eq!(parsed.classification, RunClassification::Normal);
    }

    #[tokio::test]
    async fn absent_report_yields_empty_list() {
        let records =
            parse_structured_report(Path::new("/definitely/not/here/report.json")).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn malformed_report_degrades_to_empty_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let records = parse_structured_report(file.path()).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn failure_and_error_markers_both_fire_for_one_test() {
        let report = serde_json::json!({
            "tests": [
                {
                    "name": "test_create_user",
                    "file": "test_api.py",
                    "line": 42,
                    "failure": {"message": "assert 500 == 201", "text": "traceback..."},
                    "error": {"message": "teardown blew up", "text": "traceback..."}
                },
                {
                    "name": "test_list_users",
                    "file": "test_api.py",
                    "line": 60
                }
            ]
        });
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{report}").unwrap();

        let records = parse_structured_report(file.path()).await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.test_name == "test_create_user"));
        assert_eq!(records[0].message.as_deref(), Some("assert 500 == 201"));
        assert_eq!(records[1].message.as_deref(), Some("teardown blew up"));
        assert_eq!(records[0].line, Some(42));
    }
}
