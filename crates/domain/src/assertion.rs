//! Assertion records and the run ledger
//!
//! Every expected-vs-actual judgement in a run is one [`AssertionRecord`],
//! appended to the run's [`Ledger`]. The ledger is append-only; totals are
//! derived from it on demand, never stored as counters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::{reason_phrase, FailureKind, Outcome};

/// Expected status code value, range, or set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusExpectation {
    /// Exact status code.
    Exact(u16),
    /// Inclusive range of status codes.
    Range {
        /// Minimum status code (inclusive).
        min: u16,
        /// Maximum status code (inclusive).
        max: u16,
    },
    /// One of multiple status codes.
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    /// Check if a status code matches this expectation.
    #[must_use]
    pub fn matches(&self, status: u16) -> bool {
        match self {
            Self::Exact(expected) => status == *expected,
            Self::Range { min, max } => status >= *min && status <= *max,
            Self::OneOf(codes) => codes.contains(&status),
        }
    }

    /// Get description of the expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Exact(code) => format!("= {code}"),
            Self::Range { min, max } => format!("in {min}-{max}"),
            Self::OneOf(codes) => {
                let codes_str: Vec<_> = codes.iter().map(ToString::to_string).collect();
                format!("in [{}]", codes_str.join(", "))
            }
        }
    }

    /// Create a "success" expectation (200-299).
    #[must_use]
    pub const fn success() -> Self {
        Self::Range { min: 200, max: 299 }
    }

    /// Create an exact status expectation.
    #[must_use]
    pub const fn exact(code: u16) -> Self {
        Self::Exact(code)
    }
}

impl Default for StatusExpectation {
    fn default() -> Self {
        Self::success()
    }
}

/// What one assertion claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expectation {
    /// The dispatch outcome carries a matching status code.
    Status {
        /// The expected code, range, or set.
        expected: StatusExpectation,
    },
    /// A named extracted field equals the given value.
    FieldEquals {
        /// Logical field name.
        field: String,
        /// Expected string value.
        value: String,
    },
    /// A named extracted field is present and non-empty.
    FieldPresent {
        /// Logical field name.
        field: String,
    },
    /// No correctness claim; the step merely probes and displays.
    Informational,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { expected } => write!(f, "status {}", expected.description()),
            Self::FieldEquals { field, value } => write!(f, "{field} = {value:?}"),
            Self::FieldPresent { field } => write!(f, "{field} present"),
            Self::Informational => write!(f, "informational"),
        }
    }
}

/// What actually happened, retained for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Observed {
    /// A response arrived with this status code.
    Status {
        /// The received code.
        code: u16,
    },
    /// No response; the dispatch failed at the transport.
    Failure {
        /// The failure classification.
        kind: FailureKind,
    },
    /// A field extraction result.
    Field {
        /// Logical field name.
        field: String,
        /// Extracted value; `None` when absent from the response shape.
        value: Option<String>,
    },
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { code } => write!(f, "{code} {}", reason_phrase(*code)),
            Self::Failure { kind } => write!(f, "{kind}"),
            Self::Field {
                field,
                value: Some(v),
            } => write!(f, "{field} = {v:?}"),
            Self::Field { field, value: None } => write!(f, "{field} absent"),
        }
    }
}

/// One step's expected-vs-actual judgement. Append-only once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionRecord {
    /// Name of the step that made the claim.
    pub step: String,
    /// What was claimed.
    pub expected: Expectation,
    /// What was observed.
    pub actual: Observed,
    /// Whether the claim held.
    pub passed: bool,
    /// When the judgement was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Derived run totals. Invariant: `passed + failed == total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of records in the ledger.
    pub total: usize,
    /// Records with `passed == true`.
    pub passed: usize,
    /// Records with `passed == false`.
    pub failed: usize,
}

impl RunSummary {
    /// Whether the whole run passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// The append-only record set for one run.
///
/// Replaces the module-level pass/fail counters of ad hoc test scripts:
/// the ledger is an explicit value passed into each operation, and totals
/// are always derived from the records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    records: Vec<AssertionRecord>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// All records, in append order.
    #[must_use]
    pub fn records(&self) -> &[AssertionRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Judges a dispatch outcome against an optional status expectation
    /// and appends exactly one record.
    ///
    /// With no expectation the call is informational only and always
    /// passes. With one, the record passes iff a response arrived and its
    /// code matches; transport failures keep their classification in the
    /// record for diagnostics.
    pub fn assert_status(
        &mut self,
        step: impl Into<String>,
        expected: Option<StatusExpectation>,
        outcome: &Outcome,
    ) -> &AssertionRecord {
        let actual = outcome.status().map_or_else(
            || Observed::Failure {
                kind: outcome
                    .failure()
                    .cloned()
                    .unwrap_or_else(|| FailureKind::Transport("no outcome".to_string())),
            },
            |code| Observed::Status { code },
        );
        let (expectation, passed) = match expected {
            None => (Expectation::Informational, true),
            Some(e) => {
                let passed = outcome.status().is_some_and(|s| e.matches(s));
                (Expectation::Status { expected: e }, passed)
            }
        };
        self.push(step.into(), expectation, actual, passed)
    }

    /// Judges an extracted field against an expected value and appends
    /// exactly one record. An absent field never matches.
    pub fn assert_field_eq(
        &mut self,
        step: impl Into<String>,
        field: impl Into<String>,
        expected_value: impl Into<String>,
        actual: Option<&str>,
    ) -> &AssertionRecord {
        let field = field.into();
        let expected_value = expected_value.into();
        let passed = actual == Some(expected_value.as_str());
        let expectation = Expectation::FieldEquals {
            field: field.clone(),
            value: expected_value,
        };
        let observed = Observed::Field {
            field,
            value: actual.map(ToString::to_string),
        };
        self.push(step.into(), expectation, observed, passed)
    }

    /// Judges that an extracted field is present and non-empty, appending
    /// exactly one record.
    pub fn assert_field_present(
        &mut self,
        step: impl Into<String>,
        field: impl Into<String>,
        actual: Option<&str>,
    ) -> &AssertionRecord {
        let field = field.into();
        let passed = actual.is_some_and(|v| !v.is_empty());
        let expectation = Expectation::FieldPresent {
            field: field.clone(),
        };
        let observed = Observed::Field {
            field,
            value: actual.map(ToString::to_string),
        };
        self.push(step.into(), expectation, observed, passed)
    }

    fn push(
        &mut self,
        step: String,
        expected: Expectation,
        actual: Observed,
        passed: bool,
    ) -> &AssertionRecord {
        self.records.push(AssertionRecord {
            step,
            expected,
            actual,
            passed,
            recorded_at: Utc::now(),
        });
        // Just pushed, so the last index is valid.
        &self.records[self.records.len() - 1]
    }

    /// Derives the run totals from the records.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let total = self.records.len();
        let passed = self.records.iter().filter(|r| r.passed).count();
        RunSummary {
            total,
            passed,
            failed: total - passed,
        }
    }

    /// Whether every record passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.summary().all_passed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_expectation_exact() {
        let exp = StatusExpectation::exact(200);
        assert!(exp.matches(200));
        assert!(!exp.matches(201));
    }

    #[test]
    fn test_status_expectation_range() {
        let exp = StatusExpectation::success();
        assert!(exp.matches(200));
        assert!(exp.matches(299));
        assert!(!exp.matches(300));
        assert!(!exp.matches(199));
    }

    #[test]
    fn test_status_expectation_one_of() {
        let exp = StatusExpectation::OneOf(vec![200, 404, 502]);
        assert!(exp.matches(404));
        assert!(exp.matches(502));
        assert!(!exp.matches(401));
    }

    #[test]
    fn test_assert_status_pass_and_fail() {
        let mut ledger = Ledger::new();
        let record = ledger.assert_status(
            "register",
            Some(StatusExpectation::exact(201)),
            &Outcome::received(201, "{}"),
        );
        assert!(record.passed);

        let record = ledger.assert_status(
            "duplicate register",
            Some(StatusExpectation::exact(400)),
            &Outcome::received(201, "{}"),
        );
        assert!(!record.passed);
        assert_eq!(record.actual, Observed::Status { code: 201 });
    }

    #[test]
    fn test_informational_always_passes() {
        let mut ledger = Ledger::new();
        let record = ledger.assert_status("probe", None, &Outcome::connection_error());
        assert!(record.passed);
        assert_eq!(record.expected, Expectation::Informational);
    }

    #[test]
    fn test_transport_failure_fails_status_claim() {
        let mut ledger = Ledger::new();
        let record = ledger.assert_status(
            "unreachable",
            Some(StatusExpectation::exact(200)),
            &Outcome::connection_error(),
        );
        assert!(!record.passed);
        assert_eq!(
            record.actual,
            Observed::Failure {
                kind: FailureKind::ConnectionError
            }
        );
    }

    #[test]
    fn test_field_assertions() {
        let mut ledger = Ledger::new();
        assert!(
            ledger
                .assert_field_eq("create loan", "success", "true", Some("true"))
                .passed
        );
        assert!(
            !ledger
                .assert_field_eq("create loan", "status", "ACTIVE", None)
                .passed
        );
        assert!(
            ledger
                .assert_field_present("login", "token", Some("abc"))
                .passed
        );
        assert!(
            !ledger
                .assert_field_present("login", "token", Some(""))
                .passed
        );
    }

    #[test]
    fn test_counters_invariant() {
        let mut ledger = Ledger::new();
        for i in 0..7 {
            let expected = if i % 2 == 0 { 200 } else { 404 };
            ledger.assert_status(
                format!("step {i}"),
                Some(StatusExpectation::exact(expected)),
                &Outcome::received(200, ""),
            );
        }
        let summary = ledger.summary();
        assert_eq!(summary.total, 7);
        assert_eq!(summary.passed + summary.failed, summary.total);
        assert_eq!(summary.passed, 4);
        assert!(!summary.all_passed());
    }
}
