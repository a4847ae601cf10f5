//! Types for test run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single HTTP check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Human-readable test name
    pub name: String,

    /// Whether the check passed
    pub success: bool,

    /// Status line, mismatch description or error text
    pub details: String,

    /// When the result was recorded (RFC 3339)
    pub timestamp: DateTime<Utc>,
}

impl TestResult {
    pub fn new(name: impl Into<String>, success: bool, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success,
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate of a complete run, as persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,

    /// Percentage of passed tests (0 when nothing ran)
    pub success_rate: f64,

    /// All results in execution order
    pub test_results: Vec<TestResult>,
}

impl TestSummary {
    /// Build a summary from recorded results
    pub fn from_results(results: &[TestResult]) -> Self {
        let total_tests = results.len();
        let passed_tests = results.iter().filter(|r| r.success).count();
        Self {
            total_tests,
            passed_tests,
            failed_tests: total_tests - passed_tests,
            success_rate: success_rate(passed_tests, total_tests),
            test_results: results.to_vec(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed_tests == 0
    }

    /// Names of the failed tests, in execution order
    pub fn failed_names(&self) -> Vec<&str> {
        self.test_results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.name.as_str())
            .collect()
    }
}

pub fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_success_rate_empty() {
        assert_eq!(success_rate(0, 0), 0.0);
    }

    #[test]
    fn test_success_rate_partial() {
        assert_eq!(success_rate(3, 4), 75.0);
        assert_eq!(success_rate(4, 4), 100.0);
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![
            TestResult::new("Root Endpoint", true, "Status: 200"),
            TestResult::new("Batch Detection", false, "Expected 200, got 500"),
            TestResult::new("Missing Upload File", true, "Status: 404"),
        ];
        let summary = TestSummary::from_results(&results);

        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.passed_tests, 2);
        assert_eq!(summary.failed_tests, 1);
        assert!(!summary.all_passed());
        assert_eq!(summary.failed_names(), vec!["Batch Detection"]);
        assert_eq!(summary.test_results, results);
    }

    #[test]
    fn test_summary_serializes_iso_timestamp() {
        let summary = TestSummary::from_results(&[TestResult::new("Root Endpoint", true, "ok")]);
        let json = serde_json::to_value(&summary).unwrap();

        let ts = json["test_results"][0]["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(json["success_rate"], 100.0);
    }
}
