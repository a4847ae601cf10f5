//! Console and on-disk rendering of a finished run.

use std::fs;
use std::path::Path;

use crate::harness::types::HarnessResult;
use crate::runner::TestSummary;

/// Write the summary as pretty-printed JSON, creating parent directories
pub fn write_summary(summary: &TestSummary, path: &Path) -> HarnessResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(summary)?)?;
    Ok(())
}

/// Render the human-readable summary block
pub fn format_summary(summary: &TestSummary) -> String {
    let mut out = format!(
        "Tests passed: {}/{} ({:.1}%)",
        summary.passed_tests, summary.total_tests, summary.success_rate
    );

    if !summary.all_passed() {
        out.push_str("\nFailed tests:");
        for result in summary.test_results.iter().filter(|r| !r.success) {
            out.push_str(&format!("\n  - {}: {}", result.name, result.details));
        }
    }
    out
}

pub fn print_summary(summary: &TestSummary) {
    println!();
    println!("{}", format_summary(summary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TestResult;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_summary_all_passed() {
        let summary = TestSummary::from_results(&[
            TestResult::new("Root Endpoint", true, "Status: 200"),
            TestResult::new("Missing Output File", true, "Status: 404"),
        ]);
        assert_eq!(format_summary(&summary), "Tests passed: 2/2 (100.0%)");
    }

    #[test]
    fn test_format_summary_lists_failures() {
        let summary = TestSummary::from_results(&[
            TestResult::new("Root Endpoint", true, "Status: 200"),
            TestResult::new("Batch Detection", false, "Missing keys: total"),
        ]);
        assert_eq!(
            format_summary(&summary),
            "Tests passed: 1/2 (50.0%)\nFailed tests:\n  - Batch Detection: Missing keys: total"
        );
    }

    #[test]
    fn test_write_summary_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");
        let summary = TestSummary::from_results(&[TestResult::new("Root Endpoint", true, "ok")]);

        write_summary(&summary, &path).unwrap();

        let written: TestSummary = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, summary);
    }
}
