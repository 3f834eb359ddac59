//! Progress reporting and result aggregation.
//!
//! Progress lines go to stderr as events occur; the recorded results feed the
//! end-of-run summary and the process exit status. Tests assert on the counts,
//! not on the log text.

use crate::types::{OperationResult, ResultStatus, RunSummary};

#[derive(Debug, Default)]
pub struct ProgressReporter {
    results: Vec<OperationResult>,
    deleted_package_count: usize,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn output(&self, message: &str) {
        eprintln!("{message}");
    }

    pub fn info(&self, message: &str) {
        self.output(message);
    }

    pub fn section(&self, title: &str) {
        self.output("");
        self.output(title);
    }

    pub fn pattern_resolved(&self, pattern: &str, count: usize) {
        let noun = if count == 1 { "class" } else { "classes" };
        self.output(&format!("  {pattern} → {count} {noun}"));
    }

    pub fn action_success(&self, action: &str, source: &str, target: &str) {
        self.output(&format!("  ✓ [{action}] {source} → {target}"));
    }

    pub fn action_failure(&self, action: &str, source: &str, error: &str) {
        self.output(&format!("  ✗ [{action}] {source} (error: {error})"));
    }

    pub fn action_skipped(&self, action: &str, source: &str, reason: &str) {
        self.output(&format!("  - [{action}] {source} (skipped: {reason})"));
    }

    pub fn dry_run_action(&self, description: &str) {
        self.output(&format!("  [dry-run] {description}"));
    }

    pub fn package_deleted(&mut self, package: &str) {
        self.deleted_package_count += 1;
        self.output(&format!("  ✓ Removed {package}"));
    }

    /// Append one terminal result. Exactly one call per attempted action.
    pub fn record(&mut self, result: OperationResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    pub fn has_failures(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.status == ResultStatus::Failed)
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for result in &self.results {
            match result.status {
                ResultStatus::Success => summary.succeeded += 1,
                ResultStatus::Failed => {
                    summary.failed += 1;
                    summary.failures.push((
                        format!("[{}] {}", result.action, result.source),
                        result.error.clone().unwrap_or_else(|| "Unknown error".to_string()),
                    ));
                }
                ResultStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn print_summary(&self) {
        let summary = self.summary();

        self.section("Summary:");
        self.output(&format!("  Succeeded: {}", summary.succeeded));
        self.output(&format!("  Failed: {}", summary.failed));
        self.output(&format!("  Skipped: {}", summary.skipped));
        if self.deleted_package_count > 0 {
            self.output(&format!("  Removed packages: {}", self.deleted_package_count));
        }

        if !summary.failures.is_empty() {
            self.section("Failures:");
            for (source, error) in &summary.failures {
                self.output(&format!("  - {source}: {error}"));
            }
        }
    }
}
