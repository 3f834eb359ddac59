//! Shared result model for refactoring runs.

use serde::{Deserialize, Serialize};

/// Opaque handle to a class known to the code model service.
///
/// The engine only ever reads the qualified name; `key` is whatever the
/// service needs to find the class again (for the filesystem workspace, the
/// source file path).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub qualified_name: String,
    pub key: String,
}

impl EntityRef {
    pub fn new(qualified_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            key: key.into(),
        }
    }

    /// The simple (unqualified) class name.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// The containing package, or `""` for a top-level class.
    pub fn container(&self) -> &str {
        match self.qualified_name.rfind('.') {
            Some(idx) => &self.qualified_name[..idx],
            None => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Success,
    Failed,
    Skipped,
}

/// Terminal outcome of one attempted action. Retries collapse into a single
/// result; the run produces exactly one of these per action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub action: String,
    pub source: String,
    pub target: String,
    pub status: ResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResult {
    pub fn success(action: &str, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            source: source.into(),
            target: target.into(),
            status: ResultStatus::Success,
            error: None,
        }
    }

    pub fn failed(
        action: &str,
        source: impl Into<String>,
        target: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            action: action.to_string(),
            source: source.into(),
            target: target.into(),
            status: ResultStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn skipped(action: &str, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            source: source.into(),
            target: target.into(),
            status: ResultStatus::Skipped,
            error: None,
        }
    }
}

/// Counts over a whole run, derived from the recorded results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// `(attributed action/source, error message)` for every failed action,
    /// in the order the failures occurred.
    pub failures: Vec<(String, String)>,
}
