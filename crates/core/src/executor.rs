//! Batch execution with bounded retry and empty-package cleanup.
//!
//! Actions run strictly one at a time, in the order resolution produced them.
//! A transient failure (stale index) is retried up to the attempt budget with
//! a fixed backoff; everything else fails the single action and the batch
//! moves on. Every attempted action ends in exactly one recorded result.

use crate::error::{Result, TransformError};
use crate::interfaces::CodeModelService;
use crate::operation::{ExtractInterfaceSpec, ReplaceDependencySpec};
use crate::report::ProgressReporter;
use crate::resolve::ResolvedEntry;
use crate::types::OperationResult;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

pub const MAX_TRANSFORM_ATTEMPTS: usize = 3;
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Executes resolved batches against the code model service.
///
/// `max_attempts` and `backoff` are injectable so tests run without sleeping.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    max_attempts: usize,
    backoff: Duration,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self {
            max_attempts: MAX_TRANSFORM_ATTEMPTS,
            backoff: RETRY_BACKOFF,
        }
    }
}

impl Orchestrator {
    pub fn new(max_attempts: usize, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Executes a move batch: one move per resolved entity, grouped by target
    /// in first-seen order, then deletes emptied source packages.
    pub fn execute_moves<M: CodeModelService>(
        &self,
        resolved: &[ResolvedEntry],
        model: &mut M,
        reporter: &mut ProgressReporter,
        dry_run: bool,
    ) -> Result<()> {
        let mut touched_packages: BTreeSet<String> = BTreeSet::new();

        for (target, entries) in group_by_target(resolved) {
            reporter.section(&format!("Moving to {target}:"));

            let all_matches: Vec<_> = entries.iter().flat_map(|e| e.matches.iter()).collect();
            if all_matches.is_empty() {
                reporter.info("  (no classes to move)");
                continue;
            }

            for entity in all_matches {
                let source = entity.qualified_name.clone();
                let target_name = format!("{target}.{}", entity.simple_name());

                if dry_run {
                    reporter.dry_run_action(&format!("{source} → {target_name}"));
                    reporter.record(OperationResult::skipped("move", &source, &target_name));
                    continue;
                }

                match self.run_with_retry(&source, reporter, || model.move_class(entity, target)) {
                    Ok(()) => {
                        reporter.action_success("move", &source, &target_name);
                        reporter.record(OperationResult::success("move", &source, &target_name));
                        if !entity.container().is_empty() {
                            touched_packages.insert(entity.container().to_string());
                        }
                    }
                    Err(e) => {
                        reporter.action_failure("move", &source, &e.to_string());
                        reporter.record(OperationResult::failed(
                            "move",
                            &source,
                            &target_name,
                            e.to_string(),
                        ));
                    }
                }
            }
        }

        if !dry_run {
            self.cleanup_empty_packages(touched_packages, model, reporter);
        }

        Ok(())
    }

    pub fn execute_extracts<M: CodeModelService>(
        &self,
        specs: &[ExtractInterfaceSpec],
        model: &mut M,
        reporter: &mut ProgressReporter,
        dry_run: bool,
    ) -> Result<()> {
        for spec in specs {
            reporter.section(&format!(
                "Extracting interface {} from {}:",
                spec.interface_name, spec.source_class
            ));

            if dry_run {
                for method in &spec.methods {
                    reporter.dry_run_action(&format!("would extract method: {method}"));
                }
                reporter.record(OperationResult::skipped(
                    "extract-interface",
                    &spec.source_class,
                    &spec.interface_name,
                ));
                continue;
            }

            let outcome = self.run_with_retry(&spec.source_class, reporter, || {
                model.extract_interface(&spec.source_class, &spec.interface_name, &spec.methods)
            });
            match outcome {
                Ok(()) => {
                    reporter.action_success(
                        "extract-interface",
                        &spec.source_class,
                        &spec.interface_name,
                    );
                    reporter.record(OperationResult::success(
                        "extract-interface",
                        &spec.source_class,
                        &spec.interface_name,
                    ));
                }
                Err(e) => {
                    reporter.action_failure("extract-interface", &spec.source_class, &e.to_string());
                    reporter.record(OperationResult::failed(
                        "extract-interface",
                        &spec.source_class,
                        &spec.interface_name,
                        e.to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn execute_replacements<M: CodeModelService>(
        &self,
        specs: &[ReplaceDependencySpec],
        model: &mut M,
        reporter: &mut ProgressReporter,
        dry_run: bool,
    ) -> Result<()> {
        for spec in specs {
            let description = format!("{} → {} in {}", spec.replace, spec.with, spec.in_class);
            reporter.section(&format!("Replacing dependency: {description}"));

            if dry_run {
                reporter.dry_run_action(&format!(
                    "would replace {} with {} in {}",
                    spec.replace, spec.with, spec.in_class
                ));
                reporter.record(OperationResult::skipped(
                    "replace-dependency",
                    &spec.in_class,
                    &description,
                ));
                continue;
            }

            let outcome = self.run_with_retry(&spec.in_class, reporter, || {
                model.replace_dependency(&spec.in_class, &spec.replace, &spec.with)
            });
            match outcome {
                Ok(count) => {
                    reporter.info(&format!("  Replaced {count} reference(s)"));
                    reporter.action_success("replace-dependency", &spec.in_class, &description);
                    reporter.record(OperationResult::success(
                        "replace-dependency",
                        &spec.in_class,
                        &description,
                    ));
                }
                Err(e) => {
                    reporter.action_failure("replace-dependency", &spec.in_class, &e.to_string());
                    reporter.record(OperationResult::failed(
                        "replace-dependency",
                        &spec.in_class,
                        &description,
                        e.to_string(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Runs one transform, retrying transient failures until the attempt
    /// budget runs out. Permanent failures return immediately.
    fn run_with_retry<T>(
        &self,
        source: &str,
        reporter: &ProgressReporter,
        mut transform: impl FnMut() -> std::result::Result<T, TransformError>,
    ) -> std::result::Result<T, TransformError> {
        let mut attempt = 1;
        loop {
            match transform() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    reporter.info(&format!(
                        "  Index not ready for {source}, retrying (attempt {}/{})...",
                        attempt + 1,
                        self.max_attempts
                    ));
                    std::thread::sleep(self.backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Deletes source packages emptied by a move batch, walking each touched
    /// package upward until a non-empty ancestor stops the walk. A package is
    /// deleted at most once per run.
    fn cleanup_empty_packages<M: CodeModelService>(
        &self,
        touched: BTreeSet<String>,
        model: &mut M,
        reporter: &mut ProgressReporter,
    ) {
        if touched.is_empty() {
            return;
        }

        reporter.section("Cleaning up empty packages...");

        // Deepest first, so children are removed before their parents are
        // checked.
        let mut packages: Vec<String> = touched.into_iter().collect();
        packages.sort_by_key(|p| std::cmp::Reverse(p.matches('.').count()));

        let mut deleted: BTreeSet<String> = BTreeSet::new();

        for package in packages {
            let mut current = package;
            while !current.is_empty() {
                if deleted.contains(&current) {
                    current = parent_package(&current);
                    continue;
                }

                match model.delete_if_empty(&current) {
                    Ok(true) => {
                        reporter.package_deleted(&current);
                        deleted.insert(current.clone());
                        current = parent_package(&current);
                    }
                    Ok(false) => break,
                    Err(e) => {
                        debug!(package = %current, error = %e, "empty-package check failed");
                        break;
                    }
                }
            }
        }

        if deleted.is_empty() {
            reporter.info("  No empty packages to remove");
        }
    }
}

/// Groups resolved entries by target package, preserving first-seen order.
fn group_by_target(resolved: &[ResolvedEntry]) -> Vec<(&str, Vec<&ResolvedEntry>)> {
    let mut groups: Vec<(&str, Vec<&ResolvedEntry>)> = Vec::new();
    for entry in resolved {
        match groups.iter_mut().find(|(t, _)| *t == entry.target) {
            Some((_, list)) => list.push(entry),
            None => groups.push((entry.target.as_str(), vec![entry])),
        }
    }
    groups
}

fn parent_package(package: &str) -> String {
    match package.rfind('.') {
        Some(idx) => package[..idx].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityRef, ResultStatus};

    fn fast_orchestrator() -> Orchestrator {
        Orchestrator::new(MAX_TRANSFORM_ATTEMPTS, Duration::ZERO)
    }

    fn entry(target: &str, pattern: &str, names: &[&str]) -> ResolvedEntry {
        ResolvedEntry {
            target: target.to_string(),
            pattern: pattern.to_string(),
            matches: names
                .iter()
                .map(|n| EntityRef::new(n.to_string(), "key"))
                .collect(),
        }
    }

    /// Code model that fails a move transiently a scripted number of times
    /// before succeeding, and tracks every call.
    #[derive(Default)]
    struct ScriptedModel {
        transient_failures_left: usize,
        permanent_moves: bool,
        move_calls: usize,
        extract_calls: usize,
        replace_calls: usize,
        empty_packages: BTreeSet<String>,
        deleted: Vec<String>,
    }

    impl CodeModelService for ScriptedModel {
        fn move_class(
            &mut self,
            _entity: &EntityRef,
            _target: &str,
        ) -> std::result::Result<(), TransformError> {
            self.move_calls += 1;
            if self.permanent_moves {
                return Err(TransformError::Failed("class not found".into()));
            }
            if self.transient_failures_left > 0 {
                self.transient_failures_left -= 1;
                return Err(TransformError::IndexNotReady("indexing".into()));
            }
            Ok(())
        }

        fn extract_interface(
            &mut self,
            _source_class: &str,
            _interface_name: &str,
            _methods: &[String],
        ) -> std::result::Result<(), TransformError> {
            self.extract_calls += 1;
            Ok(())
        }

        fn replace_dependency(
            &mut self,
            _in_class: &str,
            _old_type: &str,
            _new_type: &str,
        ) -> std::result::Result<usize, TransformError> {
            self.replace_calls += 1;
            Ok(2)
        }

        fn delete_if_empty(&mut self, container: &str) -> std::result::Result<bool, TransformError> {
            if self.empty_packages.contains(container) {
                self.deleted.push(container.to_string());
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }

    #[test]
    fn transient_failures_then_success_yield_one_success_result() {
        let mut model = ScriptedModel {
            transient_failures_left: 2,
            ..Default::default()
        };
        let mut reporter = ProgressReporter::new();
        let resolved = [entry("com.target", "a.B", &["a.B"])];

        fast_orchestrator()
            .execute_moves(&resolved, &mut model, &mut reporter, false)
            .unwrap();

        assert_eq!(model.move_calls, 3);
        assert_eq!(reporter.results().len(), 1);
        assert_eq!(reporter.results()[0].status, ResultStatus::Success);
    }

    #[test]
    fn exhausted_transient_retries_yield_one_failed_result() {
        let mut model = ScriptedModel {
            transient_failures_left: usize::MAX,
            ..Default::default()
        };
        let mut reporter = ProgressReporter::new();
        let resolved = [entry("com.target", "a.B", &["a.B"])];

        fast_orchestrator()
            .execute_moves(&resolved, &mut model, &mut reporter, false)
            .unwrap();

        assert_eq!(model.move_calls, MAX_TRANSFORM_ATTEMPTS);
        assert_eq!(reporter.results().len(), 1);
        assert_eq!(reporter.results()[0].status, ResultStatus::Failed);
        assert!(
            reporter.results()[0]
                .error
                .as_deref()
                .unwrap()
                .contains("index not ready")
        );
    }

    #[test]
    fn permanent_failure_is_not_retried() {
        let mut model = ScriptedModel {
            permanent_moves: true,
            ..Default::default()
        };
        let mut reporter = ProgressReporter::new();
        let resolved = [entry("com.target", "a.*", &["a.B", "a.C"])];

        fast_orchestrator()
            .execute_moves(&resolved, &mut model, &mut reporter, false)
            .unwrap();

        // One call per entity; sibling actions continue after a failure.
        assert_eq!(model.move_calls, 2);
        assert_eq!(reporter.results().len(), 2);
        assert!(reporter.results().iter().all(|r| r.status == ResultStatus::Failed));
    }

    #[test]
    fn dry_run_never_invokes_the_model() {
        let mut model = ScriptedModel::default();
        let mut reporter = ProgressReporter::new();
        let resolved = [entry("com.target", "a.*", &["a.B", "a.C"])];

        fast_orchestrator()
            .execute_moves(&resolved, &mut model, &mut reporter, true)
            .unwrap();

        assert_eq!(model.move_calls, 0);
        assert!(model.deleted.is_empty());
        assert_eq!(reporter.results().len(), 2);
        assert!(reporter.results().iter().all(|r| r.status == ResultStatus::Skipped));
    }

    #[test]
    fn empty_match_group_is_reported_not_failed() {
        let mut model = ScriptedModel::default();
        let mut reporter = ProgressReporter::new();
        let resolved = [entry("com.target", "a.Missing*", &[])];

        fast_orchestrator()
            .execute_moves(&resolved, &mut model, &mut reporter, false)
            .unwrap();

        assert_eq!(model.move_calls, 0);
        assert!(reporter.results().is_empty());
        assert!(!reporter.has_failures());
    }

    #[test]
    fn cleanup_walks_upward_through_empty_packages_once() {
        // Moving everything out of a.b.c and a.b.d leaves a.b empty too,
        // but a still holds other content.
        let mut model = ScriptedModel {
            empty_packages: ["a.b.c", "a.b.d", "a.b"]
                .into_iter()
                .map(String::from)
                .collect(),
            ..Default::default()
        };
        let mut reporter = ProgressReporter::new();
        let resolved = [
            entry("t", "a.b.c.*", &["a.b.c.X"]),
            entry("t", "a.b.d.*", &["a.b.d.Y"]),
        ];

        fast_orchestrator()
            .execute_moves(&resolved, &mut model, &mut reporter, false)
            .unwrap();

        let mut sorted = model.deleted.clone();
        sorted.sort();
        assert_eq!(sorted, ["a.b", "a.b.c", "a.b.d"]);
        // No package is deleted more than once.
        assert_eq!(model.deleted.len(), 3);
    }

    #[test]
    fn target_groups_preserve_first_seen_order() {
        let resolved = [
            entry("t1", "p1", &["a.A"]),
            entry("t2", "p2", &["a.B"]),
            entry("t1", "p3", &["a.C"]),
        ];
        let groups = group_by_target(&resolved);

        let order: Vec<_> = groups.iter().map(|(t, _)| *t).collect();
        assert_eq!(order, ["t1", "t2"]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn replace_success_records_description_target() {
        let mut model = ScriptedModel::default();
        let mut reporter = ProgressReporter::new();
        let specs = [ReplaceDependencySpec {
            in_class: "a.Consumer".into(),
            replace: "a.Impl".into(),
            with: "a.Port".into(),
        }];

        fast_orchestrator()
            .execute_replacements(&specs, &mut model, &mut reporter, false)
            .unwrap();

        assert_eq!(model.replace_calls, 1);
        assert_eq!(reporter.results().len(), 1);
        assert_eq!(reporter.results()[0].target, "a.Impl → a.Port in a.Consumer");
    }

    #[test]
    fn extract_dry_run_records_one_skip_per_spec() {
        let mut model = ScriptedModel::default();
        let mut reporter = ProgressReporter::new();
        let specs = [ExtractInterfaceSpec {
            source_class: "a.Service".into(),
            interface_name: "a.Port".into(),
            methods: vec!["findAll".into(), "findById".into()],
        }];

        fast_orchestrator()
            .execute_extracts(&specs, &mut model, &mut reporter, true)
            .unwrap();

        assert_eq!(model.extract_calls, 0);
        assert_eq!(reporter.results().len(), 1);
        assert_eq!(reporter.results()[0].status, ResultStatus::Skipped);
    }
}
