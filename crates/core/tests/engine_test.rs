//! End-to-end runs of the engine against a real filesystem workspace.

use reforge_core::report::ProgressReporter;
use reforge_core::runner::RefactorRunner;
use reforge_core::workspace::FsWorkspace;
use reforge_core::{Orchestrator, parse_config_str};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn write_java(root: &Path, package: &str, name: &str, body: &str) -> PathBuf {
    let mut dir = root.to_path_buf();
    for segment in package.split('.') {
        dir.push(segment);
    }
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join(format!("{name}.java"));
    std::fs::write(
        &path,
        format!("package {package};\n\npublic class {name} {{\n{body}}}\n"),
    )
    .unwrap();
    path
}

fn runner() -> RefactorRunner {
    RefactorRunner::new(Orchestrator::new(3, Duration::ZERO), 5)
}

fn run_plan(root: &Path, plan: &str, dry_run: bool) -> ProgressReporter {
    let ops = parse_config_str(plan).unwrap();
    let mut workspace = FsWorkspace::open(root).unwrap();
    let mut reporter = ProgressReporter::new();
    runner()
        .run(ops, &mut workspace, &mut reporter, dry_run)
        .unwrap();
    reporter
}

#[test]
fn full_plan_moves_extracts_and_replaces() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_java(root, "com.example.model", "Task", "");
    write_java(root, "com.example.model", "TaskState", "");
    write_java(
        root,
        "com.example.service",
        "TaskService",
        "    public int count() {\n        return 0;\n    }\n",
    );
    write_java(
        root,
        "com.example.web",
        "TaskController",
        "    private TaskService service;\n",
    );

    let reporter = run_plan(
        root,
        r#"
operations:
  - type: move
    target: com.example.task.model
    sources:
      - com.example.model.Task*
  - type: extract-interface
    class: com.example.service.TaskService
    interface: com.example.port.TaskPort
    methods: [count]
  - type: replace-dependency
    in: com.example.web.TaskController
    replace: com.example.service.TaskService
    with: com.example.port.TaskPort
"#,
        false,
    );

    let summary = reporter.summary();
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 0);
    assert!(!reporter.has_failures());

    // Moves landed under the new package and the old one was cleaned up.
    assert!(root.join("com/example/task/model/Task.java").exists());
    assert!(root.join("com/example/task/model/TaskState.java").exists());
    assert!(!root.join("com/example/model").exists());

    // Extracted interface exists and the class implements it.
    let service = std::fs::read_to_string(root.join("com/example/service/TaskService.java")).unwrap();
    assert!(service.contains("implements TaskPort"));
    assert!(root.join("com/example/port/TaskPort.java").exists());

    // The controller now depends on the interface.
    let controller =
        std::fs::read_to_string(root.join("com/example/web/TaskController.java")).unwrap();
    assert!(controller.contains("private TaskPort service;"));
}

#[test]
fn dry_run_leaves_the_tree_untouched() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let original = write_java(root, "com.example.model", "Task", "");
    let before = std::fs::read_to_string(&original).unwrap();

    let reporter = run_plan(
        root,
        r#"
operations:
  - type: move
    target: com.example.task.model
    sources: [com.example.model.Task]
  - type: extract-interface
    class: com.example.model.Task
    interface: com.example.port.TaskLike
    methods: [toString]
  - type: replace-dependency
    in: com.example.model.Task
    replace: com.example.Old
    with: com.example.New
"#,
        true,
    );

    let summary = reporter.summary();
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);

    assert_eq!(std::fs::read_to_string(&original).unwrap(), before);
    assert!(!root.join("com/example/task").exists());
    assert!(!root.join("com/example/port").exists());
}

#[test]
fn unresolved_pattern_is_skipped_without_failure() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_java(root, "com.example", "Keep", "");

    let reporter = run_plan(
        root,
        r#"
operations:
  - type: move
    target: com.example.elsewhere
    sources: [com.example.nothing.*]
"#,
        false,
    );

    let summary = reporter.summary();
    assert_eq!(summary.succeeded + summary.failed + summary.skipped, 0);
    assert!(!reporter.has_failures());
}

#[test]
fn failed_action_is_isolated_and_flags_the_run() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_java(root, "com.example.model", "Task", "");

    let reporter = run_plan(
        root,
        r#"
operations:
  - type: move
    target: com.example.task
    sources: [com.example.model.Task]
  - type: extract-interface
    class: com.example.Missing
    interface: com.example.port.Port
    methods: [m]
"#,
        false,
    );

    let summary = reporter.summary();
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert!(reporter.has_failures());
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].0.contains("com.example.Missing"));

    // The earlier move still landed.
    assert!(root.join("com/example/task/Task.java").exists());
}

#[test]
fn unknown_operation_type_aborts_before_mutation() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let original = write_java(root, "com.example", "Task", "");

    let ops = parse_config_str(
        r#"
operations:
  - type: rename
    target: com.example.Other
"#,
    )
    .unwrap();
    let mut workspace = FsWorkspace::open(root).unwrap();
    let mut reporter = ProgressReporter::new();

    let err = runner()
        .run(ops, &mut workspace, &mut reporter, false)
        .unwrap_err();

    assert!(err.to_string().contains("Unknown operation type: 'rename'"));
    assert!(original.exists());
    assert!(reporter.results().is_empty());
}

#[test]
fn later_batches_see_earlier_batch_edits() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_java(root, "com.example.model", "Task", "");

    // The second batch addresses the class at its post-move location.
    let reporter = run_plan(
        root,
        r#"
operations:
  - type: move
    target: com.example.task.model
    sources: [com.example.model.Task]
  - type: extract-interface
    class: com.example.task.model.Task
    interface: com.example.task.port.TaskLike
    methods: [toString]
"#,
        false,
    );

    assert!(!reporter.has_failures());
    assert!(root.join("com/example/task/port/TaskLike.java").exists());
    let moved = std::fs::read_to_string(root.join("com/example/task/model/Task.java")).unwrap();
    assert!(moved.contains("implements TaskLike"));
}
