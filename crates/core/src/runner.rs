//! Run driver: batches the plan and pushes each batch through parse,
//! resolution, and execution.

use crate::batch::group_into_batches;
use crate::config::RawOperation;
use crate::error::Result;
use crate::executor::Orchestrator;
use crate::interfaces::Workspace;
use crate::operation::{ExtractInterfaceSpec, MoveSpec, OperationSpec, ReplaceDependencySpec};
use crate::report::ProgressReporter;
use crate::resolve::{MAX_RESOLVE_PASSES, resolve_move_patterns};
use tracing::{debug, info};

/// Drives a whole refactoring run over one workspace.
///
/// Everything is sequential: a single logical thread executes batches in plan
/// order, one action at a time. The workspace is resynced before each batch
/// and flushed after each non-dry-run batch, since later batches may depend
/// on earlier structural edits.
pub struct RefactorRunner {
    orchestrator: Orchestrator,
    max_resolve_passes: usize,
}

impl Default for RefactorRunner {
    fn default() -> Self {
        Self {
            orchestrator: Orchestrator::default(),
            max_resolve_passes: MAX_RESOLVE_PASSES,
        }
    }
}

impl RefactorRunner {
    pub fn new(orchestrator: Orchestrator, max_resolve_passes: usize) -> Self {
        Self {
            orchestrator,
            max_resolve_passes,
        }
    }

    /// Runs every operation in the plan. Returns once all batches finished;
    /// per-action outcomes are in the reporter. A configuration error aborts
    /// the run before the offending batch mutates anything.
    pub fn run<W: Workspace>(
        &self,
        ops: Vec<RawOperation>,
        workspace: &mut W,
        reporter: &mut ProgressReporter,
        dry_run: bool,
    ) -> Result<()> {
        if ops.is_empty() {
            reporter.info("No operations found in config");
            return Ok(());
        }

        if dry_run {
            reporter.info("DRY RUN MODE - no changes will be made");
        }

        let batches = group_into_batches(ops);
        info!(batch_count = batches.len(), "executing plan");

        for batch in batches {
            debug!(op_type = %batch.op_type, entries = batch.entries.len(), "starting batch");

            // Validate the whole batch before touching the workspace.
            let specs = batch
                .entries
                .iter()
                .map(OperationSpec::parse)
                .collect::<Result<Vec<_>>>()?;

            workspace.resync();

            match batch.op_type.as_str() {
                "move" => {
                    let move_specs: Vec<MoveSpec> = specs
                        .into_iter()
                        .filter_map(|spec| match spec {
                            OperationSpec::Move(m) => Some(m),
                            _ => None,
                        })
                        .collect();
                    let resolved = resolve_move_patterns(
                        &move_specs,
                        workspace,
                        reporter,
                        self.max_resolve_passes,
                    )?;
                    self.orchestrator
                        .execute_moves(&resolved, workspace, reporter, dry_run)?;
                }
                "extract-interface" => {
                    let extract_specs: Vec<ExtractInterfaceSpec> = specs
                        .into_iter()
                        .filter_map(|spec| match spec {
                            OperationSpec::ExtractInterface(e) => Some(e),
                            _ => None,
                        })
                        .collect();
                    self.orchestrator
                        .execute_extracts(&extract_specs, workspace, reporter, dry_run)?;
                }
                "replace-dependency" => {
                    let replace_specs: Vec<ReplaceDependencySpec> = specs
                        .into_iter()
                        .filter_map(|spec| match spec {
                            OperationSpec::ReplaceDependency(r) => Some(r),
                            _ => None,
                        })
                        .collect();
                    self.orchestrator
                        .execute_replacements(&replace_specs, workspace, reporter, dry_run)?;
                }
                // OperationSpec::parse already rejected unknown types.
                _ => unreachable!("batch type validated during spec parse"),
            }

            if !dry_run {
                workspace.flush()?;
            }
        }

        Ok(())
    }
}
