use anyhow::{Context, Result};
use clap::Parser;
use reforge_core::report::ProgressReporter;
use reforge_core::runner::RefactorRunner;
use reforge_core::workspace::FsWorkspace;
use reforge_core::{Error, parse_config_file};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Batch, pattern-driven refactoring of Java codebases
#[derive(Parser)]
#[command(name = "reforge", version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
struct Cli {
    /// Path to the project to refactor
    project_path: PathBuf,

    /// Path to the YAML plan file
    config_path: PathBuf,

    /// Show what would change without making changes
    #[arg(long = "dry-run")]
    dry_run: bool,
}

fn main() -> ExitCode {
    // Initialize tracing based on RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if !cli.project_path.exists() {
        eprintln!(
            "Error: Project path does not exist: {}",
            cli.project_path.display()
        );
        return ExitCode::from(2);
    }
    if !cli.config_path.exists() {
        eprintln!(
            "Error: Config file does not exist: {}",
            cli.config_path.display()
        );
        return ExitCode::from(2);
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if is_usage_error(&e) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Plan-shape problems (malformed config, unknown operation type) count as
/// usage errors; action failures and infrastructure errors do not.
fn is_usage_error(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<Error>(),
        Some(Error::ConfigError(_)) | Some(Error::UnknownOperation { .. })
    )
}

fn run(cli: &Cli) -> Result<bool> {
    let mut reporter = ProgressReporter::new();

    reporter.info(&format!(
        "Loading project: {}",
        cli.project_path.display()
    ));
    let mut workspace = FsWorkspace::open(&cli.project_path)
        .with_context(|| format!("Failed to open project: {}", cli.project_path.display()))?;
    debug!(source_root = %workspace.source_root().display(), "workspace opened");

    reporter.info(&format!(
        "Parsing config: {}",
        cli.config_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| cli.config_path.display().to_string())
    ));
    let ops = parse_config_file(&cli.config_path)?;

    RefactorRunner::default().run(ops, &mut workspace, &mut reporter, cli.dry_run)?;

    reporter.print_summary();
    Ok(!reporter.has_failures())
}
