//! reforge - batch, pattern-driven refactoring of Java codebases
//!
//! This crate provides the engine behind the `reforge` CLI:
//! - Parse a YAML plan of move / extract-interface / replace-dependency
//!   operations
//! - Resolve glob patterns over qualified class names against a workspace
//! - Execute each batch with bounded retry and partial-failure isolation
pub mod batch;
pub mod config;
pub mod error;
pub mod executor;
pub mod interfaces;
pub mod operation;
pub mod pattern;
pub mod report;
pub mod resolve;
pub mod runner;
pub mod types;
pub mod workspace;

// Re-export commonly used types and traits
pub use error::{Error, Result, TransformError};
pub use types::*;

// Re-export main API components
pub use batch::{Batch, group_into_batches};
pub use config::{RawOperation, parse_config_file, parse_config_str};
pub use executor::Orchestrator;
pub use interfaces::{ClassLookup, CodeModelService, Persistence, Workspace};
pub use operation::OperationSpec;
pub use pattern::NamePattern;
pub use report::ProgressReporter;
pub use runner::RefactorRunner;
pub use workspace::FsWorkspace;
