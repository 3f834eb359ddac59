//! Collaborator seams consumed by the engine.
//!
//! The engine never edits code itself; it drives a workspace implementation
//! through these traits. `workspace::FsWorkspace` is the built-in
//! implementation; tests substitute scripted mocks.

pub mod class_lookup;
pub mod code_model;
pub mod persistence;

pub use class_lookup::ClassLookup;
pub use code_model::CodeModelService;
pub use persistence::Persistence;

/// Everything the run driver needs from one workspace object.
pub trait Workspace: ClassLookup + CodeModelService + Persistence {}

impl<T: ClassLookup + CodeModelService + Persistence> Workspace for T {}
