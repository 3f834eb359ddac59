use crate::error::TransformError;
use crate::types::EntityRef;

/// The structural edit primitives the engine orchestrates.
///
/// Each call performs a single transform and reports success or a classified
/// failure; transient failures (`TransformError::IndexNotReady`) are the only
/// ones worth retrying.
pub trait CodeModelService {
    /// Move a class into the target container (package).
    fn move_class(
        &mut self,
        entity: &EntityRef,
        target_container: &str,
    ) -> Result<(), TransformError>;

    /// Create an interface from the named methods of a class and make the
    /// class implement it.
    fn extract_interface(
        &mut self,
        source_class: &str,
        interface_name: &str,
        methods: &[String],
    ) -> Result<(), TransformError>;

    /// Retype references to `old_type` inside `in_class` to `new_type`.
    /// Returns the number of replaced references.
    fn replace_dependency(
        &mut self,
        in_class: &str,
        old_type: &str,
        new_type: &str,
    ) -> Result<usize, TransformError>;

    /// Delete the container if it holds no classes and no sub-containers.
    /// Returns whether anything was deleted.
    fn delete_if_empty(&mut self, container: &str) -> Result<bool, TransformError>;
}
