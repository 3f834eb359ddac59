use crate::error::Result;
use crate::pattern::NamePattern;
use crate::types::EntityRef;

/// Queryable view of the classes in a workspace.
///
/// Implementations resolve exact patterns with a direct lookup and wildcard
/// patterns with an exhaustive scan filtered through the matcher. The view may
/// lag behind structural edits; `resync` brings it up to date.
pub trait ClassLookup {
    /// All classes whose qualified name matches the pattern, in a stable
    /// order.
    fn find(&self, pattern: &NamePattern) -> Result<Vec<EntityRef>>;

    /// Blocks until subsequent `find` calls reflect the latest project state.
    fn resync(&mut self);
}
