use crate::error::Result;

/// Flushes pending in-memory edits to durable storage.
pub trait Persistence {
    /// Called after each non-dry-run batch; later batches may depend on the
    /// flushed state.
    fn flush(&mut self) -> Result<()>;
}
