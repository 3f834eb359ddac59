//! Grouping of plan entries into maximal same-type runs.
//!
//! Batching preserves the user-declared order while letting type-specific
//! optimizations (multi-pass resolution for moves) apply to all consecutive
//! entries of one kind. Later operations may depend on earlier ones, so the
//! entries are never sorted.

use crate::config::RawOperation;

/// A maximal run of consecutive same-type operations.
#[derive(Debug, Clone)]
pub struct Batch {
    pub op_type: String,
    pub entries: Vec<RawOperation>,
}

pub fn group_into_batches(ops: Vec<RawOperation>) -> Vec<Batch> {
    let mut batches: Vec<Batch> = Vec::new();

    for op in ops {
        match batches.last_mut() {
            Some(batch) if batch.op_type == op.op_type => batch.entries.push(op),
            _ => batches.push(Batch {
                op_type: op.op_type.clone(),
                entries: vec![op],
            }),
        }
    }

    batches
}
