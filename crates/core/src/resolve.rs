//! Multi-pass resolution of move-source patterns.
//!
//! A pattern may come up empty because the lookup's view of the project has
//! not yet observed an earlier batch's edits. Resolution therefore re-queries
//! every pattern across up to [`MAX_RESOLVE_PASSES`] passes, resyncing the
//! lookup between passes, and stops early once every pattern has at least one
//! match. Patterns still empty after the budget are carried through and
//! surface as "(no classes to move)" during execution.

use crate::error::Result;
use crate::interfaces::ClassLookup;
use crate::operation::MoveSpec;
use crate::pattern::NamePattern;
use crate::report::ProgressReporter;
use crate::types::EntityRef;
use tracing::debug;

pub const MAX_RESOLVE_PASSES: usize = 5;

/// Matches of one `(target, pattern)` pair in one pass.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    pub target: String,
    pub pattern: String,
    pub matches: Vec<EntityRef>,
}

/// Resolves every source pattern of every spec, in declaration order.
///
/// Each pass rebuilds the whole entry list from scratch; nothing is carried
/// over between passes. The termination check only looks for empty-match
/// patterns, so a pattern oscillating between different entity sets from pass
/// to pass is not detected.
pub fn resolve_move_patterns<L: ClassLookup>(
    specs: &[MoveSpec],
    lookup: &mut L,
    reporter: &ProgressReporter,
    max_passes: usize,
) -> Result<Vec<ResolvedEntry>> {
    let mut resolved = Vec::new();

    for pass in 1..=max_passes {
        if pass > 1 {
            reporter.info("");
            reporter.info(&format!("Pass {pass}: retrying resolution..."));
            lookup.resync();
        }

        reporter.section("Resolving patterns...");
        resolved = Vec::new();
        for spec in specs {
            for pattern in &spec.sources {
                let compiled = NamePattern::compile(pattern);
                let matches = lookup.find(&compiled)?;
                reporter.pattern_resolved(pattern, matches.len());
                resolved.push(ResolvedEntry {
                    target: spec.target.clone(),
                    pattern: pattern.clone(),
                    matches,
                });
            }
        }

        let unresolved = resolved.iter().filter(|e| e.matches.is_empty()).count();
        if unresolved == 0 {
            break;
        }
        debug!(pass, unresolved, "resolution pass left unresolved patterns");
    }

    Ok(resolved)
}
