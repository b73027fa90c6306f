use std::time::Instant;

use itertools::Itertools;
use tracing::{debug, info, trace};

use crate::merge::{self, Candidate};
use crate::metrics::{self, MinimizePhases, MinimizeStats};
use crate::types::Statement;

/// Merge statements until no pair can be combined.
///
/// The input is never modified. The result grants and denies exactly what
/// the input does.
///
/// Scan order is part of the contract: pairs `(i, j)` with `i < j` are
/// visited with `i` ascending, then `j` ascending. The first mergeable pair
/// is replaced by its merge at position `i`, position `j` is dropped, and the
/// scan starts over. The same input order always yields the same output.
pub fn minimize(statements: &[Statement]) -> Vec<Statement> {
    minimize_with_stats(statements).0
}

/// Like [`minimize`], also returning the run's statistics.
pub fn minimize_with_stats(statements: &[Statement]) -> (Vec<Statement>, MinimizeStats) {
    let started = Instant::now();
    let mut phases = MinimizePhases::default();

    debug!(
        event = "Minimize",
        phase = "Start",
        statements = statements.len()
    );

    // 1. Drop literal duplicates up front
    let t = Instant::now();
    let working = winnow(statements.to_vec());
    phases.pre_winnow_ms = t.elapsed().as_secs_f64() * 1000.0;
    debug!(
        event = "Minimize",
        phase = "Winnow",
        dropped = statements.len() - working.len()
    );

    // 2. Merge pairs until nothing changes
    let t = Instant::now();
    let (working, merges, passes) = fixpoint(working);
    phases.fixpoint_ms = t.elapsed().as_secs_f64() * 1000.0;

    // 3. Dedupe every collection and drop anything subsumed by an earlier statement
    let t = Instant::now();
    let result = winnow(working.iter().map(Statement::deduped).collect());
    phases.post_winnow_ms = t.elapsed().as_secs_f64() * 1000.0;

    let duration = started.elapsed();
    phases.total_ms = duration.as_secs_f64() * 1000.0;

    let stats = MinimizeStats {
        duration,
        statements_in: statements.len(),
        statements_out: result.len(),
        merges,
        passes,
    };

    info!(
        event = "Minimize",
        phase = "Converged",
        statements_in = stats.statements_in,
        statements_out = stats.statements_out,
        merges = stats.merges,
        passes = stats.passes
    );

    metrics::record_minimize(&stats, &phases);

    (result, stats)
}

/// Keep each statement unless an earlier kept statement equals it on every field.
fn winnow(statements: Vec<Statement>) -> Vec<Statement> {
    let mut kept: Vec<Statement> = Vec::with_capacity(statements.len());
    for statement in statements {
        let subsumed = kept
            .iter()
            .any(|k| merge::candidate(k, &statement) == Some(Candidate::Duplicate));
        if subsumed {
            trace!(event = "Minimize", phase = "Winnow", statement = %statement);
        } else {
            kept.push(statement);
        }
    }
    kept
}

fn first_mergeable(statements: &[Statement]) -> Option<(usize, usize, Candidate)> {
    (0..statements.len())
        .tuple_combinations()
        .find_map(|(i, j)| merge::candidate(&statements[i], &statements[j]).map(|c| (i, j, c)))
}

/// Returns the converged statements, the number of merges and the number of scans.
fn fixpoint(mut working: Vec<Statement>) -> (Vec<Statement>, usize, usize) {
    let mut merges = 0;
    let mut passes = 0;

    loop {
        passes += 1;
        let Some((i, j, candidate)) = first_mergeable(&working) else {
            break;
        };

        debug!(
            event = "Minimize",
            phase = "Merge",
            left = i,
            right = j,
            candidate = ?candidate
        );

        let mut merged = Some(merge::merge(&working[i], &working[j], candidate));
        working = working
            .into_iter()
            .enumerate()
            .filter_map(|(k, statement)| match k {
                k if k == i => merged.take(),
                k if k == j => None,
                _ => Some(statement),
            })
            .collect();
        merges += 1;
    }

    (working, merges, passes)
}

#[cfg(test)]
mod tests;
