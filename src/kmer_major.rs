//! The k-mer-major engine (C7): cross-update every VLMC pair sharing a
//! fingerprint, instead of walking each pair's containers independently.
//!
//! Each worker accumulates into its own thread-local `dot_prod` / `left_norm`
//! / `right_norm` matrices and they are summed after the parallel phase —
//! accumulating directly into one shared matrix from multiple threads with
//! no synchronization would be a data race; `rayon`'s `fold`/`reduce` gives
//! the thread-local accumulate-then-sum shape safely, with no mutex.
//!
//! This mode pays off when the average number of VLMCs sharing each context
//! is high; it also costs `O(rows * cols)` per thread-local accumulator
//! matrix, which for a large collection can be substantial — see
//! [`MAX_KMER_MAJOR_CELLS`].

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::collection::{build_buckets, Collection};
use crate::container::VlmcContainer;
use crate::error::{DvstarError, Result};
use crate::kernel::normalise;
use crate::matrix::DistanceMatrix;

/// An upper bound on `rows * cols`, past which the three thread-local
/// accumulator matrices this engine needs would risk exhausting memory
/// before any useful work is visible. Pair-major mode has no equivalent
/// cost and is unaffected.
pub const MAX_KMER_MAJOR_CELLS: usize = 200_000_000;

type Triple = (Vec<f64>, Vec<f64>, Vec<f64>);

fn zero_triple(cells: usize) -> Triple {
    (vec![0.0; cells], vec![0.0; cells], vec![0.0; cells])
}

fn merge_triple(mut a: Triple, b: Triple) -> Triple {
    for i in 0..a.0.len() {
        a.0[i] += b.0[i];
        a.1[i] += b.1[i];
        a.2[i] += b.2[i];
    }
    a
}

fn check_cell_budget(cells: usize) -> Result<()> {
    if cells > MAX_KMER_MAJOR_CELLS {
        return Err(DvstarError::ResourceExhausted(format!(
            "k-mer-major mode would need {cells} accumulator cells, exceeding the {MAX_KMER_MAJOR_CELLS} cap; use pair-major mode for collections this large"
        )));
    }
    Ok(())
}

/// Compute the full `left x right` distance matrix by crossing VLMC pairs
/// through shared fingerprint buckets.
pub fn compute_rectangular<C: VlmcContainer>(
    pool: &ThreadPool,
    left: &Collection<C>,
    right: &Collection<C>,
) -> Result<DistanceMatrix> {
    let rows = left.len();
    let cols = right.len();
    if rows == 0 || cols == 0 {
        return Ok(DistanceMatrix::new(rows, cols));
    }
    check_cell_budget(rows * cols)?;

    let left_buckets = build_buckets(left);
    let right_buckets = build_buckets(right);

    let (dp, ln, rn) = pool.install(|| {
        left_buckets
            .par_iter()
            .fold(
                || zero_triple(rows * cols),
                |mut acc, (fingerprint, left_entries)| {
                    if let Some(right_entries) = right_buckets.get(fingerprint) {
                        for le in left_entries {
                            for re in right_entries {
                                let idx = le.vlmc_index * cols + re.vlmc_index;
                                for k in 0..4 {
                                    acc.0[idx] += le.probs[k] * re.probs[k];
                                    acc.1[idx] += le.probs[k] * le.probs[k];
                                    acc.2[idx] += re.probs[k] * re.probs[k];
                                }
                            }
                        }
                    }
                    acc
                },
            )
            .reduce(|| zero_triple(rows * cols), merge_triple)
    });

    let mut matrix = DistanceMatrix::new(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            let idx = r * cols + c;
            matrix.set(r, c, normalise(dp[idx], ln[idx], rn[idx]));
        }
    }
    Ok(matrix)
}

/// Compute the distance matrix for a single collection against itself.
/// Only `(i, j)` with `i < j` are ever accumulated, normalized, or written;
/// entries with `i >= j` are intentionally left at `0.0`, not a mirror of
/// the upper triangle.
pub fn compute_triangular<C: VlmcContainer>(
    pool: &ThreadPool,
    items: &Collection<C>,
) -> Result<DistanceMatrix> {
    let n = items.len();
    if n < 2 {
        return Ok(DistanceMatrix::new(n, n));
    }
    check_cell_budget(n * n)?;

    let buckets = build_buckets(items);

    let (dp, ln, rn) = pool.install(|| {
        buckets
            .par_iter()
            .fold(
                || zero_triple(n * n),
                |mut acc, (_fingerprint, entries)| {
                    for a in 0..entries.len() {
                        for b in (a + 1)..entries.len() {
                            let (left_entry, right_entry) =
                                if entries[a].vlmc_index < entries[b].vlmc_index {
                                    (&entries[a], &entries[b])
                                } else {
                                    (&entries[b], &entries[a])
                                };
                            if left_entry.vlmc_index == right_entry.vlmc_index {
                                continue;
                            }
                            let idx = left_entry.vlmc_index * n + right_entry.vlmc_index;
                            for k in 0..4 {
                                acc.0[idx] += left_entry.probs[k] * right_entry.probs[k];
                                acc.1[idx] += left_entry.probs[k] * left_entry.probs[k];
                                acc.2[idx] += right_entry.probs[k] * right_entry.probs[k];
                            }
                        }
                    }
                    acc
                },
            )
            .reduce(|| zero_triple(n * n), merge_triple)
    });

    let mut matrix = DistanceMatrix::new(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let idx = i * n + j;
            let d = normalise(dp[idx], ln[idx], rn[idx]);
            matrix.set(i, j, d);
        }
    }
    Ok(matrix)
}
