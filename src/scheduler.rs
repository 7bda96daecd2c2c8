//! Fixed-size worker pool scheduling (C6): the worker count is capped at
//! `min(requested, hardware concurrency, work size)`, and a bounded
//! `rayon::ThreadPool` runs one task per row range.
//!
//! Each worker owns one contiguous, non-overlapping row range of the output
//! matrix (`RowRangeMut`, see [`crate::matrix`]) for the life of its task —
//! two workers can never alias the same memory, so there is nothing here
//! for a mutex to protect.

use rayon::ThreadPool;

use crate::config::Config;
use crate::container::VlmcContainer;
use crate::error::DvstarError;
use crate::matrix::DistanceMatrix;
use crate::tiler;

/// Build a thread pool sized to `worker_count` (already clamped by
/// [`Config::worker_count`]).
pub fn build_pool(worker_count: usize) -> crate::error::Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(worker_count.max(1))
        .build()
        .map_err(|e| DvstarError::Config(format!("failed to build worker pool: {e}")))
}

/// Compute the full `left x right` distance matrix (pair-major, rectangular
/// mode). Rows are split across `pool`'s workers; each worker fills its
/// entire row range with [`tiler::fill_rectangle`].
pub fn compute_rectangular<C: VlmcContainer>(
    config: &Config,
    pool: &ThreadPool,
    left: &[C],
    right: &[C],
) -> DistanceMatrix {
    let mut matrix = DistanceMatrix::new(left.len(), right.len());
    if left.is_empty() || right.is_empty() {
        return matrix;
    }
    let worker_count = config.worker_count(left.len());
    let right_len = right.len();

    pool.install(|| {
        let chunks = matrix.full_range_mut().split_into(worker_count);
        rayon::scope(|scope| {
            for mut chunk in chunks {
                scope.spawn(move |_| {
                    let row_start = chunk.row_offset();
                    let row_end = row_start + chunk.num_rows();
                    tiler::fill_rectangle(left, right, row_start, row_end, 0, right_len, &mut chunk);
                });
            }
        });
    });

    matrix
}

/// Compute the distance matrix for a single collection against itself
/// (pair-major, triangular mode). Each worker owns a contiguous row range
/// and fills both the triangular slice within its own rows and the
/// rectangular slice to the right of it, so no worker ever touches another
/// worker's rows. Entries with `i >= j` are left at `0.0`: the diagonal and
/// lower triangle are intentionally zero, never a mirror of the upper
/// triangle.
pub fn compute_triangular<C: VlmcContainer>(
    config: &Config,
    pool: &ThreadPool,
    items: &[C],
) -> DistanceMatrix {
    let mut matrix = DistanceMatrix::new(items.len(), items.len());
    if items.len() < 2 {
        return matrix;
    }
    let worker_count = config.worker_count(items.len());
    let total_len = items.len();

    pool.install(|| {
        let chunks = matrix.full_range_mut().split_into(worker_count);
        rayon::scope(|scope| {
            for mut chunk in chunks {
                scope.spawn(move |_| {
                    let row_start = chunk.row_offset();
                    let row_end = row_start + chunk.num_rows();
                    tiler::fill_triangle(items, row_start, row_end, &mut chunk);
                    tiler::fill_rectangle(items, items, row_start, row_end, row_end, total_len, &mut chunk);
                });
            }
        });
    });

    matrix
}
