//! Top-level orchestration: load VLMC collections, pick pair-major or
//! k-mer-major per [`Config::mode`], and dispatch to rectangular
//! (two distinct collections) or triangular (one collection against
//! itself) computation.
//!
//! This is the engine's one required entry point; everything else in the
//! crate is reachable independently for callers who want to load
//! collections once and run several comparisons against them, or swap in
//! [`crate::container::HashMapContainer`] instead of the default
//! [`crate::container::SortedSkipContainer`].

use std::path::Path;

use crate::collection::{load_collection, Collection};
use crate::config::{Config, Mode};
use crate::container::{SortedSkipContainer, VlmcContainer};
use crate::error::Result;
use crate::kmer_major;
use crate::matrix::DistanceMatrix;
use crate::scheduler::{self, build_pool};

/// Load one or two directories of VLMC files and compute their distance
/// matrix, using [`SortedSkipContainer`] as the storage layout.
pub fn run(config: &Config, left_dir: &Path, right_dir: Option<&Path>) -> Result<DistanceMatrix> {
    config.validate()?;
    let left: Collection<SortedSkipContainer> = load_collection(left_dir, config)?;
    match right_dir {
        None => compute_self_distances(config, &left),
        Some(right_dir) => {
            let right: Collection<SortedSkipContainer> = load_collection(right_dir, config)?;
            compute_distances(config, &left, &right)
        }
    }
}

/// Compute the `left x right` distance matrix for two distinct collections.
pub fn compute_distances<C: VlmcContainer>(
    config: &Config,
    left: &Collection<C>,
    right: &Collection<C>,
) -> Result<DistanceMatrix> {
    config.validate()?;
    let worker_count = config.worker_count(left.len().max(right.len()).max(1));
    let pool = build_pool(worker_count)?;

    match config.mode {
        Mode::PairMajor => Ok(scheduler::compute_rectangular(config, &pool, &left.vlmcs, &right.vlmcs)),
        Mode::KmerMajor => kmer_major::compute_rectangular(&pool, left, right),
    }
}

/// Compute one collection's distance matrix against itself; only the
/// strict upper triangle is computed, the diagonal and lower triangle stay
/// `0.0`.
pub fn compute_self_distances<C: VlmcContainer>(
    config: &Config,
    collection: &Collection<C>,
) -> Result<DistanceMatrix> {
    config.validate()?;
    let worker_count = config.worker_count(collection.len().max(1));
    let pool = build_pool(worker_count)?;

    match config.mode {
        Mode::PairMajor => Ok(scheduler::compute_triangular(config, &pool, &collection.vlmcs)),
        Mode::KmerMajor => kmer_major::compute_triangular(&pool, collection),
    }
}
