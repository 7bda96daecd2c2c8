//! # dvstar — parallel all-pairs VLMC distance engine
//!
//! Computes the dvstar angular cosine distance between Variable-Length
//! Markov Chains (VLMCs): either every pair across two collections, or
//! every pair within one collection against itself.
//!
//! ## Pipeline
//!
//! 1. [`loader`] streams each VLMC's binary record file into
//!    [`record::ContextRecord`]s, applying background-order probability
//!    adjustment once up front.
//! 2. [`container`] holds a VLMC's records in a layout that supports fast
//!    ordered intersection — [`container::SortedSkipContainer`] by default.
//! 3. [`kernel`] computes one pair's dvstar distance from two containers.
//! 4. [`tiler`] recursively subdivides a distance matrix region for cache
//!    locality; [`scheduler`] hands contiguous row ranges of that matrix to
//!    a bounded `rayon` worker pool.
//! 5. [`kmer_major`] is an alternate engine for collections with heavy
//!    context sharing: it crosses every pair through shared fingerprint
//!    buckets instead of walking each pair's containers independently.
//! 6. [`driver`] ties the above together behind [`driver::run`].
//!
//! ## Allocator
//!
//! mimalloc replaces the system allocator globally — the workload is
//! allocation-heavy (one `ContextRecord` per context per VLMC, one row-chunk
//! per worker per matrix) and benefits from mimalloc's per-thread,
//! size-segregated free lists under concurrent load.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod collection;
pub mod config;
pub mod container;
pub mod driver;
pub mod error;
pub mod kernel;
pub mod kmer_major;
pub mod loader;
pub mod matrix;
pub mod record;
pub mod scheduler;
pub mod tiler;

pub use collection::{load_collection, Collection};
pub use config::{Config, Mode};
pub use container::{HashMapContainer, SortedSkipContainer, VlmcContainer};
pub use driver::{compute_distances, compute_self_distances, run};
pub use error::{DvstarError, Result};
pub use kernel::distance;
pub use matrix::DistanceMatrix;
pub use record::ContextRecord;
