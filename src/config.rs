//! Runtime configuration for a distance computation: background order,
//! pseudo-count smoothing, worker-pool size, engine mode, and the
//! diagnostic `set_size` truncation.

use serde::{Deserialize, Serialize};

use crate::error::{DvstarError, Result};

/// Which engine computes the distance matrix.
///
/// Pair-major pays off when VLMCs share few contexts; k-mer-major pays off
/// when the average sharing factor across the collection is high. Both
/// engines are required to agree to within floating-point tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    PairMajor,
    KmerMajor,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::PairMajor
    }
}

/// Configuration accepted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Length of the background suffix used to normalize next-symbol
    /// probabilities. 0 disables background adjustment.
    pub background_order: usize,
    /// Pseudo-count α added to raw next-symbol counts before normalizing.
    pub pseudo_count: f64,
    /// Worker pool size. Actual pool size is capped at
    /// `min(parallelism, available_parallelism, work_size)`.
    pub parallelism: usize,
    /// Which engine computes the matrix.
    pub mode: Mode,
    /// If `Some(n)`, truncate each loaded collection to its first `n` files.
    /// Diagnostic/benchmark use only.
    pub set_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            background_order: 0,
            pseudo_count: 1.0,
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            mode: Mode::default(),
            set_size: None,
        }
    }
}

impl Config {
    /// Validate option combinations that are fatal before any work begins.
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(DvstarError::Config(
                "parallelism must be >= 1".to_string(),
            ));
        }
        if self.pseudo_count < 0.0 {
            return Err(DvstarError::Config(
                "pseudo_count must be >= 0".to_string(),
            ));
        }
        if let Some(n) = self.set_size {
            if n == 0 {
                return Err(DvstarError::Config(
                    "set_size must be >= 1 when present".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The number of worker threads to actually use, given the size of the
    /// work to be scheduled: `min(requested, hardware concurrency, work
    /// size)`. Loader parallelism is capped further still (see
    /// [`crate::collection::LOADER_CORE_CAP`]).
    pub fn worker_count(&self, work_size: usize) -> usize {
        let hardware = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.parallelism.min(hardware).min(work_size.max(1))
    }
}
