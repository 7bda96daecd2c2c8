//! Error types for the dvstar engine.
//!
//! Numeric degeneracy (zero-norm VLMCs, NaN from `arccos` drift) is *not*
//! represented here — it is part of the kernel's return contract, not a
//! failure mode. See [`crate::kernel`].

use std::path::PathBuf;

/// Errors the engine can report. Load and configuration errors are fatal to
/// the operation that triggered them; the kernel and tiler never fail.
#[derive(Debug, thiserror::Error)]
pub enum DvstarError {
    /// A VLMC file could not be read or its record stream was malformed.
    #[error("failed to load VLMC from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The binary record stream ended mid-record.
    #[error("truncated VLMC record stream in {path}")]
    Truncated { path: PathBuf },

    /// A configuration value was invalid (negative parallelism, unknown
    /// mode string, nonexistent directory) — fatal before any work begins.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An accumulator allocation would exceed available memory, most often
    /// in k-mer-major mode with many workers and a large collection.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
}

pub type Result<T> = std::result::Result<T, DvstarError>;
