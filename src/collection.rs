//! Directory-backed VLMC collections and k-mer bucketization (C7 support).
//!
//! A recursive directory scan collects file paths, an optional `set_size`
//! truncates them, and loading is parallelized across a pool capped at
//! [`LOADER_CORE_CAP`] regardless of how many workers the matrix computation
//! itself is allowed — I/O concurrency and CPU concurrency are sized
//! independently.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::Config;
use crate::container::VlmcContainer;
use crate::error::{DvstarError, Result};
use crate::loader::load_vlmc_file;
use crate::scheduler::build_pool;

/// Loader-stage parallelism never exceeds this, independent of
/// `Config::parallelism`: disk I/O rarely benefits from more concurrent
/// readers than this regardless of core count.
pub const LOADER_CORE_CAP: usize = 4;

/// A loaded set of VLMCs, in a deterministic order (sorted by source path
/// rather than directory-iteration order, which the filesystem does not
/// guarantee is stable).
pub struct Collection<C: VlmcContainer> {
    pub vlmcs: Vec<C>,
    pub paths: Vec<PathBuf>,
}

impl<C: VlmcContainer> Collection<C> {
    pub fn len(&self) -> usize {
        self.vlmcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vlmcs.is_empty()
    }
}

/// Recursively scan `directory`, load every file found as a VLMC, and
/// return them in a [`Collection`].
pub fn load_collection<C: VlmcContainer>(directory: &Path, config: &Config) -> Result<Collection<C>> {
    config.validate()?;

    let mut paths = collect_paths(directory)?;
    paths.sort();
    if let Some(set_size) = config.set_size {
        paths.truncate(set_size);
    }

    let loader_workers = config.worker_count(paths.len().max(1)).min(LOADER_CORE_CAP);
    let pool = build_pool(loader_workers)?;

    let results: Vec<Result<C>> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| load_vlmc_file(path, config.background_order, config.pseudo_count))
            .collect()
    });

    let mut vlmcs = Vec::with_capacity(results.len());
    for result in results {
        vlmcs.push(result?);
    }

    tracing::debug!(count = vlmcs.len(), directory = %directory.display(), "loaded collection");
    Ok(Collection { vlmcs, paths })
}

fn collect_paths(directory: &Path) -> Result<Vec<PathBuf>> {
    fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                walk(&path, out)?;
            } else {
                out.push(path);
            }
        }
        Ok(())
    }

    let mut out = Vec::new();
    walk(directory, &mut out).map_err(|source| DvstarError::Load {
        path: directory.to_path_buf(),
        source,
    })?;
    Ok(out)
}

/// One VLMC's contribution to a fingerprint bucket: which collection member
/// it came from, and that context's background-adjusted probabilities.
#[derive(Debug, Clone, Copy)]
pub struct BucketEntry {
    pub vlmc_index: usize,
    pub probs: [f64; 4],
}

/// Group every context record across a collection by fingerprint, so the
/// k-mer-major engine (C7) can later cross every `(left, right)` pair that
/// shares a fingerprint without re-walking either collection's containers.
pub fn build_buckets<C: VlmcContainer>(collection: &Collection<C>) -> HashMap<u64, Vec<BucketEntry>> {
    let mut buckets: HashMap<u64, Vec<BucketEntry>> = HashMap::new();
    for (vlmc_index, vlmc) in collection.vlmcs.iter().enumerate() {
        vlmc.for_each(|record| {
            buckets.entry(record.fingerprint).or_default().push(BucketEntry {
                vlmc_index,
                probs: record.probs,
            });
        });
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::SortedSkipContainer;
    use crate::record::ContextRecord;

    fn rec(fingerprint: u64) -> ContextRecord {
        ContextRecord {
            fingerprint,
            length: 2,
            probs: [0.25; 4],
            is_null: false,
        }
    }

    #[test]
    fn build_buckets_groups_shared_fingerprints_across_vlmcs() {
        let a = SortedSkipContainer::from_records(vec![rec(1), rec(2)]);
        let b = SortedSkipContainer::from_records(vec![rec(2), rec(3)]);
        let collection = Collection {
            vlmcs: vec![a, b],
            paths: vec![PathBuf::from("a"), PathBuf::from("b")],
        };

        let buckets = build_buckets(&collection);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[&2].len(), 2);
        assert_eq!(buckets[&1].len(), 1);
        assert_eq!(buckets[&2][0].vlmc_index, 0);
        assert_eq!(buckets[&2][1].vlmc_index, 1);
    }

    #[test]
    fn collect_paths_recurses_into_subdirectories() {
        let dir = std::env::temp_dir().join(format!("dvstar-collection-test-{}", std::process::id()));
        let sub = dir.join("nested");
        fs::create_dir_all(&sub).unwrap();
        fs::write(dir.join("one.bin"), b"").unwrap();
        fs::write(sub.join("two.bin"), b"").unwrap();

        let paths = collect_paths(&dir).unwrap();
        assert_eq!(paths.len(), 2);

        fs::remove_dir_all(&dir).ok();
    }
}
