//! VLMC loading (C2): turn one binary record stream into a searchable
//! container, with background-order probability adjustment applied once,
//! up front, rather than on every comparison.
//!
//! The stream is read in a single forward pass. Records shorter than the
//! background order carry no information this engine uses and are dropped.
//! Records exactly at the background order populate a cache keyed by their
//! own fingerprint (shifted down by [`crate::record::offset_to_remove`] so
//! the cache is a dense array rather than a sparse map). Records longer than
//! the background order are retained for the container; once the stream is
//! exhausted, each retained record's probabilities are divided by the square
//! root of its background suffix's cached probability.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::container::VlmcContainer;
use crate::error::{DvstarError, Result};
use crate::record::{background_cache_index, offset_to_remove, ContextRecord, RawRecord};

/// Load a VLMC from `path` into a container of type `C`.
pub fn load_vlmc_file<C: VlmcContainer>(
    path: &Path,
    background_order: usize,
    pseudo_count: f64,
) -> Result<C> {
    let file = File::open(path).map_err(|source| DvstarError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    load_vlmc(BufReader::new(file), path, background_order, pseudo_count)
}

/// Load a VLMC from an arbitrary reader. Split out from
/// [`load_vlmc_file`] so the record-stream logic can be exercised directly
/// against an in-memory buffer in tests.
pub fn load_vlmc<R: Read, C: VlmcContainer>(
    mut reader: R,
    path: &Path,
    background_order: usize,
    pseudo_count: f64,
) -> Result<C> {
    let cache_len = 4usize.saturating_pow(background_order as u32);
    let offset = offset_to_remove(background_order);
    let mut background_cache: Vec<Option<[f64; 4]>> = vec![None; cache_len];
    let mut retained: Vec<ContextRecord> = Vec::new();

    loop {
        let raw = match RawRecord::read_from(&mut reader) {
            Ok(Some(raw)) => raw,
            Ok(None) => break,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(DvstarError::Truncated {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(DvstarError::Load {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let length = raw.length as usize;
        if length < background_order {
            continue;
        }

        let fingerprint = raw.fingerprint();
        let probs = raw.smoothed_probs(pseudo_count);

        if length == background_order {
            let idx = background_cache_index(fingerprint, background_order, offset);
            if idx >= 0 && (idx as usize) < background_cache.len() {
                background_cache[idx as usize] = Some(probs);
            } else {
                warn!(fingerprint, background_order, "background context fingerprint out of cache range");
            }
            continue;
        }

        retained.push(ContextRecord {
            fingerprint,
            length: raw.length as u8,
            probs,
            is_null: false,
        });
    }

    trace!(
        retained = retained.len(),
        cached = background_cache.iter().filter(|c| c.is_some()).count(),
        "finished streaming VLMC record file"
    );

    for rec in retained.iter_mut() {
        let bg_fingerprint = rec.background_fingerprint(background_order);
        let idx = bg_fingerprint as i64 - offset as i64;
        let bg_probs = if idx >= 0 && (idx as usize) < background_cache.len() {
            background_cache[idx as usize]
        } else {
            None
        };

        match bg_probs {
            Some(bg) => {
                for i in 0..4 {
                    rec.probs[i] = if bg[i] > 0.0 {
                        rec.probs[i] / bg[i].sqrt()
                    } else {
                        0.0
                    };
                }
            }
            None => rec.probs = [0.0; 4],
        }
    }

    debug!(path = %path.display(), contexts = retained.len(), "loaded VLMC");
    Ok(C::from_records(retained))
}
