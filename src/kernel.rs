//! The dvstar distance kernel (C4): a pure function from two containers to
//! one `f64`, with no knowledge of scheduling, tiling, or loading.
//!
//! Dot product and both norms accumulate only over contexts shared by both
//! sides; a context present on only one side contributes nothing. The
//! per-component background division is applied once, at load time, in
//! [`crate::loader`] — so the probabilities this kernel reads are already
//! background-adjusted.

use crate::container::VlmcContainer;
use crate::record::ContextRecord;

/// The three accumulators the kernel needs: dot product and both squared
/// norms. Exposed so [`crate::kmer_major`] can build the same triple from a
/// bucket of pairs sharing one fingerprint instead of from a full container
/// intersection.
#[derive(Debug, Default, Clone, Copy)]
pub struct Accumulator {
    pub dot_product: f64,
    pub left_norm: f64,
    pub right_norm: f64,
}

impl Accumulator {
    /// Fold in one pair of matched records.
    #[inline]
    pub fn add_pair(&mut self, left: &ContextRecord, right: &ContextRecord) {
        for i in 0..4 {
            self.dot_product += left.probs[i] * right.probs[i];
            self.left_norm += left.probs[i] * left.probs[i];
            self.right_norm += right.probs[i] * right.probs[i];
        }
    }

    #[inline]
    pub fn merge(&mut self, other: &Accumulator) {
        self.dot_product += other.dot_product;
        self.left_norm += other.left_norm;
        self.right_norm += other.right_norm;
    }

    /// Finish accumulation into a dvstar distance. See [`normalise`].
    pub fn finish(&self) -> f64 {
        normalise(self.dot_product, self.left_norm, self.right_norm)
    }
}

/// The angular cosine distance between two accumulated dot-product/norm
/// triples.
///
/// A zero norm on either side means that VLMC contributed no overlapping
/// context at all (or every shared context happened to background-adjust to
/// zero); the two VLMCs are then defined to be maximally dissimilar, `1.0`,
/// not undefined. `acos`'s argument can drift fractionally outside `[-1, 1]`
/// from floating-point error, producing `NaN`; that case collapses to `0.0`
/// (identical direction) rather than propagating the `NaN`. Both rules are
/// part of the kernel's contract, not error conditions — see
/// [`crate::error`].
pub fn normalise(dot_product: f64, left_norm_sq: f64, right_norm_sq: f64) -> f64 {
    let left_norm = left_norm_sq.sqrt();
    let right_norm = right_norm_sq.sqrt();

    if left_norm == 0.0 || right_norm == 0.0 {
        return 1.0;
    }

    let cosine = dot_product / (left_norm * right_norm);
    let angular_distance = 2.0 * cosine.acos() / std::f64::consts::PI;
    if angular_distance.is_nan() {
        0.0
    } else {
        angular_distance
    }
}

/// The dvstar distance between two VLMCs' context sets.
pub fn distance<C: VlmcContainer>(left: &C, right: &C) -> f64 {
    accumulate(left, right).finish()
}

/// Accumulate dot product and both norms over `left` and `right`'s shared
/// fingerprints, without normalizing. Used directly by the tiler so a single
/// pass over a container pair can be reused across many comparisons sharing
/// one side.
pub fn accumulate<C: VlmcContainer>(left: &C, right: &C) -> Accumulator {
    let mut acc = Accumulator::default();
    left.for_each_match(right, |l, r| acc.add_pair(l, r));
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::SortedSkipContainer;

    fn rec(fingerprint: u64, probs: [f64; 4]) -> ContextRecord {
        ContextRecord {
            fingerprint,
            length: 2,
            probs,
            is_null: false,
        }
    }

    #[test]
    fn identical_collections_have_zero_distance() {
        let records = vec![rec(1, [0.4, 0.3, 0.2, 0.1]), rec(2, [0.25, 0.25, 0.25, 0.25])];
        let a = SortedSkipContainer::from_records(records.clone());
        let b = SortedSkipContainer::from_records(records);
        let d = distance(&a, &b);
        assert!(d.abs() < 1e-9, "expected ~0, got {d}");
    }

    #[test]
    fn disjoint_fingerprints_have_no_shared_contexts_and_distance_one() {
        let a = SortedSkipContainer::from_records(vec![rec(1, [1.0, 0.0, 0.0, 0.0])]);
        let b = SortedSkipContainer::from_records(vec![rec(2, [1.0, 0.0, 0.0, 0.0])]);
        assert_eq!(distance(&a, &b), 1.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = SortedSkipContainer::from_records(vec![
            rec(1, [0.7, 0.1, 0.1, 0.1]),
            rec(5, [0.1, 0.1, 0.1, 0.7]),
        ]);
        let b = SortedSkipContainer::from_records(vec![
            rec(1, [0.2, 0.2, 0.2, 0.4]),
            rec(5, [0.25, 0.25, 0.25, 0.25]),
        ]);
        assert!((distance(&a, &b) - distance(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn distance_stays_within_unit_range() {
        let a = SortedSkipContainer::from_records(vec![rec(1, [0.9, 0.05, 0.03, 0.02])]);
        let b = SortedSkipContainer::from_records(vec![rec(1, [0.01, 0.01, 0.01, 0.97])]);
        let d = distance(&a, &b);
        assert!((0.0..=1.0).contains(&d));
    }

    #[test]
    fn normalise_treats_zero_norm_as_maximal_distance() {
        assert_eq!(normalise(0.0, 0.0, 1.0), 1.0);
        assert_eq!(normalise(0.0, 1.0, 0.0), 1.0);
        assert_eq!(normalise(0.0, 0.0, 0.0), 1.0);
    }

    #[test]
    fn normalise_collapses_acos_drift_to_zero_not_nan() {
        // cosine slightly above 1.0 from float error would make acos NaN.
        let d = normalise(1.0000000000000002, 1.0, 1.0);
        assert_eq!(d, 0.0);
    }
}
