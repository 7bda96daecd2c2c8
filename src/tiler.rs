//! Cache-oblivious recursive matrix tiling (C5).
//!
//! The rectangular tiler bisects the longer axis at each step (ties go to
//! the row axis). The triangular tiler follows the standard
//! divide-without-crossing-the-diagonal shape: split the range in half,
//! recurse into the two resulting triangles, and fill the rectangle between
//! them with the ordinary rectangular tiler, since it never touches the
//! diagonal.
//!
//! Both functions write through a [`RowRangeMut`] rather than a shared
//! pointer: the row range handed in already belongs exclusively to the
//! caller for the duration of the call, so the recursion can write freely
//! with no lock and no `unsafe`.

use crate::container::VlmcContainer;
use crate::kernel;
use crate::matrix::RowRangeMut;

/// Fill `out[row_start..row_end, col_start..col_end]` with dvstar distances
/// between `left[row_start..row_end]` and `right[col_start..col_end]`.
///
/// `out` must be a row range covering at least `[row_start, row_end)` of the
/// full matrix; `out.row_offset()` is subtracted from each row index so the
/// same range can be reused across an entire worker's assigned rows.
pub fn fill_rectangle<C: VlmcContainer>(
    left: &[C],
    right: &[C],
    row_start: usize,
    row_end: usize,
    col_start: usize,
    col_end: usize,
    out: &mut RowRangeMut<'_>,
) {
    let rows = row_end - row_start;
    let cols = col_end - col_start;
    if rows == 0 || cols == 0 {
        return;
    }
    if rows == 1 && cols == 1 {
        let d = kernel::distance(&left[row_start], &right[col_start]);
        out.set(row_start - out.row_offset(), col_start, d);
        return;
    }

    if cols > rows {
        let mid = col_start + cols / 2;
        fill_rectangle(left, right, row_start, row_end, col_start, mid, out);
        fill_rectangle(left, right, row_start, row_end, mid, col_end, out);
    } else {
        let mid = row_start + rows / 2;
        fill_rectangle(left, right, row_start, mid, col_start, col_end, out);
        fill_rectangle(left, right, mid, row_end, col_start, col_end, out);
    }
}

/// Fill the strict upper triangle `out[i, j]` for `start <= i < j < stop`
/// with dvstar distances between `items[i]` and `items[j]`. The diagonal and
/// lower triangle are left untouched at `0.0`: entries with `i >= j` are
/// intentionally zero, not a mirror of the upper triangle.
pub fn fill_triangle<C: VlmcContainer>(
    items: &[C],
    start: usize,
    stop: usize,
    out: &mut RowRangeMut<'_>,
) {
    if stop <= start + 1 {
        return;
    }
    let mid = start + (stop - start) / 2;
    fill_triangle(items, start, mid, out);
    fill_triangle(items, mid, stop, out);
    fill_rectangle(items, items, start, mid, mid, stop, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::SortedSkipContainer;
    use crate::matrix::DistanceMatrix;
    use crate::record::ContextRecord;

    fn fixture(seed: u64) -> SortedSkipContainer {
        let records: Vec<_> = (0..5)
            .map(|i| ContextRecord {
                fingerprint: i,
                length: 2,
                probs: [
                    ((seed + i) % 7) as f64 + 1.0,
                    ((seed + i) % 3) as f64 + 1.0,
                    ((seed + i) % 5) as f64 + 1.0,
                    ((seed + i) % 2) as f64 + 1.0,
                ],
                is_null: false,
            })
            .collect();
        SortedSkipContainer::from_records(records)
    }

    #[test]
    fn rectangle_matches_brute_force() {
        let left: Vec<_> = (0..4).map(fixture).collect();
        let right: Vec<_> = (0..6).map(|s| fixture(s + 100)).collect();

        let mut matrix = DistanceMatrix::new(4, 6);
        {
            let mut range = matrix.full_range_mut();
            fill_rectangle(&left, &right, 0, 4, 0, 6, &mut range);
        }

        for i in 0..4 {
            for j in 0..6 {
                let expected = kernel::distance(&left[i], &right[j]);
                assert!((matrix.get(i, j) - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn triangle_fills_only_strict_upper_half() {
        let items: Vec<_> = (0..5).map(fixture).collect();
        let mut matrix = DistanceMatrix::new(5, 5);
        {
            let mut range = matrix.full_range_mut();
            fill_triangle(&items, 0, 5, &mut range);
        }

        for i in 0..5 {
            assert_eq!(matrix.get(i, i), 0.0);
            for j in 0..i {
                assert_eq!(matrix.get(i, j), 0.0);
            }
        }
        for i in 0..5 {
            for j in (i + 1)..5 {
                let expected = kernel::distance(&items[i], &items[j]);
                assert!((matrix.get(i, j) - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn triangle_with_single_item_touches_nothing() {
        let items = vec![fixture(0)];
        let mut matrix = DistanceMatrix::new(1, 1);
        {
            let mut range = matrix.full_range_mut();
            fill_triangle(&items, 0, 1, &mut range);
        }
        assert_eq!(matrix.get(0, 0), 0.0);
    }
}
