//! Dense distance matrix storage and safe disjoint-range partitioning.
//!
//! The matrix is stored row-major, one `f64` per VLMC pair. Because storage
//! is row-major, an owned *range of rows* is a single contiguous slice — so
//! [`RowRangeMut`] hands out non-overlapping row ranges as ordinary Rust
//! slices, letting the scheduler (C6) and tiler (C5) write concurrently with
//! no shared mutex and no unsafe pointer arithmetic: the borrow checker
//! proves two ranges never alias.

/// A dense `rows x cols` matrix of distances.
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Borrow the whole matrix as one row range, ready to be handed to the
    /// scheduler for further splitting.
    pub fn full_range_mut(&mut self) -> RowRangeMut<'_> {
        RowRangeMut {
            row_offset: 0,
            cols: self.cols,
            data: &mut self.data,
        }
    }
}

/// An exclusively-owned, contiguous range of a [`DistanceMatrix`]'s rows.
///
/// `row_offset` is the range's first row index in the parent matrix;
/// `set`/`get` take row indices local to the range (`0` is `row_offset` in
/// the parent). Splitting a range produces two ranges with no overlapping
/// memory, which the compiler verifies — two workers each holding one half
/// can write concurrently with no risk of a data race.
pub struct RowRangeMut<'a> {
    row_offset: usize,
    cols: usize,
    data: &'a mut [f64],
}

impl<'a> RowRangeMut<'a> {
    pub fn num_rows(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.data.len() / self.cols
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The first row index this range covers in the parent matrix.
    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    pub fn get(&self, local_row: usize, col: usize) -> f64 {
        self.data[local_row * self.cols + col]
    }

    pub fn set(&mut self, local_row: usize, col: usize, value: f64) {
        self.data[local_row * self.cols + col] = value;
    }

    /// Split at local row `mid`, consuming `self`: rows `[0, mid)` go to the
    /// first half, `[mid, num_rows)` to the second. Panics if `mid` is out
    /// of bounds, mirroring `[T]::split_at_mut`.
    pub fn split_at_row(self, mid: usize) -> (RowRangeMut<'a>, RowRangeMut<'a>) {
        let split_point = mid * self.cols;
        let (a, b) = self.data.split_at_mut(split_point);
        (
            RowRangeMut {
                row_offset: self.row_offset,
                cols: self.cols,
                data: a,
            },
            RowRangeMut {
                row_offset: self.row_offset + mid,
                cols: self.cols,
                data: b,
            },
        )
    }

    /// Split into up to `n` roughly equal contiguous row chunks. Used by the
    /// scheduler to hand one chunk per worker thread.
    pub fn split_into(self, n: usize) -> Vec<RowRangeMut<'a>> {
        let n = n.max(1);
        let total_rows = self.num_rows();
        if total_rows == 0 {
            return vec![self];
        }
        let chunk = total_rows.div_ceil(n);
        let mut out = Vec::with_capacity(n);
        let mut remaining = self;
        while remaining.num_rows() > 0 {
            let take = chunk.min(remaining.num_rows());
            let (head, tail) = remaining.split_at_row(take);
            out.push(head);
            remaining = tail;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_into_covers_every_row_exactly_once() {
        let mut m = DistanceMatrix::new(7, 3);
        let chunks = m.full_range_mut().split_into(3);
        let mut covered = Vec::new();
        for mut chunk in chunks {
            for r in 0..chunk.num_rows() {
                covered.push(chunk.row_offset() + r);
                chunk.set(r, 0, 1.0);
            }
        }
        covered.sort();
        assert_eq!(covered, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn split_at_row_produces_disjoint_writable_halves() {
        let mut m = DistanceMatrix::new(4, 2);
        let (mut top, mut bottom) = m.full_range_mut().split_at_row(2);
        top.set(0, 0, 1.0);
        top.set(1, 1, 2.0);
        bottom.set(0, 0, 3.0);
        drop(top);
        drop(bottom);
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(1, 1), 2.0);
        assert_eq!(m.get(2, 0), 3.0);
    }

    #[test]
    fn split_into_with_more_workers_than_rows_still_covers_all_rows() {
        let mut m = DistanceMatrix::new(2, 2);
        let chunks = m.full_range_mut().split_into(8);
        let total: usize = chunks.iter().map(|c| c.num_rows()).sum();
        assert_eq!(total, 2);
    }
}
