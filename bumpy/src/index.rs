use crate::error::{BumpyError, Result};
use std::ops::Range;

/// Map from occupied `(row, col)` coordinates to `[start, end)` ranges of a flat value
/// store, laid out as compressed sparse columns.
///
/// Within a column, row indices are strictly increasing. Coordinates that are not
/// recorded are empty entries. Recorded ranges are never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewIndex {
    nrow: usize,
    ncol: usize,
    colptr: Vec<usize>,
    rows: Vec<usize>,
    starts: Vec<usize>,
    ends: Vec<usize>,
}

/// Accumulates occupied coordinates in column-major order.
pub(crate) struct IndexBuilder {
    index: ViewIndex,
    last: Option<(usize, usize)>,
}

impl IndexBuilder {
    pub(crate) fn new(nrow: usize, ncol: usize) -> IndexBuilder {
        IndexBuilder {
            index: ViewIndex {
                nrow,
                ncol,
                colptr: vec![0],
                rows: Vec::new(),
                starts: Vec::new(),
                ends: Vec::new(),
            },
            last: None,
        }
    }

    /// Record an entry. Coordinates must arrive in strictly increasing column-major
    /// order and the range must be non-empty.
    pub(crate) fn push(&mut self, row: usize, col: usize, range: Range<usize>) {
        debug_assert!(row < self.index.nrow && col < self.index.ncol);
        debug_assert!(range.start < range.end);
        debug_assert!(self.last.map_or(true, |(r, c)| (c, r) < (col, row)));

        self.close_until(col);
        self.index.rows.push(row);
        self.index.starts.push(range.start);
        self.index.ends.push(range.end);
        self.last = Some((row, col));
    }

    fn close_until(&mut self, col: usize) {
        while self.index.colptr.len() <= col {
            self.index.colptr.push(self.index.rows.len());
        }
    }

    pub(crate) fn finish(mut self) -> ViewIndex {
        let ncol = self.index.ncol;
        self.close_until(ncol);
        self.index
    }
}

impl ViewIndex {
    /// Index of an `nrow x ncol` matrix with no occupied entries
    pub fn empty(nrow: usize, ncol: usize) -> ViewIndex {
        IndexBuilder::new(nrow, ncol).finish()
    }

    /// Build an index from per-entry triplets, in any order.
    ///
    /// Checks that coordinates are in range and unique, that ranges are non-empty
    /// and lie within `[0, total_len)`, and that no two ranges overlap.
    pub fn from_triplets(
        nrow: usize,
        ncol: usize,
        rows: &[usize],
        cols: &[usize],
        starts: &[usize],
        ends: &[usize],
        total_len: usize,
    ) -> Result<ViewIndex> {
        let n = rows.len();
        if cols.len() != n || starts.len() != n || ends.len() != n {
            return Err(BumpyError::InvalidLayout(format!(
                "triplet arrays differ in length: rows {}, cols {}, starts {}, ends {}",
                n,
                cols.len(),
                starts.len(),
                ends.len()
            )));
        }

        for i in 0..n {
            if rows[i] >= nrow || cols[i] >= ncol {
                return Err(BumpyError::InvalidLayout(format!(
                    "coordinate ({}, {}) outside a {}x{} matrix",
                    rows[i], cols[i], nrow, ncol
                )));
            }
            if starts[i] >= ends[i] || ends[i] > total_len {
                return Err(BumpyError::InvalidLayout(format!(
                    "range [{}, {}) at ({}, {}) is empty or exceeds store length {}",
                    starts[i], ends[i], rows[i], cols[i], total_len
                )));
            }
        }

        let mut by_range: Vec<usize> = (0..n).collect();
        by_range.sort_unstable_by_key(|&i| starts[i]);
        for w in by_range.windows(2) {
            if ends[w[0]] > starts[w[1]] {
                return Err(BumpyError::InvalidLayout(format!(
                    "ranges at ({}, {}) and ({}, {}) overlap",
                    rows[w[0]], cols[w[0]], rows[w[1]], cols[w[1]]
                )));
            }
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_unstable_by_key(|&i| (cols[i], rows[i]));
        for w in order.windows(2) {
            if (cols[w[0]], rows[w[0]]) == (cols[w[1]], rows[w[1]]) {
                return Err(BumpyError::InvalidLayout(format!(
                    "coordinate ({}, {}) occurs more than once",
                    rows[w[0]], cols[w[0]]
                )));
            }
        }

        let mut builder = IndexBuilder::new(nrow, ncol);
        for i in order {
            builder.push(rows[i], cols[i], starts[i]..ends[i]);
        }
        Ok(builder.finish())
    }

    /// Build an index from compressed-sparse-column arrays, checking the same
    /// invariants as `from_triplets`.
    pub fn from_csc(
        nrow: usize,
        colptr: &[usize],
        row_indices: &[usize],
        starts: &[usize],
        ends: &[usize],
        total_len: usize,
    ) -> Result<ViewIndex> {
        if colptr.first() != Some(&0) || colptr.last() != Some(&row_indices.len()) {
            return Err(BumpyError::InvalidLayout(
                "column pointers must start at 0 and end at the number of entries".to_string(),
            ));
        }
        if colptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(BumpyError::InvalidLayout("column pointers must be non-decreasing".to_string()));
        }
        let ncol = colptr.len() - 1;
        let cols = colptr
            .windows(2)
            .enumerate()
            .flat_map(|(c, w)| std::iter::repeat(c).take(w[1] - w[0]))
            .collect::<Vec<_>>();
        ViewIndex::from_triplets(nrow, ncol, row_indices, &cols, starts, ends, total_len)
    }

    /// Number of rows
    pub fn nrow(&self) -> usize {
        self.nrow
    }

    /// Number of columns
    pub fn ncol(&self) -> usize {
        self.ncol
    }

    /// Number of occupied coordinates
    pub fn nnz(&self) -> usize {
        self.rows.len()
    }

    /// Fraction of coordinates that are occupied
    pub fn density(&self) -> f64 {
        let cells = self.nrow * self.ncol;
        if cells == 0 {
            0.0
        } else {
            self.nnz() as f64 / cells as f64
        }
    }

    /// Sum of all entry lengths
    pub fn total_len(&self) -> usize {
        self.starts.iter().zip(self.ends.iter()).map(|(s, e)| e - s).sum()
    }

    /// Column pointers, length `ncol + 1`
    pub fn colptr(&self) -> &[usize] {
        &self.colptr
    }

    /// Row index of each occupied entry, column-major
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    /// Range start of each occupied entry, column-major
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// Range end of each occupied entry, column-major
    pub fn ends(&self) -> &[usize] {
        &self.ends
    }

    /// Range of the entry at `(row, col)`, or `None` if the entry is empty or the
    /// coordinates are out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<Range<usize>> {
        if row >= self.nrow || col >= self.ncol {
            return None;
        }
        let lo = self.colptr[col];
        let hi = self.colptr[col + 1];
        self.rows[lo..hi]
            .binary_search(&row)
            .ok()
            .map(|k| self.starts[lo + k]..self.ends[lo + k])
    }

    /// Occupied `(row, range)` pairs of one column, by increasing row
    pub fn column(&self, col: usize) -> impl Iterator<Item = (usize, Range<usize>)> + '_ {
        (self.colptr[col]..self.colptr[col + 1]).map(move |k| (self.rows[k], self.starts[k]..self.ends[k]))
    }

    /// Occupied `(row, col, range)` triplets in column-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Range<usize>)> + '_ {
        (0..self.ncol).flat_map(move |c| self.column(c).map(move |(r, range)| (r, c, range)))
    }

    /// True if the ranges tile `[0, total_len)` back to back in column-major order.
    pub fn is_canonical(&self) -> bool {
        let mut pos = 0;
        for (s, e) in self.starts.iter().zip(self.ends.iter()) {
            if *s != pos {
                return false;
            }
            pos = *e;
        }
        true
    }

    /// Select rows and columns by old position. The entry at new `(i, j)` is the old
    /// entry at `(rows[i], cols[j])`; positions may repeat or be reordered. Ranges are
    /// carried over unchanged, so the result views the same store.
    pub(crate) fn remap(&self, rows: &[usize], cols: &[usize]) -> ViewIndex {
        // offsets/targets: new row positions grouped by old row
        let mut offsets = vec![0usize; self.nrow + 1];
        for &r in rows {
            offsets[r + 1] += 1;
        }
        for i in 0..self.nrow {
            offsets[i + 1] += offsets[i];
        }
        let mut fill = offsets.clone();
        let mut targets = vec![0usize; rows.len()];
        for (new_row, &r) in rows.iter().enumerate() {
            targets[fill[r]] = new_row;
            fill[r] += 1;
        }

        let mut builder = IndexBuilder::new(rows.len(), cols.len());
        let mut tmp: Vec<(usize, Range<usize>)> = Vec::new();
        for (new_col, &c) in cols.iter().enumerate() {
            tmp.clear();
            for (r, range) in self.column(c) {
                for &new_row in &targets[offsets[r]..offsets[r + 1]] {
                    tmp.push((new_row, range.clone()));
                }
            }
            tmp.sort_unstable_by_key(|(r, _)| *r);
            for (new_row, range) in tmp.drain(..) {
                builder.push(new_row, new_col, range);
            }
        }
        builder.finish()
    }

    /// Swap rows and columns. Ranges are carried over unchanged.
    pub(crate) fn transpose(&self) -> ViewIndex {
        let mut colptr = vec![0usize; self.nrow + 1];
        for &r in &self.rows {
            colptr[r + 1] += 1;
        }
        for i in 0..self.nrow {
            colptr[i + 1] += colptr[i];
        }

        let nnz = self.nnz();
        let mut fill = colptr.clone();
        let mut rows = vec![0usize; nnz];
        let mut starts = vec![0usize; nnz];
        let mut ends = vec![0usize; nnz];
        // old columns are visited in increasing order, so new row indices stay sorted
        for (r, c, range) in self.iter() {
            let k = fill[r];
            rows[k] = c;
            starts[k] = range.start;
            ends[k] = range.end;
            fill[r] += 1;
        }

        ViewIndex {
            nrow: self.ncol,
            ncol: self.nrow,
            colptr,
            rows,
            starts,
            ends,
        }
    }

    /// Same occupancy, with each range shifted by `offset`
    pub(crate) fn shifted(&self, offset: usize) -> ViewIndex {
        let mut out = self.clone();
        out.starts.iter_mut().for_each(|s| *s += offset);
        out.ends.iter_mut().for_each(|e| *e += offset);
        out
    }

    /// Same occupancy with entries packed back to back, plus the store positions to
    /// gather (in order) to build the matching store.
    pub(crate) fn packed(&self) -> (ViewIndex, Vec<usize>) {
        let mut picks = Vec::with_capacity(self.total_len());
        let mut out = self.clone();
        for k in 0..self.nnz() {
            let start = picks.len();
            picks.extend(self.starts[k]..self.ends[k]);
            out.starts[k] = start;
            out.ends[k] = picks.len();
        }
        (out, picks)
    }
}
