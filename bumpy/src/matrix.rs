use crate::error::{length_mismatch, Axis, BumpyError, Result};
use crate::frame::{Column, Frame};
use crate::index::{IndexBuilder, ViewIndex};
use crate::list::BumpyList;
use crate::selector::Selector;
use crate::store::{Element, ElementKind, VectorLike};
use log::debug;
use std::collections::HashSet;
use std::ops::Range;
use std::rc::Rc;
use std::time::Instant;

/// Two-dimensional matrix whose entries are variable-length vector-like values.
///
/// All entries live back to back in one flat store of type `V`; a `ViewIndex` maps
/// each occupied `(row, col)` to its range in that store. Operations never modify a
/// matrix in place. Slicing and transposition share the store with the parent;
/// operations that produce new values build a fresh store.
#[derive(Clone, Debug)]
pub struct BumpyMatrix<V> {
    pub(crate) index: ViewIndex,
    pub(crate) store: Rc<V>,
    pub(crate) row_names: Option<Vec<String>>,
    pub(crate) col_names: Option<Vec<String>>,
}

pub(crate) fn check_names(names: &[String], extent: usize, axis: Axis) -> Result<()> {
    if names.len() != extent {
        return Err(BumpyError::InvalidNames {
            axis,
            reason: format!("expected {} names, got {}", extent, names.len()),
        });
    }
    let mut seen = HashSet::with_capacity(names.len());
    if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
        return Err(BumpyError::InvalidNames {
            axis,
            reason: format!("duplicated name '{dup}'"),
        });
    }
    Ok(())
}

fn pick_names(names: &Option<Vec<String>>, positions: &[usize]) -> Option<Vec<String>> {
    names.as_ref().map(|n| positions.iter().map(|&i| n[i].clone()).collect())
}

impl<V: VectorLike> BumpyMatrix<V> {
    pub(crate) fn from_raw(
        index: ViewIndex,
        store: Rc<V>,
        row_names: Option<Vec<String>>,
        col_names: Option<Vec<String>>,
    ) -> BumpyMatrix<V> {
        BumpyMatrix {
            index,
            store,
            row_names,
            col_names,
        }
    }

    /// Same occupancy and names as `self`, viewing a different store
    pub(crate) fn with_store<W>(&self, store: W) -> BumpyMatrix<W> {
        BumpyMatrix {
            index: self.index.clone(),
            store: Rc::new(store),
            row_names: self.row_names.clone(),
            col_names: self.col_names.clone(),
        }
    }

    /// An `nrow x ncol` matrix with every entry empty. `template` fixes the element
    /// type (and schema, for tabular entries).
    pub fn empty(template: &V, nrow: usize, ncol: usize) -> BumpyMatrix<V> {
        BumpyMatrix::from_raw(ViewIndex::empty(nrow, ncol), Rc::new(template.empty_like()), None, None)
    }

    /// Build a matrix from all `nrow * ncol` entries given in column-major order.
    /// Empty entries are not stored.
    pub fn from_entries(nrow: usize, ncol: usize, entries: &[V]) -> Result<BumpyMatrix<V>> {
        if entries.len() != nrow * ncol {
            return Err(length_mismatch(nrow * ncol, entries.len(), "column-major entry list"));
        }

        let mut builder = IndexBuilder::new(nrow, ncol);
        let mut parts = Vec::new();
        let mut pos = 0;
        for (i, e) in entries.iter().enumerate() {
            if e.is_empty() {
                continue;
            }
            builder.push(i % nrow, i / nrow, pos..pos + e.len());
            pos += e.len();
            parts.push(e.clone());
        }
        if let Some(first) = parts.first() {
            if let Some(bad) = parts.iter().find(|p| !first.compatible(p)) {
                return Err(BumpyError::TypeMismatch {
                    field: "entries".to_string(),
                    expected: first.kind().name().to_string(),
                    found: bad.kind().name().to_string(),
                });
            }
        }

        let store = match (parts.is_empty(), entries.first()) {
            (true, Some(first)) => first.empty_like(),
            _ => V::concat(&parts),
        };
        Ok(BumpyMatrix::from_raw(builder.finish(), Rc::new(store), None, None))
    }

    /// Replace the row names. Names must be unique and one per row.
    pub fn with_row_names<S: AsRef<str>>(mut self, names: &[S]) -> Result<BumpyMatrix<V>> {
        let names = names.iter().map(|s| s.as_ref().to_string()).collect::<Vec<_>>();
        check_names(&names, self.nrow(), Axis::Row)?;
        self.row_names = Some(names);
        Ok(self)
    }

    /// Replace the column names. Names must be unique and one per column.
    pub fn with_col_names<S: AsRef<str>>(mut self, names: &[S]) -> Result<BumpyMatrix<V>> {
        let names = names.iter().map(|s| s.as_ref().to_string()).collect::<Vec<_>>();
        check_names(&names, self.ncol(), Axis::Col)?;
        self.col_names = Some(names);
        Ok(self)
    }

    /// Drop row and column names
    pub fn without_names(mut self) -> BumpyMatrix<V> {
        self.row_names = None;
        self.col_names = None;
        self
    }

    /// Number of rows in the matrix
    pub fn nrow(&self) -> usize {
        self.index.nrow()
    }

    /// Number of columns in the matrix
    pub fn ncol(&self) -> usize {
        self.index.ncol()
    }

    /// Shape as (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        (self.nrow(), self.ncol())
    }

    /// Number of entries, `nrow * ncol`, occupied or not
    pub fn len(&self) -> usize {
        self.nrow() * self.ncol()
    }

    /// True if the matrix has no entries at all (a zero extent).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of occupied entries
    pub fn nnz(&self) -> usize {
        self.index.nnz()
    }

    /// Fraction of occupied entries
    pub fn density(&self) -> f64 {
        self.index.density()
    }

    /// Element kind of the entries
    pub fn kind(&self) -> ElementKind {
        self.store.kind()
    }

    /// Row names, if set
    pub fn row_names(&self) -> Option<&[String]> {
        self.row_names.as_deref()
    }

    /// Column names, if set
    pub fn col_names(&self) -> Option<&[String]> {
        self.col_names.as_deref()
    }

    /// The flat value store. Only the ranges recorded in the index are meaningful.
    pub fn store(&self) -> &V {
        &self.store
    }

    /// The view index
    pub fn index(&self) -> &ViewIndex {
        &self.index
    }

    /// True if both matrices view the same flat store.
    pub fn shares_store(&self, other: &BumpyMatrix<V>) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }

    fn check_coord(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.nrow() {
            return Err(BumpyError::IndexOutOfRange {
                index: row,
                extent: self.nrow(),
                axis: Axis::Row,
            });
        }
        if col >= self.ncol() {
            return Err(BumpyError::IndexOutOfRange {
                index: col,
                extent: self.ncol(),
                axis: Axis::Col,
            });
        }
        Ok(())
    }

    /// Range of the entry at `(row, col)` in the store, `None` if the entry is empty
    pub fn entry_range(&self, row: usize, col: usize) -> Result<Option<Range<usize>>> {
        self.check_coord(row, col)?;
        Ok(self.index.get(row, col))
    }

    /// Length of the entry at `(row, col)`
    pub fn entry_len(&self, row: usize, col: usize) -> Result<usize> {
        Ok(self.entry_range(row, col)?.map_or(0, |r| r.len()))
    }

    /// The entry at `(row, col)`. Unoccupied coordinates yield an empty value.
    pub fn get(&self, row: usize, col: usize) -> Result<V> {
        Ok(match self.entry_range(row, col)? {
            Some(r) => self.store.slice_range(r.start, r.end),
            None => self.store.empty_like(),
        })
    }

    /// The entry at the named row and column
    pub fn get_named(&self, row: &str, col: &str) -> Result<V> {
        let r = Selector::from(row).resolve(self.nrow(), self.row_names(), Axis::Row)?;
        let c = Selector::from(col).resolve(self.ncol(), self.col_names(), Axis::Col)?;
        self.get(r[0], c[0])
    }

    /// The entry at column-major linear position `i`
    pub fn get_linear(&self, i: usize) -> Result<V> {
        if i >= self.len() {
            return Err(BumpyError::IndexOutOfRange {
                index: i,
                extent: self.len(),
                axis: Axis::Linear,
            });
        }
        self.get(i % self.nrow(), i / self.nrow())
    }

    /// Occupied entries as `(row, col, value)`, in column-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, V)> + '_ {
        self.index
            .iter()
            .map(move |(r, c, range)| (r, c, self.store.slice_range(range.start, range.end)))
    }

    /// All entries of one row, one per column
    pub fn row(&self, row: usize) -> Result<BumpyList<V>> {
        if row >= self.nrow() {
            return Err(BumpyError::IndexOutOfRange {
                index: row,
                extent: self.nrow(),
                axis: Axis::Row,
            });
        }
        let ranges = (0..self.ncol()).map(|c| self.index.get(row, c)).collect();
        Ok(BumpyList::new(self.store.clone(), ranges, self.col_names.clone()))
    }

    /// All entries of one column, one per row
    pub fn col(&self, col: usize) -> Result<BumpyList<V>> {
        if col >= self.ncol() {
            return Err(BumpyError::IndexOutOfRange {
                index: col,
                extent: self.ncol(),
                axis: Axis::Col,
            });
        }
        let mut ranges = vec![None; self.nrow()];
        for (r, range) in self.index.column(col) {
            ranges[r] = Some(range);
        }
        Ok(BumpyList::new(self.store.clone(), ranges, self.row_names.clone()))
    }

    /// Every entry as a flat list, in column-major order
    pub fn undim(&self) -> BumpyList<V> {
        let mut ranges = Vec::with_capacity(self.len());
        for c in 0..self.ncol() {
            let base = ranges.len();
            ranges.extend(std::iter::repeat(None).take(self.nrow()));
            for (r, range) in self.index.column(c) {
                ranges[base + r] = Some(range);
            }
        }
        BumpyList::new(self.store.clone(), ranges, None)
    }

    /// Select rows and columns. The result shares the store with `self`.
    pub fn subset(&self, rows: &Selector, cols: &Selector) -> Result<BumpyMatrix<V>> {
        let rows = rows.resolve(self.nrow(), self.row_names(), Axis::Row)?;
        let cols = cols.resolve(self.ncol(), self.col_names(), Axis::Col)?;
        Ok(BumpyMatrix::from_raw(
            self.index.remap(&rows, &cols),
            self.store.clone(),
            pick_names(&self.row_names, &rows),
            pick_names(&self.col_names, &cols),
        ))
    }

    /// Select rows, keeping every column
    pub fn subset_rows(&self, rows: &Selector) -> Result<BumpyMatrix<V>> {
        self.subset(rows, &Selector::All)
    }

    /// Select columns, keeping every row
    pub fn subset_cols(&self, cols: &Selector) -> Result<BumpyMatrix<V>> {
        self.subset(&Selector::All, cols)
    }

    /// Swap rows and columns. The result shares the store with `self`.
    pub fn transpose(&self) -> BumpyMatrix<V> {
        BumpyMatrix::from_raw(
            self.index.transpose(),
            self.store.clone(),
            self.col_names.clone(),
            self.row_names.clone(),
        )
    }

    /// Keep, within every entry, the elements whose mask value is true.
    ///
    /// `mask` must have the same shape, and each of its entries the same length as the
    /// corresponding entry of `self`. Entries left with no elements become unoccupied.
    pub fn mask(&self, mask: &BumpyMatrix<Vec<bool>>) -> Result<BumpyMatrix<V>> {
        if mask.dim() != self.dim() {
            return Err(BumpyError::DimensionMismatch {
                left: self.dim(),
                right: mask.dim(),
            });
        }
        for (r, c, mrange) in mask.index.iter() {
            if self.index.get(r, c).is_none() {
                return Err(length_mismatch(0, mrange.len(), format!("mask entry ({r}, {c})")));
            }
        }

        let mut builder = IndexBuilder::new(self.nrow(), self.ncol());
        let mut picks = Vec::new();
        for (r, c, range) in self.index.iter() {
            let keep = mask.index.get(r, c).map_or(&[][..], |m| &mask.values()[m]);
            if keep.len() != range.len() {
                return Err(length_mismatch(range.len(), keep.len(), format!("mask entry ({r}, {c})")));
            }
            let start = picks.len();
            picks.extend(range.zip(keep.iter()).filter(|(_, &k)| k).map(|(i, _)| i));
            if picks.len() > start {
                builder.push(r, c, start..picks.len());
            }
        }

        Ok(BumpyMatrix::from_raw(
            builder.finish(),
            Rc::new(self.store.select(&picks)),
            self.row_names.clone(),
            self.col_names.clone(),
        ))
    }

    /// Copy into a fresh store with entries back to back in column-major order.
    /// Returns a cheap clone if the layout is already canonical.
    pub fn compact(&self) -> BumpyMatrix<V> {
        if self.index.is_canonical() && self.index.total_len() == self.store.len() {
            return self.clone();
        }
        let tick = Instant::now();
        let (index, picks) = self.index.packed();
        let store = self.store.select(&picks);
        debug!(
            "compacted {} entries ({} of {} elements kept) in {:.3}s",
            index.nnz(),
            picks.len(),
            self.store.len(),
            tick.elapsed().as_secs_f64()
        );
        BumpyMatrix::from_raw(index, Rc::new(store), self.row_names.clone(), self.col_names.clone())
    }

    /// Undo the grouping: every element with the row and column of the entry it came
    /// from, in column-major entry order.
    pub fn flatten(&self) -> (V, Vec<usize>, Vec<usize>) {
        let (index, picks) = self.index.packed();
        let mut rows = Vec::with_capacity(picks.len());
        let mut cols = Vec::with_capacity(picks.len());
        for (r, c, range) in index.iter() {
            rows.extend(std::iter::repeat(r).take(range.len()));
            cols.extend(std::iter::repeat(c).take(range.len()));
        }
        (self.store.select(&picks), rows, cols)
    }

    /// A copy of `self` where the entries at the selected rows and columns are
    /// replaced by the entries of `value`, whose shape must match the selection.
    /// When a position is selected more than once, the last assignment wins.
    pub fn assign(&self, rows: &Selector, cols: &Selector, value: &BumpyMatrix<V>) -> Result<BumpyMatrix<V>> {
        let rows = rows.resolve(self.nrow(), self.row_names(), Axis::Row)?;
        let cols = cols.resolve(self.ncol(), self.col_names(), Axis::Col)?;
        if value.dim() != (rows.len(), cols.len()) {
            return Err(BumpyError::DimensionMismatch {
                left: (rows.len(), cols.len()),
                right: value.dim(),
            });
        }
        if !self.store.compatible(&value.store) {
            return Err(BumpyError::TypeMismatch {
                field: "assigned entries".to_string(),
                expected: self.kind().name().to_string(),
                found: value.kind().name().to_string(),
            });
        }

        let mut row_src = vec![None; self.nrow()];
        for (i, &r) in rows.iter().enumerate() {
            row_src[r] = Some(i);
        }
        let mut col_src = vec![None; self.ncol()];
        for (j, &c) in cols.iter().enumerate() {
            col_src[c] = Some(j);
        }

        let offset = self.store.len();
        let combined = V::concat(&[(*self.store).clone(), (*value.store).clone()]);

        let mut builder = IndexBuilder::new(self.nrow(), self.ncol());
        let mut picks = Vec::new();
        let mut tmp: Vec<(usize, Range<usize>)> = Vec::new();
        for (c, src) in col_src.iter().enumerate() {
            tmp.clear();
            match *src {
                None => tmp.extend(self.index.column(c)),
                Some(j) => {
                    tmp.extend(self.index.column(c).filter(|(r, _)| row_src[*r].is_none()));
                    for (i, range) in value.index.column(j) {
                        let r = rows[i];
                        if row_src[r] == Some(i) {
                            tmp.push((r, range.start + offset..range.end + offset));
                        }
                    }
                    tmp.sort_unstable_by_key(|(r, _)| *r);
                }
            }
            for (r, range) in tmp.drain(..) {
                let start = picks.len();
                picks.extend(range);
                builder.push(r, c, start..picks.len());
            }
        }

        Ok(BumpyMatrix::from_raw(
            builder.finish(),
            Rc::new(combined.select(&picks)),
            self.row_names.clone(),
            self.col_names.clone(),
        ))
    }
}

impl<T: Element> BumpyMatrix<Vec<T>> {
    /// The flat values as a slice
    pub fn values(&self) -> &[T] {
        self.store.as_slice()
    }

    /// Borrow the entry at `(row, col)` without copying
    pub fn entry_slice(&self, row: usize, col: usize) -> Result<&[T]> {
        Ok(match self.entry_range(row, col)? {
            Some(r) => &self.values()[r],
            None => &[],
        })
    }
}

impl BumpyMatrix<Frame> {
    /// Project every tabular entry onto one field. Occupancy is unchanged.
    pub fn field(&self, name: &str) -> Result<BumpyMatrix<Column>> {
        let column = self.store.try_column(name)?;
        Ok(self.with_store(column.clone()))
    }

    fn typed_field<T>(
        &self,
        name: &str,
        expected: &str,
        pick: impl Fn(&Column) -> Option<&Vec<T>>,
    ) -> Result<BumpyMatrix<Vec<T>>>
    where
        T: Clone,
    {
        let column = self.store.try_column(name)?;
        match pick(column) {
            Some(v) => Ok(self.with_store(v.clone())),
            None => Err(BumpyError::TypeMismatch {
                field: name.to_string(),
                expected: expected.to_string(),
                found: column.type_name().to_string(),
            }),
        }
    }

    /// Project onto a floating point field
    pub fn field_f64(&self, name: &str) -> Result<BumpyMatrix<Vec<f64>>> {
        self.typed_field(name, "f64", |c| match c {
            Column::F64(v) => Some(v),
            _ => None,
        })
    }

    /// Project onto an integer field
    pub fn field_i32(&self, name: &str) -> Result<BumpyMatrix<Vec<i32>>> {
        self.typed_field(name, "i32", |c| match c {
            Column::I32(v) => Some(v),
            _ => None,
        })
    }

    /// Project onto a boolean field
    pub fn field_bool(&self, name: &str) -> Result<BumpyMatrix<Vec<bool>>> {
        self.typed_field(name, "bool", |c| match c {
            Column::Bool(v) => Some(v),
            _ => None,
        })
    }

    /// Project onto a string field
    pub fn field_str(&self, name: &str) -> Result<BumpyMatrix<Vec<String>>> {
        self.typed_field(name, "str", |c| match c {
            Column::Str(v) => Some(v),
            _ => None,
        })
    }
}

/// Matrices are equal when shape, names, occupancy and every entry's values agree.
/// The physical layout of the stores may differ.
impl<V: VectorLike> PartialEq for BumpyMatrix<V> {
    fn eq(&self, other: &BumpyMatrix<V>) -> bool {
        self.dim() == other.dim()
            && self.row_names == other.row_names
            && self.col_names == other.col_names
            && self.index.colptr() == other.index.colptr()
            && self.index.row_indices() == other.index.row_indices()
            && self
                .index
                .iter()
                .zip(other.index.iter())
                .all(|((_, _, a), (_, _, b))| {
                    self.store.slice_range(a.start, a.end) == other.store.slice_range(b.start, b.end)
                })
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::gen_rand::{random_bumpy_mat, random_mask};
    use rand::{distributions::Uniform, prelude::Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    /// 3x2 matrix, rows a/b/c, cols x/y:
    ///   (a,x)=[1,2]  (a,y)=[]
    ///   (b,x)=[]     (b,y)=[3,4,5]
    ///   (c,x)=[6]    (c,y)=[7]
    pub fn input_a() -> BumpyMatrix<Vec<f64>> {
        let e = Vec::<f64>::new();
        BumpyMatrix::from_entries(
            3,
            2,
            &[vec![1.0, 2.0], e.clone(), vec![6.0], e, vec![3.0, 4.0, 5.0], vec![7.0]],
        )
        .unwrap()
        .with_row_names(&["a", "b", "c"])
        .unwrap()
        .with_col_names(&["x", "y"])
        .unwrap()
    }

    #[test]
    fn test_entries() {
        let m = input_a();
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m.len(), 6);
        assert_eq!(m.nnz(), 4);
        assert_eq!(m.kind(), ElementKind::Numeric);
        assert_eq!(m.values(), &[1.0, 2.0, 6.0, 3.0, 4.0, 5.0, 7.0]);
        assert!(m.index().is_canonical());

        assert_eq!(m.get(0, 0).unwrap(), vec![1.0, 2.0]);
        assert_eq!(m.get(0, 1).unwrap(), Vec::<f64>::new());
        assert_eq!(m.entry_slice(1, 1).unwrap(), &[3.0, 4.0, 5.0]);
        assert_eq!(m.get_named("c", "y").unwrap(), vec![7.0]);
        assert_eq!(m.get_linear(2).unwrap(), vec![6.0]);
        assert_eq!(m.get_linear(4).unwrap(), vec![3.0, 4.0, 5.0]);
        assert_eq!(m.entry_len(1, 0).unwrap(), 0);

        assert!(matches!(
            m.get(3, 0),
            Err(BumpyError::IndexOutOfRange { axis: Axis::Row, .. })
        ));
        assert!(matches!(
            m.get(0, 2),
            Err(BumpyError::IndexOutOfRange { axis: Axis::Col, .. })
        ));
        assert!(m.get_linear(6).is_err());
        assert!(matches!(m.get_named("q", "x"), Err(BumpyError::NameResolutionFailure { .. })));
    }

    #[test]
    fn test_names_validation() {
        let m = input_a();
        assert!(matches!(
            m.clone().with_row_names(&["a", "b"]),
            Err(BumpyError::InvalidNames { axis: Axis::Row, .. })
        ));
        assert!(matches!(
            m.clone().with_col_names(&["x", "x"]),
            Err(BumpyError::InvalidNames { axis: Axis::Col, .. })
        ));
        let bare = m.without_names();
        assert!(bare.row_names().is_none());
        assert!(bare.col_names().is_none());
    }

    #[test]
    fn test_row_col_lists() {
        let m = input_a();
        let row = m.row(1).unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row.names().unwrap(), &["x".to_string(), "y".to_string()]);
        assert_eq!(row.get(0).unwrap(), Vec::<f64>::new());
        assert_eq!(row.get_named("y").unwrap(), vec![3.0, 4.0, 5.0]);

        let col = m.col(0).unwrap();
        assert_eq!(col.lengths(), vec![2, 0, 1]);
        assert_eq!(col.unlist(), vec![1.0, 2.0, 6.0]);

        assert!(m.row(3).is_err());
        assert!(m.col(2).is_err());

        let flat = m.undim();
        assert_eq!(flat.lengths(), vec![2, 0, 1, 0, 3, 1]);
    }

    #[test]
    fn test_subset() {
        let m = input_a();
        let s = m
            .subset(&Selector::from(vec!["c", "a"]), &Selector::from(vec![true, true]))
            .unwrap();
        assert_eq!(s.dim(), (2, 2));
        assert!(s.shares_store(&m));
        assert_eq!(s.row_names().unwrap(), &["c".to_string(), "a".to_string()]);
        assert_eq!(s.get(0, 0).unwrap(), vec![6.0]);
        assert_eq!(s.get(1, 0).unwrap(), vec![1.0, 2.0]);
        assert_eq!(s.get(1, 1).unwrap(), Vec::<f64>::new());

        let dup = m.subset_cols(&Selector::from(vec![1, 1])).unwrap();
        assert_eq!(dup.get(1, 0).unwrap(), dup.get(1, 1).unwrap());
        assert_eq!(dup.compact().values(), &[3.0, 4.0, 5.0, 7.0, 3.0, 4.0, 5.0, 7.0]);

        let none = m.subset_rows(&Selector::Positions(vec![])).unwrap();
        assert_eq!(none.dim(), (0, 2));
        assert_eq!(none.nnz(), 0);

        assert!(matches!(
            m.subset_rows(&Selector::from(vec![5])),
            Err(BumpyError::IndexOutOfRange { index: 5, extent: 3, .. })
        ));
        assert!(matches!(
            m.subset_cols(&Selector::from(vec![true])),
            Err(BumpyError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            m.subset_cols(&Selector::from("z")),
            Err(BumpyError::NameResolutionFailure { .. })
        ));
    }

    #[test]
    fn test_transpose() {
        let m = input_a();
        let t = m.transpose();
        assert_eq!(t.dim(), (2, 3));
        assert!(t.shares_store(&m));
        assert_eq!(t.row_names().unwrap(), m.col_names().unwrap());
        assert_eq!(t.get(1, 1).unwrap(), vec![3.0, 4.0, 5.0]);
        assert_eq!(t.get(0, 2).unwrap(), vec![6.0]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn test_mask() {
        let m = input_a();
        let e = Vec::<bool>::new();
        let mask = BumpyMatrix::from_entries(
            3,
            2,
            &[vec![false, true], e.clone(), vec![false], e, vec![true, false, true], vec![true]],
        )
        .unwrap();
        let masked = m.mask(&mask).unwrap();
        assert_eq!(masked.dim(), (3, 2));
        assert_eq!(masked.get(0, 0).unwrap(), vec![2.0]);
        assert_eq!(masked.get(2, 0).unwrap(), Vec::<f64>::new());
        assert_eq!(masked.entry_range(2, 0).unwrap(), None);
        assert_eq!(masked.get(1, 1).unwrap(), vec![3.0, 5.0]);
        assert_eq!(masked.nnz(), 3);
        assert_eq!(masked.values(), &[2.0, 3.0, 5.0, 7.0]);
        assert_eq!(masked.row_names(), m.row_names());

        // wrong per-entry length
        let entries = [vec![true], vec![], vec![true], vec![], vec![true; 3], vec![true]];
        let short = BumpyMatrix::from_entries(3, 2, &entries).unwrap();
        assert!(matches!(
            m.mask(&short),
            Err(BumpyError::LengthMismatch { expected: 2, found: 1, .. })
        ));

        // mask entry where the data is empty
        let extra = BumpyMatrix::from_entries(
            3,
            2,
            &[vec![true; 2], vec![true], vec![true], vec![], vec![true; 3], vec![true]],
        )
        .unwrap();
        assert!(matches!(m.mask(&extra), Err(BumpyError::LengthMismatch { .. })));

        let wrong_shape = mask.transpose();
        assert!(matches!(m.mask(&wrong_shape), Err(BumpyError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_assign() {
        let m = input_a();
        let value = BumpyMatrix::from_entries(2, 1, &[vec![10.0], vec![]]).unwrap();
        let out = m
            .assign(&Selector::from(vec!["b", "a"]), &Selector::from("x"), &value)
            .unwrap();
        assert_eq!(out.get(1, 0).unwrap(), vec![10.0]);
        assert_eq!(out.get(0, 0).unwrap(), Vec::<f64>::new());
        assert_eq!(out.get(2, 0).unwrap(), vec![6.0]);
        assert_eq!(out.get(1, 1).unwrap(), vec![3.0, 4.0, 5.0]);
        assert!(out.index().is_canonical());
        // input untouched
        assert_eq!(m.get(0, 0).unwrap(), vec![1.0, 2.0]);

        let bad = m.assign(&Selector::All, &Selector::from(0), &value);
        assert!(matches!(bad, Err(BumpyError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_flatten() {
        let m = input_a();
        let (values, rows, cols) = m.transpose().flatten();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(rows, vec![0, 0, 1, 1, 1, 0, 1]);
        assert_eq!(cols, vec![0, 0, 1, 1, 1, 2, 2]);
    }

    #[test]
    fn test_frame_fields() {
        let frame = Frame::new(vec![
            ("x".to_string(), Column::F64(vec![1.0, 2.0, 3.0])),
            ("id".to_string(), Column::I32(vec![7, 8, 9])),
        ])
        .unwrap();
        let m = BumpyMatrix::from_entries(
            2,
            1,
            &[frame.slice_range(0, 2), frame.slice_range(2, 3)],
        )
        .unwrap();
        assert_eq!(m.kind(), ElementKind::Tabular);
        assert_eq!(m.get(1, 0).unwrap().nrow(), 1);

        let x = m.field_f64("x").unwrap();
        assert_eq!(x.get(0, 0).unwrap(), vec![1.0, 2.0]);
        assert_eq!(x.index(), m.index());
        let id = m.field("id").unwrap();
        assert_eq!(id.get(1, 0).unwrap(), Column::I32(vec![9]));
        assert_eq!(m.field_i32("id").unwrap().get(1, 0).unwrap(), vec![9]);

        assert!(matches!(m.field_bool("x"), Err(BumpyError::TypeMismatch { .. })));
        assert!(matches!(m.field_str("nope"), Err(BumpyError::NameResolutionFailure { .. })));

        let empty = m.mask(&BumpyMatrix::from_entries(2, 1, &[vec![false, false], vec![false]]).unwrap()).unwrap();
        assert_eq!(empty.nnz(), 0);
        assert_eq!(empty.get(0, 0).unwrap().names(), frame.names());

        let mixed = BumpyMatrix::from_entries(2, 1, &[Column::F64(vec![1.0]), Column::I32(vec![2])]);
        assert!(matches!(mixed, Err(BumpyError::TypeMismatch { .. })));
    }

    #[test]
    fn test_slice_composition() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        for _ in 0..20 {
            let nrow = rng.gen_range(1..30);
            let ncol = rng.gen_range(1..30);
            let m = random_bumpy_mat(&mut rng, nrow, ncol, 0.3, 5);

            let rows = (&mut rng).sample_iter(Uniform::new(0, nrow)).take(10).collect::<Vec<_>>();
            let cols = (&mut rng).sample_iter(Uniform::new(0, ncol)).take(10).collect::<Vec<_>>();
            let row_sel = Selector::from(rows.clone());
            let col_sel = Selector::from(cols.clone());

            let two_step = m.subset_rows(&row_sel).unwrap().subset_cols(&col_sel).unwrap();
            let one_step = m.subset(&row_sel, &col_sel).unwrap();
            assert_eq!(two_step, one_step);
            assert_eq!(one_step.compact(), one_step);

            for (i, &r) in rows.iter().enumerate() {
                for (j, &c) in cols.iter().enumerate() {
                    assert_eq!(one_step.get(i, j).unwrap(), m.get(r, c).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_transpose_involution_and_masking() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        for _ in 0..20 {
            let nrow = rng.gen_range(0..25);
            let ncol = rng.gen_range(0..25);
            let m = random_bumpy_mat(&mut rng, nrow, ncol, 0.4, 6);
            assert_eq!(m.transpose().transpose(), m);

            let mask = random_mask(&mut rng, &m);
            let masked = m.mask(&mask).unwrap();
            for (r, c, keep) in mask.iter() {
                let data = m.get(r, c).unwrap();
                let expect = data
                    .iter()
                    .zip(keep.iter())
                    .filter(|(_, &k)| k)
                    .map(|(&v, _)| v)
                    .collect::<Vec<_>>();
                assert_eq!(masked.entry_len(r, c).unwrap(), keep.iter().filter(|&&k| k).count());
                assert_eq!(masked.get(r, c).unwrap(), expect);
            }
        }
    }
}
