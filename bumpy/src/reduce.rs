//! Per-entry summaries of a bumpy matrix, as ordinary dense or sparse matrices.

use crate::matrix::BumpyMatrix;
use crate::ops::Numeric;
use crate::store::{Element, VectorLike};
use ndarray::Array2;
use num_traits::ToPrimitive;
use sprs::CsMat;

impl<V: VectorLike> BumpyMatrix<V> {
    /// Length of every entry; 0 for unoccupied coordinates.
    pub fn lengths(&self) -> Array2<usize> {
        let mut out = Array2::zeros(self.dim());
        for (r, c, range) in self.index.iter() {
            out[(r, c)] = range.len();
        }
        out
    }

    /// Entry lengths as a sparse CSC matrix with the same occupancy as `self`.
    pub fn lengths_sparse(&self) -> CsMat<usize> {
        let idx = &self.index;
        let data = idx.starts().iter().zip(idx.ends()).map(|(s, e)| e - s).collect();
        CsMat::new_csc(self.dim(), idx.colptr().to_vec(), idx.row_indices().to_vec(), data)
    }

    /// Apply `f` to every occupied entry; unoccupied coordinates get `fill`.
    pub fn reduce<O, F>(&self, fill: O, mut f: F) -> Array2<O>
    where
        O: Clone,
        F: FnMut(&V) -> O,
    {
        let mut out = Array2::from_elem(self.dim(), fill);
        for (r, c, range) in self.index.iter() {
            out[(r, c)] = f(&self.store.slice_range(range.start, range.end));
        }
        out
    }
}

impl<T: Element> BumpyMatrix<Vec<T>> {
    /// Like `reduce`, but `f` borrows each entry instead of receiving a copy.
    pub fn reduce_slices<O, F>(&self, fill: O, mut f: F) -> Array2<O>
    where
        O: Clone,
        F: FnMut(&[T]) -> O,
    {
        let mut out = Array2::from_elem(self.dim(), fill);
        let values = self.values();
        for (r, c, range) in self.index.iter() {
            out[(r, c)] = f(&values[range]);
        }
        out
    }
}

fn to_f64<T: Numeric>(v: &T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

impl<T: Numeric> BumpyMatrix<Vec<T>> {
    /// Sum of every entry; 0 for empty entries
    pub fn sums(&self) -> Array2<f64> {
        self.reduce_slices(0.0, |s| s.iter().map(to_f64).sum())
    }

    /// Mean of every entry; NaN for empty entries
    pub fn means(&self) -> Array2<f64> {
        self.reduce_slices(f64::NAN, |s| s.iter().map(to_f64).sum::<f64>() / s.len() as f64)
    }

    /// Maximum of every entry; NaN for empty entries
    pub fn maxs(&self) -> Array2<f64> {
        self.reduce_slices(f64::NAN, |s| s.iter().map(to_f64).fold(f64::NEG_INFINITY, f64::max))
    }

    /// Minimum of every entry; NaN for empty entries
    pub fn mins(&self) -> Array2<f64> {
        self.reduce_slices(f64::NAN, |s| s.iter().map(to_f64).fold(f64::INFINITY, f64::min))
    }
}

impl BumpyMatrix<Vec<bool>> {
    /// Whether any element of each entry is true; false for empty entries
    pub fn any(&self) -> Array2<bool> {
        self.reduce_slices(false, |s| s.iter().any(|&b| b))
    }

    /// Whether every element of each entry is true; true for empty entries
    pub fn all(&self) -> Array2<bool> {
        self.reduce_slices(true, |s| s.iter().all(|&b| b))
    }
}
