//! Flat interchange layout of a bumpy matrix: the values of every entry back to back,
//! plus per-entry coordinates and ranges. This is what gets written to disk.

use crate::error::{Axis, BumpyError, Result};
use crate::index::ViewIndex;
use crate::matrix::BumpyMatrix;
use crate::store::{ElementKind, VectorLike};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Triplet form: one `(row, col, start, end)` per occupied entry, in column-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumpyParts<V> {
    /// element kind of `values`
    pub kind: ElementKind,
    /// number of rows
    pub nrow: usize,
    /// number of columns
    pub ncol: usize,
    /// row names
    #[serde(default)]
    pub row_names: Option<Vec<String>>,
    /// column names
    #[serde(default)]
    pub col_names: Option<Vec<String>>,
    /// flat values
    pub values: V,
    /// row of each entry
    pub rows: Vec<usize>,
    /// column of each entry
    pub cols: Vec<usize>,
    /// start of each entry in `values`
    pub starts: Vec<usize>,
    /// end (exclusive) of each entry in `values`
    pub ends: Vec<usize>,
}

/// Compressed sparse column form of the same layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CscParts<V> {
    /// element kind of `values`
    pub kind: ElementKind,
    /// number of rows
    pub nrow: usize,
    /// row names
    #[serde(default)]
    pub row_names: Option<Vec<String>>,
    /// column names
    #[serde(default)]
    pub col_names: Option<Vec<String>>,
    /// flat values
    pub values: V,
    /// column pointers, length `ncol + 1`
    pub colptr: Vec<usize>,
    /// row of each entry
    pub row_indices: Vec<usize>,
    /// start of each entry in `values`
    pub starts: Vec<usize>,
    /// end (exclusive) of each entry in `values`
    pub ends: Vec<usize>,
}

fn check_kind<V: VectorLike>(kind: ElementKind, values: &V) -> Result<()> {
    if values.kind() != kind {
        return Err(BumpyError::TypeMismatch {
            field: "values".to_string(),
            expected: kind.name().to_string(),
            found: values.kind().name().to_string(),
        });
    }
    Ok(())
}

fn check_name_len(names: &Option<Vec<String>>, extent: usize, axis: Axis) -> Result<()> {
    match names {
        Some(n) if n.len() != extent => Err(BumpyError::InvalidNames {
            axis,
            reason: format!("expected {} names, got {}", extent, n.len()),
        }),
        _ => Ok(()),
    }
}

impl<V: VectorLike> BumpyMatrix<V> {
    /// Decompose into triplet parts. The values are compacted first, so `values` holds
    /// exactly the entries in column-major order.
    pub fn to_parts(&self) -> BumpyParts<V> {
        let m = self.compact();
        let idx = &m.index;
        let cols = idx.iter().map(|(_, c, _)| c).collect();
        BumpyParts {
            kind: m.kind(),
            nrow: m.nrow(),
            ncol: m.ncol(),
            row_names: m.row_names.clone(),
            col_names: m.col_names.clone(),
            values: (*m.store).clone(),
            rows: idx.row_indices().to_vec(),
            cols,
            starts: idx.starts().to_vec(),
            ends: idx.ends().to_vec(),
        }
    }

    /// Assemble from triplet parts, in any entry order. The layout is validated: see
    /// `ViewIndex::from_triplets`.
    pub fn from_parts(parts: BumpyParts<V>) -> Result<BumpyMatrix<V>> {
        check_kind(parts.kind, &parts.values)?;
        check_name_len(&parts.row_names, parts.nrow, Axis::Row)?;
        check_name_len(&parts.col_names, parts.ncol, Axis::Col)?;
        let index = ViewIndex::from_triplets(
            parts.nrow,
            parts.ncol,
            &parts.rows,
            &parts.cols,
            &parts.starts,
            &parts.ends,
            parts.values.len(),
        )?;
        Ok(BumpyMatrix::from_raw(
            index,
            Rc::new(parts.values),
            parts.row_names,
            parts.col_names,
        ))
    }

    /// Decompose into compressed sparse column parts, compacting first.
    pub fn to_csc_parts(&self) -> CscParts<V> {
        let m = self.compact();
        let idx = &m.index;
        CscParts {
            kind: m.kind(),
            nrow: m.nrow(),
            row_names: m.row_names.clone(),
            col_names: m.col_names.clone(),
            values: (*m.store).clone(),
            colptr: idx.colptr().to_vec(),
            row_indices: idx.row_indices().to_vec(),
            starts: idx.starts().to_vec(),
            ends: idx.ends().to_vec(),
        }
    }

    /// Assemble from compressed sparse column parts, with the same validation as
    /// `from_parts`.
    pub fn from_csc_parts(parts: CscParts<V>) -> Result<BumpyMatrix<V>> {
        check_kind(parts.kind, &parts.values)?;
        let index = ViewIndex::from_csc(
            parts.nrow,
            &parts.colptr,
            &parts.row_indices,
            &parts.starts,
            &parts.ends,
            parts.values.len(),
        )?;
        check_name_len(&parts.row_names, index.nrow(), Axis::Row)?;
        check_name_len(&parts.col_names, index.ncol(), Axis::Col)?;
        Ok(BumpyMatrix::from_raw(
            index,
            Rc::new(parts.values),
            parts.row_names,
            parts.col_names,
        ))
    }
}
