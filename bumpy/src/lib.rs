//! # Bumpy: compressed ragged matrices.
//!
//! A bumpy matrix is a two-dimensional array whose entries are variable-length
//! vectors: numbers, booleans, strings or row slices of a table. Grouping a long
//! table of observations by two keys (say gene and cell) gives one.
//!
//! Entries are not stored separately. All values live back to back in one flat store,
//! and a compressed-sparse-column index maps each occupied `(row, col)` to its
//! `[start, end)` range in that store. Empty entries cost nothing, so memory grows with
//! the number of occupied entries rather than `rows * cols`.
//!
//! - Slicing and transposition only rewrite the index; the store is shared.
//! - Elementwise operations recycle the shorter operand within each entry.
//! - Per-entry summaries come back as plain `ndarray` or `sprs` matrices.

#![warn(missing_docs)]

/// Error type shared by all operations
pub mod error;

/// Flat value stores: the `VectorLike` capability and its vector implementations
pub mod store;

/// Minimal column-oriented table usable as a flat store
pub mod frame;

/// Compressed sparse column map from occupied coordinates to store ranges
pub mod index;

/// Row and column selection by position, name or mask
pub mod selector;

/// The bumpy matrix container
pub mod matrix;

/// One-dimensional lists of entries
pub mod list;

/// Construction by grouping observations on two keys
pub mod split;

pub mod ops;

pub mod reduce;

/// Binding matrices by rows or columns
pub mod bind;

pub mod parts;

/// Methods for generating random bumpy matrices. Useful for testing.
pub mod gen_rand;

pub use bind::{cbind, rbind};
pub use error::{Axis, BumpyError, Result};
pub use frame::{Column, Frame};
pub use index::ViewIndex;
pub use list::BumpyList;
pub use matrix::BumpyMatrix;
pub use ops::{
    arith, binary, compare, logic, map_values, not, ArithOp, CompareOp, EngineOptions, LogicOp, Numeric, Operand,
    RecyclePolicy,
};
pub use parts::{BumpyParts, CscParts};
pub use selector::Selector;
pub use split::{split_frame, split_into_matrix, KeyOrder, SplitOptions};
pub use store::{Element, ElementKind, VectorLike};
