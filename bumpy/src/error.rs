use std::fmt;
use thiserror::Error;

/// Which axis of a matrix an index or name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Row axis
    Row,
    /// Column axis
    Col,
    /// Column-major linear position over all entries
    Linear,
    /// Field of a tabular entry
    Field,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Axis::Row => "row",
            Axis::Col => "column",
            Axis::Linear => "linear",
            Axis::Field => "field",
        };
        write!(f, "{msg}")
    }
}

/// Errors raised by bumpy matrix operations. None of them leave a partial result behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BumpyError {
    /// Operands have incompatible dimensions
    #[error("dimension mismatch: {left:?} vs {right:?}")]
    DimensionMismatch {
        /// (rows, cols) of the left operand
        left: (usize, usize),
        /// (rows, cols) of the right operand
        right: (usize, usize),
    },

    /// A selector does not resolve to a valid position
    #[error("{axis} index {index} out of range for extent {extent}")]
    IndexOutOfRange {
        /// offending index (or mask length)
        index: usize,
        /// extent of the axis
        extent: usize,
        /// axis being indexed
        axis: Axis,
    },

    /// Per-entry or per-operand lengths are incompatible
    #[error("length mismatch in {context}: expected {expected}, found {found}")]
    LengthMismatch {
        /// expected length
        expected: usize,
        /// length actually supplied
        found: usize,
        /// where the mismatch happened
        context: String,
    },

    /// A row or column name is not present
    #[error("{axis} name '{name}' not found")]
    NameResolutionFailure {
        /// requested name
        name: String,
        /// axis being indexed
        axis: Axis,
    },

    /// Names supplied for an axis are invalid (wrong length or duplicated)
    #[error("invalid {axis} names: {reason}")]
    InvalidNames {
        /// axis the names belong to
        axis: Axis,
        /// why they were rejected
        reason: String,
    },

    /// A tabular field has a different element type than requested
    #[error("field '{field}' has type {found}, expected {expected}")]
    TypeMismatch {
        /// field name
        field: String,
        /// requested element kind
        expected: String,
        /// actual element kind
        found: String,
    },

    /// Parts handed to an assembly routine violate the view index invariants
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// An elementwise operation was called without any matrix operand
    #[error("elementwise operation requires at least one matrix operand")]
    NoMatrixOperand,
}

/// Result type for bumpy operations
pub type Result<T> = std::result::Result<T, BumpyError>;

pub(crate) fn length_mismatch(expected: usize, found: usize, context: impl Into<String>) -> BumpyError {
    BumpyError::LengthMismatch {
        expected,
        found,
        context: context.into(),
    }
}
