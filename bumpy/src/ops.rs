//! Elementwise operations between bumpy matrices, scalars and vectors.
//!
//! Within each entry, the shorter operand is recycled to the length of the longer
//! one. An entry that is empty in either operand is empty in the result.

use crate::error::{length_mismatch, BumpyError, Result};
use crate::index::IndexBuilder;
use crate::matrix::BumpyMatrix;
use crate::store::Element;
use log::warn;
use num_traits::ToPrimitive;
use serde::Deserialize;
use std::rc::Rc;

/// What to do when an entry's longer length is not a multiple of the shorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecyclePolicy {
    /// recycle anyway and log a warning
    #[default]
    Warn,
    /// fail with `LengthMismatch`
    Strict,
}

/// Parameters for the elementwise engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// handling of uneven recycling
    pub recycle: RecyclePolicy,
}

impl EngineOptions {
    /// Default options: uneven recycling warns
    pub fn new() -> EngineOptions {
        EngineOptions {
            recycle: RecyclePolicy::Warn,
        }
    }

    /// Options that reject uneven recycling
    pub fn strict() -> EngineOptions {
        EngineOptions {
            recycle: RecyclePolicy::Strict,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// One side of an elementwise operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a, T> {
    /// a bumpy matrix; its entries are combined entry by entry
    Matrix(&'a BumpyMatrix<Vec<T>>),
    /// a single value applied to every element
    Scalar(&'a T),
    /// a vector of length 1, `nrow` (value `v[r]` applies to the entries of row `r`)
    /// or `nrow * ncol` (one value per entry, column-major). To align a vector with
    /// columns instead, transpose the matrix first.
    Vector(&'a [T]),
}

impl<'a, T: Element> Operand<'a, T> {
    fn matrix(&self) -> Option<&'a BumpyMatrix<Vec<T>>> {
        match *self {
            Operand::Matrix(m) => Some(m),
            _ => None,
        }
    }
}

/// An operand together with the shape it is applied against.
struct Side<'a, T> {
    operand: Operand<'a, T>,
    nrow: usize,
}

impl<'a, T: Element> Side<'a, T> {
    fn new(operand: Operand<'a, T>, nrow: usize, ncol: usize) -> Result<Side<'a, T>> {
        if let Operand::Vector(v) = operand {
            if v.len() != 1 && v.len() != nrow && v.len() != nrow * ncol {
                return Err(length_mismatch(nrow, v.len(), "vector operand"));
            }
        }
        Ok(Side { operand, nrow })
    }

    /// Values this side contributes at `(row, col)`; `None` for an empty matrix entry.
    fn at(&self, row: usize, col: usize) -> Option<&'a [T]> {
        match self.operand {
            Operand::Matrix(m) => m.index.get(row, col).map(|r| &m.values()[r]),
            Operand::Scalar(x) => Some(std::slice::from_ref(x)),
            Operand::Vector(v) => {
                let i = if v.len() == 1 {
                    0
                } else if v.len() == self.nrow {
                    row
                } else {
                    col * self.nrow + row
                };
                Some(&v[i..i + 1])
            }
        }
    }
}

/// Apply `f` elementwise to two operands, at least one of which is a matrix.
///
/// The result has the shape and names of the first matrix operand. When both
/// operands are matrices they must have the same shape, and only coordinates
/// occupied in both produce an entry.
pub fn binary<A, B, O, F>(
    lhs: Operand<A>,
    rhs: Operand<B>,
    options: &EngineOptions,
    f: F,
) -> Result<BumpyMatrix<Vec<O>>>
where
    A: Element,
    B: Element,
    O: Element,
    F: FnMut(&A, &B) -> O,
{
    let (out, uneven) = combine(lhs, rhs, options, f)?;
    if uneven > 0 {
        warn!("longer object length is not a multiple of shorter object length in {uneven} entries");
    }
    Ok(out)
}

/// `binary` without the diagnostic; also returns the number of unevenly recycled entries.
fn combine<A, B, O, F>(
    lhs: Operand<A>,
    rhs: Operand<B>,
    options: &EngineOptions,
    mut f: F,
) -> Result<(BumpyMatrix<Vec<O>>, usize)>
where
    A: Element,
    B: Element,
    O: Element,
    F: FnMut(&A, &B) -> O,
{
    let (dim, index, row_names, col_names) = match (lhs.matrix(), rhs.matrix()) {
        (Some(a), Some(b)) => {
            if a.dim() != b.dim() {
                return Err(BumpyError::DimensionMismatch {
                    left: a.dim(),
                    right: b.dim(),
                });
            }
            (a.dim(), &a.index, &a.row_names, &a.col_names)
        }
        (Some(a), None) => (a.dim(), &a.index, &a.row_names, &a.col_names),
        (None, Some(b)) => (b.dim(), &b.index, &b.row_names, &b.col_names),
        (None, None) => return Err(BumpyError::NoMatrixOperand),
    };
    let (nrow, ncol) = dim;
    let left = Side::new(lhs, nrow, ncol)?;
    let right = Side::new(rhs, nrow, ncol)?;

    let mut builder = IndexBuilder::new(nrow, ncol);
    let mut out: Vec<O> = Vec::new();
    let mut uneven = 0usize;
    for (r, c, _) in index.iter() {
        let (Some(x), Some(y)) = (left.at(r, c), right.at(r, c)) else {
            continue;
        };
        let (a, b) = (x.len(), y.len());
        let n = a.max(b);
        if n % a != 0 || n % b != 0 {
            match options.recycle {
                RecyclePolicy::Strict => {
                    return Err(length_mismatch(n, a.min(b), format!("recycling entry ({r}, {c})")));
                }
                RecyclePolicy::Warn => uneven += 1,
            }
        }
        let start = out.len();
        out.extend((0..n).map(|k| f(&x[k % a], &y[k % b])));
        builder.push(r, c, start..out.len());
    }

    let m = BumpyMatrix::from_raw(builder.finish(), Rc::new(out), row_names.clone(), col_names.clone());
    Ok((m, uneven))
}

/// Apply `f` to every element, keeping the occupancy of `m`.
pub fn map_values<T, O, F>(m: &BumpyMatrix<Vec<T>>, mut f: F) -> BumpyMatrix<Vec<O>>
where
    T: Element,
    O: Element,
    F: FnMut(&T) -> O,
{
    let mut builder = IndexBuilder::new(m.nrow(), m.ncol());
    let mut out = Vec::with_capacity(m.index.total_len());
    for (r, c, range) in m.index.iter() {
        let start = out.len();
        out.extend(m.values()[range].iter().map(&mut f));
        builder.push(r, c, start..out.len());
    }
    BumpyMatrix::from_raw(builder.finish(), Rc::new(out), m.row_names.clone(), m.col_names.clone())
}

/// Element types usable in arithmetic. Values are promoted to `f64`.
pub trait Numeric: Element + ToPrimitive {}

impl Numeric for f64 {}
impl Numeric for f32 {}
impl Numeric for i32 {}
impl Numeric for i64 {}
impl Numeric for u32 {}

fn as_f64<T: Numeric>(v: &T) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithOp {
    /// a + b
    Add,
    /// a - b
    Sub,
    /// a * b
    Mul,
    /// a / b
    Div,
    /// a raised to b
    Pow,
    /// floored modulus; the result has the sign of b
    Rem,
    /// floored division
    IntDiv,
}

impl ArithOp {
    /// Apply to a pair of values
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
            ArithOp::Div => a / b,
            ArithOp::Pow => a.powf(b),
            ArithOp::Rem => a - (a / b).floor() * b,
            ArithOp::IntDiv => (a / b).floor(),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    /// a == b
    Eq,
    /// a != b
    Ne,
    /// a < b
    Lt,
    /// a <= b
    Le,
    /// a > b
    Gt,
    /// a >= b
    Ge,
}

impl CompareOp {
    /// Apply to a pair of values
    pub fn apply<T: PartialOrd>(self, a: &T, b: &T) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
        }
    }
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicOp {
    /// a && b
    And,
    /// a || b
    Or,
    /// a != b
    Xor,
}

impl LogicOp {
    /// Apply to a pair of values
    pub fn apply(self, a: bool, b: bool) -> bool {
        match self {
            LogicOp::And => a && b,
            LogicOp::Or => a || b,
            LogicOp::Xor => a ^ b,
        }
    }
}

/// Elementwise arithmetic; the result is always numeric (`f64`).
pub fn arith<A: Numeric, B: Numeric>(
    lhs: Operand<A>,
    op: ArithOp,
    rhs: Operand<B>,
    options: &EngineOptions,
) -> Result<BumpyMatrix<Vec<f64>>> {
    binary(lhs, rhs, options, |a, b| op.apply(as_f64(a), as_f64(b)))
}

/// Elementwise comparison; the result is always logical.
pub fn compare<T: Element + PartialOrd>(
    lhs: Operand<T>,
    op: CompareOp,
    rhs: Operand<T>,
    options: &EngineOptions,
) -> Result<BumpyMatrix<Vec<bool>>> {
    binary(lhs, rhs, options, |a, b| op.apply(a, b))
}

/// Elementwise logical combination
pub fn logic(
    lhs: Operand<bool>,
    op: LogicOp,
    rhs: Operand<bool>,
    options: &EngineOptions,
) -> Result<BumpyMatrix<Vec<bool>>> {
    binary(lhs, rhs, options, |&a, &b| op.apply(a, b))
}

/// Elementwise negation
pub fn not(m: &BumpyMatrix<Vec<bool>>) -> BumpyMatrix<Vec<bool>> {
    map_values(m, |b| !b)
}
