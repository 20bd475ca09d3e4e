//! Minimal column store used as the tabular entry type of a bumpy matrix.
//!
//! Only what the matrix needs is provided: row count, row gathering, row
//! concatenation and projection onto a single named field.

use crate::error::{Axis, BumpyError, Result};
use crate::store::{ElementKind, VectorLike};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single typed column of a `Frame`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    /// floating point column
    F64(Vec<f64>),
    /// integer column
    I32(Vec<i32>),
    /// boolean column
    Bool(Vec<bool>),
    /// string column
    Str(Vec<String>),
}

macro_rules! col_expand {
    ($col:expr, $v:ident, $body:expr) => {
        match $col {
            Column::F64($v) => Column::F64($body),
            Column::I32($v) => Column::I32($body),
            Column::Bool($v) => Column::Bool($body),
            Column::Str($v) => Column::Str($body),
        }
    };
}

impl Column {
    /// Type name of the column, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Column::F64(_) => "f64",
            Column::I32(_) => "i32",
            Column::Bool(_) => "bool",
            Column::Str(_) => "str",
        }
    }

    fn same_type(&self, other: &Column) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Render every value as a string. Used when a column serves as a grouping key.
    pub fn to_strings(&self) -> Vec<String> {
        match self {
            Column::F64(v) => v.iter().map(ToString::to_string).collect(),
            Column::I32(v) => v.iter().map(ToString::to_string).collect(),
            Column::Bool(v) => v.iter().map(ToString::to_string).collect(),
            Column::Str(v) => v.clone(),
        }
    }
}

impl VectorLike for Column {
    fn kind(&self) -> ElementKind {
        match self {
            Column::F64(_) => ElementKind::Numeric,
            Column::I32(_) => ElementKind::Integer,
            Column::Bool(_) => ElementKind::Logical,
            Column::Str(_) => ElementKind::Character,
        }
    }

    fn len(&self) -> usize {
        match self {
            Column::F64(v) => v.len(),
            Column::I32(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    fn slice_range(&self, start: usize, end: usize) -> Self {
        col_expand!(self, v, v[start..end].to_vec())
    }

    fn select(&self, indices: &[usize]) -> Self {
        col_expand!(self, v, v.select(indices))
    }

    fn concat(parts: &[Self]) -> Self {
        let Some(first) = parts.first() else {
            return Column::F64(Vec::new());
        };
        let mut out = first.clone();
        for p in &parts[1..] {
            match (&mut out, p) {
                (Column::F64(a), Column::F64(b)) => a.extend_from_slice(b),
                (Column::I32(a), Column::I32(b)) => a.extend_from_slice(b),
                (Column::Bool(a), Column::Bool(b)) => a.extend_from_slice(b),
                (Column::Str(a), Column::Str(b)) => a.extend_from_slice(b),
                (a, b) => panic!("cannot concatenate {} column with {} column", a.type_name(), b.type_name()),
            }
        }
        out
    }

    fn compatible(&self, other: &Self) -> bool {
        self.same_type(other)
    }
}

/// Named, equal-length columns. Each row is one element of a bumpy matrix entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFrame", into = "RawFrame")]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    nrow: usize,
}

/// Serialized form of a `Frame`, validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawFrame {
    names: Vec<String>,
    columns: Vec<Column>,
    nrow: usize,
}

impl TryFrom<RawFrame> for Frame {
    type Error = BumpyError;

    fn try_from(raw: RawFrame) -> Result<Frame> {
        if raw.names.len() != raw.columns.len() {
            return Err(BumpyError::LengthMismatch {
                expected: raw.columns.len(),
                found: raw.names.len(),
                context: "frame field names".to_string(),
            });
        }
        check_columns(raw.names.iter().zip(raw.columns.iter()), raw.nrow)?;
        Ok(Frame {
            names: raw.names,
            columns: raw.columns,
            nrow: raw.nrow,
        })
    }
}

impl From<Frame> for RawFrame {
    fn from(f: Frame) -> RawFrame {
        RawFrame {
            names: f.names,
            columns: f.columns,
            nrow: f.nrow,
        }
    }
}

fn check_columns<'a>(columns: impl Iterator<Item = (&'a String, &'a Column)>, nrow: usize) -> Result<()> {
    let mut seen = HashSet::new();
    for (name, col) in columns {
        if col.len() != nrow {
            return Err(BumpyError::LengthMismatch {
                expected: nrow,
                found: col.len(),
                context: format!("frame column '{name}'"),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(BumpyError::InvalidNames {
                axis: Axis::Field,
                reason: format!("duplicated field '{name}'"),
            });
        }
    }
    Ok(())
}

impl Frame {
    /// Build a frame from `(name, column)` pairs. Columns must have equal length and
    /// unique names.
    pub fn new(columns: Vec<(String, Column)>) -> Result<Frame> {
        let nrow = columns.first().map_or(0, |(_, c)| c.len());
        check_columns(columns.iter().map(|(n, c)| (n, c)), nrow)?;
        let (names, columns) = columns.into_iter().unzip();
        Ok(Frame { names, columns, nrow })
    }

    /// Number of rows
    pub fn nrow(&self) -> usize {
        self.nrow
    }

    /// Field names, in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names.iter().position(|n| n == name).map(|i| &self.columns[i])
    }

    /// Like `column`, failing with `NameResolutionFailure` when absent
    pub fn try_column(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| BumpyError::NameResolutionFailure {
            name: name.to_string(),
            axis: Axis::Field,
        })
    }

    /// Frame without the named columns. Unknown names are an error.
    pub fn drop_columns(&self, drop: &[&str]) -> Result<Frame> {
        for name in drop {
            self.try_column(name)?;
        }
        let (names, columns) = self
            .names
            .iter()
            .zip(self.columns.iter())
            .filter(|(n, _)| !drop.contains(&n.as_str()))
            .map(|(n, c)| (n.clone(), c.clone()))
            .unzip();
        Ok(Frame {
            names,
            columns,
            nrow: self.nrow,
        })
    }
}

impl VectorLike for Frame {
    fn kind(&self) -> ElementKind {
        ElementKind::Tabular
    }

    fn len(&self) -> usize {
        self.nrow
    }

    fn slice_range(&self, start: usize, end: usize) -> Self {
        Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.slice_range(start, end)).collect(),
            nrow: end - start,
        }
    }

    fn select(&self, indices: &[usize]) -> Self {
        Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(indices)).collect(),
            nrow: indices.len(),
        }
    }

    fn concat(parts: &[Self]) -> Self {
        let Some(first) = parts.first() else {
            return Frame::default();
        };
        let columns = (0..first.columns.len())
            .map(|i| Column::concat(&parts.iter().map(|p| p.columns[i].clone()).collect::<Vec<_>>()))
            .collect();
        Frame {
            names: first.names.clone(),
            columns,
            nrow: parts.iter().map(|p| p.nrow).sum(),
        }
    }

    fn compatible(&self, other: &Self) -> bool {
        self.names == other.names
            && self
                .columns
                .iter()
                .zip(other.columns.iter())
                .all(|(a, b)| a.same_type(b))
    }
}
