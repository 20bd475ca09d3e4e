use crate::error::{length_mismatch, Axis, BumpyError, Result};
use crate::frame::Frame;
use crate::index::IndexBuilder;
use crate::matrix::{check_names, BumpyMatrix};
use crate::store::VectorLike;
use itertools::Itertools;
use log::info;
use serde::Deserialize;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

/// How the distinct keys of an axis are ordered to become its names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrder {
    /// lexicographic order
    #[default]
    Sorted,
    /// order of first appearance in the input
    FirstSeen,
}

/// Parameters for `split_into_matrix`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// ordering of discovered keys, when levels are not given
    pub key_order: KeyOrder,
    /// explicit row names; keys outside this set are an error
    pub row_levels: Option<Vec<String>>,
    /// explicit column names; keys outside this set are an error
    pub col_levels: Option<Vec<String>>,
}

impl SplitOptions {
    /// Default options: sorted keys, levels discovered from the data
    pub fn new() -> SplitOptions {
        SplitOptions {
            key_order: KeyOrder::Sorted,
            row_levels: None,
            col_levels: None,
        }
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self::new()
    }
}

fn key_str<K: AsRef<str>>(k: &K) -> &str {
    k.as_ref()
}

/// Distinct levels of `keys` and the level code of every key.
fn encode_keys<K: AsRef<str>>(
    keys: &[K],
    levels: Option<&[String]>,
    order: KeyOrder,
    axis: Axis,
) -> Result<(Vec<String>, Vec<usize>)> {
    let levels: Vec<String> = match levels {
        Some(l) => {
            check_names(l, l.len(), axis)?;
            l.to_vec()
        }
        None => match order {
            KeyOrder::Sorted => keys.iter().map(key_str).sorted_unstable().dedup().map(String::from).collect(),
            KeyOrder::FirstSeen => keys.iter().map(key_str).unique().map(String::from).collect(),
        },
    };

    let lookup: HashMap<&str, usize> = levels.iter().enumerate().map(|(i, l)| (l.as_str(), i)).collect();
    let codes = keys
        .iter()
        .map(|k| {
            lookup
                .get(key_str(k))
                .copied()
                .ok_or_else(|| BumpyError::NameResolutionFailure {
                    name: key_str(k).to_string(),
                    axis,
                })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((levels, codes))
}

/// Group `values` by `(row_keys[i], col_keys[i])` into a bumpy matrix.
///
/// Distinct row keys become the row names and distinct column keys the column names.
/// Each non-empty group becomes one entry holding its values in their original
/// relative order; entries are laid out back to back in column-major order. Groups
/// without observations are not stored.
pub fn split_into_matrix<V, K>(
    values: &V,
    row_keys: &[K],
    col_keys: &[K],
    options: &SplitOptions,
) -> Result<BumpyMatrix<V>>
where
    V: VectorLike,
    K: AsRef<str>,
{
    let tick = Instant::now();
    let n = values.len();
    if row_keys.len() != n {
        return Err(length_mismatch(n, row_keys.len(), "row keys"));
    }
    if col_keys.len() != n {
        return Err(length_mismatch(n, col_keys.len(), "column keys"));
    }

    let (row_names, row_codes) = encode_keys(row_keys, options.row_levels.as_deref(), options.key_order, Axis::Row)?;
    let (col_names, col_codes) = encode_keys(col_keys, options.col_levels.as_deref(), options.key_order, Axis::Col)?;

    // stable: observations keep their relative order within a group
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| (col_codes[i], row_codes[i]));

    let mut builder = IndexBuilder::new(row_names.len(), col_names.len());
    let mut pos = 0;
    for (count, (c, r)) in order.iter().map(|&i| (col_codes[i], row_codes[i])).dedup_with_count() {
        builder.push(r, c, pos..pos + count);
        pos += count;
    }
    let index = builder.finish();

    info!(
        "split {} observations into a {}x{} bumpy matrix with {} occupied entries in {:.3}s",
        n,
        row_names.len(),
        col_names.len(),
        index.nnz(),
        tick.elapsed().as_secs_f64()
    );

    Ok(BumpyMatrix::from_raw(
        index,
        Rc::new(values.select(&order)),
        Some(row_names),
        Some(col_names),
    ))
}

/// Split a frame using two of its columns as keys. The key columns are dropped from
/// the entries; any column type can serve as a key.
pub fn split_frame(
    frame: &Frame,
    row_field: &str,
    col_field: &str,
    options: &SplitOptions,
) -> Result<BumpyMatrix<Frame>> {
    let row_keys = frame.try_column(row_field)?.to_strings();
    let col_keys = frame.try_column(col_field)?.to_strings();
    let values = frame.drop_columns(&[row_field, col_field])?;
    split_into_matrix(&values, &row_keys, &col_keys, options)
}
