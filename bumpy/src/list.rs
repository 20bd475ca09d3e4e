use crate::error::{Axis, BumpyError, Result};
use crate::selector::name_lookup;
use crate::store::VectorLike;
use std::ops::Range;
use std::rc::Rc;

/// One-dimensional list of vector-like entries viewing a shared flat store.
/// Produced by extracting a row or column of a `BumpyMatrix`, or by `undim`.
#[derive(Clone, Debug)]
pub struct BumpyList<V> {
    store: Rc<V>,
    ranges: Vec<Range<usize>>,
    names: Option<Vec<String>>,
}

impl<V: VectorLike> BumpyList<V> {
    /// `None` ranges are empty entries.
    pub(crate) fn new(store: Rc<V>, ranges: Vec<Option<Range<usize>>>, names: Option<Vec<String>>) -> BumpyList<V> {
        let ranges = ranges.into_iter().map(|r| r.unwrap_or(0..0)).collect();
        BumpyList { store, ranges, names }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Entry names, if any
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// Entry at position `i`
    pub fn get(&self, i: usize) -> Result<V> {
        let r = self.ranges.get(i).ok_or(BumpyError::IndexOutOfRange {
            index: i,
            extent: self.len(),
            axis: Axis::Linear,
        })?;
        Ok(self.store.slice_range(r.start, r.end))
    }

    /// Entry with the given name
    pub fn get_named(&self, name: &str) -> Result<V> {
        let lookup = name_lookup(self.names.as_deref().unwrap_or(&[]));
        let i = lookup.get(name).copied().ok_or_else(|| BumpyError::NameResolutionFailure {
            name: name.to_string(),
            axis: Axis::Linear,
        })?;
        self.get(i)
    }

    /// Iterate over entries, in order
    pub fn iter(&self) -> impl Iterator<Item = V> + '_ {
        self.ranges.iter().map(|r| self.store.slice_range(r.start, r.end))
    }

    /// Length of every entry
    pub fn lengths(&self) -> Vec<usize> {
        self.ranges.iter().map(|r| r.end - r.start).collect()
    }

    /// All entries concatenated into one collection
    pub fn unlist(&self) -> V {
        let picks = self.ranges.iter().flat_map(|r| r.clone()).collect::<Vec<_>>();
        self.store.select(&picks)
    }
}
