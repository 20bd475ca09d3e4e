use crate::error::{Axis, BumpyError, Result};
use std::collections::HashMap;

/// Selection along one axis of a matrix.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Selector {
    /// Every position, in order
    #[default]
    All,
    /// Explicit positions; may repeat and be in any order
    Positions(Vec<usize>),
    /// Row or column names, resolved against the matrix dimnames
    Names(Vec<String>),
    /// Boolean mask with one value per position
    Mask(Vec<bool>),
}

impl Selector {
    /// Select by names
    pub fn names<S: AsRef<str>>(names: &[S]) -> Selector {
        Selector::Names(names.iter().map(|s| s.as_ref().to_string()).collect())
    }

    /// Resolve to positions along an axis of length `extent`, with optional `names`.
    pub fn resolve(&self, extent: usize, names: Option<&[String]>, axis: Axis) -> Result<Vec<usize>> {
        match self {
            Selector::All => Ok((0..extent).collect()),
            Selector::Positions(p) => {
                if let Some(&bad) = p.iter().find(|&&i| i >= extent) {
                    return Err(BumpyError::IndexOutOfRange {
                        index: bad,
                        extent,
                        axis,
                    });
                }
                Ok(p.clone())
            }
            Selector::Mask(m) => {
                if m.len() != extent {
                    return Err(BumpyError::IndexOutOfRange {
                        index: m.len(),
                        extent,
                        axis,
                    });
                }
                Ok(m.iter().enumerate().filter(|(_, &keep)| keep).map(|(i, _)| i).collect())
            }
            Selector::Names(wanted) => {
                let lookup = name_lookup(names.unwrap_or(&[]));
                wanted
                    .iter()
                    .map(|n| {
                        lookup.get(n.as_str()).copied().ok_or_else(|| BumpyError::NameResolutionFailure {
                            name: n.clone(),
                            axis,
                        })
                    })
                    .collect()
            }
        }
    }
}

/// Map from name to its first position.
pub(crate) fn name_lookup(names: &[String]) -> HashMap<&str, usize> {
    let mut lookup = HashMap::with_capacity(names.len());
    for (i, n) in names.iter().enumerate() {
        lookup.entry(n.as_str()).or_insert(i);
    }
    lookup
}

impl From<Vec<usize>> for Selector {
    fn from(v: Vec<usize>) -> Self {
        Selector::Positions(v)
    }
}

impl From<&[usize]> for Selector {
    fn from(v: &[usize]) -> Self {
        Selector::Positions(v.to_vec())
    }
}

impl From<usize> for Selector {
    fn from(i: usize) -> Self {
        Selector::Positions(vec![i])
    }
}

impl From<std::ops::Range<usize>> for Selector {
    fn from(r: std::ops::Range<usize>) -> Self {
        Selector::Positions(r.collect())
    }
}

impl From<Vec<bool>> for Selector {
    fn from(v: Vec<bool>) -> Self {
        Selector::Mask(v)
    }
}

impl From<Vec<&str>> for Selector {
    fn from(v: Vec<&str>) -> Self {
        Selector::names(&v)
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Selector::Names(vec![s.to_string()])
    }
}
