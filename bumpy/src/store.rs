use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Element type tag of the values held by a flat store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// floating point values
    Numeric,
    /// integer values
    Integer,
    /// boolean values
    Logical,
    /// strings
    Character,
    /// rows of a `Frame`
    Tabular,
}

impl ElementKind {
    /// Short name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Numeric => "numeric",
            ElementKind::Integer => "integer",
            ElementKind::Logical => "logical",
            ElementKind::Character => "character",
            ElementKind::Tabular => "tabular",
        }
    }
}

/// A collection that knows its own length and can be cut, gathered and concatenated.
/// This is the only capability the matrix needs from its flat value store.
///
/// Ranges and indices passed to these methods are produced by the view index, so
/// out-of-bounds arguments are bugs and panic.
pub trait VectorLike: Clone + Debug + PartialEq {
    /// Element kind stored in this collection
    fn kind(&self) -> ElementKind;

    /// Number of elements (or rows)
    fn len(&self) -> usize;

    /// True if the collection holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the elements in `[start, end)`
    fn slice_range(&self, start: usize, end: usize) -> Self;

    /// Gather the elements at `indices`, in order. Repeats are allowed.
    fn select(&self, indices: &[usize]) -> Self;

    /// Concatenate `parts` end to end.
    fn concat(parts: &[Self]) -> Self;

    /// Whether `other` can be concatenated with `self`. Always true for plain vectors;
    /// tabular stores require matching schemas.
    fn compatible(&self, _other: &Self) -> bool {
        true
    }

    /// Canonical empty value of the same type (and schema) as `self`
    fn empty_like(&self) -> Self {
        self.slice_range(0, 0)
    }
}

/// Scalar types that can be stored in a `Vec`-backed flat store.
pub trait Element: Clone + Debug + PartialEq {
    /// Kind reported by `Vec<Self>`
    const KIND: ElementKind;
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Numeric;
}

impl Element for f32 {
    const KIND: ElementKind = ElementKind::Numeric;
}

impl Element for i32 {
    const KIND: ElementKind = ElementKind::Integer;
}

impl Element for i64 {
    const KIND: ElementKind = ElementKind::Integer;
}

impl Element for u32 {
    const KIND: ElementKind = ElementKind::Integer;
}

impl Element for bool {
    const KIND: ElementKind = ElementKind::Logical;
}

impl Element for String {
    const KIND: ElementKind = ElementKind::Character;
}

impl<T: Element> VectorLike for Vec<T> {
    fn kind(&self) -> ElementKind {
        T::KIND
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn slice_range(&self, start: usize, end: usize) -> Self {
        self[start..end].to_vec()
    }

    fn select(&self, indices: &[usize]) -> Self {
        indices.iter().map(|&i| self[i].clone()).collect()
    }

    fn concat(parts: &[Self]) -> Self {
        let total = parts.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(total);
        for p in parts {
            out.extend_from_slice(p);
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_vec_store() {
        let v = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(v.kind(), ElementKind::Numeric);
        assert_eq!(VectorLike::len(&v), 4);
        assert_eq!(v.slice_range(1, 3), vec![2.0, 3.0]);
        assert!(v.empty_like().is_empty());
        assert_eq!(v.select(&[3, 0, 0]), vec![4.0, 1.0, 1.0]);

        let joined = <Vec<bool>>::concat(&[vec![true], vec![], vec![false, true]]);
        assert_eq!(joined, vec![true, false, true]);
        assert_eq!(joined.kind(), ElementKind::Logical);
    }

    #[test]
    fn test_kind_serde() {
        let s = serde_json::to_string(&ElementKind::Character).unwrap();
        assert_eq!(s, "\"character\"");
        let k: ElementKind = serde_json::from_str("\"tabular\"").unwrap();
        assert_eq!(k, ElementKind::Tabular);
    }
}
