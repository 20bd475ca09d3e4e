use crate::error::{length_mismatch, Axis, BumpyError, Result};
use crate::index::IndexBuilder;
use crate::matrix::{check_names, BumpyMatrix};
use crate::store::VectorLike;
use std::rc::Rc;

fn check_compatible<V: VectorLike>(first: &BumpyMatrix<V>, other: &BumpyMatrix<V>) -> Result<()> {
    if first.store.compatible(&other.store) {
        Ok(())
    } else {
        Err(BumpyError::TypeMismatch {
            field: "bound matrices".to_string(),
            expected: first.kind().name().to_string(),
            found: other.kind().name().to_string(),
        })
    }
}

/// Concatenated names along the bound axis, or `None` if any part is unnamed.
fn bound_names(
    parts: impl Iterator<Item = Option<Vec<String>>>,
    extent: usize,
    axis: Axis,
) -> Result<Option<Vec<String>>> {
    let names = parts.collect::<Option<Vec<_>>>().map(|n| n.concat());
    if let Some(n) = &names {
        check_names(n, extent, axis)?;
    }
    Ok(names)
}

/// Bind matrices side by side. All must have the same number of rows; the result
/// takes its row names from the first matrix and keeps column names only when every
/// input has them.
pub fn cbind<V: VectorLike>(mats: &[&BumpyMatrix<V>]) -> Result<BumpyMatrix<V>> {
    let first = mats.first().ok_or_else(|| length_mismatch(1, 0, "matrices to bind"))?;
    for m in &mats[1..] {
        if m.nrow() != first.nrow() {
            return Err(BumpyError::DimensionMismatch {
                left: first.dim(),
                right: m.dim(),
            });
        }
        check_compatible(first, m)?;
    }

    let ncol = mats.iter().map(|m| m.ncol()).sum::<usize>();
    let compacted = mats.iter().map(|m| m.compact()).collect::<Vec<_>>();

    let mut builder = IndexBuilder::new(first.nrow(), ncol);
    let mut col_offset = 0;
    let mut store_offset = 0;
    for m in &compacted {
        for (r, c, range) in m.index.shifted(store_offset).iter() {
            builder.push(r, col_offset + c, range);
        }
        col_offset += m.ncol();
        store_offset += m.store.len();
    }

    let stores = compacted.iter().map(|m| (*m.store).clone()).collect::<Vec<_>>();
    let col_names = bound_names(mats.iter().map(|m| m.col_names.clone()), ncol, Axis::Col)?;

    Ok(BumpyMatrix::from_raw(
        builder.finish(),
        Rc::new(V::concat(&stores)),
        first.row_names.clone(),
        col_names,
    ))
}

/// Bind matrices on top of each other. All must have the same number of columns; the
/// result takes its column names from the first matrix and keeps row names only when
/// every input has them.
pub fn rbind<V: VectorLike>(mats: &[&BumpyMatrix<V>]) -> Result<BumpyMatrix<V>> {
    let transposed = mats.iter().map(|m| m.transpose()).collect::<Vec<_>>();
    let refs = transposed.iter().collect::<Vec<_>>();
    let bound = cbind(&refs).map_err(|e| match e {
        BumpyError::DimensionMismatch { left, right } => BumpyError::DimensionMismatch {
            left: (left.1, left.0),
            right: (right.1, right.0),
        },
        BumpyError::InvalidNames { reason, .. } => BumpyError::InvalidNames { axis: Axis::Row, reason },
        other => other,
    })?;
    Ok(bound.transpose().compact())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame::{Column, Frame};
    use crate::gen_rand::random_bumpy_mat;
    use crate::matrix::test::input_a;
    use crate::selector::Selector;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn test_cbind() {
        let m = input_a();
        let other = BumpyMatrix::from_entries(3, 1, &[vec![], vec![8.0], vec![9.0, 9.5]])
            .unwrap()
            .with_col_names(&["z"])
            .unwrap();
        let b = cbind(&[&m, &other]).unwrap();
        assert_eq!(b.dim(), (3, 3));
        assert_eq!(b.col_names().unwrap(), &["x".to_string(), "y".to_string(), "z".to_string()]);
        assert_eq!(b.row_names(), m.row_names());
        assert_eq!(b.get(1, 2).unwrap(), vec![8.0]);
        assert_eq!(b.get(1, 1).unwrap(), vec![3.0, 4.0, 5.0]);
        assert!(b.index().is_canonical());
        assert_eq!(b.subset_cols(&Selector::from(0..2)).unwrap(), m);

        // an unnamed input drops the column names
        let unnamed = cbind(&[&m, &other.clone().without_names()]).unwrap();
        assert!(unnamed.col_names().is_none());

        assert!(matches!(
            cbind(&[&m, &m.transpose()]),
            Err(BumpyError::DimensionMismatch { left: (3, 2), right: (2, 3) })
        ));
        assert!(matches!(cbind(&[&m, &m]), Err(BumpyError::InvalidNames { axis: Axis::Col, .. })));
        assert!(cbind::<Vec<f64>>(&[]).is_err());
    }

    #[test]
    fn test_rbind() {
        let m = input_a();
        let other = BumpyMatrix::from_entries(1, 2, &[vec![0.5], vec![]])
            .unwrap()
            .with_row_names(&["d"])
            .unwrap();
        let b = rbind(&[&m, &other]).unwrap();
        assert_eq!(b.dim(), (4, 2));
        assert_eq!(b.row_names().unwrap()[3], "d");
        assert_eq!(b.col_names(), m.col_names());
        assert_eq!(b.get_named("d", "x").unwrap(), vec![0.5]);
        assert_eq!(b.get_named("b", "y").unwrap(), vec![3.0, 4.0, 5.0]);
        assert!(b.index().is_canonical());
        assert_eq!(b.values(), &[1.0, 2.0, 6.0, 0.5, 3.0, 4.0, 5.0, 7.0]);

        assert!(matches!(
            rbind(&[&m, &m.transpose()]),
            Err(BumpyError::DimensionMismatch { left: (3, 2), right: (2, 3) })
        ));
        assert!(matches!(rbind(&[&m, &m]), Err(BumpyError::InvalidNames { axis: Axis::Row, .. })));
    }

    #[test]
    fn test_bind_frames() {
        let a = Frame::new(vec![("x".to_string(), Column::F64(vec![1.0, 2.0]))]).unwrap();
        let b = Frame::new(vec![("y".to_string(), Column::F64(vec![3.0]))]).unwrap();
        let ma = BumpyMatrix::from_entries(1, 1, &[a]).unwrap();
        let mb = BumpyMatrix::from_entries(1, 1, &[b]).unwrap();
        assert!(matches!(cbind(&[&ma, &mb]), Err(BumpyError::TypeMismatch { .. })));
        let doubled = cbind(&[&ma, &ma]).unwrap();
        assert_eq!(doubled.field_f64("x").unwrap().get(0, 1).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_split_and_rebind() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        for _ in 0..10 {
            let m = random_bumpy_mat(&mut rng, 9, 12, 0.4, 4);
            let left = m.subset_cols(&Selector::from(0..5)).unwrap();
            let right = m.subset_cols(&Selector::from(5..12)).unwrap();
            assert_eq!(cbind(&[&left, &right]).unwrap(), m);

            let top = m.subset_rows(&Selector::from(0..3)).unwrap();
            let bottom = m.subset_rows(&Selector::from(3..9)).unwrap();
            assert_eq!(rbind(&[&top, &bottom]).unwrap(), m);
        }
    }
}
