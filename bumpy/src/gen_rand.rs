use crate::index::IndexBuilder;
use crate::matrix::BumpyMatrix;
use crate::store::VectorLike;
use rand::prelude::Rng;
use std::rc::Rc;

/// Generate a random `nrow x ncol` bumpy matrix with rows named `r0, r1, ..` and
/// columns `c0, c1, ..`. Each coordinate is occupied with probability `density`, by an
/// entry of `1..=max_len` whole numbers in `[0, 100)`.
pub fn random_bumpy_mat(
    rng: &mut impl Rng,
    nrow: usize,
    ncol: usize,
    density: f64,
    max_len: usize,
) -> BumpyMatrix<Vec<f64>> {
    let mut builder = IndexBuilder::new(nrow, ncol);
    let mut values = Vec::new();
    for c in 0..ncol {
        for r in 0..nrow {
            if max_len == 0 || !rng.gen_bool(density) {
                continue;
            }
            let len = rng.gen_range(1..=max_len);
            let start = values.len();
            values.extend((0..len).map(|_| rng.gen_range(0..100) as f64));
            builder.push(r, c, start..values.len());
        }
    }

    BumpyMatrix::from_raw(
        builder.finish(),
        Rc::new(values),
        Some((0..nrow).map(|i| format!("r{i}")).collect()),
        Some((0..ncol).map(|j| format!("c{j}")).collect()),
    )
}

/// Generate a random mask conformant with `m`: one coin flip per element of every
/// occupied entry.
pub fn random_mask<V: VectorLike>(rng: &mut impl Rng, m: &BumpyMatrix<V>) -> BumpyMatrix<Vec<bool>> {
    let mut builder = IndexBuilder::new(m.nrow(), m.ncol());
    let mut values = Vec::with_capacity(m.index.total_len());
    for (r, c, range) in m.index.iter() {
        let start = values.len();
        values.extend(range.map(|_| rng.gen_bool(0.5)));
        builder.push(r, c, start..values.len());
    }
    BumpyMatrix::from_raw(builder.finish(), Rc::new(values), None, None)
}
