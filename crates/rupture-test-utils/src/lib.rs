//! Test fixtures and reference kernels for rupture development.
//!
//! Provides store fill helpers, a naive dense matrix kernel usable with
//! [`KernelTable`], and ready-made fault scenarios in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use rupture_core::{FieldId, Layer, Real, NUM_QUANTITIES};
use rupture_friction::{KernelError, KernelTable, Prefetch, Shape};
use rupture_store::{LayeredStore, StoreError};

/// Set component `c` of a per-point field at every unpadded point of
/// every face in `layer`.
pub fn fill_points(
    store: &mut LayeredStore,
    layer: Layer,
    field: FieldId,
    c: usize,
    value: f64,
) -> Result<(), StoreError> {
    let padded = store.padded_points();
    let points = store.quadrature_points();
    for face in 0..store.face_count(layer) {
        let block = store.face_reals_mut(layer, field, face)?;
        block[c * padded..c * padded + points].fill(value as Real);
    }
    Ok(())
}

/// Set component `c` of a face-uniform field on every face in `layer`.
pub fn fill_uniform(
    store: &mut LayeredStore,
    layer: Layer,
    field: FieldId,
    c: usize,
    value: f64,
) -> Result<(), StoreError> {
    for face in 0..store.face_count(layer) {
        store.face_reals_mut(layer, field, face)?[c] = value as Real;
    }
    Ok(())
}

/// Component `c` of a per-point field, unpadded, all faces concatenated.
pub fn point_values(
    store: &LayeredStore,
    layer: Layer,
    field: FieldId,
    c: usize,
) -> Result<Vec<f64>, StoreError> {
    let padded = store.padded_points();
    let points = store.quadrature_points();
    let mut out = Vec::with_capacity(store.face_count(layer) * points);
    for face in 0..store.face_count(layer) {
        let block = store.face_reals(layer, field, face)?;
        out.extend(
            block[c * padded..c * padded + points]
                .iter()
                .map(|&v| f64::from(v)),
        );
    }
    Ok(out)
}

/// Naive column-major `c = a · b` with `N` columns and inner dimension
/// `K`. The row count is taken from `c.len() / N`.
pub fn dense_kernel<const N: usize, const K: usize>(
    a: &[Real],
    b: &[Real],
    c: &mut [Real],
    _prefetch: Prefetch<'_>,
) {
    let m = c.len() / N;
    for j in 0..N {
        for i in 0..m {
            let mut sum = 0.0;
            for l in 0..K {
                sum += a[l * m + i] * b[j * K + l];
            }
            c[j * m + i] = sum;
        }
    }
}

/// Register [`dense_kernel`] for the flux projection of `order` at
/// `padded_points` rows.
pub fn register_reference_kernels(
    table: &mut KernelTable,
    order: u32,
    padded_points: usize,
) -> Result<(), KernelError> {
    table.register(
        order,
        Shape::new(padded_points, NUM_QUANTITIES, NUM_QUANTITIES),
        dense_kernel::<NUM_QUANTITIES, NUM_QUANTITIES>,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_kernel_multiplies_column_major() {
        // a = [[1, 2], [3, 4]], b = I.
        let a = [1.0, 3.0, 2.0, 4.0];
        let b = [1.0, 0.0, 0.0, 1.0];
        let mut c = [0.0; 4];
        dense_kernel::<2, 2>(&a, &b, &mut c, Prefetch::default());
        assert_eq!(c, a);
    }
}
