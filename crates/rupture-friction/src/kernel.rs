//! Small dense matrix kernels for the fault flux projection.
//!
//! Kernels are plain function pointers computing `c = a · b` for one fixed
//! shape, all matrices column-major. They are registered per polynomial
//! order and shape in a [`KernelTable`]; [`FluxProjector`] picks its
//! kernel once at setup, so a missing kernel is reported before any
//! time step runs.

use indexmap::IndexMap;
use rupture_core::{Layer, Real, NUM_QUANTITIES};
use rupture_store::{LayeredStore, RuptureRecord};

use crate::error::{FrictionError, KernelError};
use crate::stress::Side;

/// Operands of the next call, for kernels that prefetch.
#[derive(Clone, Copy, Debug, Default)]
pub struct Prefetch<'a> {
    /// Next `a`.
    pub a: Option<&'a [Real]>,
    /// Next `b`.
    pub b: Option<&'a [Real]>,
    /// Next `c`.
    pub c: Option<&'a [Real]>,
}

/// `c = a · b` for an `m × k` by `k × n` product. `c` is overwritten.
pub type KernelFn = fn(a: &[Real], b: &[Real], c: &mut [Real], prefetch: Prefetch<'_>);

/// Matrix shape of a kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Rows of `a` and `c`.
    pub m: usize,
    /// Columns of `b` and `c`.
    pub n: usize,
    /// Columns of `a`, rows of `b`.
    pub k: usize,
}

impl Shape {
    /// A shape from its three dimensions.
    pub fn new(m: usize, n: usize, k: usize) -> Self {
        Self { m, n, k }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct KernelKey {
    order: u32,
    shape: Shape,
}

impl KernelKey {
    fn not_found(self) -> KernelError {
        KernelError::NotFound {
            order: self.order,
            m: self.shape.m,
            n: self.shape.n,
            k: self.shape.k,
        }
    }
}

/// Registered kernels by order and shape.
#[derive(Clone, Debug, Default)]
pub struct KernelTable {
    kernels: IndexMap<KernelKey, KernelFn>,
}

impl KernelTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kernel. Each `(order, shape)` may be registered once.
    pub fn register(&mut self, order: u32, shape: Shape, kernel: KernelFn) -> Result<(), KernelError> {
        let key = KernelKey { order, shape };
        if self.kernels.contains_key(&key) {
            return Err(KernelError::Duplicate {
                order,
                m: shape.m,
                n: shape.n,
                k: shape.k,
            });
        }
        self.kernels.insert(key, kernel);
        Ok(())
    }

    /// The kernel for `(order, shape)`.
    pub fn select(&self, order: u32, shape: Shape) -> Result<KernelFn, KernelError> {
        let key = KernelKey { order, shape };
        self.kernels
            .get(&key)
            .copied()
            .ok_or_else(|| key.not_found())
    }

    /// Number of registered kernels.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// Whether no kernel is registered.
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

/// Projects each face's imposed state through its flux-solver block.
///
/// Per face, `a` is the imposed state (`padded_points × 9`, one column per
/// quantity), `b` is the `9 × 9` flux-solver block, and the result is a
/// `padded_points × 9` block.
#[derive(Clone, Copy, Debug)]
pub struct FluxProjector {
    kernel: KernelFn,
    order: u32,
    shape: Shape,
}

impl FluxProjector {
    /// Select the kernel for `order` at `padded_points` rows.
    pub fn new(table: &KernelTable, order: u32, padded_points: usize) -> Result<Self, KernelError> {
        let shape = Shape::new(padded_points, NUM_QUANTITIES, NUM_QUANTITIES);
        let kernel = table.select(order, shape)?;
        tracing::debug!(order, m = shape.m, n = shape.n, k = shape.k, "selected flux kernel");
        Ok(Self {
            kernel,
            order,
            shape,
        })
    }

    /// Polynomial order the kernel was selected for.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Shape of the per-face product.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Project one side of every face of `layer` into `out`, face by face.
    ///
    /// `out` is resized to `faces × padded_points × 9`.
    pub fn project(
        &self,
        store: &LayeredStore,
        base: &RuptureRecord,
        layer: Layer,
        side: Side,
        out: &mut Vec<Real>,
    ) -> Result<(), FrictionError> {
        if store.padded_points() != self.shape.m {
            return Err(KernelError::NotFound {
                order: self.order,
                m: store.padded_points(),
                n: self.shape.n,
                k: self.shape.k,
            }
            .into());
        }
        let (imposed, flux) = match side {
            Side::Plus => (base.imposed_state_plus, base.flux_solver_plus),
            Side::Minus => (base.imposed_state_minus, base.flux_solver_minus),
        };
        let faces = store.face_count(layer);
        let block = self.shape.m * self.shape.n;
        out.clear();
        out.resize(faces * block, 0.0);

        for (face, c) in out.chunks_mut(block).enumerate() {
            let a = store.face_reals(layer, imposed, face)?;
            let b = store.face_reals(layer, flux, face)?;
            let prefetch = if face + 1 < faces {
                Prefetch {
                    a: Some(store.face_reals(layer, imposed, face + 1)?),
                    b: Some(store.face_reals(layer, flux, face + 1)?),
                    c: None,
                }
            } else {
                Prefetch::default()
            };
            (self.kernel)(a, b, c, prefetch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero(_: &[Real], _: &[Real], c: &mut [Real], _: Prefetch<'_>) {
        c.fill(0.0);
    }

    #[test]
    fn select_finds_registered_shape() {
        let mut table = KernelTable::new();
        table.register(3, Shape::new(16, 9, 9), zero).unwrap();
        assert!(table.select(3, Shape::new(16, 9, 9)).is_ok());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_kernel_is_reported_with_key() {
        let table = KernelTable::new();
        assert_eq!(
            table.select(5, Shape::new(40, 9, 9)).err(),
            Some(KernelError::NotFound {
                order: 5,
                m: 40,
                n: 9,
                k: 9
            })
        );
        assert!(FluxProjector::new(&table, 5, 40).is_err());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut table = KernelTable::new();
        table.register(1, Shape::new(8, 9, 9), zero).unwrap();
        assert!(matches!(
            table.register(1, Shape::new(8, 9, 9), zero),
            Err(KernelError::Duplicate { .. })
        ));
    }
}
