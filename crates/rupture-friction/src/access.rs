//! Per-face copy-in/copy-out between the store and the friction kernels.
//!
//! Friction math runs in `f64` on small unpadded per-point vectors; the
//! store holds padded [`Real`] rows. [`FaceReader`] widens on the way in,
//! [`FaceWriter`] rounds on the way out.

use rupture_core::{FieldId, Layer, Real};
use rupture_store::{LayeredStore, StoreError};
use smallvec::SmallVec;

/// Per-point values of one face, widened to `f64`.
pub type PointVec = SmallVec<[f64; 32]>;

/// Per-point flags of one face.
pub type FlagVec = SmallVec<[bool; 32]>;

/// Reads one face of one layer.
#[derive(Clone, Copy)]
pub struct FaceReader<'a> {
    store: &'a LayeredStore,
    layer: Layer,
    face: usize,
}

impl<'a> FaceReader<'a> {
    /// Reader for `face` of `layer`.
    pub fn new(store: &'a LayeredStore, layer: Layer, face: usize) -> Self {
        Self { store, layer, face }
    }

    /// Unpadded quadrature points per face.
    pub fn points(&self) -> usize {
        self.store.quadrature_points()
    }

    /// Component `c` of a per-point field.
    ///
    /// # Panics
    ///
    /// Panics if the field has fewer than `c + 1` per-point components.
    pub fn component(&self, field: FieldId, c: usize) -> Result<PointVec, StoreError> {
        let padded = self.store.padded_points();
        let block = self.store.face_reals(self.layer, field, self.face)?;
        let start = c * padded;
        Ok(block[start..start + self.points()]
            .iter()
            .map(|&v| f64::from(v))
            .collect())
    }

    /// First component of a per-point field.
    pub fn point_values(&self, field: FieldId) -> Result<PointVec, StoreError> {
        self.component(field, 0)
    }

    /// Components `0..N` of a per-point field.
    pub fn components<const N: usize>(&self, field: FieldId) -> Result<[PointVec; N], StoreError> {
        let mut out: [PointVec; N] = std::array::from_fn(|_| PointVec::new());
        for (c, slot) in out.iter_mut().enumerate() {
            *slot = self.component(field, c)?;
        }
        Ok(out)
    }

    /// All `count` components of a per-point field, flattened `[c][point]`.
    pub fn flattened(&self, field: FieldId, count: usize) -> Result<Vec<f64>, StoreError> {
        let mut out = Vec::with_capacity(count * self.points());
        for c in 0..count {
            out.extend(self.component(field, c)?);
        }
        Ok(out)
    }

    /// Component `c` of a face-uniform field.
    pub fn uniform(&self, field: FieldId, c: usize) -> Result<f64, StoreError> {
        let block = self.store.face_reals(self.layer, field, self.face)?;
        Ok(f64::from(block[c]))
    }

    /// Component `c` of a face-uniform flag field.
    pub fn uniform_flag(&self, field: FieldId, c: usize) -> Result<bool, StoreError> {
        let stride = self.store.stride(field)?;
        Ok(self.store.flags(self.layer, field)?[self.face * stride + c])
    }

    /// A per-point flag field.
    pub fn flags(&self, field: FieldId) -> Result<FlagVec, StoreError> {
        let stride = self.store.stride(field)?;
        let all = self.store.flags(self.layer, field)?;
        let start = self.face * stride;
        Ok(all[start..start + self.points()].iter().copied().collect())
    }
}

/// Writes one face of one layer.
pub struct FaceWriter<'a> {
    store: &'a mut LayeredStore,
    layer: Layer,
    face: usize,
}

impl<'a> FaceWriter<'a> {
    /// Writer for `face` of `layer`.
    pub fn new(store: &'a mut LayeredStore, layer: Layer, face: usize) -> Self {
        Self { store, layer, face }
    }

    /// Overwrite component `c` of a per-point field. Padding is untouched.
    pub fn put_component(
        &mut self,
        field: FieldId,
        c: usize,
        values: &[f64],
    ) -> Result<(), StoreError> {
        let padded = self.store.padded_points();
        let block = self.store.face_reals_mut(self.layer, field, self.face)?;
        for (dst, &v) in block[c * padded..(c + 1) * padded].iter_mut().zip(values) {
            *dst = v as Real;
        }
        Ok(())
    }

    /// Overwrite the first component of a per-point field.
    pub fn put_points(&mut self, field: FieldId, values: &[f64]) -> Result<(), StoreError> {
        self.put_component(field, 0, values)
    }

    /// Overwrite a per-point field from a flattened `[c][point]` buffer.
    pub fn put_flattened(&mut self, field: FieldId, values: &[f64]) -> Result<(), StoreError> {
        let points = self.store.quadrature_points();
        for (c, chunk) in values.chunks(points).enumerate() {
            self.put_component(field, c, chunk)?;
        }
        Ok(())
    }

    /// Overwrite component `c` of a face-uniform field.
    pub fn put_uniform(&mut self, field: FieldId, c: usize, value: f64) -> Result<(), StoreError> {
        let block = self.store.face_reals_mut(self.layer, field, self.face)?;
        block[c] = value as Real;
        Ok(())
    }

    /// Overwrite a per-point flag field.
    pub fn put_flags(&mut self, field: FieldId, values: &[bool]) -> Result<(), StoreError> {
        let stride = self.store.stride(field)?;
        let start = self.face * stride;
        let all = self.store.flags_mut(self.layer, field)?;
        for (dst, &v) in all[start..start + stride].iter_mut().zip(values) {
            *dst = v;
        }
        Ok(())
    }
}
