//! Field definitions for the per-face record schema.

use crate::layer::LayerMask;

/// Element type stored by a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    /// Floating-point values stored as [`Real`](crate::Real).
    Real,
    /// Boolean flags (e.g. "has ruptured").
    Flag,
    /// Unsigned integer indices (element ids, local face numbers).
    Index,
}

impl ElementType {
    /// Size in bytes of one stored element.
    pub fn size_bytes(self) -> usize {
        match self {
            Self::Real => std::mem::size_of::<crate::Real>(),
            Self::Flag => std::mem::size_of::<bool>(),
            Self::Index => std::mem::size_of::<u32>(),
        }
    }
}

/// How many values a field holds per face, before multiplying by
/// the component count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extent {
    /// One value per fault quadrature point, padded to the vector stride.
    PerPoint,
    /// One value per face (face-uniform parameters like `t_0`).
    PerFace,
}

/// Which allocator backs a field's storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocStrategy {
    /// A dedicated aligned heap buffer per field per layer.
    Standard,
    /// Bump-allocated from the store's shared segment pool.
    ///
    /// Stands in for pinned or device-visible memory: everything in the
    /// pool lives in a few large contiguous blocks.
    Pooled,
}

/// Definition of a field registered in a record schema.
///
/// A field is a fixed-size block of values per fault face. Per-point
/// fields are laid out component-major: `[component][point]`, each
/// component row padded to the vector stride.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    /// Unique field name (e.g. `"slip_rate1"`).
    pub name: String,
    /// Stored element type.
    pub element: ElementType,
    /// Per-point or per-face.
    pub extent: Extent,
    /// Number of components (rows) per face.
    pub components: u32,
    /// Layers the field is allocated in.
    pub layers: LayerMask,
    /// Requested alignment of the field's base address, in bytes.
    pub alignment: usize,
    /// Backing allocator.
    pub strategy: AllocStrategy,
}

impl FieldDef {
    /// Default base-address alignment (one cache line).
    pub const DEFAULT_ALIGNMENT: usize = 64;

    fn new(name: impl Into<String>, element: ElementType, extent: Extent) -> Self {
        Self {
            name: name.into(),
            element,
            extent,
            components: 1,
            layers: LayerMask::ALL,
            alignment: Self::DEFAULT_ALIGNMENT,
            strategy: AllocStrategy::Standard,
        }
    }

    /// A real-valued field with one value per quadrature point.
    pub fn per_point(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Real, Extent::PerPoint)
    }

    /// A real-valued face-uniform field.
    pub fn per_face(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Real, Extent::PerFace)
    }

    /// A boolean field with one flag per quadrature point.
    pub fn flags(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Flag, Extent::PerPoint)
    }

    /// A face-uniform boolean field.
    pub fn face_flag(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Flag, Extent::PerFace)
    }

    /// A face-uniform index field.
    pub fn indices(name: impl Into<String>) -> Self {
        Self::new(name, ElementType::Index, Extent::PerFace)
    }

    /// Set the component count.
    pub fn components(mut self, components: u32) -> Self {
        self.components = components;
        self
    }

    /// Restrict allocation to the given layers.
    pub fn layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    /// Request a base-address alignment in bytes.
    pub fn aligned(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    /// Allocate from the shared segment pool.
    pub fn pooled(mut self) -> Self {
        self.strategy = AllocStrategy::Pooled;
        self
    }

    /// Number of stored elements per face given the padded point stride.
    pub fn elements_per_face(&self, padded_points: usize) -> usize {
        let per_component = match self.extent {
            Extent::PerPoint => padded_points,
            Extent::PerFace => 1,
        };
        self.components as usize * per_component
    }

    /// Whether two definitions describe the same per-face layout.
    pub fn same_layout(&self, other: &Self) -> bool {
        self.element == other.element
            && self.extent == other.extent
            && self.components == other.components
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layer;

    #[test]
    fn per_point_scales_with_padding() {
        let def = FieldDef::per_point("initial_stress").components(6);
        assert_eq!(def.elements_per_face(16), 96);
    }

    #[test]
    fn per_face_ignores_padding() {
        let def = FieldDef::per_face("t_0");
        assert_eq!(def.elements_per_face(16), 1);
    }

    #[test]
    fn builder_sets_strategy_and_layers() {
        let def = FieldDef::per_point("mu")
            .pooled()
            .layers(LayerMask::ALL.without(Layer::Ghost));
        assert_eq!(def.strategy, AllocStrategy::Pooled);
        assert!(!def.layers.contains(Layer::Ghost));
    }

    #[test]
    fn layout_comparison_ignores_placement() {
        let a = FieldDef::per_point("slip");
        let b = FieldDef::per_point("slip").pooled().aligned(4096);
        let c = FieldDef::per_point("slip").components(2);
        assert!(a.same_layout(&b));
        assert!(!a.same_layout(&c));
    }
}
