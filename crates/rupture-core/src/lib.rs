//! Core types for the rupture workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the store, the friction laws, and the mesh
//! locator: typed identifiers, field definitions, mesh layers, and the
//! storage precision alias [`Real`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod field;
pub mod id;
pub mod layer;

pub use field::{AllocStrategy, ElementType, Extent, FieldDef};
pub use id::{ElementId, FaceIndex, FieldId, VertexId};
pub use layer::{Layer, LayerMask};

/// Floating-point type used for stored fault state.
///
/// `f32` by default; the `double` feature switches storage to `f64`.
/// Friction computations always run in `f64` and round on write-back.
#[cfg(not(feature = "double"))]
pub type Real = f32;

/// Floating-point type used for stored fault state.
#[cfg(feature = "double")]
pub type Real = f64;

/// Number of stress/velocity quantities carried per quadrature point
/// (six stress components followed by three particle velocities).
pub const NUM_QUANTITIES: usize = 9;
