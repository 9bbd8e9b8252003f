//! Mesh construction and ownership errors.

use rupture_core::{ElementId, VertexId};
use thiserror::Error;

/// Errors arising from mesh construction or ownership resolution.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum MeshError {
    /// The mesh has no elements.
    #[error("mesh must have at least one element")]
    EmptyMesh,
    /// An element references a vertex that does not exist.
    #[error("element {element} references vertex {vertex}, mesh has {vertices} vertices")]
    VertexOutOfRange {
        /// The offending element.
        element: ElementId,
        /// The missing vertex.
        vertex: VertexId,
        /// Number of vertices in the mesh.
        vertices: usize,
    },
    /// An element has (numerically) zero volume.
    #[error("element {element} is degenerate (volume {volume:e})")]
    DegenerateElement {
        /// The offending element.
        element: ElementId,
        /// Signed volume of the element.
        volume: f64,
    },
    /// A vertex coordinate is NaN or infinite.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex {
        /// The offending vertex.
        vertex: VertexId,
    },
    /// Per-rank claim arrays disagree on the number of points.
    #[error("rank {rank} reports {found} points, rank 0 reports {expected}")]
    ClaimLengthMismatch {
        /// The offending rank.
        rank: usize,
        /// Points reported by rank 0.
        expected: usize,
        /// Points reported by `rank`.
        found: usize,
    },
}
