//! Tetrahedral mesh view and point-in-element location.
//!
//! Maps arbitrary 3-D points (fault receivers, point sources) onto the
//! tetrahedron that contains them. Containment uses barycentric
//! coordinates with a small tolerance so that points on shared faces and
//! vertices are found. Points outside every element are reported, not
//! rejected: the caller decides whether a miss is fatal.
//!
//! Under a partitioned mesh the same point can be found by several ranks
//! near partition boundaries; [`deduplicate_ownership`] resolves each
//! point to exactly one owner.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod barycentric;
pub mod dedup;
pub mod error;
pub mod locator;
pub mod mesh;

pub use barycentric::{barycentric, Barycentric};
pub use dedup::{deduplicate_ownership, Ownership};
pub use error::MeshError;
pub use locator::{find_mesh_ids, Containment, LocateSummary, Located, Locator};
pub use mesh::{Aabb, TetMesh};
