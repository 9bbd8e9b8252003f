//! Rupture: per-fault-face state and friction for dynamic rupture on
//! tetrahedral meshes.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the rupture sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use rupture::prelude::*;
//!
//! let config = RuptureConfig::from_toml_str(
//!     r#"
//!     friction_law = "linear_slip_weakening"
//!     quadrature_points = 4
//!     "#,
//! )
//! .unwrap();
//!
//! // Register the law's fields, then freeze them into a store.
//! let mut schema = Schema::new();
//! let rupture = DynamicRupture::from_config(&config, &mut schema).unwrap();
//! let layout = LayerLayout::new().with_faces(Layer::Interior, 8);
//! let mut store = LayeredStore::allocate(schema, layout, &config.store_config()).unwrap();
//!
//! rupture.initialise(&mut store, Layer::Interior).unwrap();
//! let stress = StressInput::zeros(8, config.quadrature_points());
//! let summary = rupture
//!     .step(&mut store, Layer::Interior, &stress, 0.0, 1e-3)
//!     .unwrap();
//! assert_eq!(summary.faces, 8);
//! assert_eq!(summary.ruptured, 0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rupture-core` | IDs, layers, field definitions, precision |
//! | [`store`] | `rupture-store` | Schema, layered store, face records |
//! | [`mesh`] | `rupture-mesh` | Tetrahedral mesh view, point location, ownership |
//! | [`friction`] | `rupture-friction` | Friction laws, solver, config, kernels |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`rupture-core`).
///
/// [`types::Real`] is `f32` unless the `double` feature is enabled.
pub use rupture_core as types;

/// Schema-driven fault-face storage (`rupture-store`).
pub use rupture_store as store;

/// Tetrahedral mesh view and point location (`rupture-mesh`).
pub use rupture_mesh as mesh;

/// Friction laws and layer updates (`rupture-friction`).
pub use rupture_friction as friction;

/// Common imports for typical usage.
///
/// ```rust
/// use rupture::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use rupture_core::{FaceIndex, FieldDef, FieldId, Layer, LayerMask, Real};

    // Storage
    pub use rupture_store::{
        FaceRecord, LayerLayout, LayeredStore, RuptureRecord, Schema, StoreConfig,
    };

    // Errors
    pub use rupture_friction::{ConfigError, FrictionError, KernelError};
    pub use rupture_mesh::MeshError;
    pub use rupture_store::{SchemaError, StoreError};

    // Mesh
    pub use rupture_mesh::{find_mesh_ids, Containment, Locator, TetMesh};

    // Friction
    pub use rupture_friction::{
        DynamicRupture, FluxProjector, FrictionLaw, FrictionSolver, KernelTable, RuptureConfig,
        Side, StepSummary, StressInput,
    };
}
