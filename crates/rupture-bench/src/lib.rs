//! Benchmark profiles for the rupture crates.
//!
//! - [`structured_mesh`]: an `n × n × n` cube grid split into tetrahedra
//! - [`grid_points`]: deterministic query points inside the unit cube
//! - [`fault_profile`]: a configured law over a populated interior layer

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rupture_core::{Layer, Real};
use rupture_friction::{DynamicRupture, FrictionError, RuptureConfig};
use rupture_mesh::{MeshError, TetMesh};
use rupture_store::{LayerLayout, LayeredStore, Schema, StoreError};

/// Rate-and-state profile used by the step benchmarks.
pub const AGING_PROFILE: &str = r#"
friction_law = "aging"
order = 4

[rate_and_state]
f0 = 0.6
sr0 = 1e-6
b = 0.014
state_iterations = 2
"#;

/// Linear slip weakening profile used by the step benchmarks.
pub const LSW_PROFILE: &str = r#"
friction_law = "linear_slip_weakening"
order = 4
"#;

/// Unit cube split into `n³` cells of six tetrahedra each, all sharing
/// the cell's main diagonal.
pub fn structured_mesh(n: u32) -> Result<TetMesh, MeshError> {
    let side = n + 1;
    let index = |i: u32, j: u32, k: u32| i + side * (j + side * k);
    let h = 1.0 / f64::from(n.max(1));

    let mut vertices = Vec::with_capacity((side * side * side) as usize);
    for k in 0..side {
        for j in 0..side {
            for i in 0..side {
                vertices.push([f64::from(i) * h, f64::from(j) * h, f64::from(k) * h]);
            }
        }
    }

    let mut elements = Vec::with_capacity((6 * n * n * n) as usize);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let c = |di: u32, dj: u32, dk: u32| index(i + di, j + dj, k + dk);
                let (origin, far) = (c(0, 0, 0), c(1, 1, 1));
                for [a, b] in [
                    [c(1, 0, 0), c(1, 1, 0)],
                    [c(1, 1, 0), c(0, 1, 0)],
                    [c(0, 1, 0), c(0, 1, 1)],
                    [c(0, 1, 1), c(0, 0, 1)],
                    [c(0, 0, 1), c(1, 0, 1)],
                    [c(1, 0, 1), c(1, 0, 0)],
                ] {
                    elements.push([origin, a, b, far]);
                }
            }
        }
    }
    TetMesh::new(vertices, elements)
}

/// `count` points spread through the unit cube on a low-discrepancy
/// sequence, so runs are reproducible.
pub fn grid_points(count: usize) -> Vec<[f64; 3]> {
    const G: f64 = 1.220_744_084_605_759_5;
    let alpha = [1.0 / G, 1.0 / (G * G), 1.0 / (G * G * G)];
    (1..=count)
        .map(|n| alpha.map(|a| (0.5 + a * n as f64).fract()))
        .collect()
}

/// A configured law over `faces` interior faces with unit material,
/// uniform initial stress, and initialised friction state.
pub fn fault_profile(config: &str, faces: usize) -> Result<(DynamicRupture, LayeredStore), FrictionError> {
    let config = RuptureConfig::from_toml_str(config)?;
    let mut schema = Schema::new();
    let rupture = DynamicRupture::from_config(&config, &mut schema)?;
    let layout = LayerLayout::new().with_faces(Layer::Interior, faces);
    let mut store = LayeredStore::allocate(schema, layout, &config.store_config())?;

    let per_point = [
        ("initial_stress", 0, -50e6),
        ("initial_stress", 3, 40e6),
        ("mu_s", 0, 0.6),
        ("mu_d", 0, 0.2),
        ("d_c", 0, 0.4),
        ("forced_rupture_time", 0, 1e9),
        ("rs_a", 0, 0.01),
        ("rs_sl0", 0, 0.2),
        ("slip_rate1", 0, 1e-6),
    ];
    for (name, c, value) in per_point {
        if let Ok(field) = store.field_id(name) {
            fill(&mut store, field, c, value)?;
        }
    }
    for name in ["wave_speeds_plus", "wave_speeds_minus"] {
        let field = store.field_id(name)?;
        for face in 0..faces {
            store
                .face_reals_mut(Layer::Interior, field, face)?
                .copy_from_slice(&[2670.0, 6000.0, 3464.0]);
        }
    }
    rupture.initialise(&mut store, Layer::Interior)?;
    Ok((rupture, store))
}

fn fill(
    store: &mut LayeredStore,
    field: rupture_core::FieldId,
    c: usize,
    value: Real,
) -> Result<(), StoreError> {
    let padded = store.padded_points();
    let points = store.quadrature_points();
    for face in 0..store.face_count(Layer::Interior) {
        store.face_reals_mut(Layer::Interior, field, face)?[c * padded..c * padded + points]
            .fill(value);
    }
    Ok(())
}
