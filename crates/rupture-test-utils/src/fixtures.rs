//! Ready-made meshes and fault scenarios.
//!
//! - [`unit_tetrahedron`]: a single right-angled tetrahedron.
//! - [`Fault`]: a configured [`DynamicRupture`] with an allocated store
//!   whose interior layer is filled with uniform material and stress.

use rupture_core::Layer;
use rupture_friction::{DynamicRupture, RuptureConfig, StepSummary, StressInput};
use rupture_mesh::TetMesh;
use rupture_store::record::wave_speeds;
use rupture_store::{LayerLayout, LayeredStore, Schema};

use crate::{fill_points, fill_uniform, point_values};

/// `(density, cp, cs)` giving `eta_p = 1` and `eta_s = 0.5` when both
/// sides match.
pub const UNIT_MATERIAL: [f64; 3] = [1.0, 2.0, 1.0];

pub const LSW_CONFIG: &str = r#"
friction_law = "linear_slip_weakening"
quadrature_points = 4
"#;

pub const LSW_FORCED_CONFIG: &str = r#"
friction_law = "linear_slip_weakening"
quadrature_points = 4

[linear_slip_weakening]
forced_rupture = true
"#;

pub const AGING_CONFIG: &str = r#"
friction_law = "aging"
quadrature_points = 4

[rate_and_state]
f0 = 0.6
sr0 = 1e-6
b = 0.014
state_iterations = 2
"#;

pub const SLIP_CONFIG: &str = r#"
friction_law = "slip"
quadrature_points = 4

[rate_and_state]
f0 = 0.6
sr0 = 1e-6
b = 0.014
state_iterations = 2
"#;

pub const AGING_TP_CONFIG: &str = r#"
friction_law = "aging"
quadrature_points = 4

[rate_and_state]
f0 = 0.6
sr0 = 1e-6
b = 0.014
state_iterations = 2

[thermal_pressurization]
thermal_diffusivity = 1e-6
heat_capacity = 2.7e3
undrained_response = 0.1e6
initial_temperature = 483.15
initial_pressure = 0.0
"#;

/// The tetrahedron `(0,0,0) (1,0,0) (0,1,0) (0,0,1)`.
pub fn unit_tetrahedron() -> TetMesh {
    TetMesh::new(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
        vec![[0, 1, 2, 3]],
    )
    .expect("unit tetrahedron is valid")
}

/// A configured friction law over an interior layer of `faces` faces.
pub struct Fault {
    pub rupture: DynamicRupture,
    pub store: LayeredStore,
    pub layer: Layer,
}

impl Fault {
    /// Parse `config`, register its record, and allocate the store with
    /// [`UNIT_MATERIAL`] on both sides.
    pub fn new(config: &str, faces: usize) -> Self {
        let config = RuptureConfig::from_toml_str(config).expect("fixture config parses");
        let mut schema = Schema::new();
        let rupture = DynamicRupture::from_config(&config, &mut schema).expect("fixture config is valid");
        let layout = LayerLayout::new().with_faces(Layer::Interior, faces);
        let store = LayeredStore::allocate(schema, layout, &config.store_config())
            .expect("fixture store fits the default budget");
        let mut fault = Self {
            rupture,
            store,
            layer: Layer::Interior,
        };
        fault.set_material(UNIT_MATERIAL, UNIT_MATERIAL);
        fault
    }

    /// Linear slip weakening with normal stress −10, `mu_s = 0.6`,
    /// `mu_d = 0.2`, `d_c = 0.4`, and initial shear `shear`.
    pub fn linear_slip_weakening(config: &str, faces: usize, shear: f64) -> Self {
        let mut fault = Self::new(config, faces);
        fault.set_points("initial_stress", 0, -10.0);
        fault.set_points("initial_stress", 3, shear);
        fault.set_points("mu_s", 0, 0.6);
        fault.set_points("mu_d", 0, 0.2);
        fault.set_points("d_c", 0, 0.4);
        fault.set_points("forced_rupture_time", 0, 1e9);
        fault
    }

    /// Rate-and-state with normal stress −50, `a = 0.01`, `L = 0.2`,
    /// a creeping initial slip rate of `1e-6`, and initial shear `shear`.
    /// Thermal pressurization fields are seeded when registered.
    pub fn rate_and_state(config: &str, faces: usize, shear: f64) -> Self {
        let mut fault = Self::new(config, faces);
        fault.set_points("initial_stress", 0, -50.0);
        fault.set_points("initial_stress", 3, shear);
        fault.set_points("rs_a", 0, 0.01);
        fault.set_points("rs_sl0", 0, 0.2);
        fault.set_points("slip_rate1", 0, 1e-6);
        if fault.store.field_id("half_width_shear_zone").is_ok() {
            fault.set_points("half_width_shear_zone", 0, 0.01);
            fault.set_points("hydraulic_diffusivity", 0, 1e-4);
        }
        fault
    }

    /// Unpadded quadrature points per face.
    pub fn points(&self) -> usize {
        self.store.quadrature_points()
    }

    /// Faces in the fault layer.
    pub fn faces(&self) -> usize {
        self.store.face_count(self.layer)
    }

    /// Zero incoming stress for the fault layer.
    pub fn zero_stress(&self) -> StressInput {
        StressInput::zeros(self.faces(), self.points())
    }

    pub fn set_material(&mut self, plus: [f64; 3], minus: [f64; 3]) {
        for (name, material) in [("wave_speeds_plus", plus), ("wave_speeds_minus", minus)] {
            for (c, value) in [wave_speeds::DENSITY, wave_speeds::P_WAVE, wave_speeds::S_WAVE]
                .into_iter()
                .zip(material)
            {
                self.set_uniform(name, c, value);
            }
        }
    }

    pub fn set_points(&mut self, name: &str, c: usize, value: f64) {
        let field = self.store.field_id(name).expect("fixture field exists");
        fill_points(&mut self.store, self.layer, field, c, value).expect("fixture field is per-point");
    }

    pub fn set_uniform(&mut self, name: &str, c: usize, value: f64) {
        let field = self.store.field_id(name).expect("fixture field exists");
        fill_uniform(&mut self.store, self.layer, field, c, value).expect("fixture field is real");
    }

    /// Component `c` of a per-point field over all faces.
    pub fn values(&self, name: &str, c: usize) -> Vec<f64> {
        let field = self.store.field_id(name).expect("fixture field exists");
        point_values(&self.store, self.layer, field, c).expect("fixture field is per-point")
    }

    /// A flag field over all faces, unpadded.
    pub fn flags(&self, name: &str) -> Vec<bool> {
        let field = self.store.field_id(name).expect("fixture field exists");
        let stride = self.store.stride(field).expect("fixture field exists");
        let points = self.points();
        self.store
            .flags(self.layer, field)
            .expect("fixture field is a flag field")
            .chunks(stride)
            .flat_map(|face| face[..points].iter().copied())
            .collect()
    }

    pub fn initialise(&mut self) {
        self.rupture
            .initialise(&mut self.store, self.layer)
            .expect("fixture initialises");
    }

    /// One step under zero incoming stress.
    pub fn step(&mut self, time: f64, dt: f64) -> StepSummary {
        let stress = self.zero_stress();
        self.rupture
            .step(&mut self.store, self.layer, &stress, time, dt)
            .expect("fixture step succeeds")
    }
}
