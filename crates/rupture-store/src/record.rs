//! Face-record variants.
//!
//! A record is a bundle of [`FieldId`]s registered together. Variants
//! extend the base [`RuptureRecord`] by composition: `register` calls the
//! base registration first, then adds its own fields, so the schema order
//! (and therefore the physical layout) is base fields, then derived fields.

use rupture_core::{FieldDef, FieldId, Layer, LayerMask, NUM_QUANTITIES};

use crate::error::SchemaError;
use crate::schema::Schema;

/// A set of fields registered together into a [`Schema`].
pub trait FaceRecord: Sized {
    /// Register this record's fields and return their ids.
    fn register(schema: &mut Schema) -> Result<Self, SchemaError>;

    /// The embedded base record.
    fn base(&self) -> &RuptureRecord;
}

/// Layers holding fault state. Ghost faces are never updated locally.
fn fault_layers() -> LayerMask {
    LayerMask::ALL.without(Layer::Ghost)
}

/// Byte alignment of the imposed-state blocks handed to the wave solver.
pub const IMPOSED_STATE_ALIGNMENT: usize = 4096;

/// Components of the `face_info` index field.
pub mod face_info {
    /// Element on the plus side.
    pub const PLUS_ELEMENT: usize = 0;
    /// Element on the minus side.
    pub const MINUS_ELEMENT: usize = 1;
    /// Local face number (0..4) within the plus element.
    pub const PLUS_SIDE: usize = 2;
    /// Local face number (0..4) within the minus element.
    pub const MINUS_SIDE: usize = 3;
    /// Global fault face id.
    pub const GLOBAL_FACE: usize = 4;
    /// Number of components.
    pub const COMPONENTS: u32 = 5;
}

/// Components of the `wave_speeds_*` fields.
pub mod wave_speeds {
    /// Density.
    pub const DENSITY: usize = 0;
    /// P-wave speed.
    pub const P_WAVE: usize = 1;
    /// S-wave speed.
    pub const S_WAVE: usize = 2;
    /// Number of components.
    pub const COMPONENTS: u32 = 3;
}

/// Fields common to every friction law.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuptureRecord {
    /// Plus-side imposed state, `NUM_QUANTITIES` rows per point.
    pub imposed_state_plus: FieldId,
    /// Minus-side imposed state.
    pub imposed_state_minus: FieldId,
    /// Plus-side flux-solver block (`NUM_QUANTITIES²`, column-major).
    pub flux_solver_plus: FieldId,
    /// Minus-side flux-solver block.
    pub flux_solver_minus: FieldId,
    /// Face connectivity, see [`face_info`].
    pub face_info: FieldId,
    /// Plus-side material, see [`wave_speeds`].
    pub wave_speeds_plus: FieldId,
    /// Minus-side material.
    pub wave_speeds_minus: FieldId,
    /// Time each point first exceeded the rupture threshold.
    pub rupture_time: FieldId,
    /// Whether each point has ruptured.
    pub ruptured: FieldId,
    /// Friction coefficient.
    pub mu: FieldId,
    /// Accumulated slip magnitude.
    pub slip: FieldId,
    /// Slip along the first fault tangent.
    pub slip1: FieldId,
    /// Slip along the second fault tangent.
    pub slip2: FieldId,
    /// Slip rate along the first fault tangent.
    pub slip_rate1: FieldId,
    /// Slip rate along the second fault tangent.
    pub slip_rate2: FieldId,
    /// Shear traction along the first tangent, relative to initial stress.
    pub traction_xy: FieldId,
    /// Shear traction along the second tangent, relative to initial stress.
    pub traction_xz: FieldId,
    /// Friction state variable.
    pub state_variable: FieldId,
}

impl FaceRecord for RuptureRecord {
    fn register(schema: &mut Schema) -> Result<Self, SchemaError> {
        let mask = fault_layers();
        let point = |name: &str| FieldDef::per_point(name).layers(mask);
        let block = |name: &str, components: u32| {
            FieldDef::per_face(name).components(components).layers(mask)
        };
        let imposed = |name: &str| {
            point(name)
                .components(NUM_QUANTITIES as u32)
                .aligned(IMPOSED_STATE_ALIGNMENT)
        };

        Ok(Self {
            imposed_state_plus: schema.register(imposed("imposed_state_plus"))?,
            imposed_state_minus: schema.register(imposed("imposed_state_minus"))?,
            flux_solver_plus: schema
                .register(block("flux_solver_plus", (NUM_QUANTITIES * NUM_QUANTITIES) as u32))?,
            flux_solver_minus: schema
                .register(block("flux_solver_minus", (NUM_QUANTITIES * NUM_QUANTITIES) as u32))?,
            face_info: schema.register(
                FieldDef::indices("face_info")
                    .components(face_info::COMPONENTS)
                    .layers(mask),
            )?,
            wave_speeds_plus: schema
                .register(block("wave_speeds_plus", wave_speeds::COMPONENTS))?,
            wave_speeds_minus: schema
                .register(block("wave_speeds_minus", wave_speeds::COMPONENTS))?,
            rupture_time: schema.register(point("rupture_time"))?,
            ruptured: schema.register(FieldDef::flags("ruptured").layers(mask))?,
            mu: schema.register(point("mu"))?,
            slip: schema.register(point("slip"))?,
            slip1: schema.register(point("slip1"))?,
            slip2: schema.register(point("slip2"))?,
            slip_rate1: schema.register(point("slip_rate1"))?,
            slip_rate2: schema.register(point("slip_rate2"))?,
            traction_xy: schema.register(point("traction_xy"))?,
            traction_xz: schema.register(point("traction_xz"))?,
            state_variable: schema.register(point("state_variable"))?,
        })
    }

    fn base(&self) -> &RuptureRecord {
        self
    }
}

/// Linear slip weakening with forced rupture and dynamic-stress tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinearSlipWeakeningRecord {
    /// Base fields.
    pub base: RuptureRecord,
    /// Initial stress in fault coordinates, rows `xx yy zz xy yz xz`.
    pub initial_stress: FieldId,
    /// Cohesion (non-negative strength offset).
    pub cohesion: FieldId,
    /// Critical slip distance.
    pub d_c: FieldId,
    /// Static friction coefficient.
    pub mu_s: FieldId,
    /// Dynamic friction coefficient.
    pub mu_d: FieldId,
    /// Time at which forced weakening starts.
    pub forced_rupture_time: FieldId,
    /// Forced weakening duration (face-uniform).
    pub t_0: FieldId,
    /// Whether each point has reached dynamic friction.
    pub ds: FieldId,
    /// Largest slip-rate magnitude seen so far.
    pub peak_slip_rate: FieldId,
    /// Mean slip over the face's quadrature points (face-uniform).
    pub averaged_slip: FieldId,
    /// Time each point reached dynamic friction.
    pub dynamic_stress_time: FieldId,
    /// Whether the face contributes to moment-magnitude output
    /// (face-uniform flag).
    pub magnitude_out: FieldId,
}

impl FaceRecord for LinearSlipWeakeningRecord {
    fn register(schema: &mut Schema) -> Result<Self, SchemaError> {
        let base = RuptureRecord::register(schema)?;
        let mask = fault_layers();
        let point = |name: &str| FieldDef::per_point(name).layers(mask);

        Ok(Self {
            base,
            initial_stress: schema.register(point("initial_stress").components(6))?,
            cohesion: schema.register(point("cohesion"))?,
            d_c: schema.register(point("d_c"))?,
            mu_s: schema.register(point("mu_s"))?,
            mu_d: schema.register(point("mu_d"))?,
            forced_rupture_time: schema.register(point("forced_rupture_time"))?,
            t_0: schema.register(FieldDef::per_face("t_0").layers(mask))?,
            ds: schema.register(FieldDef::flags("ds").layers(mask))?,
            peak_slip_rate: schema.register(point("peak_slip_rate"))?,
            averaged_slip: schema.register(FieldDef::per_face("averaged_slip").layers(mask))?,
            dynamic_stress_time: schema.register(point("dynamic_stress_time"))?,
            magnitude_out: schema.register(FieldDef::face_flag("magnitude_out").layers(mask))?,
        })
    }

    fn base(&self) -> &RuptureRecord {
        &self.base
    }
}

/// Rate-and-state friction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateAndStateRecord {
    /// Base fields.
    pub base: RuptureRecord,
    /// Initial stress in fault coordinates, rows `xx yy zz xy yz xz`.
    pub initial_stress: FieldId,
    /// Direct-effect parameter `a`.
    pub rs_a: FieldId,
    /// Evolution-effect parameter `b`.
    pub rs_b: FieldId,
    /// Characteristic slip distance `L`.
    pub rs_sl0: FieldId,
}

impl FaceRecord for RateAndStateRecord {
    fn register(schema: &mut Schema) -> Result<Self, SchemaError> {
        let base = RuptureRecord::register(schema)?;
        let mask = fault_layers();
        let point = |name: &str| FieldDef::per_point(name).layers(mask);

        Ok(Self {
            base,
            initial_stress: schema.register(point("initial_stress").components(6))?,
            rs_a: schema.register(point("rs_a"))?,
            rs_b: schema.register(point("rs_b"))?,
            rs_sl0: schema.register(point("rs_sl0"))?,
        })
    }

    fn base(&self) -> &RuptureRecord {
        &self.base
    }
}
