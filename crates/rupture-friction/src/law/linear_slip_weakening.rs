//! Linear slip weakening with optional forced rupture.
//!
//! The friction coefficient drops linearly from `mu_s` to `mu_d` as slip
//! grows to `d_c`. With forced rupture enabled, weakening is also driven
//! by time after `forced_rupture_time` over a ramp of `t_0`; the stronger
//! of the two weakenings applies.

use rupture_core::Layer;
use rupture_store::{
    FaceRecord, LayeredStore, LinearSlipWeakeningRecord, RuptureRecord, StoreError,
};

use crate::access::{FaceReader, FaceWriter, FlagVec, PointVec};
use crate::common::{resolve_shear, CommonFace, StepInfo};
use crate::error::FrictionError;
use crate::law::FrictionLaw;
use crate::stress::{q, FaceStress};

/// Working copy of one linear slip weakening face.
#[derive(Clone, Debug, Default)]
pub struct LswFace {
    /// Base fields.
    pub common: CommonFace,
    /// Initial stress rows `xx yy zz xy yz xz`.
    pub initial_stress: [PointVec; 6],
    /// Cohesion, a non-negative strength added to the frictional part.
    pub cohesion: PointVec,
    /// Critical slip distance.
    pub d_c: PointVec,
    /// Static friction coefficient.
    pub mu_s: PointVec,
    /// Dynamic friction coefficient.
    pub mu_d: PointVec,
    /// Start of forced weakening.
    pub forced_rupture_time: PointVec,
    /// Forced weakening duration.
    pub t_0: f64,
    /// Whether each point has reached dynamic friction.
    pub ds: FlagVec,
    /// Peak slip-rate magnitude.
    pub peak_slip_rate: PointVec,
    /// Time each point reached dynamic friction.
    pub dynamic_stress_time: PointVec,
    /// Mean slip over the face, kept only when `magnitude_out` is set.
    pub averaged_slip: f64,
    /// Whether the face contributes to moment-magnitude output.
    pub magnitude_out: bool,
}

/// Linear slip weakening friction.
#[derive(Clone, Debug)]
pub struct LinearSlipWeakeningLaw {
    record: LinearSlipWeakeningRecord,
    threshold: f64,
    forced_rupture: bool,
}

impl LinearSlipWeakeningLaw {
    /// Law over `record`. `threshold` is the rupture slip-rate threshold.
    pub fn new(record: LinearSlipWeakeningRecord, threshold: f64, forced_rupture: bool) -> Self {
        Self {
            record,
            threshold,
            forced_rupture,
        }
    }

    /// The registered fields.
    pub fn record(&self) -> &LinearSlipWeakeningRecord {
        &self.record
    }

    /// Whether time-forced weakening is applied.
    pub fn forced_rupture(&self) -> bool {
        self.forced_rupture
    }

    /// Weakening fraction in `[0, 1]` at a point, at simulation time `time`.
    fn weakening(&self, face: &LswFace, p: usize, time: f64) -> f64 {
        let d_c = face.d_c[p];
        let by_slip = if d_c > 0.0 {
            (face.common.slip[p] / d_c).min(1.0)
        } else {
            1.0
        };
        if !self.forced_rupture {
            return by_slip;
        }
        let elapsed = time - face.forced_rupture_time[p];
        let by_time = if face.t_0 > 0.0 {
            (elapsed / face.t_0).clamp(0.0, 1.0)
        } else if elapsed >= 0.0 {
            1.0
        } else {
            0.0
        };
        by_slip.max(by_time)
    }

    fn set_friction(face: &mut LswFace, p: usize, f: f64) {
        face.common.mu[p] = face.mu_s[p] - (face.mu_s[p] - face.mu_d[p]) * f;
        face.common.state[p] = f;
    }
}

impl FrictionLaw for LinearSlipWeakeningLaw {
    type Face = LswFace;

    fn name(&self) -> &'static str {
        "linear_slip_weakening"
    }

    fn base(&self) -> &RuptureRecord {
        self.record.base()
    }

    fn prepare(&self, store: &mut LayeredStore, layer: Layer) -> Result<(), FrictionError> {
        if store.face_count(layer) == 0 || !store.contains(layer, self.record.cohesion) {
            return Ok(());
        }
        let padded = store.padded_points();
        let cohesion = store.reals(layer, self.record.cohesion)?;
        match cohesion.iter().position(|&c| c < 0.0 || c.is_nan()) {
            Some(i) => Err(FrictionError::InvalidParameter {
                field: "cohesion",
                layer,
                face: i / padded,
                value: f64::from(cohesion[i]),
                reason: "cohesion is stored as a non-negative magnitude",
            }),
            None => Ok(()),
        }
    }

    fn load_face(&self, reader: &FaceReader<'_>) -> Result<LswFace, StoreError> {
        let r = &self.record;
        Ok(LswFace {
            common: CommonFace::load(reader, &r.base)?,
            initial_stress: reader.components::<6>(r.initial_stress)?,
            cohesion: reader.point_values(r.cohesion)?,
            d_c: reader.point_values(r.d_c)?,
            mu_s: reader.point_values(r.mu_s)?,
            mu_d: reader.point_values(r.mu_d)?,
            forced_rupture_time: reader.point_values(r.forced_rupture_time)?,
            t_0: reader.uniform(r.t_0, 0)?,
            ds: reader.flags(r.ds)?,
            peak_slip_rate: reader.point_values(r.peak_slip_rate)?,
            dynamic_stress_time: reader.point_values(r.dynamic_stress_time)?,
            averaged_slip: reader.uniform(r.averaged_slip, 0)?,
            magnitude_out: reader.uniform_flag(r.magnitude_out, 0)?,
        })
    }

    fn initialise_face(&self, face: &mut LswFace) {
        for p in 0..face.common.points() {
            let d_c = face.d_c[p];
            let f = if d_c > 0.0 {
                (face.common.slip[p] / d_c).min(1.0)
            } else {
                1.0
            };
            Self::set_friction(face, p, f);
        }
    }

    fn update(&self, face: &mut LswFace, stress: &FaceStress<'_>, step: &StepInfo) -> usize {
        let end = step.end();
        let n = face.common.points();
        let eta_s = face.common.impedance.eta_s;
        let mut ruptured = 0;
        let mut slip_increment = 0.0;

        for p in 0..n {
            let g = face.common.impedance.godunov(stress, p);
            let init = |row: usize| face.initial_stress[row][p];
            let normal = init(q::XX) + g.normal;
            let t1 = init(q::XY) + g.xy;
            let t2 = init(q::XZ) + g.xz;

            let strength = face.cohesion[p] + face.common.mu[p] * (-normal).max(0.0);
            let v = if eta_s > 0.0 {
                ((t1.hypot(t2) - strength) / eta_s).max(0.0)
            } else {
                0.0
            };
            let shear = resolve_shear(t1, t2, v, eta_s);
            face.common
                .advance_slip(p, shear.slip_rate1, shear.slip_rate2, step.dt);
            if face.common.detect_rupture(p, self.threshold, end) {
                ruptured += 1;
            }
            slip_increment += v * step.dt;

            let f = self.weakening(face, p, end);
            Self::set_friction(face, p, f);
            if f >= 1.0 && !face.ds[p] {
                face.ds[p] = true;
                face.dynamic_stress_time[p] = end;
            }
            face.peak_slip_rate[p] = face.peak_slip_rate[p].max(v);

            let txy = shear.traction1 - face.initial_stress[q::XY][p];
            let txz = shear.traction2 - face.initial_stress[q::XZ][p];
            face.common.traction_xy[p] = txy;
            face.common.traction_xz[p] = txz;
            face.common.impose(stress, p, g.normal, txy, txz);
        }
        if face.magnitude_out && n > 0 {
            face.averaged_slip += slip_increment / n as f64;
        }
        ruptured
    }

    fn store_face(&self, face: &LswFace, writer: &mut FaceWriter<'_>) -> Result<(), StoreError> {
        let r = &self.record;
        face.common.store(writer, &r.base)?;
        writer.put_flags(r.ds, &face.ds)?;
        writer.put_points(r.peak_slip_rate, &face.peak_slip_rate)?;
        writer.put_points(r.dynamic_stress_time, &face.dynamic_stress_time)?;
        writer.put_uniform(r.averaged_slip, 0, face.averaged_slip)?;
        Ok(())
    }
}
