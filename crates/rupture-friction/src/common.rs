//! State shared by every friction law: slip bookkeeping, rupture
//! detection, and the imposed state handed back to the wave solver.

use rupture_core::NUM_QUANTITIES;
use rupture_store::record::wave_speeds;
use rupture_store::{RuptureRecord, StoreError};

use crate::access::{FaceReader, FaceWriter, FlagVec, PointVec};
use crate::stress::{q, FaceStress, Impedance};

/// Timing of one friction update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepInfo {
    /// Simulation time at the start of the step.
    pub time: f64,
    /// Step length.
    pub dt: f64,
}

impl StepInfo {
    /// Simulation time at the end of the step.
    pub fn end(&self) -> f64 {
        self.time + self.dt
    }
}

/// Base-record values of one face, in `f64`.
#[derive(Clone, Debug, Default)]
pub struct CommonFace {
    /// Impedances from the two sides' wave speeds.
    pub impedance: Impedance,
    /// Friction coefficient.
    pub mu: PointVec,
    /// Accumulated slip magnitude.
    pub slip: PointVec,
    /// Slip along the first tangent.
    pub slip1: PointVec,
    /// Slip along the second tangent.
    pub slip2: PointVec,
    /// Slip rate along the first tangent.
    pub slip_rate1: PointVec,
    /// Slip rate along the second tangent.
    pub slip_rate2: PointVec,
    /// Relative shear traction, first tangent.
    pub traction_xy: PointVec,
    /// Relative shear traction, second tangent.
    pub traction_xz: PointVec,
    /// Friction state variable.
    pub state: PointVec,
    /// Rupture time per point.
    pub rupture_time: PointVec,
    /// Whether each point has ruptured.
    pub ruptured: FlagVec,
    /// Plus-side imposed state, `[quantity][point]`.
    pub imposed_plus: Vec<f64>,
    /// Minus-side imposed state, `[quantity][point]`.
    pub imposed_minus: Vec<f64>,
}

impl CommonFace {
    /// Read the base fields of one face.
    pub fn load(reader: &FaceReader<'_>, base: &RuptureRecord) -> Result<Self, StoreError> {
        let speeds = |field| -> Result<[f64; 3], StoreError> {
            Ok([
                reader.uniform(field, wave_speeds::DENSITY)?,
                reader.uniform(field, wave_speeds::P_WAVE)?,
                reader.uniform(field, wave_speeds::S_WAVE)?,
            ])
        };
        let points = reader.points();
        Ok(Self {
            impedance: Impedance::from_wave_speeds(
                speeds(base.wave_speeds_plus)?,
                speeds(base.wave_speeds_minus)?,
            ),
            mu: reader.point_values(base.mu)?,
            slip: reader.point_values(base.slip)?,
            slip1: reader.point_values(base.slip1)?,
            slip2: reader.point_values(base.slip2)?,
            slip_rate1: reader.point_values(base.slip_rate1)?,
            slip_rate2: reader.point_values(base.slip_rate2)?,
            traction_xy: reader.point_values(base.traction_xy)?,
            traction_xz: reader.point_values(base.traction_xz)?,
            state: reader.point_values(base.state_variable)?,
            rupture_time: reader.point_values(base.rupture_time)?,
            ruptured: reader.flags(base.ruptured)?,
            imposed_plus: vec![0.0; NUM_QUANTITIES * points],
            imposed_minus: vec![0.0; NUM_QUANTITIES * points],
        })
    }

    /// Write the base fields of one face. Wave speeds are read-only.
    pub fn store(&self, writer: &mut FaceWriter<'_>, base: &RuptureRecord) -> Result<(), StoreError> {
        writer.put_points(base.mu, &self.mu)?;
        writer.put_points(base.slip, &self.slip)?;
        writer.put_points(base.slip1, &self.slip1)?;
        writer.put_points(base.slip2, &self.slip2)?;
        writer.put_points(base.slip_rate1, &self.slip_rate1)?;
        writer.put_points(base.slip_rate2, &self.slip_rate2)?;
        writer.put_points(base.traction_xy, &self.traction_xy)?;
        writer.put_points(base.traction_xz, &self.traction_xz)?;
        writer.put_points(base.state_variable, &self.state)?;
        writer.put_points(base.rupture_time, &self.rupture_time)?;
        writer.put_flags(base.ruptured, &self.ruptured)?;
        writer.put_flattened(base.imposed_state_plus, &self.imposed_plus)?;
        writer.put_flattened(base.imposed_state_minus, &self.imposed_minus)?;
        Ok(())
    }

    /// Number of quadrature points.
    pub fn points(&self) -> usize {
        self.slip.len()
    }

    /// Slip-rate magnitude at a point.
    pub fn slip_rate(&self, p: usize) -> f64 {
        self.slip_rate1[p].hypot(self.slip_rate2[p])
    }

    /// Integrate slip over one step. Slip grows by `|V| dt`, so it never
    /// decreases.
    pub fn advance_slip(&mut self, p: usize, slip_rate1: f64, slip_rate2: f64, dt: f64) {
        self.slip_rate1[p] = slip_rate1;
        self.slip_rate2[p] = slip_rate2;
        self.slip1[p] += slip_rate1 * dt;
        self.slip2[p] += slip_rate2 * dt;
        self.slip[p] += slip_rate1.hypot(slip_rate2) * dt;
    }

    /// Set the ruptured flag the first time the slip rate exceeds the
    /// threshold. Returns whether the point ruptured during this step.
    pub fn detect_rupture(&mut self, p: usize, threshold: f64, time: f64) -> bool {
        if self.ruptured[p] || self.slip_rate(p) <= threshold {
            return false;
        }
        self.ruptured[p] = true;
        self.rupture_time[p] = time;
        true
    }

    /// Fill both sides' imposed state at a point from the Godunov normal
    /// stress and the relative shear tractions after friction.
    pub fn impose(
        &mut self,
        stress: &FaceStress<'_>,
        p: usize,
        normal: f64,
        traction_xy: f64,
        traction_xz: f64,
    ) {
        let n = self.points();
        let imp = self.impedance;
        let qp = |i: usize| stress.plus(i, p);
        let qm = |i: usize| stress.minus(i, p);

        let plus = &mut self.imposed_plus;
        plus[q::XX * n + p] = normal;
        plus[q::XY * n + p] = traction_xy;
        plus[q::XZ * n + p] = traction_xz;
        for i in [q::YY, q::ZZ, q::YZ] {
            plus[i * n + p] = 0.0;
        }
        plus[q::U * n + p] = qp(q::U) - imp.inv_zp_plus * (normal - qp(q::XX));
        plus[q::V * n + p] = qp(q::V) + imp.inv_zs_plus * (traction_xy - qp(q::XY));
        plus[q::W * n + p] = qp(q::W) + imp.inv_zs_plus * (traction_xz - qp(q::XZ));

        let minus = &mut self.imposed_minus;
        minus[q::XX * n + p] = normal;
        minus[q::XY * n + p] = traction_xy;
        minus[q::XZ * n + p] = traction_xz;
        for i in [q::YY, q::ZZ, q::YZ] {
            minus[i * n + p] = 0.0;
        }
        minus[q::U * n + p] = qm(q::U) + imp.inv_zp_minus * (normal - qm(q::XX));
        minus[q::V * n + p] = qm(q::V) - imp.inv_zs_minus * (traction_xy - qm(q::XY));
        minus[q::W * n + p] = qm(q::W) - imp.inv_zs_minus * (traction_xz - qm(q::XZ));
    }
}

/// Resolved shear traction after the friction bound is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShearUpdate {
    /// Slip rate along the first tangent.
    pub slip_rate1: f64,
    /// Slip rate along the second tangent.
    pub slip_rate2: f64,
    /// Total shear traction, first tangent.
    pub traction1: f64,
    /// Total shear traction, second tangent.
    pub traction2: f64,
}

/// Split a slip-rate magnitude `v` along the total shear stress
/// `(t1, t2)` and reduce the traction by the radiation term `eta_s v`.
pub fn resolve_shear(t1: f64, t2: f64, v: f64, eta_s: f64) -> ShearUpdate {
    let tau = t1.hypot(t2);
    if tau <= 0.0 {
        return ShearUpdate {
            slip_rate1: 0.0,
            slip_rate2: 0.0,
            traction1: t1,
            traction2: t2,
        };
    }
    let scale = (tau - eta_s * v).max(0.0) / tau;
    ShearUpdate {
        slip_rate1: v * t1 / tau,
        slip_rate2: v * t2 / tau,
        traction1: t1 * scale,
        traction2: t2 * scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shear_split_follows_stress_direction() {
        let s = resolve_shear(3.0, 4.0, 2.0, 1.0);
        assert!((s.slip_rate1 - 1.2).abs() < 1e-12);
        assert!((s.slip_rate2 - 1.6).abs() < 1e-12);
        // |t| drops from 5 to 3.
        assert!((s.traction1.hypot(s.traction2) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_shear_has_no_direction() {
        let s = resolve_shear(0.0, 0.0, 1.0, 1.0);
        assert_eq!(s.slip_rate1, 0.0);
        assert_eq!(s.slip_rate2, 0.0);
    }

    #[test]
    fn rupture_is_detected_once() {
        let mut face = CommonFace {
            slip: PointVec::from_elem(0.0, 2),
            slip_rate1: PointVec::from_elem(0.0, 2),
            slip_rate2: PointVec::from_elem(0.0, 2),
            slip1: PointVec::from_elem(0.0, 2),
            slip2: PointVec::from_elem(0.0, 2),
            rupture_time: PointVec::from_elem(0.0, 2),
            ruptured: FlagVec::from_elem(false, 2),
            ..CommonFace::default()
        };
        face.advance_slip(1, 0.01, 0.0, 0.5);
        assert!(face.detect_rupture(1, 0.001, 2.5));
        assert!(!face.detect_rupture(1, 0.001, 3.0));
        assert!(!face.detect_rupture(0, 0.001, 3.0));
        assert_eq!(face.rupture_time[1], 2.5);
        assert!((face.slip[1] - 0.005).abs() < 1e-15);
    }
}
