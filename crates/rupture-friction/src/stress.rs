//! Incoming stress from the wave solver and the Godunov fault state.

use rupture_core::{Real, NUM_QUANTITIES};

use crate::error::FrictionError;

/// Quantity rows of a stress/velocity block.
pub mod q {
    /// Normal stress `σ_xx`.
    pub const XX: usize = 0;
    /// `σ_yy`.
    pub const YY: usize = 1;
    /// `σ_zz`.
    pub const ZZ: usize = 2;
    /// Shear stress along the first fault tangent.
    pub const XY: usize = 3;
    /// `σ_yz`.
    pub const YZ: usize = 4;
    /// Shear stress along the second fault tangent.
    pub const XZ: usize = 5;
    /// Normal particle velocity.
    pub const U: usize = 6;
    /// Tangential particle velocity, first direction.
    pub const V: usize = 7;
    /// Tangential particle velocity, second direction.
    pub const W: usize = 8;
}

/// Side of a fault face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// The side the face normal points away from.
    Plus,
    /// The opposite side.
    Minus,
}

/// Plus- and minus-side quantities at the fault quadrature points of every
/// face in a layer, in fault coordinates.
///
/// Each face holds `NUM_QUANTITIES × points` values per side, laid out
/// `[quantity][point]`.
#[derive(Clone, Debug, PartialEq)]
pub struct StressInput {
    faces: usize,
    points: usize,
    plus: Vec<Real>,
    minus: Vec<Real>,
}

impl StressInput {
    /// All-zero input.
    pub fn zeros(faces: usize, points: usize) -> Self {
        let len = faces * points * NUM_QUANTITIES;
        Self {
            faces,
            points,
            plus: vec![0.0; len],
            minus: vec![0.0; len],
        }
    }

    /// Wrap existing buffers. Both must hold `faces × 9 × points` values.
    pub fn from_parts(
        faces: usize,
        points: usize,
        plus: Vec<Real>,
        minus: Vec<Real>,
    ) -> Result<Self, FrictionError> {
        let len = faces * points * NUM_QUANTITIES;
        for found in [plus.len(), minus.len()] {
            if found != len {
                return Err(FrictionError::StressShape {
                    faces,
                    points,
                    found_faces: found / (points * NUM_QUANTITIES).max(1),
                    found_points: points,
                });
            }
        }
        Ok(Self {
            faces,
            points,
            plus,
            minus,
        })
    }

    /// Number of faces.
    pub fn faces(&self) -> usize {
        self.faces
    }

    /// Quadrature points per face.
    pub fn points(&self) -> usize {
        self.points
    }

    /// Set one value.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn set(&mut self, side: Side, face: usize, quantity: usize, point: usize, value: Real) {
        let i = self.index(face, quantity, point);
        match side {
            Side::Plus => self.plus[i] = value,
            Side::Minus => self.minus[i] = value,
        }
    }

    /// Set one quantity at every point of every face on one side.
    pub fn fill(&mut self, side: Side, quantity: usize, value: Real) {
        for face in 0..self.faces {
            for point in 0..self.points {
                self.set(side, face, quantity, point, value);
            }
        }
    }

    /// Borrow one face.
    ///
    /// # Panics
    ///
    /// Panics if `face` is out of range.
    pub fn face(&self, face: usize) -> FaceStress<'_> {
        let block = self.points * NUM_QUANTITIES;
        let range = face * block..(face + 1) * block;
        FaceStress {
            plus: &self.plus[range.clone()],
            minus: &self.minus[range],
            points: self.points,
        }
    }

    fn index(&self, face: usize, quantity: usize, point: usize) -> usize {
        assert!(quantity < NUM_QUANTITIES && point < self.points && face < self.faces);
        (face * NUM_QUANTITIES + quantity) * self.points + point
    }
}

/// One face's incoming quantities.
#[derive(Clone, Copy, Debug)]
pub struct FaceStress<'a> {
    plus: &'a [Real],
    minus: &'a [Real],
    points: usize,
}

impl FaceStress<'_> {
    /// Plus-side quantity at a point.
    pub fn plus(&self, quantity: usize, point: usize) -> f64 {
        f64::from(self.plus[quantity * self.points + point])
    }

    /// Minus-side quantity at a point.
    pub fn minus(&self, quantity: usize, point: usize) -> f64 {
        f64::from(self.minus[quantity * self.points + point])
    }

    /// Quadrature points per face.
    pub fn points(&self) -> usize {
        self.points
    }
}

/// Acoustic impedances of the two sides of a face.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Impedance {
    /// `1 / Zp` on the plus side.
    pub inv_zp_plus: f64,
    /// `1 / Zp` on the minus side.
    pub inv_zp_minus: f64,
    /// `1 / Zs` on the plus side.
    pub inv_zs_plus: f64,
    /// `1 / Zs` on the minus side.
    pub inv_zs_minus: f64,
    /// Effective P impedance `1 / (1/Zp⁺ + 1/Zp⁻)`.
    pub eta_p: f64,
    /// Effective S impedance `1 / (1/Zs⁺ + 1/Zs⁻)`.
    pub eta_s: f64,
}

fn reciprocal(z: f64) -> f64 {
    if z > 0.0 {
        1.0 / z
    } else {
        0.0
    }
}

impl Impedance {
    /// From `(density, cp, cs)` on each side. Non-positive impedances
    /// (fluids, unset material) contribute nothing.
    pub fn from_wave_speeds(plus: [f64; 3], minus: [f64; 3]) -> Self {
        let inv_zp_plus = reciprocal(plus[0] * plus[1]);
        let inv_zp_minus = reciprocal(minus[0] * minus[1]);
        let inv_zs_plus = reciprocal(plus[0] * plus[2]);
        let inv_zs_minus = reciprocal(minus[0] * minus[2]);
        Self {
            inv_zp_plus,
            inv_zp_minus,
            inv_zs_plus,
            inv_zs_minus,
            eta_p: reciprocal(inv_zp_plus + inv_zp_minus),
            eta_s: reciprocal(inv_zs_plus + inv_zs_minus),
        }
    }

    /// Normal and shear stresses of the Riemann solution at one point,
    /// before friction is applied.
    pub fn godunov(&self, stress: &FaceStress<'_>, p: usize) -> Godunov {
        let qp = |i: usize| stress.plus(i, p);
        let qm = |i: usize| stress.minus(i, p);
        Godunov {
            normal: self.eta_p
                * (qm(q::U) - qp(q::U)
                    + qp(q::XX) * self.inv_zp_plus
                    + qm(q::XX) * self.inv_zp_minus),
            xy: self.eta_s
                * (qm(q::V) - qp(q::V)
                    + qp(q::XY) * self.inv_zs_plus
                    + qm(q::XY) * self.inv_zs_minus),
            xz: self.eta_s
                * (qm(q::W) - qp(q::W)
                    + qp(q::XZ) * self.inv_zs_plus
                    + qm(q::XZ) * self.inv_zs_minus),
        }
    }
}

/// Godunov stresses at one point, relative to the initial fault stress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Godunov {
    /// Normal stress.
    pub normal: f64,
    /// Shear stress along the first tangent.
    pub xy: f64,
    /// Shear stress along the second tangent.
    pub xz: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impedance_of_identical_sides_is_half() {
        let imp = Impedance::from_wave_speeds([2.0, 3.0, 1.5], [2.0, 3.0, 1.5]);
        assert!((imp.eta_p - 3.0).abs() < 1e-12);
        assert!((imp.eta_s - 1.5).abs() < 1e-12);
    }

    #[test]
    fn zero_material_does_not_divide_by_zero() {
        let imp = Impedance::from_wave_speeds([0.0; 3], [0.0; 3]);
        assert_eq!(imp, Impedance::default());
    }

    #[test]
    fn godunov_averages_symmetric_stress() {
        let imp = Impedance::from_wave_speeds([1.0, 2.0, 1.0], [1.0, 2.0, 1.0]);
        let mut input = StressInput::zeros(1, 2);
        for side in [Side::Plus, Side::Minus] {
            input.fill(side, q::XX, -4.0);
            input.fill(side, q::XY, 2.0);
        }
        let g = imp.godunov(&input.face(0), 1);
        assert!((g.normal + 4.0).abs() < 1e-12);
        assert!((g.xy - 2.0).abs() < 1e-12);
        assert_eq!(g.xz, 0.0);
    }

    #[test]
    fn velocity_jump_drives_shear() {
        let imp = Impedance::from_wave_speeds([1.0, 2.0, 1.0], [1.0, 2.0, 1.0]);
        let mut input = StressInput::zeros(1, 1);
        input.set(Side::Minus, 0, q::V, 0, 1.0);
        let g = imp.godunov(&input.face(0), 0);
        // eta_s = 0.5, jump = 1.
        assert!((g.xy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn from_parts_checks_length() {
        assert!(matches!(
            StressInput::from_parts(2, 3, vec![0.0; 54], vec![0.0; 53]),
            Err(FrictionError::StressShape { .. })
        ));
        assert!(StressInput::from_parts(2, 3, vec![0.0; 54], vec![0.0; 54]).is_ok());
    }
}
