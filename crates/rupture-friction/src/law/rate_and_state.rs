//! Rate-and-state friction.
//!
//! The friction coefficient is the regularised form
//!
//! ```text
//! μ(V, θ) = a · asinh( V / (2 V0) · exp((f0 + b ln(V0 θ / L)) / a) )
//! ```
//!
//! Each step solves `τ − η_s V − μ(V, θ) σ_eff = 0` for the slip rate with
//! a Newton iteration in `ln V` kept inside a bisection bracket, alternating
//! with the state update a fixed number of times.

use rupture_core::{Layer, Real};
use rupture_store::{FaceRecord, LayeredStore, RateAndStateRecord, RuptureRecord, StoreError};

use crate::access::{FaceReader, FaceWriter, PointVec};
use crate::common::{resolve_shear, CommonFace, StepInfo};
use crate::config::RateAndStateParams;
use crate::error::FrictionError;
use crate::evolution::{StateEvolution, V_MIN};
use crate::law::FrictionLaw;
use crate::stress::{q, FaceStress};
use crate::thermal::PressureModel;

const MIN_A: f64 = 1e-12;
const MIN_SL0: f64 = 1e-12;
const MAX_LN_X: f64 = 500.0;

/// Friction coefficient and its slip-rate derivative.
///
/// `a`, `theta`, and `sl0` are floored away from zero. Above `ln X = 500`
/// the asymptotic form `a (ln(V/V0) + ln X)` is used.
pub fn friction_coefficient(
    slip_rate: f64,
    theta: f64,
    a: f64,
    b: f64,
    sl0: f64,
    f0: f64,
    sr0: f64,
) -> (f64, f64) {
    let a = a.max(MIN_A);
    let theta = theta.max(f64::MIN_POSITIVE);
    let sl0 = sl0.max(MIN_SL0);
    let ln_x = (f0 + b * (sr0 * theta / sl0).ln()) / a;

    if ln_x >= MAX_LN_X {
        if slip_rate <= 0.0 {
            return (0.0, f64::MAX);
        }
        return (a * ((slip_rate / sr0).ln() + ln_x), a / slip_rate);
    }
    let x = ln_x.exp() / (2.0 * sr0);
    let z = slip_rate.max(0.0) * x;
    (a * z.asinh(), a * x / z.hypot(1.0))
}

/// Result of a bracketed Newton solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NewtonResult {
    /// Final iterate.
    pub root: f64,
    /// Iterations taken.
    pub iterations: usize,
    /// Whether the tolerance was met.
    pub converged: bool,
}

/// Find the root of a decreasing function on `[lo, hi]`.
///
/// `f` returns the value and derivative. Newton steps that leave the
/// current bracket, or are not finite, are replaced by bisection.
/// Convergence is `|Δ| ≤ tolerance`. An inverted bracket collapses to
/// `lo`.
pub fn safeguarded_newton<F>(
    f: F,
    mut lo: f64,
    mut hi: f64,
    guess: f64,
    tolerance: f64,
    max_iterations: usize,
) -> NewtonResult
where
    F: Fn(f64) -> (f64, f64),
{
    hi = hi.max(lo);
    let mut x = guess.clamp(lo, hi);
    for iteration in 1..=max_iterations {
        let (value, slope) = f(x);
        if value == 0.0 {
            return NewtonResult {
                root: x,
                iterations: iteration,
                converged: true,
            };
        }
        if value > 0.0 {
            lo = x;
        } else {
            hi = x;
        }
        let newton = x - value / slope;
        let next = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
        let delta = (next - x).abs();
        x = next;
        if delta <= tolerance {
            return NewtonResult {
                root: x,
                iterations: iteration,
                converged: true,
            };
        }
    }
    NewtonResult {
        root: x,
        iterations: max_iterations,
        converged: false,
    }
}

/// Working copy of one rate-and-state face.
#[derive(Clone, Debug, Default)]
pub struct RateAndStateFace<F> {
    /// Base fields.
    pub common: CommonFace,
    /// Initial stress rows `xx yy zz xy yz xz`.
    pub initial_stress: [PointVec; 6],
    /// Direct-effect parameter.
    pub a: PointVec,
    /// Evolution-effect parameter.
    pub b: PointVec,
    /// Characteristic slip distance.
    pub sl0: PointVec,
    /// Pore-pressure model state.
    pub pressure: F,
}

/// Rate-and-state friction with state evolution `E` and pore-pressure
/// model `P`.
#[derive(Clone, Debug)]
pub struct RateAndStateLaw<E, P> {
    record: RateAndStateRecord,
    params: RateAndStateParams,
    threshold: f64,
    evolution: E,
    pressure: P,
}

impl<E: StateEvolution, P: PressureModel> RateAndStateLaw<E, P> {
    /// Law over `record`.
    pub fn new(
        record: RateAndStateRecord,
        params: RateAndStateParams,
        threshold: f64,
        evolution: E,
        pressure: P,
    ) -> Self {
        Self {
            record,
            params,
            threshold,
            evolution,
            pressure,
        }
    }

    /// The registered fields.
    pub fn record(&self) -> &RateAndStateRecord {
        &self.record
    }

    /// The law constants.
    pub fn params(&self) -> &RateAndStateParams {
        &self.params
    }

    /// The pore-pressure model.
    pub fn pressure_model(&self) -> &P {
        &self.pressure
    }

    fn mu<F>(&self, face: &RateAndStateFace<F>, p: usize, slip_rate: f64, theta: f64) -> (f64, f64) {
        friction_coefficient(
            slip_rate,
            theta,
            face.a[p],
            face.b[p],
            face.sl0[p],
            self.params.f0,
            self.params.sr0,
        )
    }

    /// Slip rate balancing shear stress `tau` against friction at state
    /// `theta` and effective normal stress `sigma_eff`.
    ///
    /// The solve runs in `u = ln V`, so the tolerance bounds the relative
    /// change of the slip rate.
    pub fn solve_slip_rate<F>(
        &self,
        face: &RateAndStateFace<F>,
        p: usize,
        tau: f64,
        sigma_eff: f64,
        theta: f64,
        guess: f64,
    ) -> f64 {
        let eta_s = face.common.impedance.eta_s;
        if tau <= 0.0 || eta_s <= 0.0 {
            return 0.0;
        }
        let hi = tau / eta_s;
        if sigma_eff <= 0.0 {
            return hi;
        }
        let (ln_lo, ln_hi) = (f64::MIN_POSITIVE.ln(), hi.ln());
        // Below the smallest normal f64 the root cannot be resolved in ln V.
        if ln_hi <= ln_lo {
            return hi;
        }
        let result = safeguarded_newton(
            |u| {
                let v = u.exp();
                let (mu, dmu) = self.mu(face, p, v, theta);
                (
                    tau - eta_s * v - mu * sigma_eff,
                    -v * (eta_s + dmu * sigma_eff),
                )
            },
            ln_lo,
            ln_hi,
            guess.max(V_MIN).ln(),
            self.params.tolerance,
            self.params.max_iterations,
        );
        if !result.converged {
            tracing::trace!(
                point = p,
                iterations = result.iterations,
                slip_rate = result.root.exp(),
                "slip-rate solve hit iteration cap"
            );
        }
        result.root.exp().min(hi)
    }
}

impl<E: StateEvolution, P: PressureModel> FrictionLaw for RateAndStateLaw<E, P> {
    type Face = RateAndStateFace<P::Face>;

    fn name(&self) -> &'static str {
        E::NAME
    }

    fn base(&self) -> &RuptureRecord {
        self.record.base()
    }

    fn prepare(&self, store: &mut LayeredStore, layer: Layer) -> Result<(), FrictionError> {
        let Some(b) = self.params.b else {
            return Ok(());
        };
        if store.face_count(layer) == 0 || !store.contains(layer, self.record.rs_b) {
            return Ok(());
        }
        store.reals_mut(layer, self.record.rs_b)?.fill(b as Real);
        Ok(())
    }

    fn load_face(&self, reader: &FaceReader<'_>) -> Result<Self::Face, StoreError> {
        let r = &self.record;
        Ok(RateAndStateFace {
            common: CommonFace::load(reader, &r.base)?,
            initial_stress: reader.components::<6>(r.initial_stress)?,
            a: reader.point_values(r.rs_a)?,
            b: reader.point_values(r.rs_b)?,
            sl0: reader.point_values(r.rs_sl0)?,
            pressure: self.pressure.load(reader)?,
        })
    }

    fn initialise_face(&self, face: &mut Self::Face) {
        for p in 0..face.common.points() {
            let v = face.common.slip_rate(p);
            if face.common.state[p] <= 0.0 {
                face.common.state[p] = self.evolution.steady_state(v, face.sl0[p].max(MIN_SL0));
            }
            face.common.mu[p] = self.mu(face, p, v, face.common.state[p]).0;
        }
        self.pressure.initialise(&mut face.pressure);
    }

    fn update(&self, face: &mut Self::Face, stress: &FaceStress<'_>, step: &StepInfo) -> usize {
        let end = step.end();
        let dt = step.dt;
        let eta_s = face.common.impedance.eta_s;
        let mut ruptured = 0;

        for p in 0..face.common.points() {
            let g = face.common.impedance.godunov(stress, p);
            let normal = face.initial_stress[q::XX][p] + g.normal;
            let t1 = face.initial_stress[q::XY][p] + g.xy;
            let t2 = face.initial_stress[q::XZ][p] + g.xz;
            let tau = t1.hypot(t2);
            let sigma_eff = (-normal - self.pressure.pressure(&face.pressure, p)).max(0.0);

            let sl0 = face.sl0[p].max(MIN_SL0);
            let theta0 = face.common.state[p];
            let v_old = face.common.slip_rate(p);
            let mut v_mid = v_old;
            let mut v_new = v_old;
            for _ in 0..self.params.state_iterations {
                let theta = self.evolution.update_state(theta0, dt, v_mid, sl0);
                v_new = self.solve_slip_rate(face, p, tau, sigma_eff, theta, v_new);
                v_mid = 0.5 * (v_old + v_new);
            }
            let theta_new = self.evolution.update_state(theta0, dt, v_mid, sl0);

            let shear = resolve_shear(t1, t2, v_new, eta_s);
            self.pressure.update(
                &mut face.pressure,
                p,
                dt,
                shear.traction1.hypot(shear.traction2),
                v_new,
            );
            face.common
                .advance_slip(p, shear.slip_rate1, shear.slip_rate2, dt);
            if face.common.detect_rupture(p, self.threshold, end) {
                ruptured += 1;
            }
            face.common.state[p] = theta_new;
            face.common.mu[p] = self.mu(face, p, v_new, theta_new).0;

            let txy = shear.traction1 - face.initial_stress[q::XY][p];
            let txz = shear.traction2 - face.initial_stress[q::XZ][p];
            face.common.traction_xy[p] = txy;
            face.common.traction_xz[p] = txz;
            face.common.impose(stress, p, g.normal, txy, txz);
        }
        ruptured
    }

    fn store_face(&self, face: &Self::Face, writer: &mut FaceWriter<'_>) -> Result<(), StoreError> {
        face.common.store(writer, &self.record.base)?;
        self.pressure.store(&face.pressure, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::FlagVec;
    use crate::evolution::{AgingLaw, SlipLaw};
    use crate::stress::{Impedance, StressInput};
    use crate::thermal::NoPressurization;
    use proptest::prelude::*;
    use rupture_store::Schema;

    fn params() -> RateAndStateParams {
        RateAndStateParams {
            f0: 0.6,
            sr0: 1e-6,
            b: None,
            state_iterations: 2,
            tolerance: 1e-12,
            max_iterations: 100,
        }
    }

    fn law() -> RateAndStateLaw<AgingLaw, NoPressurization> {
        let mut schema = Schema::new();
        let record = RateAndStateRecord::register(&mut schema).unwrap();
        RateAndStateLaw::new(record, params(), 1e-3, AgingLaw, NoPressurization)
    }

    fn zeros(n: usize) -> PointVec {
        PointVec::from_elem(0.0, n)
    }

    /// One point with unit materials (`eta_s = 0.5`) and normal stress −50.
    fn face(shear: f64) -> RateAndStateFace<()> {
        let n = 1;
        let mut initial_stress: [PointVec; 6] = std::array::from_fn(|_| zeros(n));
        initial_stress[q::XX][0] = -50.0;
        initial_stress[q::XY][0] = shear;
        RateAndStateFace {
            common: CommonFace {
                impedance: Impedance::from_wave_speeds([1.0, 2.0, 1.0], [1.0, 2.0, 1.0]),
                mu: zeros(n),
                slip: zeros(n),
                slip1: zeros(n),
                slip2: zeros(n),
                slip_rate1: PointVec::from_elem(1e-6, n),
                slip_rate2: zeros(n),
                traction_xy: zeros(n),
                traction_xz: zeros(n),
                state: zeros(n),
                rupture_time: zeros(n),
                ruptured: FlagVec::from_elem(false, n),
                imposed_plus: vec![0.0; 9 * n],
                imposed_minus: vec![0.0; 9 * n],
            },
            initial_stress,
            a: PointVec::from_elem(0.01, n),
            b: PointVec::from_elem(0.014, n),
            sl0: PointVec::from_elem(0.2, n),
            pressure: (),
        }
    }

    #[test]
    fn coefficient_is_f0_at_steady_reference_rate() {
        // V = V0, θ = L/V0: μ = a asinh(exp(f0/a) / 2) ≈ f0.
        let (mu, dmu) = friction_coefficient(1e-6, 0.2 / 1e-6, 0.01, 0.014, 0.2, 0.6, 1e-6);
        assert!((mu - 0.6).abs() < 1e-6);
        assert!(dmu > 0.0);
    }

    #[test]
    fn coefficient_overflow_branch_is_finite() {
        let (mu, dmu) = friction_coefficient(1.0, 1e300, 1e-6, 0.5, 1e-3, 0.6, 1e-6);
        assert!(mu.is_finite() && dmu.is_finite());
        let (mu0, _) = friction_coefficient(0.0, 1e300, 1e-6, 0.5, 1e-3, 0.6, 1e-6);
        assert_eq!(mu0, 0.0);
    }

    #[test]
    fn coefficient_branches_agree_near_threshold() {
        // ln X just below and above 500 gives nearly the same μ.
        let a = 1e-3;
        let below = friction_coefficient(1.0, 1.0, a, 0.0, 1.0, 0.4999, 1e-6).0;
        let above = friction_coefficient(1.0, 1.0, a, 0.0, 1.0, 0.5001, 1e-6).0;
        assert!((above - below).abs() < 1e-3);
    }

    #[test]
    fn newton_finds_linear_root() {
        let r = safeguarded_newton(|x| (3.0 - 2.0 * x, -2.0), 0.0, 10.0, 9.0, 1e-12, 50);
        assert!(r.converged);
        assert!((r.root - 1.5).abs() < 1e-12);
    }

    #[test]
    fn newton_bisects_bad_steps() {
        // Zero slope makes every Newton step non-finite.
        let r = safeguarded_newton(|x| (1.0 - x, 0.0), 0.0, 4.0, 0.0, 1e-12, 200);
        assert!(r.converged);
        assert!((r.root - 1.0).abs() < 1e-9);
    }

    #[test]
    fn newton_tolerates_inverted_bracket() {
        let r = safeguarded_newton(|x| (1.0 - x, -1.0), 2.0, -3.0, 0.0, 1e-12, 20);
        assert!(r.root.is_finite());
        assert!(r.root >= 2.0);
    }

    #[test]
    fn subnormal_shear_stress_gives_tiny_slip_rate() {
        let law = law();
        let f = face(0.0);
        let v = law.solve_slip_rate(&f, 0, 1e-310, 50.0, 1.0, 0.0);
        assert!(v.is_finite());
        assert!((0.0..1e-300).contains(&v));
    }

    #[test]
    fn solved_slip_rate_balances_stress() {
        let law = law();
        let f = face(40.0);
        let theta = 0.2 / 1e-6;
        let v = law.solve_slip_rate(&f, 0, 40.0, 50.0, theta, 0.0);
        let (mu, _) = law.mu(&f, 0, v, theta);
        let residual = 40.0 - 0.5 * v - mu * 50.0;
        assert!(residual.abs() < 1e-8, "residual {residual}");
        assert!(v > 0.0 && v < 80.0);
    }

    #[test]
    fn tensile_fault_slides_freely() {
        let law = law();
        let f = face(10.0);
        assert_eq!(law.solve_slip_rate(&f, 0, 10.0, 0.0, 1.0, 0.0), 20.0);
        assert_eq!(law.solve_slip_rate(&f, 0, 0.0, 50.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn initialise_seeds_steady_state() {
        let law = law();
        let mut f = face(30.0);
        law.initialise_face(&mut f);
        assert!((f.common.state[0] - 0.2 / 1e-6).abs() < 1e-6);
        assert!((f.common.mu[0] - 0.6).abs() < 1e-3);
    }

    #[test]
    fn high_stress_ruptures() {
        let law = law();
        let mut f = face(45.0);
        law.initialise_face(&mut f);
        let input = StressInput::zeros(1, 1);
        let mut count = 0;
        for i in 0..5 {
            count += law.update(&mut f, &input.face(0), &StepInfo { time: i as f64 * 0.01, dt: 0.01 });
        }
        assert_eq!(count, 1);
        assert!(f.common.ruptured[0]);
        assert!(f.common.slip[0] > 0.0);
        // Total shear traction never exceeds the applied stress.
        assert!(f.common.traction_xy[0] <= 0.0);
    }

    #[test]
    fn slip_law_name() {
        let mut schema = Schema::new();
        let record = RateAndStateRecord::register(&mut schema).unwrap();
        let law = RateAndStateLaw::new(record, params(), 1e-3, SlipLaw, NoPressurization);
        assert_eq!(law.name(), "slip");
    }

    proptest! {
        #[test]
        fn coefficient_increases_with_slip_rate(
            v in 1e-9f64..10.0,
            scale in 1.01f64..10.0,
            theta in 1e-3f64..1e6,
        ) {
            let (lo, _) = friction_coefficient(v, theta, 0.01, 0.014, 0.2, 0.6, 1e-6);
            let (hi, _) = friction_coefficient(v * scale, theta, 0.01, 0.014, 0.2, 0.6, 1e-6);
            prop_assert!(hi > lo);
        }

        #[test]
        fn solved_slip_rate_is_bracketed(tau in 0.0f64..100.0, sigma in 0.0f64..100.0) {
            let law = law();
            let f = face(tau);
            let v = law.solve_slip_rate(&f, 0, tau, sigma, 1.0, 0.0);
            prop_assert!(v >= 0.0 && v <= tau / 0.5 + 1e-12);
        }
    }
}
