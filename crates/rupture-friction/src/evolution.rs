//! State-variable evolution laws for rate-and-state friction.
//!
//! All laws integrate the state exactly over one step at a fixed slip
//! rate. Inputs and outputs are `f64` whatever the storage precision.

/// Slip-rate floor used by state updates.
pub const V_MIN: f64 = 1e-14;

/// Evolve the rate-and-state memory variable over one step.
pub trait StateEvolution: Send + Sync + 'static {
    /// Config name of the law.
    const NAME: &'static str;

    /// State after `dt` at constant slip rate `slip_rate`, starting from
    /// `state0`, with characteristic slip distance `sl0`.
    ///
    /// `slip_rate` is floored at [`V_MIN`]; `dt == 0` returns `state0`.
    fn update_state(&self, state0: f64, dt: f64, slip_rate: f64, sl0: f64) -> f64;

    /// Steady-state value `L / V`.
    fn steady_state(&self, slip_rate: f64, sl0: f64) -> f64 {
        sl0 / slip_rate.max(V_MIN)
    }
}

/// Aging law: `dθ/dt = 1 − Vθ/L`.
///
/// ```text
/// θ(t) = θ0·exp(−Vt/L) + (L/V)(1 − exp(−Vt/L))
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AgingLaw;

impl StateEvolution for AgingLaw {
    const NAME: &'static str = "aging";

    fn update_state(&self, state0: f64, dt: f64, slip_rate: f64, sl0: f64) -> f64 {
        if dt == 0.0 {
            return state0;
        }
        let v = slip_rate.max(V_MIN);
        let x = -v * dt / sl0;
        state0 * x.exp() - (sl0 / v) * x.exp_m1()
    }
}

/// Slip law: `dθ/dt = −(Vθ/L)·ln(Vθ/L)`.
///
/// ```text
/// θ(t) = (L/V)·exp(ln(Vθ0/L)·exp(−Vt/L))
/// ```
///
/// Implements the closed form of the ODE above. It has not been checked
/// against an independent reference implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlipLaw;

impl StateEvolution for SlipLaw {
    const NAME: &'static str = "slip";

    fn update_state(&self, state0: f64, dt: f64, slip_rate: f64, sl0: f64) -> f64 {
        if dt == 0.0 {
            return state0;
        }
        let v = slip_rate.max(V_MIN);
        let steady = sl0 / v;
        steady * ((v * state0 / sl0).ln() * (-v * dt / sl0).exp()).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slip_law_matches_closed_form() {
        let (state0, v, l, t) = (1e-3_f64, 0.5_f64, 0.01_f64, 0.1_f64);
        let expected = (l / v) * ((v * state0 / l).ln() * (-(v / l) * t).exp()).exp();
        let got = SlipLaw.update_state(state0, t, v, l);
        assert!((got - expected).abs() <= 1e-15 * expected.abs());
        assert!(got > 0.0);
    }

    #[test]
    fn slip_law_reaches_steady_state() {
        let got = SlipLaw.update_state(1e-3, 1e3, 0.5, 0.01);
        assert!((got - 0.02).abs() < 1e-12);
    }

    #[test]
    fn aging_law_reaches_steady_state() {
        let got = AgingLaw.update_state(5.0, 1e3, 0.5, 0.01);
        assert!((got - 0.02).abs() < 1e-12);
    }

    #[test]
    fn aging_law_heals_at_rest() {
        // V -> 0: dθ/dt = 1.
        let got = AgingLaw.update_state(2.0, 0.5, 0.0, 0.01);
        assert!((got - 2.5).abs() < 1e-9);
    }

    #[test]
    fn zero_step_is_identity() {
        assert_eq!(SlipLaw.update_state(0.3, 0.0, 0.0, 0.01), 0.3);
        assert_eq!(AgingLaw.update_state(0.3, 0.0, 1.0, 0.01), 0.3);
    }

    #[test]
    fn zero_slip_rate_is_finite() {
        let got = SlipLaw.update_state(0.3, 1.0, 0.0, 0.01);
        assert!(got.is_finite() && got > 0.0);
    }

    proptest! {
        #[test]
        fn slip_law_stays_positive(
            state0 in 1e-6f64..1e3,
            dt in 0.0f64..10.0,
            v in 1e-9f64..10.0,
            l in 1e-4f64..1.0,
        ) {
            let s = SlipLaw.update_state(state0, dt, v, l);
            prop_assert!(s > 0.0 && s.is_finite());
        }

        #[test]
        fn aging_law_moves_toward_steady_state(
            state0 in 1e-6f64..1e3,
            dt in 0.0f64..10.0,
            v in 1e-6f64..10.0,
            l in 1e-4f64..1.0,
        ) {
            let s = AgingLaw.update_state(state0, dt, v, l);
            let steady = l / v;
            let (lo, hi) = if state0 < steady { (state0, steady) } else { (steady, state0) };
            prop_assert!(s >= lo * (1.0 - 1e-12) && s <= hi * (1.0 + 1e-12));
        }
    }
}
