//! Pore-pressure models that adjust the effective normal stress.
//!
//! [`ThermalPressurization`] tracks frictional heating and pore-fluid
//! diffusion across a shear zone of finite width. The diffusion equations
//! are solved in a truncated Fourier basis of [`N_TP`] modes on a
//! logarithmic wavenumber grid; each mode has an exact exponential update
//! for a step at constant heating.

use rupture_core::{FieldDef, FieldId, Layer, LayerMask};
use rupture_store::{Schema, SchemaError, StoreError};

use crate::access::{FaceReader, FaceWriter, PointVec};
use crate::config::ThermalPressurizationParams;

/// Number of Fourier modes.
pub const N_TP: usize = 60;

const LOG_DZ: f64 = 0.3;
const MAX_WAVE_NUMBER: f64 = 10.0;

/// Strategy for the pore pressure entering the effective normal stress.
pub trait PressureModel: Send + Sync + 'static {
    /// Per-face working state.
    type Face: Send;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Read the model's fields for one face.
    fn load(&self, reader: &FaceReader<'_>) -> Result<Self::Face, StoreError>;

    /// Reset a face to ambient conditions.
    fn initialise(&self, face: &mut Self::Face);

    /// Pore pressure at a point, positive values reduce compression.
    fn pressure(&self, face: &Self::Face, point: usize) -> f64;

    /// Advance a point by `dt` under frictional heating `shear_stress × slip_rate`.
    fn update(&self, face: &mut Self::Face, point: usize, dt: f64, shear_stress: f64, slip_rate: f64);

    /// Write the model's fields for one face.
    fn store(&self, face: &Self::Face, writer: &mut FaceWriter<'_>) -> Result<(), StoreError>;
}

/// Constant zero pore pressure.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPressurization;

impl PressureModel for NoPressurization {
    type Face = ();

    fn name(&self) -> &'static str {
        "none"
    }

    fn load(&self, _reader: &FaceReader<'_>) -> Result<(), StoreError> {
        Ok(())
    }

    fn initialise(&self, _face: &mut ()) {}

    fn pressure(&self, _face: &(), _point: usize) -> f64 {
        0.0
    }

    fn update(&self, _face: &mut (), _point: usize, _dt: f64, _shear_stress: f64, _slip_rate: f64) {}

    fn store(&self, _face: &(), _writer: &mut FaceWriter<'_>) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Fields holding thermal pressurization state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThermalPressurizationRecord {
    /// Temperature at the fault.
    pub temperature: FieldId,
    /// Pore pressure at the fault.
    pub pressure: FieldId,
    /// Temperature modes, [`N_TP`] components.
    pub theta: FieldId,
    /// Pressure modes, [`N_TP`] components.
    pub sigma: FieldId,
    /// Half width of the shear zone.
    pub half_width_shear_zone: FieldId,
    /// Hydraulic diffusivity.
    pub hydraulic_diffusivity: FieldId,
}

impl ThermalPressurizationRecord {
    /// Register the fields. Composed alongside a rate-and-state record.
    pub fn register(schema: &mut Schema) -> Result<Self, SchemaError> {
        let mask = LayerMask::ALL.without(Layer::Ghost);
        let point = |name: &str| FieldDef::per_point(name).layers(mask);
        Ok(Self {
            temperature: schema.register(point("temperature"))?,
            pressure: schema.register(point("pressure"))?,
            theta: schema.register(point("tp_theta").components(N_TP as u32))?,
            sigma: schema.register(point("tp_sigma").components(N_TP as u32))?,
            half_width_shear_zone: schema.register(point("half_width_shear_zone"))?,
            hydraulic_diffusivity: schema.register(point("hydraulic_diffusivity"))?,
        })
    }
}

/// Wavenumber grid and inverse-transform weights.
#[derive(Clone, Debug)]
pub struct TpModes {
    /// Dimensionless wavenumbers, increasing.
    pub wave_numbers: [f64; N_TP],
    /// Inverse Fourier weights.
    pub inverse: [f64; N_TP],
    /// Fourier coefficients of the Gaussian heat source.
    pub heat_source: [f64; N_TP],
}

impl TpModes {
    /// The logarithmic grid `k_n = 10·exp(−0.3(N − 1 − n))`.
    pub fn new() -> Self {
        let wave_numbers: [f64; N_TP] = std::array::from_fn(|n| {
            MAX_WAVE_NUMBER * (-LOG_DZ * (N_TP - 1 - n) as f64).exp()
        });
        let mut inverse: [f64; N_TP] = std::array::from_fn(|n| {
            (2.0 / std::f64::consts::PI).sqrt() * wave_numbers[n] * LOG_DZ
        });
        inverse[0] *= 0.5;
        let heat_source = wave_numbers.map(|k| (-0.5 * k * k).exp());
        Self {
            wave_numbers,
            inverse,
            heat_source,
        }
    }
}

impl Default for TpModes {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-face thermal pressurization state.
#[derive(Clone, Debug, Default)]
pub struct TpFace {
    /// Temperature per point.
    pub temperature: PointVec,
    /// Pore pressure per point.
    pub pressure: PointVec,
    /// Temperature modes, `[mode][point]`.
    pub theta: Vec<f64>,
    /// Pressure modes, `[mode][point]`.
    pub sigma: Vec<f64>,
    /// Shear-zone half width per point.
    pub half_width: PointVec,
    /// Hydraulic diffusivity per point.
    pub hydraulic_diffusivity: PointVec,
}

/// Thermal pressurization of the pore fluid by frictional heating.
#[derive(Clone, Debug)]
pub struct ThermalPressurization {
    record: ThermalPressurizationRecord,
    params: ThermalPressurizationParams,
    modes: TpModes,
}

impl ThermalPressurization {
    /// Register the model's fields and keep its constants.
    pub fn register(
        schema: &mut Schema,
        params: ThermalPressurizationParams,
    ) -> Result<Self, SchemaError> {
        Ok(Self::new(ThermalPressurizationRecord::register(schema)?, params))
    }

    /// From an already-registered record.
    pub fn new(record: ThermalPressurizationRecord, params: ThermalPressurizationParams) -> Self {
        Self {
            record,
            params,
            modes: TpModes::new(),
        }
    }

    /// The registered fields.
    pub fn record(&self) -> &ThermalPressurizationRecord {
        &self.record
    }

    /// The model constants.
    pub fn params(&self) -> &ThermalPressurizationParams {
        &self.params
    }
}

impl PressureModel for ThermalPressurization {
    type Face = TpFace;

    fn name(&self) -> &'static str {
        "thermal_pressurization"
    }

    fn load(&self, reader: &FaceReader<'_>) -> Result<TpFace, StoreError> {
        let r = &self.record;
        Ok(TpFace {
            temperature: reader.point_values(r.temperature)?,
            pressure: reader.point_values(r.pressure)?,
            theta: reader.flattened(r.theta, N_TP)?,
            sigma: reader.flattened(r.sigma, N_TP)?,
            half_width: reader.point_values(r.half_width_shear_zone)?,
            hydraulic_diffusivity: reader.point_values(r.hydraulic_diffusivity)?,
        })
    }

    fn initialise(&self, face: &mut TpFace) {
        face.temperature.fill(self.params.initial_temperature);
        face.pressure.fill(self.params.initial_pressure);
        face.theta.fill(0.0);
        face.sigma.fill(0.0);
    }

    fn pressure(&self, face: &TpFace, point: usize) -> f64 {
        face.pressure[point]
    }

    fn update(&self, face: &mut TpFace, point: usize, dt: f64, shear_stress: f64, slip_rate: f64) {
        let w = face.half_width[point];
        if w <= 0.0 || dt == 0.0 {
            return;
        }
        let points = face.temperature.len();
        let alpha_hy = face.hydraulic_diffusivity[point].max(0.0);
        let p = &self.params;
        let heating = shear_stress.abs() * slip_rate / p.heat_capacity;

        let (mut temperature, mut pressure) = (0.0, 0.0);
        for n in 0..N_TP {
            let k = self.modes.wave_numbers[n] / w;
            let a = p.thermal_diffusivity * k * k;
            let c = alpha_hy * k * k;
            let s = self.modes.heat_source[n] * heating;
            let i = n * points + point;
            let theta0 = face.theta[i];

            let ea = (-a * dt).exp();
            let theta = if a > 0.0 {
                theta0 * ea - (s / a) * (-a * dt).exp_m1()
            } else {
                theta0 + s * dt
            };
            let drive = p.undrained_response * (s - a * theta0);
            let transfer = if (c - a).abs() > 1e-9 * c.max(a) {
                (ea - (-c * dt).exp()) / (c - a)
            } else {
                dt * ea
            };
            let sigma = face.sigma[i] * (-c * dt).exp() + drive * transfer;

            face.theta[i] = theta;
            face.sigma[i] = sigma;
            temperature += self.modes.inverse[n] * theta / w;
            pressure += self.modes.inverse[n] * sigma / w;
        }
        face.temperature[point] = p.initial_temperature + temperature;
        face.pressure[point] = p.initial_pressure + pressure;
    }

    fn store(&self, face: &TpFace, writer: &mut FaceWriter<'_>) -> Result<(), StoreError> {
        let r = &self.record;
        writer.put_points(r.temperature, &face.temperature)?;
        writer.put_points(r.pressure, &face.pressure)?;
        writer.put_flattened(r.theta, &face.theta)?;
        writer.put_flattened(r.sigma, &face.sigma)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ThermalPressurizationParams {
        ThermalPressurizationParams {
            thermal_diffusivity: 1e-6,
            heat_capacity: 2.7e6,
            undrained_response: 0.1e6,
            initial_temperature: 483.15,
            initial_pressure: 10e6,
        }
    }

    fn model() -> ThermalPressurization {
        let mut schema = Schema::new();
        ThermalPressurization::register(&mut schema, params()).unwrap()
    }

    fn face(points: usize) -> TpFace {
        TpFace {
            temperature: PointVec::from_elem(0.0, points),
            pressure: PointVec::from_elem(0.0, points),
            theta: vec![0.0; N_TP * points],
            sigma: vec![0.0; N_TP * points],
            half_width: PointVec::from_elem(0.01, points),
            hydraulic_diffusivity: PointVec::from_elem(1e-4, points),
        }
    }

    #[test]
    fn grid_is_logarithmic_and_ends_at_max() {
        let modes = TpModes::new();
        assert!((modes.wave_numbers[N_TP - 1] - MAX_WAVE_NUMBER).abs() < 1e-12);
        for pair in modes.wave_numbers.windows(2) {
            assert!((pair[1] / pair[0] - LOG_DZ.exp()).abs() < 1e-12);
        }
        assert!(modes.inverse[0] < modes.inverse[1]);
    }

    #[test]
    fn initialise_sets_ambient_state() {
        let tp = model();
        let mut f = face(3);
        f.theta[5] = 1.0;
        tp.initialise(&mut f);
        assert!(f.temperature.iter().all(|&t| t == 483.15));
        assert_eq!(tp.pressure(&f, 2), 10e6);
        assert!(f.theta.iter().all(|&t| t == 0.0));
    }

    #[test]
    fn heating_raises_temperature_and_pressure() {
        let tp = model();
        let mut f = face(2);
        tp.initialise(&mut f);
        for _ in 0..10 {
            tp.update(&mut f, 1, 1e-3, 50e6, 1.0);
        }
        assert!(f.temperature[1] > 483.15);
        assert!(f.pressure[1] > 10e6);
        // The other point saw no heat.
        assert_eq!(f.temperature[0], 483.15);
    }

    #[test]
    fn no_slip_no_change() {
        let tp = model();
        let mut f = face(1);
        tp.initialise(&mut f);
        tp.update(&mut f, 0, 1e-3, 50e6, 0.0);
        assert_eq!(f.temperature[0], 483.15);
        assert_eq!(f.pressure[0], 10e6);
    }

    #[test]
    fn zero_width_shear_zone_is_inert() {
        let tp = model();
        let mut f = face(1);
        tp.initialise(&mut f);
        f.half_width[0] = 0.0;
        tp.update(&mut f, 0, 1e-3, 50e6, 1.0);
        assert_eq!(f.pressure[0], 10e6);
    }

    #[test]
    fn no_pressurization_is_zero() {
        assert_eq!(NoPressurization.pressure(&(), 0), 0.0);
    }
}
