//! Layer-wide friction driver.
//!
//! [`FrictionSolver`] runs a [`FrictionLaw`] over every face of one layer:
//! faces are copied out of the store in parallel, updated in parallel,
//! then written back in face order. All faces are loaded before anything
//! is written, so a failed load leaves the store untouched.

use std::time::Instant;

use rayon::prelude::*;
use rupture_core::Layer;
use rupture_store::LayeredStore;

use crate::access::{FaceReader, FaceWriter};
use crate::common::StepInfo;
use crate::error::FrictionError;
use crate::law::FrictionLaw;
use crate::stress::StressInput;

// ── StepSummary ─────────────────────────────────────────────────

/// Outcome of one layer update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepSummary {
    /// Faces updated.
    pub faces: usize,
    /// Points that ruptured during the step.
    pub ruptured: usize,
}

impl StepSummary {
    /// Combine the summaries of two layers.
    pub fn merge(self, other: Self) -> Self {
        Self {
            faces: self.faces + other.faces,
            ruptured: self.ruptured + other.ruptured,
        }
    }
}

// ── FrictionSolver ──────────────────────────────────────────────

/// Drives one friction law over the faces of a [`LayeredStore`].
#[derive(Clone, Debug)]
pub struct FrictionSolver<L> {
    law: L,
}

impl<L: FrictionLaw> FrictionSolver<L> {
    /// Solver for `law`.
    pub fn new(law: L) -> Self {
        Self { law }
    }

    /// The law being driven.
    pub fn law(&self) -> &L {
        &self.law
    }

    /// Derive initial friction state for every face of `layer`.
    pub fn initialise(&self, store: &mut LayeredStore, layer: Layer) -> Result<(), FrictionError> {
        self.law.prepare(store, layer)?;
        let mut faces = self.load(store, layer)?;
        faces
            .par_iter_mut()
            .for_each(|face| self.law.initialise_face(face));
        self.write_back(store, layer, &faces)?;
        tracing::debug!(
            law = self.law.name(),
            ?layer,
            faces = faces.len(),
            "initialised friction state"
        );
        Ok(())
    }

    /// Advance every face of `layer` from `time` to `time + dt`.
    ///
    /// `dt == 0` leaves the store unchanged. A negative or non-finite
    /// `dt` is rejected before any face is touched.
    pub fn step(
        &self,
        store: &mut LayeredStore,
        layer: Layer,
        stress: &StressInput,
        time: f64,
        dt: f64,
    ) -> Result<StepSummary, FrictionError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(FrictionError::InvalidTimeStep { dt });
        }
        let faces = store.face_count(layer);
        let points = store.quadrature_points();
        if stress.faces() != faces || stress.points() != points {
            return Err(FrictionError::StressShape {
                faces,
                points,
                found_faces: stress.faces(),
                found_points: stress.points(),
            });
        }
        if dt == 0.0 || faces == 0 {
            return Ok(StepSummary {
                faces,
                ruptured: 0,
            });
        }

        let start = Instant::now();
        let step = StepInfo { time, dt };
        let mut working = self.load(store, layer)?;
        let ruptured: usize = working
            .par_iter_mut()
            .enumerate()
            .map(|(i, face)| self.law.update(face, &stress.face(i), &step))
            .sum();
        self.write_back(store, layer, &working)?;

        tracing::trace!(
            law = self.law.name(),
            ?layer,
            faces,
            ruptured,
            elapsed_us = start.elapsed().as_micros() as u64,
            "friction step"
        );
        if ruptured > 0 {
            tracing::debug!(?layer, ruptured, time = step.end(), "rupture front advanced");
        }
        Ok(StepSummary { faces, ruptured })
    }

    fn load(&self, store: &LayeredStore, layer: Layer) -> Result<Vec<L::Face>, FrictionError> {
        let faces = store.face_count(layer);
        let loaded = (0..faces)
            .into_par_iter()
            .map(|i| self.law.load_face(&FaceReader::new(store, layer, i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(loaded)
    }

    fn write_back(
        &self,
        store: &mut LayeredStore,
        layer: Layer,
        faces: &[L::Face],
    ) -> Result<(), FrictionError> {
        for (i, face) in faces.iter().enumerate() {
            self.law
                .store_face(face, &mut FaceWriter::new(store, layer, i))?;
        }
        Ok(())
    }
}
