//! Friction laws.
//!
//! A law is a strategy plugged into [`FrictionSolver`](crate::FrictionSolver).
//! The solver copies each face out of the store, hands it to the law, and
//! writes it back. Laws never touch the store during [`FrictionLaw::update`],
//! so faces can be updated in parallel.

pub mod linear_slip_weakening;
pub mod rate_and_state;

use rupture_core::Layer;
use rupture_store::{LayeredStore, RuptureRecord, StoreError};

use crate::access::{FaceReader, FaceWriter};
use crate::common::StepInfo;
use crate::error::FrictionError;
use crate::stress::FaceStress;

pub use linear_slip_weakening::{LinearSlipWeakeningLaw, LswFace};
pub use rate_and_state::{RateAndStateFace, RateAndStateLaw};

/// Per-point friction update for one family of laws.
///
/// # Contract
///
/// - `load_face` followed by `store_face` with no update in between must
///   leave the store unchanged.
/// - `update` must not decrease accumulated slip.
/// - `update` returns the number of points that ruptured during the step.
pub trait FrictionLaw: Send + Sync + 'static {
    /// Working copy of one face.
    type Face: Send;

    /// Config name of the law.
    fn name(&self) -> &'static str;

    /// Base fields shared by all laws.
    fn base(&self) -> &RuptureRecord;

    /// Layer-wide setup and parameter checks before faces are
    /// initialised.
    fn prepare(&self, _store: &mut LayeredStore, _layer: Layer) -> Result<(), FrictionError> {
        Ok(())
    }

    /// Copy one face out of the store.
    fn load_face(&self, reader: &FaceReader<'_>) -> Result<Self::Face, StoreError>;

    /// Derive the initial friction state of a face from its parameters.
    fn initialise_face(&self, face: &mut Self::Face);

    /// Advance a face by one step.
    fn update(&self, face: &mut Self::Face, stress: &FaceStress<'_>, step: &StepInfo) -> usize;

    /// Copy one face back into the store.
    fn store_face(&self, face: &Self::Face, writer: &mut FaceWriter<'_>) -> Result<(), StoreError>;
}
