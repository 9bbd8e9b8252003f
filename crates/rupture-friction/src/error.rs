//! Error types for configuration, kernel selection, and friction updates.

use std::path::PathBuf;

use rupture_core::Layer;
use rupture_store::{SchemaError, StoreError};
use thiserror::Error;

/// Errors from loading or validating a [`RuptureConfig`](crate::RuptureConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config at {path:?}")]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config text is not valid TOML for this schema.
    #[error("failed to parse rupture config")]
    Parse(#[from] toml::de::Error),
    /// The selected law needs a parameter the config does not provide.
    #[error("friction law '{law}' requires parameter '{parameter}'")]
    MissingParameter {
        /// The selected friction law.
        law: &'static str,
        /// Dotted path of the missing parameter.
        parameter: &'static str,
    },
    /// A parameter is present but out of range.
    #[error("invalid value for '{parameter}': {reason}")]
    InvalidValue {
        /// Dotted path of the parameter.
        parameter: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// A combination of options that no law implements.
    #[error("unsupported configuration: {reason}")]
    Unsupported {
        /// What was requested.
        reason: String,
    },
}

/// Errors from kernel registration and selection.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KernelError {
    /// No kernel is registered for the requested order and shape.
    #[error("no kernel registered for order {order} and shape {m}x{n}x{k}")]
    NotFound {
        /// Polynomial order.
        order: u32,
        /// Rows of `a` and `c`.
        m: usize,
        /// Columns of `b` and `c`.
        n: usize,
        /// Columns of `a`, rows of `b`.
        k: usize,
    },
    /// A kernel was registered twice for the same key.
    #[error("kernel already registered for order {order} and shape {m}x{n}x{k}")]
    Duplicate {
        /// Polynomial order.
        order: u32,
        /// Rows of `a` and `c`.
        m: usize,
        /// Columns of `b` and `c`.
        n: usize,
        /// Columns of `a`, rows of `b`.
        k: usize,
    },
}

/// Errors from setting up or running a friction update.
#[derive(Debug, Error)]
pub enum FrictionError {
    /// Field registration failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Store access failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Invalid or incomplete configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Kernel selection failed.
    #[error(transparent)]
    Kernel(#[from] KernelError),
    /// The time step is negative or not finite.
    #[error("invalid time step {dt}")]
    InvalidTimeStep {
        /// The offending step length.
        dt: f64,
    },
    /// A stored per-point parameter is out of range.
    #[error("{field} is {value} on {layer:?} face {face}: {reason}")]
    InvalidParameter {
        /// Field name.
        field: &'static str,
        /// Layer holding the face.
        layer: Layer,
        /// Face index within the layer.
        face: usize,
        /// The offending value.
        value: f64,
        /// What the value must satisfy.
        reason: &'static str,
    },
    /// Incoming stress does not match the layer being updated.
    #[error("stress input has {found_faces} faces x {found_points} points, layer needs {faces} x {points}")]
    StressShape {
        /// Faces in the layer.
        faces: usize,
        /// Quadrature points per face.
        points: usize,
        /// Faces in the stress input.
        found_faces: usize,
        /// Points per face in the stress input.
        found_points: usize,
    },
}
