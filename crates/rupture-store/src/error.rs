//! Schema and store error types.

use rupture_core::{ElementType, FieldId, Layer};
use thiserror::Error;

/// Errors raised while registering fields in a [`Schema`](crate::Schema).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The same field name was registered twice with different
    /// element types, extents, or component counts.
    #[error("field '{name}' already registered with a different layout")]
    ConflictingDefinition {
        /// The duplicated field name.
        name: String,
    },
    /// Alignment is not a power of two, is smaller than the element size,
    /// or exceeds the segment base alignment for a `Pooled` field.
    #[error("field '{name}' requests invalid alignment {alignment}")]
    InvalidAlignment {
        /// The offending field.
        name: String,
        /// The requested alignment in bytes.
        alignment: usize,
    },
    /// A field with zero components.
    #[error("field '{name}' has zero components")]
    ZeroComponents {
        /// The offending field.
        name: String,
    },
}

/// Errors from store allocation and field access.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A `FieldId` the schema never issued.
    #[error("unknown field: {field}")]
    UnknownField {
        /// The unrecognised field.
        field: FieldId,
    },
    /// A field name the schema never registered.
    #[error("unknown field name: '{name}'")]
    UnknownName {
        /// The unrecognised name.
        name: String,
    },
    /// The field's layer mask excludes the requested layer.
    #[error("field '{name}' is not allocated in the {layer} layer")]
    FieldNotInLayer {
        /// Field name.
        name: String,
        /// The excluded layer.
        layer: Layer,
    },
    /// Accessor element type differs from the registered type.
    #[error("field '{name}' holds {found:?} elements, accessed as {expected:?}")]
    TypeMismatch {
        /// Field name.
        name: String,
        /// Type the caller asked for.
        expected: ElementType,
        /// Type the field was registered with.
        found: ElementType,
    },
    /// Face index past the end of the layer.
    #[error("face {face} out of range for layer with {faces} faces")]
    FaceOutOfRange {
        /// Requested face.
        face: usize,
        /// Faces in the layer.
        faces: usize,
    },
    /// The schema needs more memory than the configured budget.
    #[error("store needs {requested} bytes, budget is {budget} bytes")]
    BudgetExceeded {
        /// Bytes required by the schema and layout.
        requested: usize,
        /// Configured budget.
        budget: usize,
    },
    /// The segment pool cannot hold a pooled field block.
    #[error("segment pool exhausted: requested {requested} bytes, capacity {capacity} bytes")]
    PoolExhausted {
        /// Bytes requested by the block.
        requested: usize,
        /// Pool capacity in bytes.
        capacity: usize,
    },
    /// Invalid store configuration.
    #[error("invalid store config: {reason}")]
    InvalidConfig {
        /// What went wrong.
        reason: String,
    },
}
