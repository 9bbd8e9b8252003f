//! Schema-driven layered storage for per-fault-face state.
//!
//! Fields are declared up front in a [`Schema`], then frozen into a
//! [`LayeredStore`] sized from the face count of each mesh [`Layer`].
//! Every field of a layer is one contiguous, aligned block so that a
//! friction update can stream over all faces of the layer.
//!
//! # Architecture
//!
//! ```text
//! LayeredStore
//! ├── FieldMeta[]           (FieldId → definition + per-face stride)
//! ├── LayerStorage × 3      (ghost / copy / interior)
//! │   ├── FieldHandle map   (FieldId → physical location)
//! │   ├── AlignedBuffer[]   (Standard real fields)
//! │   └── Vec<bool>/Vec<u32> (flag and index fields)
//! └── SegmentList           (Pooled real fields, shared by all layers)
//! ```
//!
//! Record variants ([`RuptureRecord`] and the law-specific extensions in
//! [`record`]) register their fields by composition: a derived record
//! registers its base first, then its own fields.
//!
//! [`Layer`]: rupture_core::Layer

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handle;
pub mod record;
pub mod schema;
pub mod segment;
pub mod store;

pub use config::StoreConfig;
pub use error::{SchemaError, StoreError};
pub use record::{
    FaceRecord, LinearSlipWeakeningRecord, RateAndStateRecord, RuptureRecord,
};
pub use schema::Schema;
pub use store::{LayerLayout, LayeredStore};
