//! Field registration: name → `FieldId` → [`FieldDef`].
//!
//! The [`Schema`] collects field definitions before any storage exists.
//! It is consumed by [`LayeredStore::allocate`](crate::LayeredStore::allocate),
//! so registration after allocation is impossible by construction.

use indexmap::IndexMap;
use rupture_core::{AllocStrategy, FieldDef, FieldId};

use crate::error::SchemaError;
use crate::segment::Segment;

/// Ordered set of field definitions.
///
/// Uses `IndexMap` (not `HashMap`) so that iteration follows registration
/// order; the physical layout of a derived record is therefore always
/// base fields first, derived fields second.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    by_name: IndexMap<String, FieldId>,
    defs: Vec<FieldDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field and return its id.
    ///
    /// Registering a name that already exists with the same per-face
    /// layout returns the existing id (the first registration's layer
    /// mask and allocator win). A different layout is a
    /// [`SchemaError::ConflictingDefinition`].
    pub fn register(&mut self, def: FieldDef) -> Result<FieldId, SchemaError> {
        if def.components == 0 {
            return Err(SchemaError::ZeroComponents { name: def.name });
        }
        let pooled_too_wide = def.strategy == AllocStrategy::Pooled
            && def.alignment > Segment::BASE_ALIGNMENT;
        if !def.alignment.is_power_of_two()
            || def.alignment < def.element.size_bytes()
            || pooled_too_wide
        {
            return Err(SchemaError::InvalidAlignment {
                name: def.name,
                alignment: def.alignment,
            });
        }

        if let Some(&id) = self.by_name.get(&def.name) {
            let existing = &self.defs[id.0 as usize];
            if !existing.same_layout(&def) {
                return Err(SchemaError::ConflictingDefinition { name: def.name });
            }
            return Ok(id);
        }

        let id = FieldId(self.defs.len() as u32);
        tracing::debug!(
            field = %def.name,
            id = id.0,
            components = def.components,
            extent = ?def.extent,
            strategy = ?def.strategy,
            "registered fault field"
        );
        self.by_name.insert(def.name.clone(), id);
        self.defs.push(def);
        Ok(id)
    }

    /// Look up a field definition by id.
    pub fn get(&self, field: FieldId) -> Option<&FieldDef> {
        self.defs.get(field.0 as usize)
    }

    /// Look up a field id by name.
    pub fn id(&self, name: &str) -> Option<FieldId> {
        self.by_name.get(name).copied()
    }

    /// Iterate over `(id, definition)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &FieldDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, def)| (FieldId(i as u32), def))
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether no fields are registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub(crate) fn into_defs(self) -> (IndexMap<String, FieldId>, Vec<FieldDef>) {
        (self.by_name, self.defs)
    }
}
