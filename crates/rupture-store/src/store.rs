//! The [`LayeredStore`]: frozen schema plus per-layer field storage.

use indexmap::IndexMap;
use rupture_core::{AllocStrategy, ElementType, Extent, FaceIndex, FieldDef, FieldId, Layer, Real};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::handle::{FieldHandle, FieldLocation};
use crate::schema::Schema;
use crate::segment::{AlignedBuffer, SegmentList, SegmentPlan};

/// Number of fault faces in each layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerLayout {
    faces: [usize; 3],
}

impl LayerLayout {
    /// A layout with every layer empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the face count of one layer.
    pub fn with_faces(mut self, layer: Layer, faces: usize) -> Self {
        self.faces[layer.index()] = faces;
        self
    }

    /// Face count of one layer.
    pub fn faces(&self, layer: Layer) -> usize {
        self.faces[layer.index()]
    }

    /// Face count over all layers.
    pub fn total_faces(&self) -> usize {
        self.faces.iter().sum()
    }
}

/// Definition plus derived per-face stride, fixed at allocation.
#[derive(Clone, Debug)]
struct FieldMeta {
    def: FieldDef,
    stride: usize,
}

#[derive(Debug, Default)]
struct LayerStorage {
    faces: usize,
    handles: IndexMap<FieldId, FieldHandle>,
    reals: Vec<AlignedBuffer>,
    flags: Vec<Vec<bool>>,
    indices: Vec<Vec<u32>>,
}

impl LayerStorage {
    fn memory_bytes(&self) -> usize {
        self.reals.iter().map(AlignedBuffer::memory_bytes).sum::<usize>()
            + self.flags.iter().map(Vec::len).sum::<usize>()
            + self.indices.iter().map(|v| v.len() * 4).sum::<usize>()
    }
}

/// Per-face fault state, partitioned by mesh layer.
///
/// Created once from a [`Schema`] and a [`LayerLayout`]; field sizes are
/// fixed for the lifetime of the store. All blocks of a layer have the
/// same face count. The store is not internally synchronised: shared
/// borrows may be read concurrently from any number of threads, writes
/// go through `&mut self`.
#[derive(Debug)]
pub struct LayeredStore {
    fields: Vec<FieldMeta>,
    names: IndexMap<String, FieldId>,
    layers: [LayerStorage; 3],
    pool: SegmentList,
    quadrature_points: usize,
    padded_points: usize,
}

impl LayeredStore {
    /// Freeze `schema` and reserve zeroed storage for every field in every
    /// layer of its mask.
    ///
    /// Fails with [`StoreError::BudgetExceeded`] if the total exceeds
    /// `config.memory_budget_bytes`, before any storage is reserved.
    pub fn allocate(
        schema: Schema,
        layout: LayerLayout,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        let padded_points = config.padded_points();
        let (names, defs) = schema.into_defs();
        let fields: Vec<FieldMeta> = defs
            .into_iter()
            .map(|def| {
                let stride = def.elements_per_face(padded_points);
                FieldMeta { def, stride }
            })
            .collect();

        let requested = required_bytes(&fields, &layout, config.segment_size);
        if requested > config.memory_budget_bytes {
            return Err(StoreError::BudgetExceeded {
                requested,
                budget: config.memory_budget_bytes,
            });
        }

        let mut pool = SegmentList::new(config.segment_size, config.max_segments);
        let mut layers: [LayerStorage; 3] = Default::default();
        for layer in Layer::ALL {
            let storage = &mut layers[layer.index()];
            storage.faces = layout.faces(layer);
            for (i, meta) in fields.iter().enumerate() {
                if !meta.def.layers.contains(layer) {
                    continue;
                }
                let len = storage.faces * meta.stride;
                let location = match (meta.def.element, meta.def.strategy) {
                    (ElementType::Real, AllocStrategy::Pooled) if len > 0 => {
                        let (segment, offset) = pool.alloc(len, meta.def.alignment)?;
                        FieldLocation::Pooled { segment, offset }
                    }
                    (ElementType::Real, _) => {
                        storage
                            .reals
                            .push(AlignedBuffer::zeroed(len, meta.def.alignment));
                        FieldLocation::Standard {
                            buffer: (storage.reals.len() - 1) as u32,
                        }
                    }
                    (ElementType::Flag, _) => {
                        storage.flags.push(vec![false; len]);
                        FieldLocation::Flags {
                            buffer: (storage.flags.len() - 1) as u32,
                        }
                    }
                    (ElementType::Index, _) => {
                        storage.indices.push(vec![0; len]);
                        FieldLocation::Indices {
                            buffer: (storage.indices.len() - 1) as u32,
                        }
                    }
                };
                storage
                    .handles
                    .insert(FieldId(i as u32), FieldHandle::new(location, len));
            }
        }

        let store = Self {
            fields,
            names,
            layers,
            pool,
            quadrature_points: config.quadrature_points,
            padded_points,
        };
        tracing::info!(
            fields = store.fields.len(),
            ghost = layout.faces(Layer::Ghost),
            copy = layout.faces(Layer::Copy),
            interior = layout.faces(Layer::Interior),
            padded_points,
            bytes = store.memory_bytes(),
            "allocated fault store"
        );
        Ok(store)
    }

    /// Number of fault quadrature points per face.
    pub fn quadrature_points(&self) -> usize {
        self.quadrature_points
    }

    /// Quadrature points rounded up to the vector stride.
    pub fn padded_points(&self) -> usize {
        self.padded_points
    }

    /// Number of faces in a layer.
    pub fn face_count(&self, layer: Layer) -> usize {
        self.layers[layer.index()].faces
    }

    /// Number of registered fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Resolve a field name to its id.
    pub fn field_id(&self, name: &str) -> Result<FieldId, StoreError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::UnknownName { name: name.into() })
    }

    /// The definition a field was registered with.
    pub fn field_def(&self, field: FieldId) -> Result<&FieldDef, StoreError> {
        self.meta(field).map(|m| &m.def)
    }

    /// Elements per face for a field. Identical in every layer.
    pub fn stride(&self, field: FieldId) -> Result<usize, StoreError> {
        self.meta(field).map(|m| m.stride)
    }

    /// Whether a field is allocated in a layer.
    pub fn contains(&self, layer: Layer, field: FieldId) -> bool {
        self.layers[layer.index()].handles.contains_key(&field)
    }

    /// Iterate over `(id, definition)` in registration order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &FieldDef)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, m)| (FieldId(i as u32), &m.def))
    }

    /// Total bytes held by the store, pool and alignment slack included.
    pub fn memory_bytes(&self) -> usize {
        self.layers.iter().map(LayerStorage::memory_bytes).sum::<usize>()
            + self.pool.memory_bytes()
    }

    /// All faces' values of a real field in one layer.
    pub fn reals(&self, layer: Layer, field: FieldId) -> Result<&[Real], StoreError> {
        let handle = self.handle(layer, field, ElementType::Real)?;
        Ok(match handle.location {
            FieldLocation::Standard { buffer } => {
                self.layers[layer.index()].reals[buffer as usize].as_slice()
            }
            FieldLocation::Pooled { segment, offset } => {
                self.pool.slice(segment, offset, handle.len)
            }
            FieldLocation::Flags { .. } | FieldLocation::Indices { .. } => {
                unreachable!("real field resolved to a non-real location")
            }
        })
    }

    /// All faces' values of a real field in one layer, mutably.
    pub fn reals_mut(&mut self, layer: Layer, field: FieldId) -> Result<&mut [Real], StoreError> {
        let handle = self.handle(layer, field, ElementType::Real)?;
        Ok(match handle.location {
            FieldLocation::Standard { buffer } => {
                self.layers[layer.index()].reals[buffer as usize].as_mut_slice()
            }
            FieldLocation::Pooled { segment, offset } => {
                self.pool.slice_mut(segment, offset, handle.len)
            }
            FieldLocation::Flags { .. } | FieldLocation::Indices { .. } => {
                unreachable!("real field resolved to a non-real location")
            }
        })
    }

    /// All faces' values of a flag field in one layer.
    pub fn flags(&self, layer: Layer, field: FieldId) -> Result<&[bool], StoreError> {
        let handle = self.handle(layer, field, ElementType::Flag)?;
        match handle.location {
            FieldLocation::Flags { buffer } => {
                Ok(self.layers[layer.index()].flags[buffer as usize].as_slice())
            }
            _ => unreachable!("flag field resolved to a non-flag location"),
        }
    }

    /// All faces' values of a flag field in one layer, mutably.
    pub fn flags_mut(&mut self, layer: Layer, field: FieldId) -> Result<&mut [bool], StoreError> {
        let handle = self.handle(layer, field, ElementType::Flag)?;
        match handle.location {
            FieldLocation::Flags { buffer } => {
                Ok(self.layers[layer.index()].flags[buffer as usize].as_mut_slice())
            }
            _ => unreachable!("flag field resolved to a non-flag location"),
        }
    }

    /// All faces' values of an index field in one layer.
    pub fn indices(&self, layer: Layer, field: FieldId) -> Result<&[u32], StoreError> {
        let handle = self.handle(layer, field, ElementType::Index)?;
        match handle.location {
            FieldLocation::Indices { buffer } => {
                Ok(self.layers[layer.index()].indices[buffer as usize].as_slice())
            }
            _ => unreachable!("index field resolved to a non-index location"),
        }
    }

    /// All faces' values of an index field in one layer, mutably.
    pub fn indices_mut(&mut self, layer: Layer, field: FieldId) -> Result<&mut [u32], StoreError> {
        let handle = self.handle(layer, field, ElementType::Index)?;
        match handle.location {
            FieldLocation::Indices { buffer } => {
                Ok(self.layers[layer.index()].indices[buffer as usize].as_mut_slice())
            }
            _ => unreachable!("index field resolved to a non-index location"),
        }
    }

    /// One face's block of a real field.
    pub fn face_reals(
        &self,
        layer: Layer,
        field: FieldId,
        face: usize,
    ) -> Result<&[Real], StoreError> {
        let range = self.face_range(layer, field, face)?;
        Ok(&self.reals(layer, field)?[range])
    }

    /// One face's block of a real field, mutably.
    pub fn face_reals_mut(
        &mut self,
        layer: Layer,
        field: FieldId,
        face: usize,
    ) -> Result<&mut [Real], StoreError> {
        let range = self.face_range(layer, field, face)?;
        Ok(&mut self.reals_mut(layer, field)?[range])
    }

    /// Unpadded per-face values of a real field, keyed by face index.
    ///
    /// Padding lanes are dropped; components are concatenated. This is the
    /// plain-array form handed to output and checkpoint writers.
    pub fn export_reals(
        &self,
        layer: Layer,
        field: FieldId,
    ) -> Result<Vec<(FaceIndex, Vec<Real>)>, StoreError> {
        let meta = self.meta(field)?;
        let data = self.reals(layer, field)?;
        let (row, valid) = match meta.def.extent {
            Extent::PerPoint => (self.padded_points, self.quadrature_points),
            Extent::PerFace => (1, 1),
        };
        let components = meta.def.components as usize;
        Ok(data
            .chunks(meta.stride)
            .enumerate()
            .map(|(face, block)| {
                let values = (0..components)
                    .flat_map(|c| block[c * row..c * row + valid].iter().copied())
                    .collect();
                (FaceIndex(face as u32), values)
            })
            .collect())
    }

    fn meta(&self, field: FieldId) -> Result<&FieldMeta, StoreError> {
        self.fields
            .get(field.0 as usize)
            .ok_or(StoreError::UnknownField { field })
    }

    fn handle(
        &self,
        layer: Layer,
        field: FieldId,
        expected: ElementType,
    ) -> Result<FieldHandle, StoreError> {
        let meta = self.meta(field)?;
        if meta.def.element != expected {
            return Err(StoreError::TypeMismatch {
                name: meta.def.name.clone(),
                expected,
                found: meta.def.element,
            });
        }
        self.layers[layer.index()]
            .handles
            .get(&field)
            .copied()
            .ok_or_else(|| StoreError::FieldNotInLayer {
                name: meta.def.name.clone(),
                layer,
            })
    }

    fn face_range(
        &self,
        layer: Layer,
        field: FieldId,
        face: usize,
    ) -> Result<std::ops::Range<usize>, StoreError> {
        let stride = self.stride(field)?;
        let faces = self.face_count(layer);
        if face >= faces {
            return Err(StoreError::FaceOutOfRange { face, faces });
        }
        Ok(face * stride..(face + 1) * stride)
    }
}

/// Bytes the schema needs for `layout`, alignment slack included.
/// `Pooled` blocks are counted at segment granularity by replaying the
/// pool's bump allocation in the order `allocate` performs it.
/// Saturates instead of overflowing so absurd layouts fail the budget check.
fn required_bytes(fields: &[FieldMeta], layout: &LayerLayout, segment_size: u32) -> usize {
    let mut total = 0usize;
    let mut plan = SegmentPlan::new(segment_size);
    for layer in Layer::ALL {
        let faces = layout.faces(layer);
        for meta in fields.iter().filter(|m| m.def.layers.contains(layer)) {
            let len = faces.saturating_mul(meta.stride);
            match (meta.def.element, meta.def.strategy) {
                (ElementType::Real, AllocStrategy::Pooled) if len > 0 => {
                    plan.alloc(len, meta.def.alignment);
                }
                (ElementType::Real, _) => {
                    let data = len.saturating_mul(meta.def.element.size_bytes());
                    let slack = meta.def.alignment - meta.def.element.size_bytes();
                    total = total.saturating_add(data).saturating_add(slack);
                }
                (ElementType::Flag | ElementType::Index, _) => {
                    total = total.saturating_add(len.saturating_mul(meta.def.element.size_bytes()));
                }
            }
        }
    }
    total.saturating_add(plan.memory_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rupture_core::LayerMask;

    fn small_config() -> StoreConfig {
        let mut config = StoreConfig::new(6);
        config.segment_size = 4096;
        config
    }

    fn layout() -> LayerLayout {
        LayerLayout::new()
            .with_faces(Layer::Ghost, 2)
            .with_faces(Layer::Copy, 3)
            .with_faces(Layer::Interior, 5)
    }

    fn schema() -> (Schema, FieldId, FieldId, FieldId, FieldId) {
        let mut schema = Schema::new();
        let slip = schema.register(FieldDef::per_point("slip")).unwrap();
        let mu = schema
            .register(
                FieldDef::per_point("mu")
                    .pooled()
                    .layers(LayerMask::ALL.without(Layer::Ghost)),
            )
            .unwrap();
        let ruptured = schema.register(FieldDef::flags("ruptured")).unwrap();
        let t0 = schema.register(FieldDef::per_face("t_0")).unwrap();
        (schema, slip, mu, ruptured, t0)
    }

    #[test]
    fn blocks_are_sized_by_layer_face_count() {
        let (schema, slip, _, ruptured, t0) = schema();
        let store = LayeredStore::allocate(schema, layout(), &small_config()).unwrap();
        let padded = store.padded_points();
        assert_eq!(store.reals(Layer::Interior, slip).unwrap().len(), 5 * padded);
        assert_eq!(store.reals(Layer::Ghost, slip).unwrap().len(), 2 * padded);
        assert_eq!(store.flags(Layer::Copy, ruptured).unwrap().len(), 3 * padded);
        assert_eq!(store.reals(Layer::Copy, t0).unwrap().len(), 3);
    }

    #[test]
    fn masked_layer_is_an_error() {
        let (schema, _, mu, _, _) = schema();
        let store = LayeredStore::allocate(schema, layout(), &small_config()).unwrap();
        assert!(!store.contains(Layer::Ghost, mu));
        assert_eq!(
            store.reals(Layer::Ghost, mu).unwrap_err(),
            StoreError::FieldNotInLayer {
                name: "mu".into(),
                layer: Layer::Ghost
            }
        );
        assert!(store.reals(Layer::Interior, mu).is_ok());
    }

    #[test]
    fn wrong_element_type_is_an_error() {
        let (schema, slip, _, ruptured, _) = schema();
        let store = LayeredStore::allocate(schema, layout(), &small_config()).unwrap();
        assert!(matches!(
            store.flags(Layer::Copy, slip),
            Err(StoreError::TypeMismatch { .. })
        ));
        assert!(matches!(
            store.reals(Layer::Copy, ruptured),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unknown_field_is_an_error() {
        let (schema, ..) = schema();
        let store = LayeredStore::allocate(schema, layout(), &small_config()).unwrap();
        assert_eq!(
            store.reals(Layer::Copy, FieldId(99)).unwrap_err(),
            StoreError::UnknownField { field: FieldId(99) }
        );
        assert!(matches!(
            store.field_id("nope"),
            Err(StoreError::UnknownName { .. })
        ));
    }

    #[test]
    fn standard_and_pooled_blocks_are_aligned() {
        let mut schema = Schema::new();
        let a = schema.register(FieldDef::per_point("a").aligned(256)).unwrap();
        let b = schema
            .register(FieldDef::per_point("b").aligned(128).pooled())
            .unwrap();
        let store = LayeredStore::allocate(schema, layout(), &small_config()).unwrap();
        for layer in Layer::ALL {
            assert_eq!(store.reals(layer, a).unwrap().as_ptr() as usize % 256, 0);
            assert_eq!(store.reals(layer, b).unwrap().as_ptr() as usize % 128, 0);
        }
    }

    #[test]
    fn face_blocks_do_not_overlap() {
        let (schema, slip, mu, ..) = schema();
        let mut store = LayeredStore::allocate(schema, layout(), &small_config()).unwrap();
        for face in 0..5 {
            store
                .face_reals_mut(Layer::Interior, slip, face)
                .unwrap()
                .fill(face as Real);
            store
                .face_reals_mut(Layer::Interior, mu, face)
                .unwrap()
                .fill(-(face as Real));
        }
        for face in 0..5 {
            let slip_block = store.face_reals(Layer::Interior, slip, face).unwrap();
            assert!(slip_block.iter().all(|&v| v == face as Real));
            let mu_block = store.face_reals(Layer::Interior, mu, face).unwrap();
            assert!(mu_block.iter().all(|&v| v == -(face as Real)));
        }
        // Other layers untouched.
        assert!(store.reals(Layer::Copy, slip).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn face_out_of_range() {
        let (schema, slip, ..) = schema();
        let store = LayeredStore::allocate(schema, layout(), &small_config()).unwrap();
        assert_eq!(
            store.face_reals(Layer::Copy, slip, 3).unwrap_err(),
            StoreError::FaceOutOfRange { face: 3, faces: 3 }
        );
    }

    #[test]
    fn budget_exceeded_is_fatal() {
        let (schema, ..) = schema();
        let config = small_config().with_budget(64);
        assert!(matches!(
            LayeredStore::allocate(schema, layout(), &config),
            Err(StoreError::BudgetExceeded { budget: 64, .. })
        ));
    }

    #[test]
    fn pooled_segments_count_against_budget() {
        let mut schema = Schema::new();
        schema.register(FieldDef::per_point("mu").pooled()).unwrap();
        let layout = LayerLayout::new().with_faces(Layer::Interior, 2);
        let config = StoreConfig::new(9).with_budget(16 * 1024);
        match LayeredStore::allocate(schema, layout, &config) {
            Err(StoreError::BudgetExceeded { requested, budget }) => {
                assert_eq!(budget, 16 * 1024);
                assert!(requested >= StoreConfig::DEFAULT_SEGMENT_SIZE as usize);
            }
            other => panic!("expected BudgetExceeded, got {:?}", other.map(|s| s.memory_bytes())),
        }
    }

    #[test]
    fn budget_check_matches_reserved_memory() {
        let measured = LayeredStore::allocate(schema().0, layout(), &small_config())
            .unwrap()
            .memory_bytes();

        let exact = small_config().with_budget(measured);
        let store = LayeredStore::allocate(schema().0, layout(), &exact).unwrap();
        assert!(store.memory_bytes() <= measured);

        let short = small_config().with_budget(measured - 1);
        assert!(matches!(
            LayeredStore::allocate(schema().0, layout(), &short),
            Err(StoreError::BudgetExceeded { .. })
        ));
    }

    #[test]
    fn pooled_block_larger_than_segment_fails() {
        let mut schema = Schema::new();
        schema
            .register(FieldDef::per_point("big").components(64).pooled())
            .unwrap();
        let mut config = small_config();
        config.segment_size = 128;
        assert!(matches!(
            LayeredStore::allocate(schema, layout(), &config),
            Err(StoreError::PoolExhausted { .. })
        ));
    }

    #[test]
    fn export_drops_padding() {
        let mut schema = Schema::new();
        let stress = schema
            .register(FieldDef::per_point("initial_stress").components(2))
            .unwrap();
        let mut store = LayeredStore::allocate(
            schema,
            LayerLayout::new().with_faces(Layer::Interior, 2),
            &small_config(),
        )
        .unwrap();
        let padded = store.padded_points();
        let block = store.face_reals_mut(Layer::Interior, stress, 1).unwrap();
        for (i, v) in block.iter_mut().enumerate() {
            *v = i as Real;
        }
        let exported = store.export_reals(Layer::Interior, stress).unwrap();
        assert_eq!(exported.len(), 2);
        let (face, values) = &exported[1];
        assert_eq!(*face, FaceIndex(1));
        assert_eq!(values.len(), 12);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[5], 5.0);
        assert_eq!(values[6], padded as Real);
    }

    #[test]
    fn empty_layer_has_empty_blocks() {
        let (schema, slip, mu, ..) = schema();
        let store = LayeredStore::allocate(
            schema,
            LayerLayout::new().with_faces(Layer::Interior, 1),
            &small_config(),
        )
        .unwrap();
        assert!(store.reals(Layer::Copy, slip).unwrap().is_empty());
        assert!(store.reals(Layer::Copy, mu).unwrap().is_empty());
    }
}
