//! Mesh layers and the [`LayerMask`] bitset.

use std::fmt;

/// A partition of fault faces grouped for storage and communication.
///
/// `Ghost` faces mirror a neighbouring partition, `Copy` faces are owned
/// locally but sent to neighbours, `Interior` faces never leave this
/// partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Faces received from a neighbouring partition.
    Ghost,
    /// Locally owned faces that neighbours also read.
    Copy,
    /// Purely local faces.
    Interior,
}

impl Layer {
    /// All layers in storage order.
    pub const ALL: [Layer; 3] = [Layer::Ghost, Layer::Copy, Layer::Interior];

    /// Dense index of the layer (0..3).
    pub fn index(self) -> usize {
        match self {
            Self::Ghost => 0,
            Self::Copy => 1,
            Self::Interior => 2,
        }
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ghost => write!(f, "ghost"),
            Self::Copy => write!(f, "copy"),
            Self::Interior => write!(f, "interior"),
        }
    }
}

/// Set of layers a field is allocated in.
///
/// Fields never needed in a partition (e.g. friction parameters on ghost
/// faces, which are only read for their flux blocks) are left out of the
/// mask and consume no memory there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(u8);

impl LayerMask {
    /// Every layer.
    pub const ALL: LayerMask = LayerMask(0b111);

    /// No layer.
    pub const NONE: LayerMask = LayerMask(0);

    /// Only the given layer.
    pub fn only(layer: Layer) -> Self {
        Self(layer.bit())
    }

    /// This mask with `layer` removed.
    pub fn without(self, layer: Layer) -> Self {
        Self(self.0 & !layer.bit())
    }

    /// This mask with `layer` added.
    pub fn with(self, layer: Layer) -> Self {
        Self(self.0 | layer.bit())
    }

    /// Whether the mask includes `layer`.
    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.bit() != 0
    }

    /// Returns `true` if no layer is selected.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the selected layers in storage order.
    pub fn iter(self) -> impl Iterator<Item = Layer> {
        Layer::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromIterator<Layer> for LayerMask {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, LayerMask::with)
    }
}
