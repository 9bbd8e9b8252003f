//! Field handles and location descriptors.
//!
//! A [`FieldHandle`] records where one field's block for one layer lives.
//! Handles are resolved to slices by the store in O(1).

use std::fmt;

/// Physical location of a field block within the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldLocation {
    /// A dedicated aligned buffer in the layer's real-buffer list.
    Standard {
        /// Index into the layer's real buffers.
        buffer: u32,
    },
    /// A block in the shared segment pool.
    Pooled {
        /// Index into the pool's segment list.
        segment: u16,
        /// Element offset within the segment.
        offset: u32,
    },
    /// A flag vector in the layer's flag-buffer list.
    Flags {
        /// Index into the layer's flag buffers.
        buffer: u32,
    },
    /// An index vector in the layer's index-buffer list.
    Indices {
        /// Index into the layer's index buffers.
        buffer: u32,
    },
}

/// Location and size of one field block in one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct FieldHandle {
    pub(crate) location: FieldLocation,
    pub(crate) len: usize,
}

impl FieldHandle {
    pub(crate) fn new(location: FieldLocation, len: usize) -> Self {
        Self { location, len }
    }

    /// Total elements in the block (`faces * stride`).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length block (empty layer).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The location descriptor.
    pub fn location(&self) -> FieldLocation {
        self.location
    }
}

impl fmt::Display for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldHandle(len={}, {:?})", self.len, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_round_trip() {
        let loc = FieldLocation::Pooled {
            segment: 3,
            offset: 1024,
        };
        let h = FieldHandle::new(loc, 256);
        assert_eq!(h.len(), 256);
        assert!(!h.is_empty());
        assert_eq!(h.location(), loc);
    }

    #[test]
    fn empty_handle() {
        let h = FieldHandle::new(FieldLocation::Flags { buffer: 0 }, 0);
        assert!(h.is_empty());
    }
}
