//! Aligned buffers, pool segments, and growable segment lists.
//!
//! An [`AlignedBuffer`] is a zeroed `Vec<Real>` whose visible window starts
//! at a requested byte alignment. A [`Segment`] is one large aligned buffer
//! with bump allocation; a [`SegmentList`] grows into new segments when the
//! current one is full. `Pooled` fields live in the segment list; `Standard`
//! fields get their own aligned buffer.

use rupture_core::Real;

use crate::error::StoreError;

const REAL_BYTES: usize = std::mem::size_of::<Real>();

/// A zero-initialised `Real` buffer whose first element sits on an
/// `alignment`-byte boundary.
///
/// The backing vector is over-allocated by up to one alignment block and
/// the visible window is shifted to the first aligned address. The heap
/// allocation never moves after construction, so the offset stays valid.
#[derive(Debug)]
pub struct AlignedBuffer {
    data: Vec<Real>,
    offset: usize,
    len: usize,
}

impl AlignedBuffer {
    /// Allocate `len` zeroed elements aligned to `alignment` bytes.
    ///
    /// `alignment` must be a power of two no smaller than `size_of::<Real>()`.
    pub fn zeroed(len: usize, alignment: usize) -> Self {
        let slack = alignment / REAL_BYTES - 1;
        let data = vec![0.0; len + slack];
        let misalign = data.as_ptr() as usize % alignment;
        let offset = if misalign == 0 {
            0
        } else {
            (alignment - misalign) / REAL_BYTES
        };
        Self { data, offset, len }
    }

    /// The aligned window.
    pub fn as_slice(&self) -> &[Real] {
        &self.data[self.offset..self.offset + self.len]
    }

    /// The aligned window, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [Real] {
        &mut self.data[self.offset..self.offset + self.len]
    }

    /// Number of visible elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes held by the backing vector, slack included.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * REAL_BYTES
    }
}

/// A single pool segment with aligned bump allocation.
///
/// Segments are never freed while the store lives; the whole pool is
/// released when the store is dropped.
#[derive(Debug)]
pub struct Segment {
    data: AlignedBuffer,
    cursor: usize,
}

impl Segment {
    /// Base alignment of every segment, in bytes.
    pub const BASE_ALIGNMENT: usize = 4096;

    /// Create a zeroed segment holding `capacity` elements.
    pub fn new(capacity: u32) -> Self {
        Self {
            data: AlignedBuffer::zeroed(capacity as usize, Self::BASE_ALIGNMENT),
            cursor: 0,
        }
    }

    /// Bump-allocate `len` elements starting on an `alignment`-byte boundary.
    ///
    /// Returns the element offset within the segment, or `None` if the
    /// remaining capacity is too small.
    pub fn alloc(&mut self, len: usize, alignment: usize) -> Option<u32> {
        let start = bump(self.cursor, len, alignment, self.data.len())?;
        self.cursor = start + len;
        Some(start as u32)
    }

    /// Bytes a segment of `capacity` elements occupies, alignment slack
    /// included.
    pub fn footprint_bytes(capacity: u32) -> usize {
        (capacity as usize + Self::BASE_ALIGNMENT / REAL_BYTES - 1) * REAL_BYTES
    }

    /// Shared slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the segment.
    pub fn slice(&self, offset: u32, len: usize) -> &[Real] {
        let start = offset as usize;
        &self.data.as_slice()[start..start + len]
    }

    /// Mutable slice at the given offset and length.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the segment.
    pub fn slice_mut(&mut self, offset: u32, len: usize) -> &mut [Real] {
        let start = offset as usize;
        &mut self.data.as_mut_slice()[start..start + len]
    }

    /// Elements handed out so far, alignment gaps included.
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Total capacity in elements.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Memory usage of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.memory_bytes()
    }
}

/// Start of a `len`-element block placed at or after `cursor` on an
/// `alignment`-byte boundary, if it ends within `capacity`.
fn bump(cursor: usize, len: usize, alignment: usize, capacity: usize) -> Option<usize> {
    let align_elems = (alignment / REAL_BYTES).max(1);
    let start = cursor.div_ceil(align_elems) * align_elems;
    let end = start.checked_add(len)?;
    (end <= capacity).then_some(start)
}

/// Dry run of a [`SegmentList`]: replays the same sequence of `alloc`
/// calls and counts the segments they would create, reserving nothing.
#[derive(Clone, Copy, Debug)]
pub struct SegmentPlan {
    segment_size: u32,
    segments: usize,
    cursor: Option<usize>,
}

impl SegmentPlan {
    /// Empty plan for segments of `segment_size` elements.
    pub fn new(segment_size: u32) -> Self {
        Self {
            segment_size,
            segments: 0,
            cursor: None,
        }
    }

    /// Record an aligned block of `len` elements.
    ///
    /// Blocks larger than a segment are counted as one full segment;
    /// [`SegmentList::alloc`] rejects them later.
    pub fn alloc(&mut self, len: usize, alignment: usize) {
        let capacity = self.segment_size as usize;
        if let Some(start) = self
            .cursor
            .and_then(|cursor| bump(cursor, len, alignment, capacity))
        {
            self.cursor = Some(start + len);
            return;
        }
        self.segments += 1;
        self.cursor = Some(len.min(capacity));
    }

    /// Segments the recorded blocks need.
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Bytes the recorded blocks need, at segment granularity.
    pub fn memory_bytes(&self) -> usize {
        self.segments
            .saturating_mul(Segment::footprint_bytes(self.segment_size))
    }
}

/// A growable list of [`Segment`]s.
///
/// When the current segment is full a new one is appended, up to
/// `max_segments`. Blocks never straddle two segments.
#[derive(Debug)]
pub struct SegmentList {
    segments: Vec<Segment>,
    segment_size: u32,
    max_segments: u16,
}

impl SegmentList {
    /// Create an empty list. Segments are created lazily on first use.
    pub fn new(segment_size: u32, max_segments: u16) -> Self {
        Self {
            segments: Vec::new(),
            segment_size,
            max_segments,
        }
    }

    /// Allocate an aligned block of `len` elements.
    ///
    /// Returns `(segment_index, offset)` or [`StoreError::PoolExhausted`]
    /// if the block is larger than a segment or the pool is full.
    pub fn alloc(&mut self, len: usize, alignment: usize) -> Result<(u16, u32), StoreError> {
        if len > self.segment_size as usize || alignment > Segment::BASE_ALIGNMENT {
            return Err(StoreError::PoolExhausted {
                requested: len * REAL_BYTES,
                capacity: self.segment_size as usize * REAL_BYTES,
            });
        }

        if let Some(last) = self.segments.last_mut() {
            if let Some(offset) = last.alloc(len, alignment) {
                return Ok(((self.segments.len() - 1) as u16, offset));
            }
        }

        if self.segments.len() >= self.max_segments as usize {
            return Err(StoreError::PoolExhausted {
                requested: len * REAL_BYTES,
                capacity: self.capacity_bytes(),
            });
        }

        let mut seg = Segment::new(self.segment_size);
        let offset = seg
            .alloc(len, alignment)
            .ok_or(StoreError::PoolExhausted {
                requested: len * REAL_BYTES,
                capacity: self.segment_size as usize * REAL_BYTES,
            })?;
        self.segments.push(seg);
        Ok(((self.segments.len() - 1) as u16, offset))
    }

    /// Shared slice from the given segment.
    pub fn slice(&self, segment: u16, offset: u32, len: usize) -> &[Real] {
        self.segments[segment as usize].slice(offset, len)
    }

    /// Mutable slice from the given segment.
    pub fn slice_mut(&mut self, segment: u16, offset: u32, len: usize) -> &mut [Real] {
        self.segments[segment as usize].slice_mut(offset, len)
    }

    /// Number of segments currently allocated.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total memory across all segments in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.segments.iter().map(Segment::memory_bytes).sum()
    }

    /// Total elements handed out across all segments.
    pub fn total_used(&self) -> usize {
        self.segments.iter().map(Segment::used).sum()
    }

    fn capacity_bytes(&self) -> usize {
        self.max_segments as usize * self.segment_size as usize * REAL_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_buffer_honours_alignment() {
        for alignment in [REAL_BYTES, 16, 64, 4096] {
            let buf = AlignedBuffer::zeroed(37, alignment);
            assert_eq!(buf.as_slice().as_ptr() as usize % alignment, 0);
            assert_eq!(buf.len(), 37);
            assert!(buf.as_slice().iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn aligned_buffer_write_read() {
        let mut buf = AlignedBuffer::zeroed(4, 64);
        buf.as_mut_slice()[3] = 7.0;
        assert_eq!(buf.as_slice()[3], 7.0);
    }

    #[test]
    fn segment_alloc_respects_alignment() {
        let mut seg = Segment::new(1024);
        let a = seg.alloc(3, REAL_BYTES).unwrap();
        let b = seg.alloc(5, 64).unwrap();
        assert_eq!(a, 0);
        assert_eq!(seg.slice(b, 5).as_ptr() as usize % 64, 0);
        assert!(b as usize >= 3);
    }

    #[test]
    fn plan_matches_segment_list() {
        let blocks = [(300, 64), (500, REAL_BYTES), (400, 256), (1000, 64), (10, 4096)];
        let mut list = SegmentList::new(1024, 8);
        let mut plan = SegmentPlan::new(1024);
        for (len, alignment) in blocks {
            list.alloc(len, alignment).unwrap();
            plan.alloc(len, alignment);
        }
        assert_eq!(plan.segment_count(), list.segment_count());
        assert_eq!(plan.memory_bytes(), list.memory_bytes());
    }

    #[test]
    fn empty_plan_needs_nothing() {
        assert_eq!(SegmentPlan::new(1 << 20).memory_bytes(), 0);
    }

    #[test]
    fn segment_alloc_fails_when_full() {
        let mut seg = Segment::new(100);
        assert!(seg.alloc(100, REAL_BYTES).is_some());
        assert!(seg.alloc(1, REAL_BYTES).is_none());
    }

    #[test]
    fn segment_list_grows_on_overflow() {
        let mut list = SegmentList::new(100, 4);
        let (s0, _) = list.alloc(100, REAL_BYTES).unwrap();
        let (s1, off) = list.alloc(50, REAL_BYTES).unwrap();
        assert_eq!(s0, 0);
        assert_eq!(s1, 1);
        assert_eq!(off, 0);
        assert_eq!(list.segment_count(), 2);
        assert_eq!(list.total_used(), 150);
    }

    #[test]
    fn segment_list_capacity_exceeded() {
        let mut list = SegmentList::new(100, 2);
        list.alloc(100, REAL_BYTES).unwrap();
        list.alloc(100, REAL_BYTES).unwrap();
        assert!(matches!(
            list.alloc(1, REAL_BYTES),
            Err(StoreError::PoolExhausted { .. })
        ));
    }

    #[test]
    fn oversized_block_returns_error_not_panic() {
        let mut list = SegmentList::new(100, 4);
        assert!(matches!(
            list.alloc(101, REAL_BYTES),
            Err(StoreError::PoolExhausted { .. })
        ));
    }

    #[test]
    fn segment_list_slice_roundtrip() {
        let mut list = SegmentList::new(1024, 4);
        let (seg, off) = list.alloc(5, 64).unwrap();
        list.slice_mut(seg, off, 5)[0] = 42.0;
        assert_eq!(list.slice(seg, off, 5)[0], 42.0);
    }
}
