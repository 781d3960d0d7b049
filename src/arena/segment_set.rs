//! Ordered collection of segments making up one message

use log::{debug, trace, warn};

use super::{
    config::ArenaConfig,
    segment::{align_to_word, Segment, SegmentId},
    stats::ArenaStats,
};
use crate::{
    config::MAX_SEGMENT_BYTES,
    error::{Result, TesseraError},
};

/// The sole owner of all segment memory of one message
///
/// Allocation always targets the current (last) segment; when it is full a
/// new segment is appended and becomes current. Earlier segments are never
/// revisited by `allocate`, so every issued `(segment, offset)` pair stays
/// valid and unchanged.
#[derive(Debug)]
pub struct SegmentSet {
    config: ArenaConfig,
    segments: Vec<Segment>,
    stats: ArenaStats,
}

impl SegmentSet {
    /// Create a segment set with its first segment already opened
    pub fn new(config: ArenaConfig) -> Result<Self> {
        config.validate()?;

        let first = Segment::new(0, config.first_segment_size)?;
        let mut stats = ArenaStats::new();
        stats.record_segment(first.capacity());

        Ok(Self {
            config,
            segments: vec![first],
            stats,
        })
    }

    /// Allocate `byte_count` bytes in the current segment, opening a new
    /// segment when it is full
    pub fn allocate(&mut self, byte_count: usize) -> Result<(SegmentId, usize)> {
        let aligned = align_to_word(byte_count).ok_or(TesseraError::SizeLimit {
            what: "allocation",
            value: byte_count as u64,
            max: MAX_SEGMENT_BYTES as u64,
        })?;

        let current = self.current_segment_id();
        if let Some(offset) = self.current_mut().allocate(aligned) {
            self.stats.record_allocation(byte_count, aligned);
            trace!("allocated {} bytes at {}:{}", aligned, current, offset);
            return Ok((current, offset));
        }

        let id = self.open_segment(aligned)?;
        let offset = self.current_mut().allocate(aligned).ok_or_else(|| {
            TesseraError::resource_exhausted(aligned, "fresh segment cannot hold the request")
        })?;
        self.stats.record_allocation(byte_count, aligned);
        trace!("allocated {} bytes at {}:{}", aligned, id, offset);
        Ok((id, offset))
    }

    /// Allocate in one specific segment without ever opening a new one
    pub fn allocate_in(&mut self, segment: SegmentId, byte_count: usize) -> Result<Option<usize>> {
        let segment_ref = self
            .segments
            .get_mut(segment as usize)
            .ok_or_else(|| TesseraError::invalid_pointer(format!("no segment {}", segment)))?;

        let offset = segment_ref.allocate(byte_count);
        if offset.is_some() {
            // allocate() succeeded, so the aligned size cannot overflow
            let aligned = align_to_word(byte_count).unwrap_or(byte_count);
            self.stats.record_allocation(byte_count, aligned);
        }
        Ok(offset)
    }

    /// Segment currently accepting allocations
    pub fn current_segment_id(&self) -> SegmentId {
        (self.segments.len() - 1) as SegmentId
    }

    /// Look up a segment by id
    pub fn segment(&self, id: SegmentId) -> Result<&Segment> {
        self.segments
            .get(id as usize)
            .ok_or_else(|| TesseraError::invalid_pointer(format!("no segment {}", id)))
    }

    /// Look up a segment by id for writing
    pub fn segment_mut(&mut self, id: SegmentId) -> Result<&mut Segment> {
        self.segments
            .get_mut(id as usize)
            .ok_or_else(|| TesseraError::invalid_pointer(format!("no segment {}", id)))
    }

    /// All segments in id order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments opened so far
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Configuration this set was created with
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocation statistics
    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    /// Count a cross-segment pointer
    pub fn record_far_pointer(&mut self) {
        self.stats.record_far_pointer();
    }

    /// Total bytes reserved across all segments
    pub fn total_reserved(&self) -> usize {
        self.segments.iter().map(Segment::capacity).sum()
    }

    /// Consume the set, yielding the committed bytes of each segment in order
    pub fn into_segments(self) -> Vec<Vec<u8>> {
        self.segments.into_iter().map(Segment::into_bytes).collect()
    }

    fn current_mut(&mut self) -> &mut Segment {
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }

    fn open_segment(&mut self, requested: usize) -> Result<SegmentId> {
        if requested > MAX_SEGMENT_BYTES {
            return Err(TesseraError::SizeLimit {
                what: "allocation",
                value: requested as u64,
                max: MAX_SEGMENT_BYTES as u64,
            });
        }

        let previous = self.current_mut().capacity();
        let size = self.config.next_segment_size(previous, requested);

        if let Some(limit) = self.config.max_message_size {
            let total = self.total_reserved().saturating_add(size);
            if total > limit {
                warn!(
                    "message size limit {} reached: {} reserved, {} more requested",
                    limit,
                    self.total_reserved(),
                    size
                );
                return Err(TesseraError::resource_exhausted(
                    requested,
                    format!("message size limit of {} bytes reached", limit),
                ));
            }
        }

        let id = SegmentId::try_from(self.segments.len()).map_err(|_| TesseraError::SizeLimit {
            what: "segment count",
            value: self.segments.len() as u64,
            max: SegmentId::MAX as u64,
        })?;

        let segment = Segment::new(id, size)?;
        debug!(
            "opened segment {} ({} bytes) for a {} byte request",
            id, size, requested
        );
        self.stats.record_segment(segment.capacity());
        self.segments.push(segment);
        Ok(id)
    }
}
