//! Segment arena statistics tracking

use serde::{Deserialize, Serialize};

/// Allocation statistics for one message's segment set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaStats {
    /// Number of segments opened so far
    pub segment_count: usize,
    /// Number of successful allocations
    pub allocations: u64,
    /// Bytes handed out, including word padding
    pub bytes_allocated: usize,
    /// Bytes reserved by all segments
    pub bytes_reserved: usize,
    /// Bytes added to round requests up to a word
    pub padding_bytes: usize,
    /// Pointers that had to cross a segment boundary
    pub far_pointers: u64,
}

impl ArenaStats {
    /// Create new statistics instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Record an allocation of `requested` bytes that consumed `aligned`
    pub fn record_allocation(&mut self, requested: usize, aligned: usize) {
        self.allocations += 1;
        self.bytes_allocated += aligned;
        self.padding_bytes += aligned - requested;
    }

    /// Record a newly opened segment of `capacity` bytes
    pub fn record_segment(&mut self, capacity: usize) {
        self.segment_count += 1;
        self.bytes_reserved += capacity;
    }

    /// Record a far pointer with its landing pad
    pub fn record_far_pointer(&mut self) {
        self.far_pointers += 1;
    }

    /// Fraction of reserved bytes that have been allocated (0.0 to 1.0)
    pub fn utilization(&self) -> f64 {
        if self.bytes_reserved == 0 {
            return 0.0;
        }
        self.bytes_allocated as f64 / self.bytes_reserved as f64
    }

    /// Get a summary string of the statistics
    pub fn summary(&self) -> String {
        format!(
            "ArenaStats {{ segments: {}, allocations: {}, allocated: {}, reserved: {}, \
             padding: {}, far_pointers: {}, utilization: {:.2}% }}",
            self.segment_count,
            self.allocations,
            self.bytes_allocated,
            self.bytes_reserved,
            self.padding_bytes,
            self.far_pointers,
            self.utilization() * 100.0
        )
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_tracking() {
        let mut stats = ArenaStats::new();
        assert_eq!(stats.utilization(), 0.0);

        stats.record_segment(64);
        stats.record_allocation(5, 8);
        stats.record_allocation(16, 16);
        stats.record_far_pointer();

        assert_eq!(stats.segment_count, 1);
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.bytes_allocated, 24);
        assert_eq!(stats.padding_bytes, 3);
        assert_eq!(stats.far_pointers, 1);
        assert!((stats.utilization() - 0.375).abs() < f64::EPSILON);
        assert!(stats.summary().contains("segments: 1"));

        stats.reset();
        assert_eq!(stats, ArenaStats::default());
    }
}
