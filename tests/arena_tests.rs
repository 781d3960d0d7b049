//! Integration tests for the segment arena: growth, stable placement and
//! configuration

use proptest::prelude::*;
use tessera::{
    arena::{AllocationStrategy, ArenaConfig, ArenaConfigBuilder, BuilderArena, SegmentSet},
    config::WORD_SIZE,
    TesseraError,
};

fn pattern(seed: usize, len: usize) -> Vec<u8> {
    (0..len).map(|i| (seed * 31 + i) as u8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ArenaConfig::default();
        assert_eq!(config.first_segment_size, 1024);
        assert_eq!(config.min_segment_size, 1024);
        assert_eq!(config.max_segment_size, 1 << 20);
        assert_eq!(config.growth_factor, 2);
        assert_eq!(config.strategy, AllocationStrategy::GrowHeuristically);
        assert!(config.max_message_size.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_validation() {
        assert!(ArenaConfigBuilder::new().first_segment_size(12).build().is_err());
        assert!(ArenaConfigBuilder::new().min_segment_size(0).build().is_err());
        assert!(ArenaConfigBuilder::new()
            .min_segment_size(4096)
            .max_segment_size(1024)
            .build()
            .is_err());
        assert!(ArenaConfigBuilder::new().growth_factor(0).build().is_err());
        assert!(ArenaConfigBuilder::new().max_message_size(8).build().is_err());

        let config = ArenaConfigBuilder::new()
            .first_segment_size(64)
            .min_segment_size(64)
            .fixed()
            .build()
            .unwrap();
        assert_eq!(config.strategy, AllocationStrategy::FixedSize);
    }

    #[test]
    fn test_growth_moves_to_later_segment() {
        let config = ArenaConfig::new(16).with_strategy(AllocationStrategy::FixedSize);
        let mut set = SegmentSet::new(config).unwrap();

        assert_eq!(set.allocate(8).unwrap(), (0, 0));
        assert_eq!(set.allocate(8).unwrap(), (0, 8));

        let (segment, offset) = set.allocate(8).unwrap();
        assert!(segment > 0);
        assert_eq!(offset, 0);
        assert_eq!(set.segment_count(), 2);

        // Oversized requests get a segment of their own
        let (big, offset) = set.allocate(100).unwrap();
        assert!(big > segment);
        assert_eq!(offset, 0);
        assert_eq!(set.segment(big).unwrap().capacity(), 104);
    }

    #[test]
    fn test_heuristic_growth_sizes() {
        let config = ArenaConfig::new(16).with_max_segment_size(64);
        let mut set = SegmentSet::new(config).unwrap();

        for _ in 0..20 {
            set.allocate(8).unwrap();
        }
        let capacities: Vec<usize> = set.segments().iter().map(|s| s.capacity()).collect();
        assert_eq!(capacities[..3], [16, 32, 64]);
        assert_eq!(capacities.len(), 4);
        assert_eq!(capacities[3], 64);
    }

    #[test]
    fn test_message_size_limit() {
        let config = ArenaConfigBuilder::new()
            .first_segment_size(16)
            .min_segment_size(16)
            .fixed()
            .max_message_size(32)
            .build()
            .unwrap();
        let mut set = SegmentSet::new(config).unwrap();

        set.allocate(16).unwrap();
        set.allocate(16).unwrap();
        assert!(matches!(
            set.allocate(8),
            Err(TesseraError::ResourceExhausted { .. })
        ));
        assert_eq!(set.segment_count(), 2);
    }

    #[test]
    fn test_into_segments_trims_to_used() {
        let mut set = SegmentSet::new(ArenaConfig::new(64)).unwrap();
        set.allocate(5).unwrap();
        let segments = set.into_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), WORD_SIZE);
    }

    #[test]
    fn test_stats_track_segments_and_padding() {
        let arena = BuilderArena::new(ArenaConfig::new(16)).unwrap();
        arena.allocate(3).unwrap();
        arena.allocate(16).unwrap();

        let stats = arena.stats();
        assert_eq!(stats.segment_count, 2);
        assert_eq!(stats.allocations, 2);
        assert_eq!(stats.bytes_allocated, 24);
        assert_eq!(stats.padding_bytes, 5);
        assert!(stats.utilization() > 0.0);
    }
}

proptest! {
    /// Every region keeps its position and contents no matter how many
    /// allocations follow it.
    #[test]
    fn prop_regions_never_move(
        segment_words in 1usize..16,
        sizes in prop::collection::vec(0usize..200, 1..64),
        fixed in any::<bool>(),
    ) {
        let strategy = if fixed {
            AllocationStrategy::FixedSize
        } else {
            AllocationStrategy::GrowHeuristically
        };
        let config = ArenaConfig::new(segment_words * WORD_SIZE).with_strategy(strategy);
        let arena = BuilderArena::new(config).unwrap();

        let mut regions = Vec::new();
        for (i, &size) in sizes.iter().enumerate() {
            let (segment, offset) = arena.allocate(size).unwrap();
            prop_assert_eq!(offset % WORD_SIZE, 0);
            arena.write_bytes(segment, offset, &pattern(i, size)).unwrap();
            regions.push((segment, offset, size));
        }

        for (i, &(segment, offset, size)) in regions.iter().enumerate() {
            prop_assert_eq!(arena.read_bytes(segment, offset, size).unwrap(), pattern(i, size));
        }
    }

    /// Regions handed out in one segment never overlap.
    #[test]
    fn prop_regions_are_disjoint(
        sizes in prop::collection::vec(1usize..100, 1..64),
    ) {
        let arena = BuilderArena::new(ArenaConfig::new(128)).unwrap();

        let mut regions: Vec<(u32, usize, usize)> = sizes
            .iter()
            .map(|&size| {
                let (segment, offset) = arena.allocate(size).unwrap();
                (segment, offset, size)
            })
            .collect();
        regions.sort();

        for pair in regions.windows(2) {
            let (seg_a, off_a, len_a) = pair[0];
            let (seg_b, off_b, _) = pair[1];
            if seg_a == seg_b {
                prop_assert!(off_a + len_a <= off_b);
            }
        }
    }
}
