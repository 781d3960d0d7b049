//! Segment arena configuration

use serde::{Deserialize, Serialize};

use crate::{
    config::{
        DEFAULT_FIRST_SEGMENT_SIZE, DEFAULT_GROWTH_FACTOR, DEFAULT_MAX_SEGMENT_SIZE,
        DEFAULT_MIN_SEGMENT_SIZE, MAX_SEGMENT_BYTES, WORD_SIZE,
    },
    error::{Result, TesseraError},
};

/// How the size of each newly opened segment is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocationStrategy {
    /// Every new segment is `min_segment_size` (or the request, if larger)
    FixedSize,
    /// Each new segment is `growth_factor` times the previous one
    GrowHeuristically,
}

impl Default for AllocationStrategy {
    fn default() -> Self {
        Self::GrowHeuristically
    }
}

impl AllocationStrategy {
    /// Get a human-readable name for the strategy
    pub fn name(&self) -> &'static str {
        match self {
            AllocationStrategy::FixedSize => "fixed",
            AllocationStrategy::GrowHeuristically => "grow",
        }
    }
}

/// Configuration for a message's segment set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Size of segment 0 in bytes
    pub first_segment_size: usize,
    /// Lower bound for every segment opened after the first
    pub min_segment_size: usize,
    /// Upper bound for heuristic growth (single oversized requests may exceed it)
    pub max_segment_size: usize,
    /// Multiplier applied to the previous segment size
    pub growth_factor: usize,
    /// Segment sizing policy
    pub strategy: AllocationStrategy,
    /// Optional cap on the total bytes reserved by all segments of one message
    pub max_message_size: Option<usize>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            first_segment_size: DEFAULT_FIRST_SEGMENT_SIZE,
            min_segment_size: DEFAULT_MIN_SEGMENT_SIZE,
            max_segment_size: DEFAULT_MAX_SEGMENT_SIZE,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            strategy: AllocationStrategy::GrowHeuristically,
            max_message_size: None,
        }
    }
}

impl ArenaConfig {
    /// Create a configuration whose segments all start at `segment_size`
    pub fn new(segment_size: usize) -> Self {
        Self {
            first_segment_size: segment_size,
            min_segment_size: segment_size,
            ..Default::default()
        }
    }

    /// Set the size of the first segment
    pub fn with_first_segment_size(mut self, size: usize) -> Self {
        self.first_segment_size = size;
        self
    }

    /// Set minimum segment size
    pub fn with_min_segment_size(mut self, size: usize) -> Self {
        self.min_segment_size = size;
        self
    }

    /// Set maximum segment size for heuristic growth
    pub fn with_max_segment_size(mut self, size: usize) -> Self {
        self.max_segment_size = size;
        self
    }

    /// Set growth factor
    pub fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor;
        self
    }

    /// Set allocation strategy
    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Limit the total reserved size of one message
    pub fn with_max_message_size(mut self, limit: Option<usize>) -> Self {
        self.max_message_size = limit;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.first_segment_size < WORD_SIZE || self.first_segment_size % WORD_SIZE != 0 {
            return Err(TesseraError::invalid_parameter(
                "first_segment_size",
                "First segment size must be a non-zero multiple of the word size",
            ));
        }

        if self.first_segment_size > MAX_SEGMENT_BYTES {
            return Err(TesseraError::invalid_parameter(
                "first_segment_size",
                "First segment size exceeds the pointer offset range",
            ));
        }

        if self.min_segment_size < WORD_SIZE || self.min_segment_size % WORD_SIZE != 0 {
            return Err(TesseraError::invalid_parameter(
                "min_segment_size",
                "Minimum segment size must be a non-zero multiple of the word size",
            ));
        }

        if self.max_segment_size < self.min_segment_size {
            return Err(TesseraError::invalid_parameter(
                "max_segment_size",
                "Maximum segment size cannot be below the minimum",
            ));
        }

        if self.max_segment_size > MAX_SEGMENT_BYTES {
            return Err(TesseraError::invalid_parameter(
                "max_segment_size",
                "Maximum segment size exceeds the pointer offset range",
            ));
        }

        if self.growth_factor == 0 {
            return Err(TesseraError::invalid_parameter(
                "growth_factor",
                "Growth factor must be at least 1",
            ));
        }

        if let Some(limit) = self.max_message_size {
            if limit < self.first_segment_size {
                return Err(TesseraError::invalid_parameter(
                    "max_message_size",
                    "Message size limit cannot be below the first segment size",
                ));
            }
        }

        Ok(())
    }

    /// Size of the segment opened after one of `previous` bytes, for a
    /// request of `requested` (already word-aligned) bytes
    pub fn next_segment_size(&self, previous: usize, requested: usize) -> usize {
        let preferred = match self.strategy {
            AllocationStrategy::FixedSize => self.min_segment_size,
            AllocationStrategy::GrowHeuristically => previous
                .saturating_mul(self.growth_factor)
                .clamp(self.min_segment_size, self.max_segment_size),
        };
        preferred.max(requested)
    }
}

/// Builder pattern for arena configuration
pub struct ArenaConfigBuilder {
    config: ArenaConfig,
}

impl ArenaConfigBuilder {
    /// Create a new builder starting from the defaults
    pub fn new() -> Self {
        Self {
            config: ArenaConfig::default(),
        }
    }

    /// Set first segment size
    pub fn first_segment_size(mut self, size: usize) -> Self {
        self.config.first_segment_size = size;
        self
    }

    /// Set minimum segment size
    pub fn min_segment_size(mut self, size: usize) -> Self {
        self.config.min_segment_size = size;
        self
    }

    /// Set maximum segment size
    pub fn max_segment_size(mut self, size: usize) -> Self {
        self.config.max_segment_size = size;
        self
    }

    /// Set growth factor
    pub fn growth_factor(mut self, factor: usize) -> Self {
        self.config.growth_factor = factor;
        self
    }

    /// Use fixed-size segments
    pub fn fixed(mut self) -> Self {
        self.config.strategy = AllocationStrategy::FixedSize;
        self
    }

    /// Grow segments geometrically
    pub fn grow(mut self) -> Self {
        self.config.strategy = AllocationStrategy::GrowHeuristically;
        self
    }

    /// Cap total message size
    pub fn max_message_size(mut self, limit: usize) -> Self {
        self.config.max_message_size = Some(limit);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ArenaConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ArenaConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
