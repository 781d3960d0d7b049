//! Error types and handling for Tessera

/// Result type alias for Tessera operations
pub type Result<T> = std::result::Result<T, TesseraError>;

/// Error types for the segment arena and the typed builders on top of it
///
/// Capacity failures inside a single segment never show up here; the
/// segment set absorbs them by opening a new segment. What remains are
/// invariant violations (schema/generator mismatches) and resource exhaustion.
#[derive(Debug, thiserror::Error)]
pub enum TesseraError {
    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// A list was requested with a negative element count
    #[error("Negative list length: {length}")]
    NegativeLength { length: i64 },

    /// List or struct exceeds what the pointer encoding can express
    #[error("Size limit exceeded: {what} is {value}, maximum {max}")]
    SizeLimit {
        what: &'static str,
        value: u64,
        max: u64,
    },

    /// Access past the declared size of a struct region
    #[error("Struct overflow: {width} bytes at offset {offset} exceed struct size {size}")]
    StructOverflow {
        offset: usize,
        width: usize,
        size: usize,
    },

    /// List index outside [0, length)
    #[error("Index out of range: index {index}, length {length}")]
    IndexOutOfRange { index: usize, length: usize },

    /// Typed wrapper does not match the list's element width
    #[error("Element width mismatch: expected {expected}, got {actual}")]
    ElementWidthMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Struct region size differs from the type or wrapper built on it
    #[error("Struct size mismatch: expected {expected} bytes, got {actual}")]
    StructSizeMismatch { expected: usize, actual: usize },

    /// Struct size or pointer slot off a word boundary
    #[error("Misaligned {what}: {value} is not a multiple of the word size")]
    Misaligned { what: &'static str, value: usize },

    /// Pointer slot already refers to an allocated region
    #[error("Field already set: slot {slot} in segment {segment}")]
    FieldAlreadySet { segment: u32, slot: usize },

    /// Pointer word that cannot be followed
    #[error("Invalid pointer: {message}")]
    InvalidPointer { message: String },

    /// Text field holds bytes that are not UTF-8
    #[error("Invalid text: {source}")]
    InvalidText {
        #[source]
        source: std::str::Utf8Error,
    },

    /// Backing storage for a segment could not be obtained
    #[error("Resource exhausted: requested {requested} bytes, {message}")]
    ResourceExhausted { requested: usize, message: String },
}

impl TesseraError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a struct overflow error
    pub fn struct_overflow(offset: usize, width: usize, size: usize) -> Self {
        Self::StructOverflow {
            offset,
            width,
            size,
        }
    }

    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, length: usize) -> Self {
        Self::IndexOutOfRange { index, length }
    }

    /// Create an element width mismatch error
    pub fn width_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::ElementWidthMismatch { expected, actual }
    }

    /// Create a struct size mismatch error
    pub fn struct_size_mismatch(expected: usize, actual: usize) -> Self {
        Self::StructSizeMismatch { expected, actual }
    }

    /// Create a misalignment error
    pub fn misaligned(what: &'static str, value: usize) -> Self {
        Self::Misaligned { what, value }
    }

    /// Create an invalid pointer error
    pub fn invalid_pointer(message: impl Into<String>) -> Self {
        Self::InvalidPointer {
            message: message.into(),
        }
    }

    /// Create a resource exhaustion error
    pub fn resource_exhausted(requested: usize, message: impl Into<String>) -> Self {
        Self::ResourceExhausted {
            requested,
            message: message.into(),
        }
    }

    /// Whether this error signals a schema/generator mismatch rather than
    /// a resource problem
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::NegativeLength { .. }
                | Self::StructOverflow { .. }
                | Self::IndexOutOfRange { .. }
                | Self::ElementWidthMismatch { .. }
                | Self::StructSizeMismatch { .. }
                | Self::Misaligned { .. }
                | Self::FieldAlreadySet { .. }
                | Self::SizeLimit { .. }
        )
    }
}

impl From<std::str::Utf8Error> for TesseraError {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::InvalidText { source: err }
    }
}
