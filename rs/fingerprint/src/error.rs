use thiserror::Error;

/// Errors surfaced by fingerprint operations.
///
/// Every operation here is a pure computation over caller-supplied data, so
/// all of these are immediate bad-argument outcomes; none are transient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    /// Pairwise operations are only defined between values of equal width.
    #[error("fingerprint widths do not match: {left} vs {right}")]
    WidthMismatch { left: usize, right: usize },

    /// Bit access beyond the declared width.
    #[error("bit index out of range: {index} >= {width}")]
    BitIndexOutOfRange { index: usize, width: usize },

    /// Deserialization input of the wrong byte length.
    #[error("byte length does not match width: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// Deserialization input with bits set above the declared width.
    #[error("serialized bytes carry bits beyond width {width}")]
    ExcessBits { width: usize },
}

/// Result type alias for fingerprint operations.
pub type Result<T> = std::result::Result<T, FingerprintError>;
