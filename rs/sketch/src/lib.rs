//! Probabilistic membership and near-duplicate sketches built on the shared
//! fingerprint value.

pub mod bloom_filter;
pub mod nilsimsa;
pub mod simhash;

use thiserror::Error;

pub use bloom_filter::{BloomFilter, BloomFilterConfig};
pub use nilsimsa::Nilsimsa;
pub use simhash::Simhash;

/// Errors surfaced while building or comparing sketches.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SketchError {
    #[error("capacity must be positive")]
    InvalidCapacity,

    #[error("false positive rate must be within (0, 1), got {0}")]
    InvalidRate(f64),

    #[error(transparent)]
    Fingerprint(#[from] fingerprint::FingerprintError),
}
