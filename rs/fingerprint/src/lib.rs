pub mod error;
#[allow(clippy::module_inception)]
pub mod fingerprint;

pub use error::{FingerprintError, Result};
pub use fingerprint::Fingerprint;

/// Shared read surface for similarity digests.
///
/// Implementors expose their digest and its width; distance and similarity
/// come for free and fail with a width mismatch when the digests disagree on
/// size.
pub trait SimilarityDigest {
    fn hashbits(&self) -> usize;
    fn digest(&self) -> &Fingerprint;

    /// Number of differing bits between two digests of the same width.
    fn hamming_distance(&self, other: &Self) -> Result<u32> {
        self.digest().hamming_distance(other.digest())
    }

    /// Fraction of agreeing bits, from 0.0 to 1.0 inclusive.
    fn similarity(&self, other: &Self) -> Result<f64> {
        let distance = self.hamming_distance(other)?;
        let bits = self.hashbits() as f64;
        Ok((bits - distance as f64) / bits)
    }
}
