pub mod geohash;

use thiserror::Error;

pub use geohash::{decode, Geohash, MAX_PRECISION};

/// Errors surfaced while encoding or decoding geohashes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeohashError {
    #[error("invalid latitude: {0} is outside [-90, 90)")]
    InvalidLatitude(f64),

    #[error("precision {0} exceeds the supported maximum")]
    InvalidPrecision(usize),

    #[error("invalid geohash character {0:?}")]
    InvalidCharacter(char),
}

/// Result type alias for geohash operations.
pub type Result<T> = std::result::Result<T, GeohashError>;
