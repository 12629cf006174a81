//! Space-efficient probabilistic membership testing. False positives are
//! possible, false negatives are not; items can be added but never removed,
//! and the filter grows denser (and more false-positive-prone) as items are
//! inserted.

use fingerprint::Fingerprint;
use log::debug;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::SketchError;

/// Construction parameters for a [`BloomFilter`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BloomFilterConfig {
    /// Expected upper limit on items inserted.
    /// Default: 3000
    pub capacity: usize,

    /// Acceptable false positive probability. The smaller it is, the larger
    /// the filter.
    /// Default: 0.01
    pub false_positive_rate: f64,
}

impl Default for BloomFilterConfig {
    fn default() -> Self {
        Self {
            capacity: 3000,
            false_positive_rate: 0.01,
        }
    }
}

impl BloomFilterConfig {
    pub fn validate(&self) -> Result<(), SketchError> {
        if self.capacity == 0 {
            return Err(SketchError::InvalidCapacity);
        }
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(SketchError::InvalidRate(self.false_positive_rate));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<BloomFilter, SketchError> {
        BloomFilter::new(self.capacity, self.false_positive_rate)
    }
}

/// A Bloom filter keyed by a 160-bit digest chopped into 20-bit groups.
pub struct BloomFilter {
    bits: Fingerprint,
    num_hashes: usize,
    capacity: usize,
    false_positive_rate: f64,
}

impl BloomFilter {
    /// Creates an empty filter sized for `capacity` items at the target
    /// false positive rate.
    pub fn new(capacity: usize, false_positive_rate: f64) -> Result<Self, SketchError> {
        BloomFilterConfig {
            capacity,
            false_positive_rate,
        }
        .validate()?;

        let (num_bits, num_hashes) = optimal_size(capacity, false_positive_rate);
        debug!("sized bloom filter to {num_bits} bits, {num_hashes} hash functions");
        Ok(Self {
            bits: Fingerprint::new(num_bits),
            num_hashes,
            capacity,
            false_positive_rate,
        })
    }

    /// Creates a filter and inserts an initial batch of items.
    pub fn with_items<I, T>(
        items: I,
        capacity: usize,
        false_positive_rate: f64,
    ) -> Result<Self, SketchError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut filter = Self::new(capacity, false_positive_rate)?;
        for item in items {
            filter.insert(item.as_ref());
        }
        Ok(filter)
    }

    /// Adds an item to the filter. Cannot be removed later.
    pub fn insert(&mut self, item: &[u8]) {
        for position in self.hash_positions(item) {
            self.bits
                .set_bit(position)
                .expect("hash positions are reduced mod the filter width");
        }
    }

    /// Whether the item may have been inserted. A false return is definite.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.hash_positions(item)
            .into_iter()
            .all(|position| self.bits.test_bit(position).unwrap_or(false))
    }

    pub fn num_bits(&self) -> usize {
        self.bits.width()
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn false_positive_rate(&self) -> f64 {
        self.false_positive_rate
    }

    pub fn bits(&self) -> &Fingerprint {
        &self.bits
    }

    /// The `k` bit positions addressed by an item: the item's SHA-1 digest
    /// chopped into consecutive 20-bit groups, each reduced mod the filter
    /// width. When one digest does not yield enough groups, the running
    /// hasher is extended with the decimal pass index and re-read, one extra
    /// 160-bit block per 8 groups needed.
    fn hash_positions(&self, item: &[u8]) -> Vec<usize> {
        let num_bits = self.bits.width();
        let mut hasher = Sha1::new();
        hasher.update(item);

        let mut digest = Vec::with_capacity(20 * (1 + self.num_hashes / 8));
        digest.extend_from_slice(&hasher.clone().finalize());
        for pass in 0..self.num_hashes / 8 {
            hasher.update(pass.to_string().as_bytes());
            digest.extend_from_slice(&hasher.clone().finalize());
        }

        (0..self.num_hashes)
            .map(|group| group20(&digest, group) % num_bits)
            .collect()
    }
}

/// 20-bit group `index` of a digest, read in hex-nibble order.
fn group20(digest: &[u8], index: usize) -> usize {
    let mut value = 0usize;
    for nibble_index in 5 * index..5 * index + 5 {
        let byte = digest[nibble_index / 2];
        let nibble = if nibble_index % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        };
        value = (value << 4) | nibble as usize;
    }
    value
}

/// Minimum bit-array size and hash count for the target capacity and error
/// rate, both rounded up and at least 1.
///
/// The denominator is deliberately kept in this exact form: simplifying it
/// changes the rounding, and the rounded size decides which bit positions an
/// item addresses.
fn optimal_size(capacity: usize, error_rate: f64) -> (usize, usize) {
    let ln2 = 2.0_f64.ln();
    let num_bits =
        ((capacity as f64 * error_rate.ln()) / (1.0 / 2.0_f64.powf(ln2)).ln()).ceil() as usize;
    let num_hashes = (ln2 * num_bits as f64 / capacity as f64).ceil() as usize;
    (num_bits.max(1), num_hashes.max(1))
}
