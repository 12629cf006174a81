//! Nilsimsa similarity digests.
//!
//! Most useful for near-duplicate detection over documents: the digest is
//! built from histograms of rolling trigraphs rather than a bag-of-words
//! model, so character order matters. Related paper:
//! <http://spdp.dti.unimi.it/papers/pdcs04.pdf>

use fingerprint::{Fingerprint, SimilarityDigest};

/// Default digest width in bits.
pub const DEFAULT_HASHBITS: usize = 256;

/// Nilsimsa transposition table. Reproduced byte-for-byte; any deviation
/// breaks digest compatibility with other implementations.
#[rustfmt::skip]
const TRAN: [u8; 256] = [
    0x02, 0xD6, 0x9E, 0x6F, 0xF9, 0x1D, 0x04, 0xAB, 0xD0, 0x22, 0x16, 0x1F, 0xD8, 0x73, 0xA1, 0xAC,
    0x3B, 0x70, 0x62, 0x96, 0x1E, 0x6E, 0x8F, 0x39, 0x9D, 0x05, 0x14, 0x4A, 0xA6, 0xBE, 0xAE, 0x0E,
    0xCF, 0xB9, 0x9C, 0x9A, 0xC7, 0x68, 0x13, 0xE1, 0x2D, 0xA4, 0xEB, 0x51, 0x8D, 0x64, 0x6B, 0x50,
    0x23, 0x80, 0x03, 0x41, 0xEC, 0xBB, 0x71, 0xCC, 0x7A, 0x86, 0x7F, 0x98, 0xF2, 0x36, 0x5E, 0xEE,
    0x8E, 0xCE, 0x4F, 0xB8, 0x32, 0xB6, 0x5F, 0x59, 0xDC, 0x1B, 0x31, 0x4C, 0x7B, 0xF0, 0x63, 0x01,
    0x6C, 0xBA, 0x07, 0xE8, 0x12, 0x77, 0x49, 0x3C, 0xDA, 0x46, 0xFE, 0x2F, 0x79, 0x1C, 0x9B, 0x30,
    0xE3, 0x00, 0x06, 0x7E, 0x2E, 0x0F, 0x38, 0x33, 0x21, 0xAD, 0xA5, 0x54, 0xCA, 0xA7, 0x29, 0xFC,
    0x5A, 0x47, 0x69, 0x7D, 0xC5, 0x95, 0xB5, 0xF4, 0x0B, 0x90, 0xA3, 0x81, 0x6D, 0x25, 0x55, 0x35,
    0xF5, 0x75, 0x74, 0x0A, 0x26, 0xBF, 0x19, 0x5C, 0x1A, 0xC6, 0xFF, 0x99, 0x5D, 0x84, 0xAA, 0x66,
    0x3E, 0xAF, 0x78, 0xB3, 0x20, 0x43, 0xC1, 0xED, 0x24, 0xEA, 0xE6, 0x3F, 0x18, 0xF3, 0xA0, 0x42,
    0x57, 0x08, 0x53, 0x60, 0xC3, 0xC0, 0x83, 0x40, 0x82, 0xD7, 0x09, 0xBD, 0x44, 0x2A, 0x67, 0xA8,
    0x93, 0xE0, 0xC2, 0x56, 0x9F, 0xD9, 0xDD, 0x85, 0x15, 0xB4, 0x8A, 0x27, 0x28, 0x92, 0x76, 0xDE,
    0xEF, 0xF8, 0xB2, 0xB7, 0xC9, 0x3D, 0x45, 0x94, 0x4B, 0x11, 0x0D, 0x65, 0xD5, 0x34, 0x8B, 0x91,
    0x0C, 0xFA, 0x87, 0xE9, 0x7C, 0x5B, 0xB1, 0x4D, 0xE5, 0xD4, 0xCB, 0x10, 0xA2, 0x17, 0x89, 0xBC,
    0xDB, 0xB0, 0xE2, 0x97, 0x88, 0x52, 0xF7, 0x48, 0xD3, 0x61, 0x2C, 0x3A, 0x2B, 0xD1, 0x8C, 0xFB,
    0xF1, 0xCD, 0xE4, 0x6A, 0xE7, 0xA9, 0xFD, 0xC4, 0x37, 0xC8, 0xD2, 0xF6, 0xDF, 0x58, 0x72, 0x4E,
];

/// Accumulator index for the triplet `(a, b, c)` hashed under shape tag `n`.
fn tran3(a: u8, b: u8, c: u8, n: usize) -> usize {
    let lead = TRAN[(a as usize + n) & 255] as usize;
    let mid = TRAN[b as usize] as usize * (2 * n + 1);
    let tail = TRAN[(c ^ TRAN[n]) as usize] as usize;
    ((lead ^ mid) + tail) & 255
}

/// A streaming Nilsimsa digest.
///
/// The digest is cumulative: every [`update`](Self::update) extends the same
/// running histogram and recomputes the digest, so feeding a byte stream in
/// one call or many yields the same result.
pub struct Nilsimsa {
    acc: [u64; 256],
    window: [Option<u8>; 4],
    count: u64,
    hashbits: usize,
    digest: Fingerprint,
}

impl Nilsimsa {
    pub fn new() -> Self {
        Self::with_hashbits(DEFAULT_HASHBITS)
    }

    /// A digest retaining only the low `hashbits` bits. Values above 256
    /// leave the extra high bits permanently zero.
    pub fn with_hashbits(hashbits: usize) -> Self {
        Self {
            acc: [0; 256],
            window: [None; 4],
            count: 0,
            hashbits,
            digest: Fingerprint::new(hashbits),
        }
    }

    /// Digests `data` in one shot at the default width.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut nilsimsa = Self::new();
        nilsimsa.update(data);
        nilsimsa
    }

    /// Feeds bytes into the running digest, bumping the accumulators for the
    /// 0 to 8 triplets each byte forms with the previous three bytes.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.count += 1;
            let [w0, w1, w2, w3] = self.window;
            if let (Some(p0), Some(p1)) = (w0, w1) {
                self.acc[tran3(byte, p0, p1, 0)] += 1;
            }
            if let (Some(p0), Some(p1), Some(p2)) = (w0, w1, w2) {
                self.acc[tran3(byte, p0, p2, 1)] += 1;
                self.acc[tran3(byte, p1, p2, 2)] += 1;
            }
            if let (Some(p0), Some(p1), Some(p2), Some(p3)) = (w0, w1, w2, w3) {
                self.acc[tran3(byte, p0, p3, 3)] += 1;
                self.acc[tran3(byte, p1, p3, 4)] += 1;
                self.acc[tran3(byte, p2, p3, 5)] += 1;
                self.acc[tran3(p3, p0, byte, 6)] += 1;
                self.acc[tran3(p3, p2, byte, 7)] += 1;
            }
            self.window = [Some(byte), w0, w1, w2];
        }
        self.digest = self.compute_digest();
    }

    /// Digest of everything seen so far: accumulators strictly above the mean
    /// triplet count become set bits, assembled byte-reversed.
    fn compute_digest(&self) -> Fingerprint {
        // Triplets counted so far; the first four bytes ramp up short.
        let total: u64 = match self.count {
            0..=2 => 0,
            3 => 1,
            4 => 4,
            n => 8 * n - 28,
        };
        let threshold = total / 256;

        let mut code = [0u8; 32];
        for (index, &count) in self.acc.iter().enumerate() {
            if count > threshold {
                code[index >> 3] |= 1 << (index & 7);
            }
        }
        code.reverse();

        Fingerprint::from_fn(self.hashbits, |bit| {
            bit < 256 && code[bit / 8] >> (bit % 8) & 1 == 1
        })
    }
}

impl Default for Nilsimsa {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityDigest for Nilsimsa {
    fn hashbits(&self) -> usize {
        self.hashbits
    }

    fn digest(&self) -> &Fingerprint {
        &self.digest
    }
}
