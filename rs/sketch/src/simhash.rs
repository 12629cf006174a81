//! Charikar similarity hashes over token sequences. Tokens whose digests
//! land close in Hamming space came from similar token bags.

use fingerprint::{Fingerprint, SimilarityDigest};

/// Default digest width in bits.
pub const DEFAULT_HASHBITS: usize = 96;

/// A Simhash digest of a token sequence.
///
/// Computed once at construction; there is no incremental update.
pub struct Simhash {
    hashbits: usize,
    digest: Fingerprint,
}

impl Simhash {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_hashbits(tokens, DEFAULT_HASHBITS)
    }

    /// Hashes every token to `hashbits` bits and takes a per-position
    /// majority vote: positions set in at least half of the token hashes end
    /// up set in the digest. An empty token sequence therefore yields the
    /// all-ones digest.
    pub fn with_hashbits<I, S>(tokens: I, hashbits: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set_votes = vec![0u64; hashbits];
        let mut num_tokens = 0u64;
        for token in tokens {
            num_tokens += 1;
            for position in string_hash(token.as_ref(), hashbits).ones() {
                set_votes[position] += 1;
            }
        }

        let digest = Fingerprint::from_fn(hashbits, |position| {
            2 * set_votes[position] >= num_tokens
        });
        Self { hashbits, digest }
    }
}

impl SimilarityDigest for Simhash {
    fn hashbits(&self) -> usize {
        self.hashbits
    }

    fn digest(&self) -> &Fingerprint {
        &self.digest
    }
}

/// Variable-width polynomial rolling hash of a token.
///
/// Seeded with the first character shifted up 7 bits, folded per character
/// as `x = (x * 1000003) ^ char`, masked to `hashbits` throughout, and
/// finalized by XOR-ing in the character count. An all-ones result is
/// remapped to keep that value reserved.
fn string_hash(token: &str, hashbits: usize) -> Fingerprint {
    let mut x = match token.chars().next() {
        Some(first) => Fingerprint::from_u64((first as u64) << 7, hashbits),
        None => return Fingerprint::new(hashbits),
    };
    let mut char_count = 0u64;
    for character in token.chars() {
        char_count += 1;
        x.wrapping_mul_u64(1000003);
        x.xor_u64(character as u64);
    }
    x.xor_u64(char_count);
    if x.is_all_ones() {
        x.xor_u64(1);
    }
    x
}

#[cfg(test)]
mod tests {
    use fingerprint::FingerprintError;

    use super::*;

    fn tokens(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn test_known_digest() {
        let simhash = Simhash::new(tokens("This is a test string for testing"));
        assert_eq!(simhash.digest().to_hex(), "20302202800d8e90e45cc488");
    }

    #[test]
    fn test_string_hash() {
        assert_eq!(string_hash("hello", 96).to_hex(), "9564bfdf0baa983db47697fd");
        assert_eq!(string_hash("", 96).count_ones(), 0);
    }

    #[test]
    fn test_truncated_width_shares_low_bits() {
        let narrow = Simhash::with_hashbits(tokens("This is a test string for testing"), 64);
        assert_eq!(narrow.digest().to_hex(), "800d8e90e45cc488");
    }

    #[test]
    fn test_similarity_of_near_duplicates() {
        let a = Simhash::new(tokens("This is a test string for testing"));
        let b = Simhash::new(tokens("This is a test string for testing also"));
        assert_eq!(a.hamming_distance(&b).unwrap(), 12);
        assert_eq!(a.similarity(&b).unwrap(), (96.0 - 12.0) / 96.0);
        assert_eq!(a.similarity(&b).unwrap(), b.similarity(&a).unwrap());
    }

    #[test]
    fn test_determinism_and_self_similarity() {
        let a = Simhash::new(tokens("PubMed comprises more than 19 million citations"));
        let b = Simhash::new(tokens("PubMed comprises more than 19 million citations"));
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.similarity(&b).unwrap(), 1.0);
    }

    #[test]
    fn test_empty_token_sequence_is_all_ones() {
        let empty = Simhash::with_hashbits(Vec::<&str>::new(), 16);
        assert!(empty.digest().is_all_ones());
        // A single empty token votes every bit down instead.
        let blank = Simhash::with_hashbits([""], 16);
        assert_eq!(blank.digest().count_ones(), 0);
    }

    #[test]
    fn test_width_mismatch() {
        let wide = Simhash::new(tokens("alpha beta"));
        let narrow = Simhash::with_hashbits(tokens("alpha beta"), 64);
        assert_eq!(
            wide.similarity(&narrow),
            Err(FingerprintError::WidthMismatch {
                left: 96,
                right: 64
            })
        );
    }
}
