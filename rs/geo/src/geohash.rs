//! Geohash spatial bucketing.
//!
//! Geohash is a latitude/longitude geocode system that subdivides space into
//! grid-shaped buckets. Codes offer arbitrary precision, and removing
//! characters from the end of a code gradually loses precision, so nearby
//! places often (but not always) share prefixes; the longer a shared prefix,
//! the closer the two places.

use std::f64::consts::PI;

use crate::{GeohashError, Result};

/// Not the RFC 4648 alphabet: a variation that drops the visually ambiguous
/// `a`, `i`, `l`, `o`. The symbol-to-value mapping is fixed for
/// interoperability with existing geohash data.
const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

const fn base32_map() -> [i8; 256] {
    let mut map = [-1i8; 256];
    let mut i = 0;
    while i < BASE32.len() {
        map[BASE32[i] as usize] = i as i8;
        i += 1;
    }
    map
}

/// Reverse symbol lookup for decoding.
static BASE32_MAP: [i8; 256] = base32_map();

/// Spreads the low 3 bits of a coordinate stream across a 5-bit symbol so
/// they can interleave with the other stream's bits.
const BOOST: [u128; 8] = [0, 1, 4, 5, 16, 17, 20, 21];

/// Longest supported code; both coordinate bit streams must fit in 128 bits.
pub const MAX_PRECISION: usize = 50;

/// A geohash cell with its representative coordinate.
///
/// Built either from a coordinate pair ([`encode`](Self::encode)) or from an
/// existing code ([`from_code`](Self::from_code)); the second form stores the
/// center of the code's quantization cell, so an encode/decode round trip
/// lands inside the original cell but not necessarily on the original point.
#[derive(Debug, Clone, PartialEq)]
pub struct Geohash {
    latitude: f64,
    longitude: f64,
    code: String,
    precision: usize,
}

impl Geohash {
    /// Encodes a coordinate pair into a code of `precision` characters.
    ///
    /// Longitude is normalized into [-180, 180); latitude outside [-90, 90)
    /// is rejected. Precision 0 yields an empty code.
    pub fn encode(latitude: f64, longitude: f64, precision: usize) -> Result<Self> {
        if !(-90.0..90.0).contains(&latitude) {
            return Err(GeohashError::InvalidLatitude(latitude));
        }
        if precision > MAX_PRECISION {
            return Err(GeohashError::InvalidPrecision(precision));
        }
        let mut longitude = longitude;
        while longitude < -180.0 {
            longitude += 360.0;
        }
        while longitude >= 180.0 {
            longitude -= 360.0;
        }

        if precision == 0 {
            return Ok(Self {
                latitude,
                longitude,
                code: String::new(),
                precision,
            });
        }

        // Latitude and longitude each get precision*5/2 bits, longitude one
        // more when precision is odd: base-32 symbols interleave 3 bits of
        // the wider stream with 2 of the narrower, and longitude's range is
        // twice latitude's.
        let lat_bits = precision * 5 / 2;
        let lon_bits = lat_bits + (precision & 1);
        let lat = quantize(latitude / 180.0, lat_bits);
        let lon = quantize(longitude / 360.0, lon_bits);
        let code = interleave(lat, lon, lat_bits, lon_bits, precision);
        Ok(Self {
            latitude,
            longitude,
            code,
            precision,
        })
    }

    /// Reconstructs a hash from an existing code. The stored coordinate is
    /// the center of the code's cell.
    pub fn from_code(code: &str) -> Result<Self> {
        let (latitude, longitude) = decode(code)?;
        Ok(Self {
            latitude,
            longitude,
            code: code.to_string(),
            precision: code.chars().count(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Great-circle angle in radians between the two stored coordinates,
    /// by the spherical law of cosines.
    pub fn distance(&self, other: &Geohash) -> f64 {
        let degrees_to_radians = PI / 180.0;
        let phi1 = (90.0 - self.latitude) * degrees_to_radians;
        let phi2 = (90.0 - other.latitude) * degrees_to_radians;
        let theta1 = self.longitude * degrees_to_radians;
        let theta2 = other.longitude * degrees_to_radians;

        let cosine =
            phi1.sin() * phi2.sin() * (theta1 - theta2).cos() + phi1.cos() * phi2.cos();
        // Rounding can push identical or antipodal points just past the
        // domain of acos.
        cosine.clamp(-1.0, 1.0).acos()
    }

    pub fn distance_in_miles(&self, other: &Geohash) -> f64 {
        self.distance(other) * 3960.0
    }

    pub fn distance_in_km(&self, other: &Geohash) -> f64 {
        self.distance(other) * 6373.0
    }
}

/// Decodes a code to the (latitude, longitude) at the center of its cell.
pub fn decode(code: &str) -> Result<(f64, f64)> {
    let (lat, lon, lat_bits, lon_bits) = deinterleave(code)?;
    // Appending a 1 bit to each stream moves the value from the cell corner
    // to the cell center.
    let lat = (lat << 1) + 1;
    let lon = (lon << 1) + 1;
    let lat_bits = lat_bits + 1;
    let lon_bits = lon_bits + 1;
    let latitude = 180.0 * (lat as i128 - (1i128 << (lat_bits - 1))) as f64
        / (1u128 << lat_bits) as f64;
    let longitude = 360.0 * (lon as i128 - (1i128 << (lon_bits - 1))) as f64
        / (1u128 << lon_bits) as f64;
    Ok((latitude, longitude))
}

/// Sign-dependent offset-binary quantization of a coordinate fraction.
///
/// Points either side of the zero meridian/equator quantize from opposite
/// directions, so near-zero coordinates can produce widely differing codes.
fn quantize(fraction: f64, bits: usize) -> u128 {
    let scale = (1u128 << bits) as f64;
    let half = 1u128 << (bits - 1);
    if fraction > 0.0 {
        (scale * fraction) as u128 + half
    } else {
        half - (scale * -fraction) as u128
    }
}

/// Merges the two quantized streams into base-32 symbols, 5 bits at a time,
/// 3 from the wider stream and 2 from the narrower.
fn interleave(lat: u128, lon: u128, lat_bits: usize, lon_bits: usize, precision: usize) -> String {
    let (mut a, mut b) = if lat_bits < lon_bits {
        (lon, lat)
    } else {
        (lat, lon)
    };
    let mut symbols = Vec::with_capacity(precision);
    for _ in 0..precision {
        let index = (BOOST[(a & 7) as usize] + (BOOST[(b & 3) as usize] << 1)) & 0x1F;
        symbols.push(BASE32[index as usize]);
        let t = a >> 3;
        a = b >> 2;
        b = t;
    }
    symbols.reverse();
    symbols.into_iter().map(char::from).collect()
}

/// Splits a code back into bit-length-tagged coordinate integers.
fn deinterleave(code: &str) -> Result<(u128, u128, usize, usize)> {
    if code.chars().count() > MAX_PRECISION {
        return Err(GeohashError::InvalidPrecision(code.chars().count()));
    }
    let mut lat = 0u128;
    let mut lon = 0u128;
    let mut lat_bits = 0usize;
    let mut lon_bits = 0usize;
    for (index, symbol) in code.chars().enumerate() {
        let value = if symbol.is_ascii() {
            BASE32_MAP[symbol as usize]
        } else {
            -1
        };
        if value < 0 {
            return Err(GeohashError::InvalidCharacter(symbol));
        }
        let t = value as u128;
        if index % 2 == 0 {
            lon = (lon << 3) | ((t >> 2) & 4) | ((t >> 1) & 2) | (t & 1);
            lat = (lat << 2) | ((t >> 2) & 2) | ((t >> 1) & 1);
            lon_bits += 3;
            lat_bits += 2;
        } else {
            lon = (lon << 2) | ((t >> 2) & 2) | ((t >> 1) & 1);
            lat = (lat << 3) | ((t >> 2) & 4) | ((t >> 1) & 2) | (t & 1);
            lon_bits += 2;
            lat_bits += 3;
        }
    }
    Ok((lat, lon, lat_bits, lon_bits))
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    #[test]
    fn test_known_codes() {
        let hash = Geohash::encode(57.64911, 10.40744, 11).unwrap();
        assert_eq!(hash.code(), "u4pruydqqvj");
        assert_eq!(Geohash::encode(40.75, -74.0, 12).unwrap().code(), "dr5ru46cgn8f");
        assert_eq!(Geohash::encode(-33.86, 151.21, 8).unwrap().code(), "r3gx2u5b");
        assert_eq!(Geohash::encode(0.0, 0.0, 5).unwrap().code(), "s0000");
    }

    #[test]
    fn test_decode_returns_cell_center() {
        let (latitude, longitude) = decode("u4pruydqqvj").unwrap();
        assert_abs_diff_eq!(latitude, 57.64911063015461, epsilon = 1e-12);
        assert_abs_diff_eq!(longitude, 10.407439693808556, epsilon = 1e-12);

        let (latitude, longitude) = decode("s0000").unwrap();
        assert_abs_diff_eq!(latitude, 0.02197265625, epsilon = 1e-12);
        assert_abs_diff_eq!(longitude, 0.02197265625, epsilon = 1e-12);

        // The decoded center re-encodes to the same code.
        let cell = Geohash::from_code("u4pruydqqvj").unwrap();
        let recoded = Geohash::encode(cell.latitude(), cell.longitude(), 11).unwrap();
        assert_eq!(recoded.code(), "u4pruydqqvj");
    }

    #[test]
    fn test_round_trip_error_shrinks_with_precision() {
        let points = [
            (57.64911, 10.40744),
            (-33.86, 151.21),
            (37.7749, -122.4194),
            (-0.0003, 0.0007),
            (71.0, -156.78),
        ];
        for (latitude, longitude) in points {
            let mut previous_error = f64::INFINITY;
            for precision in [4, 6, 8, 10, 12] {
                let code = Geohash::encode(latitude, longitude, precision)
                    .unwrap()
                    .code()
                    .to_string();
                let (decoded_lat, decoded_lon) = decode(&code).unwrap();
                let lat_bits = precision * 5 / 2;
                let lon_bits = lat_bits + (precision & 1);
                // The offset-binary quantization can land a point up to a
                // cell and a half from the decoded center either side of the
                // zero meridian/equator.
                let lat_cell = 180.0 / (1u64 << lat_bits) as f64;
                let lon_cell = 360.0 / (1u64 << lon_bits) as f64;
                assert!((decoded_lat - latitude).abs() <= 1.5 * lat_cell);
                assert!((decoded_lon - longitude).abs() <= 1.5 * lon_cell);

                let error = (decoded_lat - latitude).abs() + (decoded_lon - longitude).abs();
                assert!(error <= previous_error + 1e-12);
                previous_error = error;
            }
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            Geohash::encode(95.0, 0.0, 8),
            Err(GeohashError::InvalidLatitude(95.0))
        );
        assert_eq!(
            Geohash::encode(90.0, 0.0, 8),
            Err(GeohashError::InvalidLatitude(90.0))
        );
        assert!(Geohash::encode(-90.0, 0.0, 8).is_ok());
        assert_eq!(
            Geohash::encode(0.0, 0.0, 51),
            Err(GeohashError::InvalidPrecision(51))
        );
        assert_eq!(
            decode("u4pruydqqva"),
            Err(GeohashError::InvalidCharacter('a'))
        );
        assert_eq!(decode("abc"), Err(GeohashError::InvalidCharacter('a')));
        assert_eq!(decode("ü"), Err(GeohashError::InvalidCharacter('ü')));
    }

    #[test]
    fn test_longitude_normalization() {
        assert_eq!(
            Geohash::encode(57.64911, 370.40744, 3).unwrap().code(),
            "u4p"
        );
        assert_eq!(
            Geohash::encode(10.0, -190.0, 6).unwrap().code(),
            Geohash::encode(10.0, 170.0, 6).unwrap().code()
        );
    }

    #[test]
    fn test_zero_precision() {
        let hash = Geohash::encode(12.0, 34.0, 0).unwrap();
        assert_eq!(hash.code(), "");
        assert_eq!(decode("").unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_distance() {
        let sf = Geohash::encode(37.7749, -122.4194, 9).unwrap();
        let la = Geohash::encode(34.0522, -118.2437, 9).unwrap();
        // Distance runs over the decoded cell centers.
        let sf = Geohash::from_code(sf.code()).unwrap();
        let la = Geohash::from_code(la.code()).unwrap();
        assert_relative_eq!(sf.distance_in_km(&la), 559.2958094030794, max_relative = 1e-9);
        assert_relative_eq!(
            sf.distance_in_miles(&la),
            559.2958094030794 / 6373.0 * 3960.0,
            max_relative = 1e-9
        );
        assert_abs_diff_eq!(sf.distance(&sf), 0.0, epsilon = 1e-6);
    }
}
