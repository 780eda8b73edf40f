//! Development helper functions for tests.

use num_bigint::{BigUint, ToBigUint};
use num_traits::cast::ToPrimitive;

/// The field modulus p = 2^256 - 2^32 - 977 as a BigUint.
pub fn modulus() -> BigUint {
    (BigUint::from(1u8) << 256) - (BigUint::from(1u8) << 32) - BigUint::from(977u32)
}

/// Converts four little-endian 64-bit words to a BigUint.
pub fn u64_array_to_biguint(words: &[u64; 4]) -> BigUint {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| w.to_biguint().unwrap() << (i * 64))
        .sum()
}

/// Converts a BigUint (below 2^256) to four little-endian 64-bit words.
pub fn biguint_to_u64_array(x: &BigUint) -> [u64; 4] {
    let mask = BigUint::from(u64::MAX);
    let mut words = [0u64; 4];
    for (i, word) in words.iter_mut().enumerate() {
        *word = ((x >> (i * 64)) & &mask).to_u64().unwrap();
    }
    words
}

#[cfg(test)]
mod tests {
    use super::{biguint_to_u64_array, modulus, u64_array_to_biguint};
    use num_bigint::BigUint;

    #[test]
    fn modulus_matches_hex() {
        let expected = BigUint::parse_bytes(
            b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F",
            16,
        )
        .unwrap();
        assert_eq!(modulus(), expected);
    }

    #[test]
    fn word_conversions_round_trip() {
        let words = [1u64, 2, 3, 4];
        assert_eq!(biguint_to_u64_array(&u64_array_to_biguint(&words)), words);
    }
}
