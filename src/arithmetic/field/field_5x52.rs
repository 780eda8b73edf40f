//! Field element modulo the curve internal modulus using 64-bit limbs.
//! Inspired by the implementation in <https://github.com/bitcoin-core/secp256k1>

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

/// Integers modulo the secp256k1 modulus (2^256 - 2^32 - 977).
/// Uses 5 64-bit limbs (little-endian), where in the normalized form
/// the first 4 contain 52 bits of the value each, and the last one contains 48.
/// Arithmetic can be chained without modular reduction for some time, using
/// the remaining overflow bits; how far a value has drifted from the
/// normalized form is its magnitude.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement5x52(pub(crate) [u64; 5]);

impl FieldElement5x52 {
    /// Zero element.
    pub const ZERO: Self = Self([0, 0, 0, 0, 0]);

    /// Multiplicative identity.
    pub const ONE: Self = Self([1, 0, 0, 0, 0]);

    pub const fn from_u64(val: u64) -> Self {
        let w0 = val & 0xFFFFFFFFFFFFF;
        let w1 = val >> 52;
        Self([w0, w1, 0, 0, 0])
    }

    /// Unpacks four little-endian 64-bit words (word 0 carrying bits 0..63)
    /// into limbs. Does not check the value against the modulus; a value
    /// at or above it is brought into range by the next normalization.
    pub const fn from_words_unchecked(words: [u64; 4]) -> Self {
        let w0 = words[0] & 0xFFFFFFFFFFFFF;
        let w1 = (words[0] >> 52) | ((words[1] & 0xFFFFFFFFFF) << 12);
        let w2 = (words[1] >> 40) | ((words[2] & 0xFFFFFFF) << 24);
        let w3 = (words[2] >> 28) | ((words[3] & 0xFFFF) << 36);
        let w4 = words[3] >> 16;
        Self([w0, w1, w2, w3, w4])
    }

    /// Attempts to parse four little-endian 64-bit words as a field element.
    ///
    /// Returns None if the words do not encode an integer in the range [0, p).
    pub fn from_words(words: [u64; 4]) -> CtOption<Self> {
        let res = Self::from_words_unchecked(words);
        let overflow = res.get_overflow();
        CtOption::new(res, !overflow)
    }

    /// Packs the limbs back into four little-endian 64-bit words.
    /// The element must be normalized.
    pub fn to_words(&self) -> [u64; 4] {
        let mut ret = [0u64; 4];
        ret[0] = self.0[0] | (self.0[1] << 52);
        ret[1] = (self.0[1] >> 12) | (self.0[2] << 40);
        ret[2] = (self.0[2] >> 24) | (self.0[3] << 28);
        ret[3] = (self.0[3] >> 36) | (self.0[4] << 16);
        ret
    }

    /// Adds `x * (2^256 - modulus)`.
    fn add_modulus_correction(&self, x: u64) -> Self {
        // add (2^256 - modulus) * x to the first limb
        let t0 = self.0[0] + x * 0x1000003D1u64;

        // Propagate excess bits up the limbs
        let t1 = self.0[1] + (t0 >> 52);
        let t0 = t0 & 0xFFFFFFFFFFFFFu64;

        let t2 = self.0[2] + (t1 >> 52);
        let t1 = t1 & 0xFFFFFFFFFFFFFu64;

        let t3 = self.0[3] + (t2 >> 52);
        let t2 = t2 & 0xFFFFFFFFFFFFFu64;

        let t4 = self.0[4] + (t3 >> 52);
        let t3 = t3 & 0xFFFFFFFFFFFFFu64;

        Self([t0, t1, t2, t3, t4])
    }

    /// Subtracts the overflow in the last limb and returns it with the new
    /// field element. Equivalent to subtracting a multiple of 2^256.
    fn subtract_modulus_approximation(&self) -> (Self, u64) {
        let x = self.0[4] >> 48;
        let t4 = self.0[4] & 0x0FFFFFFFFFFFFu64; // equivalent to self -= 2^256 * x
        (Self([self.0[0], self.0[1], self.0[2], self.0[3], t4]), x)
    }

    /// Checks if the field element is greater or equal to the modulus.
    fn get_overflow(&self) -> Choice {
        let m = self.0[1] & self.0[2] & self.0[3];
        let x = (self.0[4] >> 48 != 0)
            | ((self.0[4] == 0x0FFFFFFFFFFFFu64)
                & (m == 0xFFFFFFFFFFFFFu64)
                & (self.0[0] >= 0xFFFFEFFFFFC2Fu64));
        Choice::from(x as u8)
    }

    /// Brings the field element's magnitude to 1, but does not necessarily
    /// normalize it: the value may still be in the range [p, 2^256).
    pub fn normalize_weak(&self) -> Self {
        // Reduce t4 at the start so there will be at most a single carry from the first pass
        let (t, x) = self.subtract_modulus_approximation();

        // The first pass ensures the magnitude is 1, ...
        let res = t.add_modulus_correction(x);

        // ... except for a possible carry at bit 48 of t4 (i.e. bit 256 of the field element)
        debug_assert!(res.0[4] >> 49 == 0);

        res
    }

    /// Fully normalizes the field element.
    /// That is, first four limbs are at most 52 bit large, the last limb is at
    /// most 48 bit large, and the value is less than the modulus.
    pub fn normalize(&self) -> Self {
        let res = self.normalize_weak();

        // At most a single final reduction is needed;
        // check if the value is >= the field characteristic
        let overflow = res.get_overflow();

        let res_corrected = res.add_modulus_correction(1u64);
        // Mask off the possible multiple of 2^256 from the final reduction
        let (res_corrected, x) = res_corrected.subtract_modulus_approximation();

        // If the last limb didn't carry to bit 48 already,
        // then it should have after any final reduction
        debug_assert!(x == (overflow.unwrap_u8() as u64));

        Self::conditional_select(&res, &res_corrected, overflow)
    }

    /// Checks if the field element becomes zero if normalized.
    pub fn normalizes_to_zero(&self) -> Choice {
        let res = self.normalize_weak();

        let t0 = res.0[0];
        let t1 = res.0[1];
        let t2 = res.0[2];
        let t3 = res.0[3];
        let t4 = res.0[4];

        // z0 tracks a possible raw value of 0, z1 tracks a possible raw value of the modulus
        let z0 = t0 | t1 | t2 | t3 | t4;
        let z1 = (t0 ^ 0x1000003D0u64) & t1 & t2 & t3 & (t4 ^ 0xF000000000000u64);

        Choice::from(((z0 == 0) | (z1 == 0xFFFFFFFFFFFFFu64)) as u8)
    }

    /// Determine if this `FieldElement5x52` is zero.
    ///
    /// The element must be normalized.
    pub fn is_zero(&self) -> Choice {
        Choice::from(((self.0[0] | self.0[1] | self.0[2] | self.0[3] | self.0[4]) == 0) as u8)
    }

    /// Determine if this `FieldElement5x52` is odd: `self mod 2 == 1`.
    ///
    /// The element must be normalized.
    pub fn is_odd(&self) -> Choice {
        (self.0[0] as u8 & 1).into()
    }

    /// The maximum number `m` for which `0xFFFFFFFFFFFFF * 2 * (m + 1) < 2^64`
    #[cfg(debug_assertions)]
    pub const fn max_magnitude() -> u32 {
        2047u32
    }

    /// Returns -self, treating it as a value of given magnitude.
    /// The provided magnitude must be equal or greater than the actual magnitude of `self`.
    /// Raises the magnitude by 1.
    ///
    /// The limbs of `(magnitude + 1) * 2 * p` dominate the corresponding limbs
    /// of any element of that magnitude, so the limb-wise subtraction never
    /// borrows.
    pub const fn negate(&self, magnitude: u32) -> Self {
        let m = (magnitude + 1) as u64;
        let r0 = 0xFFFFEFFFFFC2Fu64 * 2 * m - self.0[0];
        let r1 = 0xFFFFFFFFFFFFFu64 * 2 * m - self.0[1];
        let r2 = 0xFFFFFFFFFFFFFu64 * 2 * m - self.0[2];
        let r3 = 0xFFFFFFFFFFFFFu64 * 2 * m - self.0[3];
        let r4 = 0x0FFFFFFFFFFFFu64 * 2 * m - self.0[4];
        Self([r0, r1, r2, r3, r4])
    }

    /// Returns self + rhs mod p.
    /// Sums the magnitudes.
    pub const fn add(&self, rhs: &Self) -> Self {
        Self([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
            self.0[3] + rhs.0[3],
            self.0[4] + rhs.0[4],
        ])
    }

    /// Returns 2*self.
    /// Doubles the magnitude.
    pub const fn double(&self) -> Self {
        self.add(self)
    }

    /// Multiplies by a single-limb integer.
    /// Multiplies the magnitude by the same value.
    pub const fn mul_single(&self, rhs: u32) -> Self {
        let rhs_u64 = rhs as u64;
        Self([
            self.0[0] * rhs_u64,
            self.0[1] * rhs_u64,
            self.0[2] * rhs_u64,
            self.0[3] * rhs_u64,
            self.0[4] * rhs_u64,
        ])
    }

    /// Returns self * rhs mod p.
    /// Brings the magnitude to 1 (but doesn't normalize the result).
    /// The magnitudes of arguments should be <= 8.
    pub fn mul(&self, rhs: &Self) -> Self {
        let a = &self.0;
        let b = &rhs.0;
        let m = 0xFFFFFFFFFFFFFu64;

        // Magnitude <= 8 keeps the low limbs below 2^56 and the top limb
        // below 2^52, so each column of five 112-bit products fits in u128.
        debug_assert!(a[0] >> 56 == 0);
        debug_assert!(a[1] >> 56 == 0);
        debug_assert!(a[2] >> 56 == 0);
        debug_assert!(a[3] >> 56 == 0);
        debug_assert!(a[4] >> 52 == 0);

        debug_assert!(b[0] >> 56 == 0);
        debug_assert!(b[1] >> 56 == 0);
        debug_assert!(b[2] >> 56 == 0);
        debug_assert!(b[3] >> 56 == 0);
        debug_assert!(b[4] >> 52 == 0);

        // Ten-limb schoolbook product, carrying 52 bits between columns.
        let mut c = (a[0] as u128) * (b[0] as u128);
        let t0 = (c as u64) & m;
        c >>= 52;
        c += (a[0] as u128) * (b[1] as u128) + (a[1] as u128) * (b[0] as u128);
        let t1 = (c as u64) & m;
        c >>= 52;
        c += (a[0] as u128) * (b[2] as u128)
            + (a[1] as u128) * (b[1] as u128)
            + (a[2] as u128) * (b[0] as u128);
        let t2 = (c as u64) & m;
        c >>= 52;
        c += (a[0] as u128) * (b[3] as u128)
            + (a[1] as u128) * (b[2] as u128)
            + (a[2] as u128) * (b[1] as u128)
            + (a[3] as u128) * (b[0] as u128);
        let t3 = (c as u64) & m;
        c >>= 52;
        c += (a[0] as u128) * (b[4] as u128)
            + (a[1] as u128) * (b[3] as u128)
            + (a[2] as u128) * (b[2] as u128)
            + (a[3] as u128) * (b[1] as u128)
            + (a[4] as u128) * (b[0] as u128);
        let t4 = (c as u64) & m;
        c >>= 52;
        c += (a[1] as u128) * (b[4] as u128)
            + (a[2] as u128) * (b[3] as u128)
            + (a[3] as u128) * (b[2] as u128)
            + (a[4] as u128) * (b[1] as u128);
        let t5 = (c as u64) & m;
        c >>= 52;
        c += (a[2] as u128) * (b[4] as u128)
            + (a[3] as u128) * (b[3] as u128)
            + (a[4] as u128) * (b[2] as u128);
        let t6 = (c as u64) & m;
        c >>= 52;
        c += (a[3] as u128) * (b[4] as u128) + (a[4] as u128) * (b[3] as u128);
        let t7 = (c as u64) & m;
        c >>= 52;
        c += (a[4] as u128) * (b[4] as u128);
        let t8 = (c as u64) & m;
        c >>= 52;
        let t9 = c as u64;

        Self::fold([t0, t1, t2, t3, t4, t5, t6, t7, t8, t9])
    }

    /// Returns self * self.
    /// Brings the magnitude to 1 (but doesn't normalize the result).
    /// The magnitude of the argument should be <= 8.
    pub fn square(&self) -> Self {
        let a = &self.0;
        let m = 0xFFFFFFFFFFFFFu64;

        debug_assert!(a[0] >> 56 == 0);
        debug_assert!(a[1] >> 56 == 0);
        debug_assert!(a[2] >> 56 == 0);
        debug_assert!(a[3] >> 56 == 0);
        debug_assert!(a[4] >> 52 == 0);

        // Same column schedule as `mul`, with the symmetric off-diagonal
        // products collapsed into doubled terms.
        let mut c = (a[0] as u128) * (a[0] as u128);
        let t0 = (c as u64) & m;
        c >>= 52;
        c += ((a[0] * 2) as u128) * (a[1] as u128);
        let t1 = (c as u64) & m;
        c >>= 52;
        c += ((a[0] * 2) as u128) * (a[2] as u128) + (a[1] as u128) * (a[1] as u128);
        let t2 = (c as u64) & m;
        c >>= 52;
        c += ((a[0] * 2) as u128) * (a[3] as u128) + ((a[1] * 2) as u128) * (a[2] as u128);
        let t3 = (c as u64) & m;
        c >>= 52;
        c += ((a[0] * 2) as u128) * (a[4] as u128)
            + ((a[1] * 2) as u128) * (a[3] as u128)
            + (a[2] as u128) * (a[2] as u128);
        let t4 = (c as u64) & m;
        c >>= 52;
        c += ((a[1] * 2) as u128) * (a[4] as u128) + ((a[2] * 2) as u128) * (a[3] as u128);
        let t5 = (c as u64) & m;
        c >>= 52;
        c += ((a[2] * 2) as u128) * (a[4] as u128) + (a[3] as u128) * (a[3] as u128);
        let t6 = (c as u64) & m;
        c >>= 52;
        c += ((a[3] * 2) as u128) * (a[4] as u128);
        let t7 = (c as u64) & m;
        c >>= 52;
        c += (a[4] as u128) * (a[4] as u128);
        let t8 = (c as u64) & m;
        c >>= 52;
        let t9 = c as u64;

        Self::fold([t0, t1, t2, t3, t4, t5, t6, t7, t8, t9])
    }

    /// Folds the upper half of a ten-limb product back into five limbs,
    /// using 2^256 == 0x1000003D1 (mod p). The result has magnitude 1.
    fn fold(t: [u64; 10]) -> Self {
        let m = 0xFFFFFFFFFFFFFu64;
        // The fold constant scaled by 2^4, accounting for the top limb being
        // 48 bits wide rather than 52.
        let r = 0x1000003D10u128;

        let mut c = (t[0] as u128) + (t[5] as u128) * r;
        let t0 = (c as u64) & m;
        c >>= 52;
        c += (t[1] as u128) + (t[6] as u128) * r;
        let t1 = (c as u64) & m;
        c >>= 52;
        c += (t[2] as u128) + (t[7] as u128) * r;
        let r2 = (c as u64) & m;
        c >>= 52;
        c += (t[3] as u128) + (t[8] as u128) * r;
        let r3 = (c as u64) & m;
        c >>= 52;
        c += (t[4] as u128) + (t[9] as u128) * r;
        let r4 = (c as u64) & 0x0FFFFFFFFFFFFu64;
        c >>= 48;
        // The carry above bit 256 is a multiple of 2^256; reinject it at the
        // bottom with the un-shifted constant and propagate once.
        c = (t0 as u128) + c * 0x1000003D1u128;
        let r0 = (c as u64) & m;
        c >>= 52;
        let r1 = t1 + (c as u64);

        debug_assert!(r1 >> 53 == 0);
        debug_assert!(r4 >> 48 == 0);

        Self([r0, r1, r2, r3, r4])
    }
}

impl Default for FieldElement5x52 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ConditionallySelectable for FieldElement5x52 {
    #[inline(always)]
    fn conditional_select(
        a: &FieldElement5x52,
        b: &FieldElement5x52,
        choice: Choice,
    ) -> FieldElement5x52 {
        FieldElement5x52([
            u64::conditional_select(&a.0[0], &b.0[0], choice),
            u64::conditional_select(&a.0[1], &b.0[1], choice),
            u64::conditional_select(&a.0[2], &b.0[2], choice),
            u64::conditional_select(&a.0[3], &b.0[3], choice),
            u64::conditional_select(&a.0[4], &b.0[4], choice),
        ])
    }
}

impl ConstantTimeEq for FieldElement5x52 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[0].ct_eq(&other.0[0])
            & self.0[1].ct_eq(&other.0[1])
            & self.0[2].ct_eq(&other.0[2])
            & self.0[3].ct_eq(&other.0[3])
            & self.0[4].ct_eq(&other.0[4])
    }
}

impl Zeroize for FieldElement5x52 {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::FieldElement5x52;

    #[test]
    fn overflow_carry_during_normalize() {
        // In `normalize()` the excess bit of limb 0 can propagate all the way
        // into bit 48 of the last limb, which `get_overflow()` must treat as
        // an overflow even though limbs 1..3 no longer hold the all-ones
        // pattern.
        //
        // This is essentially 2^256
        let z = FieldElement5x52([
            1 << 52, // an excess bit here
            // the remaining full-sized limbs are at top normalized capacity
            (1 << 52) - 1,
            (1 << 52) - 1,
            (1 << 52) - 1,
            // the last limb is also at top normalized capacity
            (1 << 48) - 1,
        ]);

        let z_normalized = z.normalize();

        // The initial number is 2^256, so the result is 0x1000003D1
        let z_reference = FieldElement5x52([0x1000003D1, 0, 0, 0, 0]);

        assert_eq!(z_normalized.0, z_reference.0);
    }

    #[test]
    fn normalize_modulus_to_zero() {
        // p itself, in the limb layout
        let p = FieldElement5x52([
            0xFFFFEFFFFFC2F,
            0xFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFF,
            0x0FFFFFFFFFFFF,
        ]);
        assert_eq!(p.normalize().0, FieldElement5x52::ZERO.0);
        assert!(bool::from(p.normalizes_to_zero()));

        // p + 1 reduces to 1
        let p1 = p.add(&FieldElement5x52::ONE);
        assert_eq!(p1.normalize().0, FieldElement5x52::ONE.0);
        assert!(!bool::from(p1.normalizes_to_zero()));
    }

    #[test]
    fn words_round_trip() {
        let words = [
            0x59F2815B16F81798,
            0x029BFCDB2DCE28D9,
            0x55A06295CE870B07,
            0x79BE667EF9DCBBAC,
        ];
        let fe = FieldElement5x52::from_words(words).unwrap();
        assert_eq!(fe.to_words(), words);
    }

    #[test]
    fn words_above_modulus_are_rejected() {
        assert!(bool::from(
            FieldElement5x52::from_words([u64::MAX; 4]).is_none()
        ));
        // ... but the unchecked unpacking reduces them mod p instead:
        // 2^256 - 1 == 0x1000003D0 (mod p)
        let fe = FieldElement5x52::from_words_unchecked([u64::MAX; 4]);
        assert_eq!(fe.normalize().to_words(), [0x1000003D0, 0, 0, 0]);
    }
}
