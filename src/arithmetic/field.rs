//! Field arithmetic modulo p = 2^256 - 2^32 - 977.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

mod field_5x52;
mod field_impl;

use field_impl::FieldElementImpl;

/// An element in the finite field modulo p = 2^256 - 2^32 - 977.
///
/// Elements are kept lazily reduced: a value is allowed to drift up to a
/// bounded multiple of p between reductions, and the bound (the element's
/// *magnitude*) is part of each operation's contract. Addition sums
/// magnitudes, negation and small-integer scaling raise them, while
/// multiplication and squaring accept magnitudes up to 8 and bring their
/// result back to magnitude 1. Predicates, packing and rendering work on
/// normalized values. In debug builds each element carries its magnitude
/// and every operation asserts these rules.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(FieldElementImpl);

impl FieldElement {
    /// Zero element.
    pub const ZERO: Self = Self(FieldElementImpl::ZERO);

    /// Multiplicative identity.
    pub const ONE: Self = Self(FieldElementImpl::ONE);

    /// Creates a field element from a small integer. Magnitude 1.
    pub const fn from_u64(val: u64) -> Self {
        Self(FieldElementImpl::from_u64(val))
    }

    /// Attempts to parse four little-endian 64-bit words (word 0 carrying
    /// bits 0..63) as a field element.
    ///
    /// Returns None if the words do not encode an integer in the range [0, p).
    pub fn from_words(words: [u64; 4]) -> CtOption<Self> {
        FieldElementImpl::from_words(words).map(Self)
    }

    /// Creates a field element from four little-endian 64-bit words without
    /// checking them against the modulus. Magnitude 1; a value at or above p
    /// is reduced by the next normalization.
    pub const fn from_words_unchecked(words: [u64; 4]) -> Self {
        Self(FieldElementImpl::from_words_unchecked(words))
    }

    /// Returns the canonical value in [0, p) as four little-endian 64-bit
    /// words, normalizing first.
    pub fn to_words(&self) -> [u64; 4] {
        self.0.normalize().to_words()
    }

    /// Parses a field element from 1 to 64 hex characters (either case).
    /// Short strings are right-aligned: the last character of the input
    /// becomes the lowest nibble of the value.
    ///
    /// Returns None for an empty string, more than 64 characters, or any
    /// non-hex character.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.is_empty() || hex.len() > 64 {
            return None;
        }
        let mut words = [0u64; 4];
        for (i, b) in hex.bytes().rev().enumerate() {
            let nibble = (b as char).to_digit(16)? as u64;
            words[i / 16] |= nibble << ((i % 16) * 4);
        }
        Some(Self::from_words_unchecked(words))
    }

    /// Fully normalizes the element: limbs in base 2^52 (2^48 for the top
    /// limb) and the value in [0, p). Magnitude 1.
    pub fn normalize(&self) -> Self {
        Self(self.0.normalize())
    }

    /// Brings the magnitude to 1 by carry propagation alone; the value may
    /// still be in [p, 2^256).
    pub fn normalize_weak(&self) -> Self {
        Self(self.0.normalize_weak())
    }

    /// Checks if the element becomes zero if normalized, without producing
    /// the normalized value.
    pub fn normalizes_to_zero(&self) -> Choice {
        self.0.normalizes_to_zero()
    }

    /// Determine if this element is zero. The element must be normalized.
    pub fn is_zero(&self) -> Choice {
        self.0.is_zero()
    }

    /// Determine if this element is odd: `self mod 2 == 1`. The element must
    /// be normalized.
    pub fn is_odd(&self) -> Choice {
        self.0.is_odd()
    }

    /// Returns -self, treating it as a value of given magnitude, which must
    /// be equal or greater than the actual magnitude of `self`. The result's
    /// magnitude is one higher.
    pub fn negate(&self, magnitude: u32) -> Self {
        Self(self.0.negate(magnitude))
    }

    /// Returns self + rhs mod p. Sums the magnitudes.
    pub fn add(&self, rhs: &Self) -> Self {
        Self(self.0.add(&(rhs.0)))
    }

    /// Returns 2*self. Doubles the magnitude.
    pub fn double(&self) -> Self {
        Self(self.0.double())
    }

    /// Multiplies by a small integer. Multiplies the magnitude by the same
    /// value, which must keep it within bounds.
    pub fn mul_single(&self, rhs: u32) -> Self {
        Self(self.0.mul_single(rhs))
    }

    /// Returns self * rhs mod p. The magnitudes of both arguments must be at
    /// most 8; the result has magnitude 1 (not necessarily normalized).
    pub fn mul(&self, rhs: &Self) -> Self {
        Self(self.0.mul(&(rhs.0)))
    }

    /// Returns self * self. The magnitude of the argument must be at most 8;
    /// the result has magnitude 1 (not necessarily normalized).
    pub fn square(&self) -> Self {
        Self(self.0.square())
    }

    /// Returns the multiplicative inverse of self, computed as self^(p - 2).
    ///
    /// The base-2^10 digits of p - 2 are 63 followed by twenty-five digits
    /// drawn from {1023, 1019, 45}, so after a short precomputation the whole
    /// exponentiation is a run of square-ten-times-then-multiply steps.
    ///
    /// Zero has no inverse; for zero input the result is zero. Callers must
    /// not rely on inverting zero.
    pub fn invert(&self) -> Self {
        let a2 = self.square();
        let a3 = a2.mul(self);
        let a4 = a2.square();
        let a5 = a4.mul(self);
        let a10 = a5.square();
        let a11 = a10.mul(self);
        let a21 = a11.mul(&a10);
        let a42 = a21.square();
        let a45 = a42.mul(&a3);
        let a63 = a42.mul(&a21);
        let a126 = a63.square();
        let a252 = a126.square();
        let a504 = a252.square();
        let a1008 = a504.square();
        let a1019 = a1008.mul(&a11);
        let a1023 = a1019.mul(&a4);

        let mut x = a63;
        for mult in [
            &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023,
            &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023,
            &a1023, &a1019, &a1023, &a1023, &a45,
        ] {
            for _ in 0..10 {
                x = x.square();
            }
            x = x.mul(mult);
        }
        x
    }

    /// Returns self^((p + 1)/4). As p == 3 (mod 4), for a quadratic residue
    /// this is a square root of self; otherwise its square is the *negation*
    /// of self. No residue check is performed here: callers that need
    /// certainty must square the result and compare.
    ///
    /// The base-2^10 digits of (p + 1)/4 are 15 followed by twenty-five
    /// digits drawn from {1023, 1022, 780}, walked the same way as in
    /// [`invert`](Self::invert).
    pub fn sqrt(&self) -> Self {
        let a2 = self.square();
        let a3 = a2.mul(self);
        let a6 = a3.square();
        let a12 = a6.square();
        let a15 = a12.mul(&a3);
        let a30 = a15.square();
        let a60 = a30.square();
        let a120 = a60.square();
        let a240 = a120.square();
        let a255 = a240.mul(&a15);
        let a510 = a255.square();
        let a750 = a510.mul(&a240);
        let a780 = a750.mul(&a30);
        let a1020 = a510.square();
        let a1022 = a1020.mul(&a2);
        let a1023 = a1022.mul(self);

        let mut x = a15;
        for mult in [
            &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023,
            &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023, &a1023,
            &a1023, &a1022, &a1023, &a1023, &a780,
        ] {
            for _ in 0..10 {
                x = x.square();
            }
            x = x.mul(mult);
        }
        x
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ConditionallySelectable for FieldElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self(FieldElementImpl::conditional_select(&(a.0), &(b.0), choice))
    }
}

impl ConstantTimeEq for FieldElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&(other.0))
    }
}

impl PartialEq for FieldElement {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Renders the canonical value as 64 uppercase hex digits, most significant
/// first.
impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in self.to_words().iter().rev() {
            write!(f, "{:016X}", word)?;
        }
        Ok(())
    }
}

impl Add<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn add(self, other: &FieldElement) -> FieldElement {
        FieldElement::add(self, other)
    }
}

impl Add<&FieldElement> for FieldElement {
    type Output = FieldElement;

    fn add(self, other: &FieldElement) -> FieldElement {
        FieldElement::add(&self, other)
    }
}

impl AddAssign<FieldElement> for FieldElement {
    fn add_assign(&mut self, rhs: FieldElement) {
        *self = FieldElement::add(self, &rhs);
    }
}

impl Mul<&FieldElement> for &FieldElement {
    type Output = FieldElement;

    fn mul(self, other: &FieldElement) -> FieldElement {
        FieldElement::mul(self, other)
    }
}

impl Mul<&FieldElement> for FieldElement {
    type Output = FieldElement;

    fn mul(self, other: &FieldElement) -> FieldElement {
        FieldElement::mul(&self, other)
    }
}

impl MulAssign<FieldElement> for FieldElement {
    fn mul_assign(&mut self, rhs: FieldElement) {
        *self = FieldElement::mul(self, &rhs);
    }
}
