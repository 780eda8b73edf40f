//! Arithmetic core for the secp256k1 (K-256) elliptic curve: the short
//! Weierstrass curve y² = x³ + 7 over the prime field modulo
//! p = 2²⁵⁶ − 2³² − 977.
//!
//! Two layers are provided:
//!
//! - [`FieldElement`]: integers modulo p in a lazily-reduced radix-2⁵² limb
//!   representation, with addition, negation, small-integer scaling,
//!   multiplication, squaring, inversion and square roots (both via fixed
//!   addition chains), parity, equality, and word/hex conversions.
//! - [`AffinePoint`] and [`ProjectivePoint`]: curve points in affine and
//!   Jacobian coordinates, with doubling, addition (including mixed
//!   Jacobian/affine addition), compressed-point decoding, curve membership
//!   checking, negation, and affine conversion.
//!
//! The field layer reduces lazily: values drift up to a bounded multiple of
//! the modulus between reductions, and the bound (the *magnitude*) is part of
//! every operation's contract. Debug builds track magnitudes at runtime and
//! assert the rules; release builds carry only the limbs.
//!
//! The group layer branches on its data (infinity flags, equal
//! x-coordinates) and is **not constant-time**. It targets throughput and
//! correctness; callers handling secret data need a hardened implementation
//! instead.

#![no_std]
#![doc(html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo_small.png")]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

#[cfg(test)]
extern crate std;

pub mod arithmetic;

pub use crate::arithmetic::{AffinePoint, FieldElement, ProjectivePoint};
