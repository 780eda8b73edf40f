//! A pure-Rust implementation of the secp256k1 field and group arithmetic.

pub(crate) mod affine;
pub(crate) mod field;
pub(crate) mod projective;

#[cfg(test)]
mod dev;

pub use self::{affine::AffinePoint, field::FieldElement, projective::ProjectivePoint};

/// b = 7 in the curve equation y² = x³ + 7, as a single limb for magnitude-
/// cheap scaling.
pub(crate) const CURVE_EQUATION_B_SINGLE: u32 = 7;

/// b = 7 as a field element.
pub(crate) const CURVE_EQUATION_B: FieldElement =
    FieldElement::from_u64(CURVE_EQUATION_B_SINGLE as u64);
