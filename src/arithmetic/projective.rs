//! Projective points

#![allow(clippy::op_ref)]

use super::{AffinePoint, FieldElement, CURVE_EQUATION_B, CURVE_EQUATION_B_SINGLE};
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use zeroize::DefaultIsZeroes;

/// A point on the secp256k1 curve in Jacobian projective coordinates: the
/// stored (x, y, z) denotes the affine point (x/z², y/z³). Chained group
/// operations stay inversion-free; a single field inversion is paid when
/// converting back to affine form.
///
/// The point at infinity is represented by the `infinity` flag, and the
/// stored coordinates of such a point are meaningless.
///
/// The group law here takes data-dependent branches (on infinity and on the
/// equal-x cases), matching its classical formulation; it is not
/// constant-time.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
    infinity: bool,
}

impl ProjectivePoint {
    /// Additive identity of the group: the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ONE,
        infinity: true,
    };

    /// Base point of secp256k1.
    pub const GENERATOR: Self = Self {
        x: AffinePoint::GENERATOR.x,
        y: AffinePoint::GENERATOR.y,
        z: FieldElement::ONE,
        infinity: false,
    };

    /// Is this point the point at infinity?
    pub fn is_identity(&self) -> bool {
        self.infinity
    }

    /// Checks whether this is a finite point on the curve:
    ///
    /// ```text
    /// (y/z³)² = (x/z²)³ + 7  ⟺  y² = x³ + 7·z⁶
    /// ```
    ///
    /// The point at infinity is not on the curve in this sense and yields
    /// `false`.
    pub fn is_valid(&self) -> bool {
        if self.infinity {
            return false;
        }
        let y2 = self.y.square();
        let x3 = self.x.square().mul(&self.x);
        let z2 = self.z.square();
        let z6 = z2.square().mul(&z2);
        let rhs = x3.add(&z6.mul_single(CURVE_EQUATION_B_SINGLE));
        bool::from((y2.negate(1) + &rhs).normalizes_to_zero())
    }

    /// Returns the affine representation of this point: the point at infinity
    /// (including any point whose z reduces to zero) maps to the affine
    /// identity, every other point to its unique normalized (X, Y).
    pub fn to_affine(&self) -> AffinePoint {
        if self.infinity || bool::from(self.z.normalizes_to_zero()) {
            return AffinePoint::IDENTITY;
        }
        let zinv = self.z.invert();
        let zinv2 = zinv.square();
        let zinv3 = zinv2.mul(&zinv);
        AffinePoint::new(
            self.x.mul(&zinv2).normalize(),
            self.y.mul(&zinv3).normalize(),
        )
    }

    /// Computes the point with the given x-coordinate and y-parity: y is
    /// recovered as a square root of x³ + 7 and negated if its parity
    /// disagrees with `y_is_odd`. The result has z = 1.
    ///
    /// No curve membership check is performed: when x³ + 7 has no square
    /// root, the recovered y is bogus. Callers decoding untrusted input must
    /// follow up with [`is_valid`](Self::is_valid).
    pub fn decompress(x: &FieldElement, y_is_odd: bool) -> Self {
        let alpha = x.square().mul(x).add(&CURVE_EQUATION_B);
        let beta = alpha.sqrt().normalize();
        let y = if bool::from(beta.is_odd()) == y_is_odd {
            beta
        } else {
            beta.negate(1).normalize()
        };
        Self {
            x: x.normalize(),
            y,
            z: FieldElement::ONE,
            infinity: false,
        }
    }

    /// Doubles this point.
    ///
    /// The comments track each value and its magnitude through the a = 0
    /// Jacobian doubling formula; no intermediate exceeds magnitude 8.
    pub fn double(&self) -> Self {
        if self.infinity || bool::from(self.y.normalizes_to_zero()) {
            // A y of zero would make Z' zero as well; doubling such a
            // (order-2) point yields infinity. The curve has none, but a
            // bogus decompressed point can.
            return Self::IDENTITY;
        }

        let z = self.y.mul(&self.z).mul_single(2); // Z' = 2*Y*Z (2)
        let t1 = self.x.square().mul_single(3); // T1 = 3*X^2 (3)
        let t2 = t1.square(); // T2 = 9*X^4 (1)
        let t3 = self.y.square().mul_single(2); // T3 = 2*Y^2 (2)
        let t4 = t3.square().mul_single(2); // T4 = 8*Y^4 (2)
        let t3 = self.x.mul(&t3); // T3 = 2*X*Y^2 (1)
        let x = t3
            .mul_single(4) // 8*X*Y^2 (4)
            .negate(4) // -8*X*Y^2 (5)
            .add(&t2); // X' = 9*X^4 - 8*X*Y^2 (6)
        let y = t1
            .mul(&t3.mul_single(6).add(&t2.negate(1))) // Y' = 36*X^3*Y^2 - 27*X^6 (1)
            .add(&t4.negate(2)); // Y' = 36*X^3*Y^2 - 27*X^6 - 8*Y^4 (4)

        Self {
            x,
            y,
            z,
            infinity: false,
        }
    }

    /// Returns `self + other` using the classical Jacobian addition formula.
    fn add(&self, other: &Self) -> Self {
        if self.infinity {
            return *other;
        }
        if other.infinity {
            return *self;
        }

        let z22 = other.z.square();
        let z12 = self.z.square();
        let u1 = self.x.mul(&z22);
        let u2 = other.x.mul(&z12);
        let s1 = self.y.mul(&z22).mul(&other.z);
        let s2 = other.y.mul(&z12).mul(&self.z);
        let h = u1.negate(1) + &u2; // U2 - U1 (3)
        let r = s1.negate(1) + &s2; // S2 - S1 (3)

        // The formula degenerates when the x-coordinates coincide: the points
        // are then equal (double) or opposite (infinity).
        if bool::from(h.normalizes_to_zero()) {
            return if bool::from(r.normalizes_to_zero()) {
                self.double()
            } else {
                Self::IDENTITY
            };
        }

        let r2 = r.square();
        let h2 = h.square();
        let h3 = h.mul(&h2);
        let z = self.z.mul(&other.z).mul(&h);
        let t = u1.mul(&h2);
        let x = t
            .double() // 2*T (2)
            .add(&h3) // 2*T + H^3 (3)
            .negate(3) // -2*T - H^3 (4)
            .add(&r2); // X3 = R^2 - H^3 - 2*T (5)
        let y = x
            .negate(5) // -X3 (6)
            .add(&t) // T - X3 (7)
            .mul(&r) // R*(T - X3) (1)
            .add(&h3.mul(&s1).negate(1)); // Y3 = R*(T - X3) - S1*H^3 (3)

        Self {
            x,
            y,
            z,
            infinity: false,
        }
    }

    /// Returns `self + other`, where the second summand is affine (z = 1).
    /// Saves the two squarings and three multiplications that general
    /// addition spends on the second point's z.
    fn add_mixed(&self, other: &AffinePoint) -> Self {
        if self.infinity {
            return Self::from(*other);
        }
        if other.is_identity() {
            return *self;
        }

        let z12 = self.z.square();
        // The stored x and y can carry any magnitude the group formulas left
        // behind; negating them below needs the magnitude-1 bound.
        let u1 = self.x.normalize();
        let u2 = other.x.mul(&z12);
        let s1 = self.y.normalize();
        let s2 = other.y.mul(&z12).mul(&self.z);
        let h = u1.negate(1) + &u2; // U2 - U1 (3)
        let r = s1.negate(1) + &s2; // S2 - S1 (3)

        if bool::from(h.normalizes_to_zero()) {
            return if bool::from(r.normalizes_to_zero()) {
                self.double()
            } else {
                Self::IDENTITY
            };
        }

        let r2 = r.square();
        let h2 = h.square();
        let h3 = h.mul(&h2);
        let z = self.z.mul(&h);
        let t = u1.mul(&h2);
        let x = t.double().add(&h3).negate(3).add(&r2);
        let y = x
            .negate(5)
            .add(&t)
            .mul(&r)
            .add(&h3.mul(&s1).negate(1));

        Self {
            x,
            y,
            z,
            infinity: false,
        }
    }

    /// Returns `-self`.
    fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: self.y.normalize().negate(1),
            z: self.z,
            infinity: self.infinity,
        }
    }

    /// Returns `self - other`.
    fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Returns `self - other`.
    fn sub_mixed(&self, other: &AffinePoint) -> Self {
        self.add_mixed(&(-*other))
    }
}

impl From<AffinePoint> for ProjectivePoint {
    fn from(p: AffinePoint) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: FieldElement::ONE,
            infinity: p.is_identity(),
        }
    }
}

impl From<&AffinePoint> for ProjectivePoint {
    fn from(p: &AffinePoint) -> Self {
        Self::from(*p)
    }
}

impl From<ProjectivePoint> for AffinePoint {
    fn from(p: ProjectivePoint) -> AffinePoint {
        p.to_affine()
    }
}

impl From<&ProjectivePoint> for AffinePoint {
    fn from(p: &ProjectivePoint) -> AffinePoint {
        p.to_affine()
    }
}

impl PartialEq for ProjectivePoint {
    fn eq(&self, other: &Self) -> bool {
        if self.infinity || other.infinity {
            return self.infinity == other.infinity;
        }
        // Cross-multiply by the opposing z to compare the affine values
        // without inverting:
        //   x₁/z₁² = x₂/z₂²  ⟺  x₁·z₂² = x₂·z₁²,  likewise for y with cubes.
        let z12 = self.z.square();
        let z22 = other.z.square();
        let lhs_x = self.x.mul(&z22);
        let rhs_x = other.x.mul(&z12);
        let lhs_y = self.y.mul(&z22).mul(&other.z);
        let rhs_y = other.y.mul(&z12).mul(&self.z);
        bool::from(
            (lhs_x.negate(1) + &rhs_x).normalizes_to_zero()
                & (lhs_y.negate(1) + &rhs_y).normalizes_to_zero(),
        )
    }
}

impl Eq for ProjectivePoint {}

impl Default for ProjectivePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DefaultIsZeroes for ProjectivePoint {}

impl Add<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(self, other)
    }
}

impl Add<ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, &other)
    }
}

impl Add<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, other)
    }
}

impl AddAssign<ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::add(self, &rhs);
    }
}

impl AddAssign<&ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::add(self, rhs);
    }
}

impl Add<AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(&self, &other)
    }
}

impl Add<&AffinePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(self, other)
    }
}

impl Add<&AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(&self, other)
    }
}

impl AddAssign<AffinePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: AffinePoint) {
        *self = ProjectivePoint::add_mixed(self, &rhs);
    }
}

impl AddAssign<&AffinePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &AffinePoint) {
        *self = ProjectivePoint::add_mixed(self, rhs);
    }
}

impl Sub<ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(&self, &other)
    }
}

impl Sub<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(self, other)
    }
}

impl Sub<&ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::sub(&self, other)
    }
}

impl SubAssign<ProjectivePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: ProjectivePoint) {
        *self = ProjectivePoint::sub(self, &rhs);
    }
}

impl SubAssign<&ProjectivePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::sub(self, rhs);
    }
}

impl Sub<AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(&self, &other)
    }
}

impl Sub<&AffinePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(self, other)
    }
}

impl Sub<&AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, other: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::sub_mixed(&self, other)
    }
}

impl SubAssign<AffinePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: AffinePoint) {
        *self = ProjectivePoint::sub_mixed(self, &rhs);
    }
}

impl SubAssign<&AffinePoint> for ProjectivePoint {
    fn sub_assign(&mut self, rhs: &AffinePoint) {
        *self = ProjectivePoint::sub_mixed(self, rhs);
    }
}

impl Neg for ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(&self)
    }
}

impl<'a> Neg for &'a ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{AffinePoint, FieldElement, ProjectivePoint};

    /// x-coordinates of two known curve points with even y (decoding them
    /// with `y_is_odd = false` must succeed).
    const P1_X: &str = "8B30BBE9AE2A990696B22F670709DFF3727FD8BC04D3362C6C7BF458E2846004";
    const P2_X: &str = "A357AE915C4A65281309EDF20504740F1EB3333990216B4F81063CB65F2F7E0F";

    fn decode(x_hex: &str) -> ProjectivePoint {
        let x = FieldElement::from_hex(x_hex).unwrap();
        ProjectivePoint::decompress(&x, false)
    }

    #[test]
    fn decompressed_points_are_valid() {
        let p1 = decode(P1_X);
        let p2 = decode(P2_X);
        assert!(p1.is_valid());
        assert!(p2.is_valid());
        assert!(!bool::from(p1.to_affine().y().is_odd()));
        assert!(!bool::from(p2.to_affine().y().is_odd()));
    }

    #[test]
    fn decompress_honors_parity() {
        let gx = AffinePoint::GENERATOR.x().normalize();
        let even = ProjectivePoint::decompress(&gx, false);
        let odd = ProjectivePoint::decompress(&gx, true);
        assert_eq!(even, ProjectivePoint::GENERATOR);
        assert_eq!(odd, -ProjectivePoint::GENERATOR);
        assert!(even.is_valid());
        assert!(odd.is_valid());
    }

    #[test]
    fn compressed_round_trip() {
        let p = ProjectivePoint::GENERATOR.double();
        let affine = p.to_affine();
        let x = affine.x();
        let y_is_odd = bool::from(affine.y().is_odd());
        let decoded = ProjectivePoint::decompress(&x, y_is_odd);
        assert!(decoded.is_valid());
        assert_eq!(decoded, p);
    }

    #[test]
    fn affine_round_trip_is_stable() {
        let p2 = decode(P2_X);
        let p2_affine = p2.to_affine();
        let again = ProjectivePoint::from(p2_affine).to_affine();
        assert_eq!(again, p2_affine);
    }

    #[test]
    fn affine_to_projective() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(ProjectivePoint::from(basepoint_affine), basepoint_projective);
        assert_eq!(basepoint_projective.to_affine(), basepoint_affine);
        assert!(!basepoint_projective.to_affine().is_identity());

        assert!(ProjectivePoint::IDENTITY.to_affine().is_identity());
    }

    #[test]
    fn projective_identity_addition() {
        let identity = ProjectivePoint::IDENTITY;
        let generator = ProjectivePoint::GENERATOR;

        assert_eq!(identity + &generator, generator);
        assert_eq!(generator + &identity, generator);
    }

    #[test]
    fn projective_mixed_addition() {
        let identity = ProjectivePoint::IDENTITY;
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(identity + &basepoint_affine, basepoint_projective);
        assert_eq!(
            basepoint_projective + &basepoint_affine,
            basepoint_projective + &basepoint_projective
        );
        assert_eq!(
            basepoint_projective + &AffinePoint::IDENTITY,
            basepoint_projective
        );
    }

    #[test]
    fn projective_add_vs_double() {
        let generator = ProjectivePoint::GENERATOR;

        let r1 = generator + &generator;
        let r2 = generator.double();
        assert_eq!(r1, r2);
        assert!(r2.is_valid());

        let r1 = (generator + &generator) + &(generator + &generator);
        let r2 = generator.double().double();
        assert_eq!(r1, r2);
    }

    #[test]
    fn add_vs_double_on_decoded_point() {
        let p1 = decode(P1_X);
        let via_add = p1 + &p1;
        let via_double = p1.double();
        assert_eq!(via_add, via_double);
        assert!(via_double.is_valid());
    }

    #[test]
    fn mixed_and_general_addition_agree() {
        let p1 = decode(P1_X);
        let p2 = decode(P2_X);
        let p2_affine = p2.to_affine();

        let q = p1 + &p2_affine;
        let q_general = p1 + &p2;
        assert_eq!(q, q_general);
        assert!(q.is_valid());
        assert_eq!(q.to_affine(), q_general.to_affine());
    }

    #[test]
    fn addition_is_commutative() {
        let p1 = decode(P1_X);
        let p2 = decode(P2_X);
        assert_eq!(p1 + &p2, p2 + &p1);
    }

    #[test]
    fn addition_is_associative() {
        let p = decode(P1_X);
        let q = decode(P2_X);
        let r = ProjectivePoint::GENERATOR;

        let lhs = (p + &q) + &r;
        let rhs = p + &(q + &r);
        assert_eq!(lhs, rhs);
        assert!(lhs.is_valid());
    }

    #[test]
    fn adding_the_negation_gives_identity() {
        let p = decode(P1_X);
        assert!((p + &(-p)).is_identity());
        assert!((p + &(-p).to_affine()).is_identity());
    }

    #[test]
    fn projective_add_and_sub() {
        let basepoint_affine = AffinePoint::GENERATOR;
        let basepoint_projective = ProjectivePoint::GENERATOR;

        assert_eq!(
            (basepoint_projective + &basepoint_projective) - &basepoint_projective,
            basepoint_projective
        );
        assert_eq!(
            (basepoint_projective + &basepoint_affine) - &basepoint_affine,
            basepoint_projective
        );
    }

    #[test]
    fn projective_double_and_sub() {
        let generator = ProjectivePoint::GENERATOR;
        assert_eq!(generator.double() - &generator, generator);
    }

    #[test]
    fn double_of_identity_is_identity() {
        assert!(ProjectivePoint::IDENTITY.double().is_identity());
    }

    #[test]
    fn identity_is_not_valid() {
        assert!(!ProjectivePoint::IDENTITY.is_valid());
    }

    #[test]
    fn validity_is_preserved_by_the_group_law() {
        let mut p = decode(P1_X);
        let q = decode(P2_X).to_affine();
        for _ in 0..16 {
            p += &q;
            assert!(p.is_valid() || p.is_identity());
            p = p.double();
            assert!(p.is_valid() || p.is_identity());
        }
    }

    #[test]
    fn projective_equality() {
        assert_ne!(ProjectivePoint::GENERATOR, ProjectivePoint::IDENTITY);
        assert_ne!(ProjectivePoint::IDENTITY, ProjectivePoint::GENERATOR);
        assert_eq!(ProjectivePoint::IDENTITY, ProjectivePoint::IDENTITY);
        assert_eq!(-ProjectivePoint::IDENTITY, ProjectivePoint::IDENTITY);
        assert_eq!(ProjectivePoint::GENERATOR, ProjectivePoint::GENERATOR);
        assert_ne!(ProjectivePoint::GENERATOR, -ProjectivePoint::GENERATOR);

        // Same point under different z coordinates
        let doubled = ProjectivePoint::GENERATOR.double();
        assert_eq!(doubled, ProjectivePoint::from(doubled.to_affine()));
    }
}
