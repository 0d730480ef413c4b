//! Group operations over the Curve25519 scalar field and the prime-order
//! subgroup of the Ed25519 Edwards curve.

use crate::codec::{Error, FixedSize, Read, Write};
use bytes::{Buf, BufMut};
use curve25519_dalek::{
    constants::ED25519_BASEPOINT_POINT,
    edwards::{CompressedEdwardsY, EdwardsPoint},
    scalar::Scalar as DalekScalar,
    traits::{Identity, IsIdentity, MultiscalarMul, VartimeMultiscalarMul},
};
use rand_core::CryptoRngCore;
use sha3::{Digest, Keccak256};
use std::{
    fmt::{Debug, Display},
    ops::{Add, AddAssign, Mul, Neg, Sub},
};
use zeroize::Zeroize;

/// Number of bytes in the canonical little-endian encoding of a scalar.
const SCALAR_LENGTH: usize = 32;

/// Number of bytes in the compressed Edwards-Y encoding of a point.
const POINT_LENGTH: usize = 32;

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// An element of the scalar field `Z/lZ`, where
/// `l = 2^252 + 27742317777372353535851937790883648493` is the order of the
/// prime-order subgroup.
///
/// Values are always canonical (reduced mod `l`); decoding rejects any byte
/// string that is not. Equality is constant-time.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Scalar(DalekScalar);

impl Scalar {
    /// The additive identity.
    pub const ZERO: Self = Self(DalekScalar::ZERO);

    /// The multiplicative identity.
    pub const ONE: Self = Self(DalekScalar::ONE);

    /// Constructs a scalar from an unsigned integer.
    pub fn from_u64(v: u64) -> Self {
        Self(DalekScalar::from(v))
    }

    /// Returns the low 64 bits of the canonical encoding.
    pub fn to_u64(&self) -> u64 {
        let bytes = self.0.to_bytes();
        let mut low = [0u8; 8];
        low.copy_from_slice(&bytes[..8]);
        u64::from_le_bytes(low)
    }

    /// Generates a uniformly random scalar from the provided RNG.
    pub fn random<R: CryptoRngCore>(rng: &mut R) -> Self {
        Self(DalekScalar::random(rng))
    }

    /// Maps arbitrary bytes to a scalar (Keccak-256, reduced mod `l`).
    ///
    /// Deterministic; used for every Fiat–Shamir challenge in this crate.
    pub fn hash_to_scalar(data: &[u8]) -> Self {
        let digest: [u8; 32] = Keccak256::digest(data).into();
        Self(DalekScalar::from_bytes_mod_order(digest))
    }

    /// Computes `self * b + c`.
    pub fn mul_add(&self, b: &Self, c: &Self) -> Self {
        Self(self.0 * b.0 + c.0)
    }

    /// Computes the multiplicative inverse.
    ///
    /// The exponent is fixed, so the operation is constant-time. The inverse
    /// of zero is zero.
    pub fn invert(&self) -> Self {
        Self(self.0.invert())
    }

    /// Raises `self` to a small public exponent by square-and-multiply.
    ///
    /// The exponent must not be secret: the multiply schedule depends on its
    /// bits.
    pub fn exp(&self, e: u64) -> Self {
        let mut result = DalekScalar::ONE;
        for i in (0..64).rev() {
            result = result * result;
            if (e >> i) & 1 == 1 {
                result *= self.0;
            }
        }
        Self(result)
    }

    /// Returns the canonical little-endian encoding.
    pub fn to_bytes(&self) -> [u8; SCALAR_LENGTH] {
        self.0.to_bytes()
    }
}

impl Add for Scalar {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Scalar {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Scalar {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul for Scalar {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl Neg for Scalar {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Write for Scalar {
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.0.to_bytes());
    }
}

impl Read for Scalar {
    fn read(buf: &mut impl Buf) -> Result<Self, Error> {
        let bytes = <[u8; SCALAR_LENGTH]>::read(buf)?;
        let scalar: Option<DalekScalar> = DalekScalar::from_canonical_bytes(bytes).into();
        scalar
            .map(Self)
            .ok_or(Error::Invalid("Scalar", "Non-canonical"))
    }
}

impl FixedSize for Scalar {
    const SIZE: usize = SCALAR_LENGTH;
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Debug for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0.to_bytes()))
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0.to_bytes()))
    }
}

/// An element of the prime-order subgroup of the Ed25519 Edwards curve.
///
/// Points are encoded as 32-byte compressed Edwards-Y. Decoding rejects byte
/// strings that fail decompression or carry a torsion component. Equality is
/// constant-time.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Point(EdwardsPoint);

impl Point {
    /// Returns the group identity.
    pub fn identity() -> Self {
        Self(EdwardsPoint::identity())
    }

    /// Returns the fixed group base point.
    pub fn generator() -> Self {
        Self(ED25519_BASEPOINT_POINT)
    }

    /// Multiplies the fixed base point by a scalar (precomputed tables,
    /// constant-time).
    pub fn mul_base(s: &Scalar) -> Self {
        Self(EdwardsPoint::mul_base(&s.0))
    }

    /// Computes `a * A + b * B` in constant time.
    pub fn double_mul(a: &Scalar, va: &Self, b: &Scalar, vb: &Self) -> Self {
        Self(EdwardsPoint::multiscalar_mul([&a.0, &b.0], [&va.0, &vb.0]))
    }

    /// Computes `a * A + b * B` in variable time. Verifier-only.
    pub fn double_mul_vartime(a: &Scalar, va: &Self, b: &Scalar, vb: &Self) -> Self {
        Self(EdwardsPoint::vartime_multiscalar_mul(
            [&a.0, &b.0],
            [&va.0, &vb.0],
        ))
    }

    /// Computes `sum(scalars[i] * points[i])` in constant time.
    ///
    /// Uses the backend's Straus algorithm: radix-16 signed digits against
    /// precomputed multiples, selected with conditional moves. This is the
    /// hot path of both protocols; collapsing a verification equation into
    /// one call here is what makes the batched verifiers worthwhile.
    pub fn msm(scalars: &[Scalar], points: &[Self]) -> Self {
        assert_eq!(scalars.len(), points.len(), "msm length mismatch");
        Self(EdwardsPoint::multiscalar_mul(
            scalars.iter().map(|s| &s.0),
            points.iter().map(|p| &p.0),
        ))
    }

    /// Computes `sum(scalars[i] * points[i])` in variable time. Verifier-only.
    pub fn msm_vartime(scalars: &[Scalar], points: &[Self]) -> Self {
        assert_eq!(scalars.len(), points.len(), "msm length mismatch");
        Self(EdwardsPoint::vartime_multiscalar_mul(
            scalars.iter().map(|s| &s.0),
            points.iter().map(|p| &p.0),
        ))
    }

    /// Maps arbitrary bytes to a point of the prime-order subgroup.
    ///
    /// Keccak-256 the input and interpret the digest as a compressed point;
    /// on decompression failure, re-hash and retry. The decompressed point
    /// is multiplied by the cofactor to clear torsion, and identity results
    /// are rejected (re-hashed). Deterministic.
    pub fn hash_to_point(data: &[u8]) -> Self {
        let mut candidate: [u8; 32] = Keccak256::digest(data).into();
        loop {
            if let Some(point) = CompressedEdwardsY(candidate).decompress() {
                let point = point.mul_by_cofactor();
                if !point.is_identity() {
                    return Self(point);
                }
            }
            candidate = Keccak256::digest(candidate).into();
        }
    }

    /// Derives the generator at `index` under a fixed domain-separation tag.
    pub fn hash_to_point_from_index(index: u64, tag: &[u8]) -> Self {
        let mut data = Vec::with_capacity(tag.len() + 8);
        data.extend_from_slice(tag);
        data.extend_from_slice(&index.to_le_bytes());
        Self::hash_to_point(&data)
    }

    /// Returns whether this is the group identity.
    pub fn is_identity(&self) -> bool {
        self.0.is_identity()
    }

    /// Returns the compressed Edwards-Y encoding.
    pub fn to_bytes(&self) -> [u8; POINT_LENGTH] {
        self.0.compress().to_bytes()
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    fn mul(self, rhs: Point) -> Point {
        Point(self.0 * rhs.0)
    }
}

impl Write for Point {
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(&self.0.compress().to_bytes());
    }
}

impl Read for Point {
    fn read(buf: &mut impl Buf) -> Result<Self, Error> {
        let bytes = <[u8; POINT_LENGTH]>::read(buf)?;
        let point = CompressedEdwardsY(bytes)
            .decompress()
            .ok_or(Error::Invalid("Point", "Not on curve"))?;
        if !point.is_torsion_free() {
            return Err(Error::Invalid("Point", "Outside prime-order subgroup"));
        }
        Ok(Self(point))
    }
}

impl FixedSize for Point {
    const SIZE: usize = POINT_LENGTH;
}

impl Zeroize for Point {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0.compress().to_bytes()))
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex(&self.0.compress().to_bytes()))
    }
}
