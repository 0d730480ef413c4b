//! Pedersen commitments over two fixed, independent generators.
//!
//! A commitment to value `v` with blinding `r` is `v * G + r * H`, where `G`
//! is the group base point and `H` is a nothing-up-my-sleeve generator
//! derived by hashing; no party knows the discrete log of `H` with respect
//! to `G`. Commitments are binding and hiding, and additively homomorphic:
//! `commit(v1, r1) + commit(v2, r2) == commit(v1 + v2, r1 + r2)`.

use crate::curve25519::{Point, Scalar};
use std::sync::LazyLock;

/// Domain-separation tag for all generator derivation in this crate.
///
/// Frozen: changing this label invalidates every previously produced proof.
pub const GENERATOR_TAG: &[u8] = b"confidential generators v1";

/// Number of generator indices reserved for commitment generators.
///
/// The range-proof generator vectors start after this reserved space, so
/// commitment and range-proof generators can never coincide.
pub(crate) const RESERVED_GENERATORS: u64 = 5;

/// The blinding generator `H`, derived from index 0 of the reserved space.
static H: LazyLock<Point> = LazyLock::new(|| Point::hash_to_point_from_index(0, GENERATOR_TAG));

/// Returns the value generator `G` (the group base point).
pub fn value_generator() -> Point {
    Point::generator()
}

/// Returns the blinding generator `H`.
pub fn blinding_generator() -> Point {
    *H
}

/// Commits to `v` with blinding `r`: `v * G + r * H`.
///
/// Constant-time: both `v` and `r` are secret.
pub fn commit(v: &Scalar, r: &Scalar) -> Point {
    Point::double_mul(v, &Point::generator(), r, &H)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_generators_independent() {
        assert_ne!(value_generator(), blinding_generator());
        assert!(!blinding_generator().is_identity());
    }

    #[test]
    fn test_commit_opens() {
        let mut rng = StdRng::seed_from_u64(0);
        let v = Scalar::from_u64(12_345);
        let r = Scalar::random(&mut rng);
        let expected = v * value_generator() + r * blinding_generator();
        assert_eq!(commit(&v, &r), expected);
    }

    #[test]
    fn test_commit_homomorphic() {
        let mut rng = StdRng::seed_from_u64(1);
        let (v1, v2) = (Scalar::from_u64(10), Scalar::from_u64(32));
        let (r1, r2) = (Scalar::random(&mut rng), Scalar::random(&mut rng));
        assert_eq!(
            commit(&v1, &r1) + commit(&v2, &r2),
            commit(&(v1 + v2), &(r1 + r2))
        );
    }

    #[test]
    fn test_commit_zero_zero_is_identity() {
        assert!(commit(&Scalar::ZERO, &Scalar::ZERO).is_identity());
    }
}
