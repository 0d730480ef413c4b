//! Scalar-vector algebra for the range proof and inner-product argument.

use super::Error;
use crate::curve25519::{Point, Scalar};

/// Pads a value count to the nearest power of two (1 and 2 map to
/// themselves).
pub(crate) fn pad(k: usize) -> usize {
    k.next_power_of_two()
}

/// Adds two vectors elementwise.
pub(crate) fn add(a: &[Scalar], b: &[Scalar]) -> Result<Vec<Scalar>, Error> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch);
    }
    Ok(a.iter().zip(b).map(|(x, y)| *x + *y).collect())
}

/// Multiplies two vectors elementwise.
pub(crate) fn hadamard(a: &[Scalar], b: &[Scalar]) -> Result<Vec<Scalar>, Error> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch);
    }
    Ok(a.iter().zip(b).map(|(x, y)| *x * *y).collect())
}

/// Computes `sum(a_i * b_i) mod l`.
pub(crate) fn inner_product(a: &[Scalar], b: &[Scalar]) -> Result<Scalar, Error> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch);
    }
    Ok(a.iter()
        .zip(b)
        .fold(Scalar::ZERO, |acc, (x, y)| x.mul_add(y, &acc)))
}

/// Adds a scalar to every element.
pub(crate) fn add_scalar(v: &[Scalar], s: &Scalar) -> Vec<Scalar> {
    v.iter().map(|x| *x + *s).collect()
}

/// Multiplies every element by a scalar.
pub(crate) fn mul_scalar(v: &[Scalar], s: &Scalar) -> Vec<Scalar> {
    v.iter().map(|x| *x * *s).collect()
}

/// Returns `[1, base, base^2, .., base^(n-1)]`.
pub(crate) fn power_vector(base: &Scalar, n: usize) -> Vec<Scalar> {
    let mut out = Vec::with_capacity(n);
    let mut acc = Scalar::ONE;
    for _ in 0..n {
        out.push(acc);
        acc = acc * *base;
    }
    out
}

/// Returns the sum of all elements.
pub(crate) fn sum(v: &[Scalar]) -> Scalar {
    v.iter().fold(Scalar::ZERO, |acc, x| acc + *x)
}

/// Decomposes a value into `n` little-endian bit scalars.
pub(crate) fn bits_le(value: u64, n: usize) -> Vec<Scalar> {
    (0..n)
        .map(|i| {
            if i < 64 {
                Scalar::from_u64((value >> i) & 1)
            } else {
                Scalar::ZERO
            }
        })
        .collect()
}

/// Commits to two vectors against two generator vectors:
/// `sum(a_i * g_i) + sum(b_i * h_i)`, as one constant-time multiscalar
/// multiplication. Prover-side (the vectors are secret).
pub(crate) fn encode(
    a: &[Scalar],
    b: &[Scalar],
    g: &[Point],
    h: &[Point],
) -> Result<Point, Error> {
    if a.len() != b.len() || g.len() != a.len() || h.len() != g.len() {
        return Err(Error::LengthMismatch);
    }
    let scalars: Vec<Scalar> = a.iter().chain(b).copied().collect();
    let points: Vec<Point> = g.iter().chain(h).copied().collect();
    Ok(Point::msm(&scalars, &points))
}

/// Variable-time [encode]. Verifier-side only (public data).
pub(crate) fn encode_vartime(
    a: &[Scalar],
    b: &[Scalar],
    g: &[Point],
    h: &[Point],
) -> Result<Point, Error> {
    if a.len() != b.len() || g.len() != a.len() || h.len() != g.len() {
        return Err(Error::LengthMismatch);
    }
    let scalars: Vec<Scalar> = a.iter().chain(b).copied().collect();
    let points: Vec<Point> = g.iter().chain(h).copied().collect();
    Ok(Point::msm_vartime(&scalars, &points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_pad() {
        assert_eq!(pad(1), 1);
        assert_eq!(pad(2), 2);
        assert_eq!(pad(3), 4);
        assert_eq!(pad(4), 4);
        assert_eq!(pad(5), 8);
        assert_eq!(pad(7), 8);
        assert_eq!(pad(9), 16);
        assert_eq!(pad(17), 32);
    }

    #[test]
    fn test_inner_product_matches_integers() {
        let a: Vec<Scalar> = [1u64, 2, 3, 4].iter().map(|v| Scalar::from_u64(*v)).collect();
        let b: Vec<Scalar> = [5u64, 6, 7, 8].iter().map(|v| Scalar::from_u64(*v)).collect();
        let expected = 1 * 5 + 2 * 6 + 3 * 7 + 4 * 8;
        assert_eq!(inner_product(&a, &b).unwrap().to_u64(), expected);
        assert!(matches!(
            inner_product(&a, &b[..3]),
            Err(Error::LengthMismatch)
        ));
    }

    #[test]
    fn test_power_vector() {
        let x = Scalar::from_u64(3);
        let powers = power_vector(&x, 5);
        for (i, p) in powers.iter().enumerate() {
            assert_eq!(*p, x.exp(i as u64));
        }
        assert_eq!(powers[0], Scalar::ONE);
    }

    #[test]
    fn test_bits_le_recomposes() {
        for value in [0u64, 1, 0b1011, 1 << 63, u64::MAX] {
            let bits = bits_le(value, 64);
            let two = Scalar::from_u64(2);
            let recomposed = inner_product(&bits, &power_vector(&two, 64)).unwrap();
            assert_eq!(recomposed, Scalar::from_u64(value));
        }
    }

    #[test]
    fn test_hadamard_and_add() {
        let a: Vec<Scalar> = [2u64, 3].iter().map(|v| Scalar::from_u64(*v)).collect();
        let b: Vec<Scalar> = [5u64, 7].iter().map(|v| Scalar::from_u64(*v)).collect();
        let prod = hadamard(&a, &b).unwrap();
        assert_eq!(prod[0].to_u64(), 10);
        assert_eq!(prod[1].to_u64(), 21);
        let total = add(&a, &b).unwrap();
        assert_eq!(total[0].to_u64(), 7);
        assert_eq!(total[1].to_u64(), 10);
        assert_eq!(sum(&total).to_u64(), 17);
    }

    #[test]
    fn test_encode_matches_naive() {
        let mut rng = StdRng::seed_from_u64(7);
        let a: Vec<Scalar> = (0..8).map(|_| Scalar::random(&mut rng)).collect();
        let b: Vec<Scalar> = (0..8).map(|_| Scalar::random(&mut rng)).collect();
        let g: Vec<Point> = (0..8)
            .map(|_| Point::mul_base(&Scalar::random(&mut rng)))
            .collect();
        let h: Vec<Point> = (0..8)
            .map(|_| Point::mul_base(&Scalar::random(&mut rng)))
            .collect();

        let mut naive = Point::identity();
        for i in 0..8 {
            naive += a[i] * g[i] + b[i] * h[i];
        }
        assert_eq!(encode(&a, &b, &g, &h).unwrap(), naive);
        assert_eq!(encode_vartime(&a, &b, &g, &h).unwrap(), naive);
    }
}
