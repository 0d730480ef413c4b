//! Recursive inner-product argument.
//!
//! An argument of knowledge that the prover knows vectors `a`, `b` opening
//! the commitment `P = sum(a_i * g_i) + sum(b_i * h_i) + <a, b> * u`. Each
//! round halves the vectors, emitting one `(L, R)` pair, so the proof is
//! `2 * log2(n)` points plus two final scalars.
//!
//! Two verifiers are provided: [InnerProductProof::verify] mirrors the
//! prover's folding (`O(n log n)` point work), while
//! [InnerProductProof::verify_fast] derives all challenges up front and
//! collapses the check into two multiscalar multiplications (`O(n)`).

use super::{params::GeneratorView, vector, Error, MAX_AGGREGATION, RANGE_BITS};
use crate::{
    codec::{self, EncodeSize, FixedSize, Read, Write},
    curve25519::{Point, Scalar},
    transcript::Transcript,
};
use bytes::{Buf, BufMut};

/// Upper bound on folding rounds, set by the largest generator table.
const MAX_ROUNDS: usize = (RANGE_BITS * MAX_AGGREGATION).ilog2() as usize;

/// Derives the round challenge `x = chal(seed, P, L, R)`.
fn round_challenge(seed: &[u8; 32], p: &Point, l: &Point, r: &Point) -> Scalar {
    let mut transcript = Transcript::new(seed);
    transcript
        .append(&p.to_bytes())
        .append(&l.to_bytes())
        .append(&r.to_bytes());
    transcript.challenge()
}

/// The witness: two vectors and their commitment.
pub struct InnerProductWitness {
    a: Vec<Scalar>,
    b: Vec<Scalar>,
    p: Point,
}

impl InnerProductWitness {
    /// Builds a witness over the provided generators, committing
    /// `P = sum(a_i * g_i) + sum(b_i * h_i) + <a, b> * u`.
    ///
    /// The vectors must be non-empty, of equal power-of-two length, and
    /// match the generator view.
    pub fn new(a: Vec<Scalar>, b: Vec<Scalar>, gens: &GeneratorView) -> Result<Self, Error> {
        if a.is_empty() {
            return Err(Error::Empty);
        }
        if a.len() != b.len() || a.len() != gens.g.len() {
            return Err(Error::LengthMismatch);
        }
        if !a.len().is_power_of_two() {
            return Err(Error::NotPowerOfTwo);
        }
        let c = vector::inner_product(&a, &b)?;
        let p = vector::encode(&a, &b, gens.g, gens.h)? + c * gens.u;
        Ok(Self { a, b, p })
    }

    /// Returns the committed statement point `P`.
    pub fn statement(&self) -> Point {
        self.p
    }

    /// Produces the argument.
    ///
    /// Constant-time in the witness vectors; the generator folds operate on
    /// public data but reuse the same constant-time primitives.
    pub fn prove(&self, gens: &GeneratorView) -> Result<InnerProductProof, Error> {
        if self.a.len() != gens.g.len() {
            return Err(Error::LengthMismatch);
        }

        let mut a = self.a.clone();
        let mut b = self.b.clone();
        let mut g = gens.g.to_vec();
        let mut h = gens.h.to_vec();
        let mut p = self.p;
        let mut n = a.len();

        let mut l_points = Vec::new();
        let mut r_points = Vec::new();

        while n > 1 {
            let half = n / 2;

            let c_l = vector::inner_product(&a[..half], &b[half..n])?;
            let c_r = vector::inner_product(&a[half..n], &b[..half])?;

            let l = vector::encode(&a[..half], &b[half..n], &g[half..n], &h[..half])?
                + c_l * gens.u;
            let r = vector::encode(&a[half..n], &b[..half], &g[..half], &h[half..n])?
                + c_r * gens.u;
            l_points.push(l);
            r_points.push(r);

            let x = round_challenge(&gens.seed, &p, &l, &r);
            let x_inv = x.invert();
            let x_sq = x * x;
            let x_inv_sq = x_inv * x_inv;

            for i in 0..half {
                g[i] = Point::double_mul(&x_inv, &g[i], &x, &g[i + half]);
                h[i] = Point::double_mul(&x, &h[i], &x_inv, &h[i + half]);
                a[i] = x.mul_add(&a[i], &(x_inv * a[i + half]));
                b[i] = x_inv.mul_add(&b[i], &(x * b[i + half]));
            }
            p = Point::double_mul(&x_sq, &l, &x_inv_sq, &r) + p;
            n = half;
        }

        Ok(InnerProductProof {
            l: l_points,
            r: r_points,
            a: a[0],
            b: b[0],
            p: self.p,
        })
    }
}

/// A logarithmic-size inner-product argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerProductProof {
    l: Vec<Point>,
    r: Vec<Point>,
    a: Scalar,
    b: Scalar,
    p: Point,
}

impl InnerProductProof {
    /// Returns the committed statement point `P`.
    pub fn statement(&self) -> Point {
        self.p
    }

    fn check_shape(&self, gens: &GeneratorView) -> Result<(), Error> {
        let n = gens.g.len();
        if n == 0 || !n.is_power_of_two() {
            return Err(Error::NotPowerOfTwo);
        }
        if self.l.len() != self.r.len() || self.l.len() != n.ilog2() as usize {
            return Err(Error::LengthMismatch);
        }
        Ok(())
    }

    /// Verifies by mirroring the prover's folding, reconstructing `g'`,
    /// `h'`, and `P'` round by round.
    pub fn verify(&self, gens: &GeneratorView) -> Result<(), Error> {
        self.check_shape(gens)?;

        let mut g = gens.g.to_vec();
        let mut h = gens.h.to_vec();
        let mut p = self.p;
        let mut n = g.len();

        for (l, r) in self.l.iter().zip(&self.r) {
            let half = n / 2;

            let x = round_challenge(&gens.seed, &p, l, r);
            let x_inv = x.invert();
            let x_sq = x * x;
            let x_inv_sq = x_inv * x_inv;

            for i in 0..half {
                g[i] = Point::double_mul_vartime(&x_inv, &g[i], &x, &g[i + half]);
                h[i] = Point::double_mul_vartime(&x, &h[i], &x_inv, &h[i + half]);
            }
            p = Point::double_mul_vartime(&x_sq, l, &x_inv_sq, r) + p;
            n = half;
        }

        let c = self.a * self.b;
        let expected = Point::double_mul_vartime(&self.a, &g[0], &self.b, &h[0]) + c * gens.u;
        if expected != p {
            return Err(Error::InnerProduct);
        }
        Ok(())
    }

    /// Verifies with all challenges derived up front and the folded
    /// generator exponents collapsed into the coefficient vectors `s` and
    /// `s^(-1)`, so each side of the check is a single multiscalar
    /// multiplication.
    pub fn verify_fast(&self, gens: &GeneratorView) -> Result<(), Error> {
        self.check_shape(gens)?;

        let n = gens.g.len();
        let rounds = self.l.len();

        let mut s = vec![Scalar::ONE; n];
        let mut s_inv = vec![Scalar::ONE; n];
        let mut x_sq = Vec::with_capacity(rounds);
        let mut x_inv_sq = Vec::with_capacity(rounds);

        let mut p = self.p;
        for (i, (l, r)) in self.l.iter().zip(&self.r).enumerate() {
            let x = round_challenge(&gens.seed, &p, l, r);
            let x_inv = x.invert();

            // s_j gains x when the i-th most-significant bit of j is set,
            // x^(-1) otherwise; s_inv_j is the mirror image.
            let bit = 1usize << (rounds - i - 1);
            for j in 0..n {
                if j & bit != 0 {
                    s[j] = s[j] * x;
                    s_inv[j] = s_inv[j] * x_inv;
                } else {
                    s[j] = s[j] * x_inv;
                    s_inv[j] = s_inv[j] * x;
                }
            }

            let xs = x * x;
            let xis = x_inv * x_inv;
            p = Point::double_mul_vartime(&xs, l, &xis, r) + p;
            x_sq.push(xs);
            x_inv_sq.push(xis);
        }

        // sum(a * s_j * g_j) + sum(b * s_inv_j * h_j) + a * b * u
        let mut rhs_scalars = Vec::with_capacity(2 * n + 1);
        rhs_scalars.extend(s.iter().map(|sj| self.a * *sj));
        rhs_scalars.extend(s_inv.iter().map(|sj| self.b * *sj));
        rhs_scalars.push(self.a * self.b);
        let mut rhs_points = Vec::with_capacity(2 * n + 1);
        rhs_points.extend_from_slice(gens.g);
        rhs_points.extend_from_slice(gens.h);
        rhs_points.push(gens.u);
        let rhs = Point::msm_vartime(&rhs_scalars, &rhs_points);

        // P + sum(x_i^2 * L_i) + sum(x_i^(-2) * R_i)
        let mut lhs_scalars = x_sq;
        lhs_scalars.extend_from_slice(&x_inv_sq);
        let mut lhs_points = self.l.clone();
        lhs_points.extend_from_slice(&self.r);
        let lhs = Point::msm_vartime(&lhs_scalars, &lhs_points) + self.p;

        if lhs != rhs {
            return Err(Error::InnerProduct);
        }
        Ok(())
    }
}

impl Write for InnerProductProof {
    fn write(&self, buf: &mut impl BufMut) {
        (self.l.len() as u8).write(buf);
        for l in &self.l {
            l.write(buf);
        }
        for r in &self.r {
            r.write(buf);
        }
        self.a.write(buf);
        self.b.write(buf);
        self.p.write(buf);
    }
}

impl EncodeSize for InnerProductProof {
    fn encode_size(&self) -> usize {
        u8::SIZE + 2 * self.l.len() * Point::SIZE + 2 * Scalar::SIZE + Point::SIZE
    }
}

impl Read for InnerProductProof {
    fn read(buf: &mut impl Buf) -> Result<Self, codec::Error> {
        let rounds = u8::read(buf)? as usize;
        if rounds > MAX_ROUNDS {
            return Err(codec::Error::InvalidLength(rounds));
        }
        let mut l = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            l.push(Point::read(buf)?);
        }
        let mut r = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            r.push(Point::read(buf)?);
        }
        let a = Scalar::read(buf)?;
        let b = Scalar::read(buf)?;
        let p = Point::read(buf)?;
        Ok(Self { l, r, a, b, p })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bulletproofs::params,
        codec::{Decode, Encode},
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn random_view(n: usize, seed: u64) -> (Vec<Point>, Vec<Point>, Point) {
        let mut rng = StdRng::seed_from_u64(seed);
        let g = (0..n)
            .map(|_| Point::mul_base(&Scalar::random(&mut rng)))
            .collect();
        let h = (0..n)
            .map(|_| Point::mul_base(&Scalar::random(&mut rng)))
            .collect();
        let u = Point::mul_base(&Scalar::random(&mut rng));
        (g, h, u)
    }

    #[test]
    fn test_all_ones_length_64() {
        let gens = params().view(1).unwrap();
        let ones = vec![Scalar::ONE; 64];
        let witness = InnerProductWitness::new(ones.clone(), ones, &gens).unwrap();
        assert_eq!(
            vector::inner_product(&witness.a, &witness.b).unwrap(),
            Scalar::from_u64(64)
        );

        let proof = witness.prove(&gens).unwrap();
        assert!(proof.verify(&gens).is_ok());
        assert!(proof.verify_fast(&gens).is_ok());
    }

    #[test]
    fn test_random_vectors_both_verifiers_agree() {
        let mut rng = StdRng::seed_from_u64(3);
        let (g, h, u) = random_view(16, 4);
        let gens = GeneratorView {
            g: &g,
            h: &h,
            u,
            seed: [7u8; 32],
        };

        let a: Vec<Scalar> = (0..16).map(|_| Scalar::random(&mut rng)).collect();
        let b: Vec<Scalar> = (0..16).map(|_| Scalar::random(&mut rng)).collect();
        let proof = InnerProductWitness::new(a, b, &gens)
            .unwrap()
            .prove(&gens)
            .unwrap();
        assert!(proof.verify(&gens).is_ok());
        assert!(proof.verify_fast(&gens).is_ok());

        // A tampered response fails both verifiers identically.
        let mut tampered = proof.clone();
        tampered.a = tampered.a + Scalar::ONE;
        assert_eq!(tampered.verify(&gens), Err(Error::InnerProduct));
        assert_eq!(tampered.verify_fast(&gens), Err(Error::InnerProduct));

        let mut tampered = proof;
        tampered.l[0] = tampered.l[0] + Point::generator();
        assert_eq!(tampered.verify(&gens), Err(Error::InnerProduct));
        assert_eq!(tampered.verify_fast(&gens), Err(Error::InnerProduct));
    }

    #[test]
    fn test_single_element() {
        let mut rng = StdRng::seed_from_u64(5);
        let (g, h, u) = random_view(1, 6);
        let gens = GeneratorView {
            g: &g,
            h: &h,
            u,
            seed: [9u8; 32],
        };
        let a = vec![Scalar::random(&mut rng)];
        let b = vec![Scalar::random(&mut rng)];
        let proof = InnerProductWitness::new(a, b, &gens)
            .unwrap()
            .prove(&gens)
            .unwrap();
        assert!(proof.l.is_empty());
        assert!(proof.verify(&gens).is_ok());
        assert!(proof.verify_fast(&gens).is_ok());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let mut rng = StdRng::seed_from_u64(8);
        let (g, h, u) = random_view(4, 9);
        let gens = GeneratorView {
            g: &g,
            h: &h,
            u,
            seed: [0u8; 32],
        };

        let a: Vec<Scalar> = (0..3).map(|_| Scalar::random(&mut rng)).collect();
        let b = a.clone();
        assert!(matches!(
            InnerProductWitness::new(a, b, &gens),
            Err(Error::LengthMismatch)
        ));

        let three = GeneratorView {
            g: &g[..3],
            h: &h[..3],
            u,
            seed: [0u8; 32],
        };
        let a: Vec<Scalar> = (0..3).map(|_| Scalar::random(&mut rng)).collect();
        let b = a.clone();
        assert!(matches!(
            InnerProductWitness::new(a, b, &three),
            Err(Error::NotPowerOfTwo)
        ));

        assert!(matches!(
            InnerProductWitness::new(Vec::new(), Vec::new(), &gens),
            Err(Error::Empty)
        ));
    }

    #[test]
    fn test_codec_roundtrip() {
        let mut rng = StdRng::seed_from_u64(11);
        let (g, h, u) = random_view(8, 12);
        let gens = GeneratorView {
            g: &g,
            h: &h,
            u,
            seed: [1u8; 32],
        };
        let a: Vec<Scalar> = (0..8).map(|_| Scalar::random(&mut rng)).collect();
        let b: Vec<Scalar> = (0..8).map(|_| Scalar::random(&mut rng)).collect();
        let proof = InnerProductWitness::new(a, b, &gens)
            .unwrap()
            .prove(&gens)
            .unwrap();

        let encoded = proof.encode();
        assert_eq!(encoded.len(), proof.encode_size());
        let decoded = InnerProductProof::decode(encoded.as_slice()).unwrap();
        assert_eq!(proof, decoded);
        assert!(decoded.verify_fast(&gens).is_ok());

        // Truncation is detected.
        assert!(InnerProductProof::decode(&encoded[..encoded.len() - 1]).is_err());
    }
}
