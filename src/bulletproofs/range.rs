//! Aggregated range proof prover and verifiers.
//!
//! A proof covers `m <= 32` committed values at once, padded to a power of
//! two (missing slots are zero-valued with zero blinding). The single-value
//! proof is the aggregated proof with `m = 1`, modulo two documented
//! differences: its transcripts include the commitment bytes, and its
//! inner-product phase runs over the transient `h_i <- y^(-i) * h_i`
//! parameter set.

use super::{
    inner_product::{InnerProductProof, InnerProductWitness},
    params::{params, GeneratorView},
    vector, Error, MAX_AGGREGATION, RANGE_BITS,
};
use crate::{
    codec::{self, EncodeSize, FixedSize, Read, Write},
    curve25519::{Point, Scalar},
    pedersen,
    transcript::Transcript,
};
use bytes::{Buf, BufMut};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Returns the serialized size of a proof over `values` commitments.
pub fn estimate_size(values: usize) -> usize {
    let log_mn = (RANGE_BITS * vector::pad(values)).ilog2() as usize;
    (values + 2 * log_mn + 5) * 32 + 5 * 32 + 2
}

/// The openings of the commitments a proof will cover.
pub struct RangeWitness {
    values: Vec<u64>,
    blindings: Vec<Scalar>,
}

impl RangeWitness {
    /// Builds a witness from values and their blindings.
    pub fn new(values: &[u64], blindings: &[Scalar]) -> Result<Self, Error> {
        if values.is_empty() {
            return Err(Error::Empty);
        }
        if values.len() > MAX_AGGREGATION {
            return Err(Error::TooManyValues(values.len()));
        }
        if values.len() != blindings.len() {
            return Err(Error::LengthMismatch);
        }
        Ok(Self {
            values: values.to_vec(),
            blindings: blindings.to_vec(),
        })
    }

    /// Returns the commitments `V_k = v_k * G + r_k * H` this witness opens.
    pub fn commitments(&self) -> Vec<Point> {
        self.values
            .iter()
            .zip(&self.blindings)
            .map(|(v, r)| pedersen::commit(&Scalar::from_u64(*v), r))
            .collect()
    }

    /// Proves every committed value lies in `[0, 2^64)`.
    pub fn prove<R: CryptoRngCore>(&self, rng: &mut R) -> Result<RangeProof, Error> {
        let m = self.values.len();
        let padded = vector::pad(m);
        let n = RANGE_BITS;
        let mn = padded * n;
        let gens = params().view(m)?;
        let single = m == 1;

        // Pad the witness: absent slots commit to zero with zero blinding.
        let mut values = self.values.clone();
        values.resize(padded, 0);
        let mut blindings = self.blindings.clone();
        blindings.resize(padded, Scalar::ZERO);

        let commitments = self.commitments();

        // Bit-decompose the values: a_l holds the bits, a_r = a_l - 1.
        let mut a_l = Vec::with_capacity(mn);
        for value in &values {
            a_l.extend(vector::bits_le(*value, n));
        }
        let a_r = vector::add_scalar(&a_l, &(-Scalar::ONE));

        // A = alpha * H + <a_l, g> + <a_r, h>
        let alpha = Scalar::random(rng);
        let a_point =
            vector::encode(&a_l, &a_r, gens.g, gens.h)? + alpha * pedersen::blinding_generator();

        // S = rho * H + <s_l, g> + <s_r, h> over random blinding vectors.
        let s_l: Vec<Scalar> = (0..mn).map(|_| Scalar::random(rng)).collect();
        let s_r: Vec<Scalar> = (0..mn).map(|_| Scalar::random(rng)).collect();
        let rho = Scalar::random(rng);
        let s_point =
            vector::encode(&s_l, &s_r, gens.g, gens.h)? + rho * pedersen::blinding_generator();

        // Challenges y, z over (cs, V?, A, S).
        let mut transcript = statement_transcript(&gens, single, &commitments);
        transcript
            .append(&a_point.to_bytes())
            .append(&s_point.to_bytes());
        let y = transcript.challenge();
        transcript.append(&y.to_bytes());
        let z = transcript.challenge();

        let y_vec = vector::power_vector(&y, mn);
        let two_vec = vector::power_vector(&Scalar::from_u64(2), n);
        let zsum_vec = aggregated_z_vector(&two_vec, &z, padded);

        // l(X) = (a_l - z * 1) + s_l * X
        let l0 = vector::add_scalar(&a_l, &(-z));
        let l1 = &s_l;

        // r(X) = y^(mn) o (a_r + z * 1 + s_r * X) + sum_k z^(k+1) * 2-vector
        let r0 = vector::add(
            &vector::hadamard(&y_vec, &vector::add_scalar(&a_r, &z))?,
            &zsum_vec,
        )?;
        let r1 = vector::hadamard(&y_vec, &s_r)?;

        // t(X) = <l(X), r(X)> = t0 + t1 * X + t2 * X^2
        let t1 = vector::inner_product(l1, &r0)? + vector::inner_product(&l0, &r1)?;
        let t2 = vector::inner_product(l1, &r1)?;

        let tau1 = Scalar::random(rng);
        let tau2 = Scalar::random(rng);
        let t1_point = pedersen::commit(&t1, &tau1);
        let t2_point = pedersen::commit(&t2, &tau2);

        // Challenge x over (cs, V?, A, S, T1, T2).
        let mut transcript = statement_transcript(&gens, single, &commitments);
        transcript
            .append(&a_point.to_bytes())
            .append(&s_point.to_bytes())
            .append(&t1_point.to_bytes())
            .append(&t2_point.to_bytes());
        let x = transcript.challenge();
        let x_sq = x * x;

        // Evaluate l(x), r(x), t_hat = <l, r>.
        let l_vec = vector::add(&l0, &vector::mul_scalar(&s_l, &x))?;
        let r_vec = vector::add(
            &vector::hadamard(
                &y_vec,
                &vector::add(&vector::add_scalar(&a_r, &z), &vector::mul_scalar(&s_r, &x))?,
            )?,
            &zsum_vec,
        )?;
        let t_hat = vector::inner_product(&l_vec, &r_vec)?;

        // tau_x = tau2 * x^2 + tau1 * x + sum_k z^(k+1) * r_k
        let mut tau_x = tau2 * x_sq + tau1 * x;
        let mut z_pow = z;
        for blinding in &blindings {
            z_pow = z_pow * z;
            tau_x += z_pow * *blinding;
        }

        // mu = alpha + rho * x
        let mu = alpha + rho * x;

        // Inner-product phase. The single variant substitutes
        // h_i <- y^(-i) * h_i (with a re-derived challenge seed); the
        // aggregated variant keeps the plain vectors, as the y powers live
        // in r.
        let inner = if single {
            let transient = gens.substitute_h(h_prime(&gens, &y));
            let ipp_gens = transient.view();
            InnerProductWitness::new(l_vec, r_vec, &ipp_gens)?.prove(&ipp_gens)?
        } else {
            InnerProductWitness::new(l_vec, r_vec, &gens)?.prove(&gens)?
        };

        Ok(RangeProof {
            commitments,
            a: a_point,
            s: s_point,
            t1: t1_point,
            t2: t2_point,
            tau_x,
            t_hat,
            mu,
            inner,
        })
    }
}

impl Zeroize for RangeWitness {
    fn zeroize(&mut self) {
        self.values.zeroize();
        self.blindings.zeroize();
    }
}

impl Drop for RangeWitness {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for RangeWitness {}

/// An aggregated range proof over `m` commitments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeProof {
    commitments: Vec<Point>,
    a: Point,
    s: Point,
    t1: Point,
    t2: Point,
    tau_x: Scalar,
    t_hat: Scalar,
    mu: Scalar,
    inner: InnerProductProof,
}

impl RangeProof {
    /// Returns the commitments this proof covers.
    pub fn commitments(&self) -> &[Point] {
        &self.commitments
    }

    /// Verifies with the folding inner-product verifier.
    pub fn verify(&self) -> Result<(), Error> {
        self.verify_inner(false)
    }

    /// Verifies with the batched inner-product verifier.
    pub fn verify_fast(&self) -> Result<(), Error> {
        self.verify_inner(true)
    }

    fn verify_inner(&self, fast: bool) -> Result<(), Error> {
        let m = self.commitments.len();
        let padded = vector::pad(m);
        let n = RANGE_BITS;
        let mn = padded * n;
        let gens = params().view(m)?;
        let single = m == 1;

        // Pad the commitment list with identity points.
        let mut commitments = self.commitments.clone();
        commitments.resize(padded, Point::identity());

        // Re-derive y, z, x.
        let mut transcript = statement_transcript(&gens, single, &self.commitments);
        transcript
            .append(&self.a.to_bytes())
            .append(&self.s.to_bytes());
        let y = transcript.challenge();
        transcript.append(&y.to_bytes());
        let z = transcript.challenge();
        let z_sq = z * z;

        let mut transcript = statement_transcript(&gens, single, &self.commitments);
        transcript
            .append(&self.a.to_bytes())
            .append(&self.s.to_bytes())
            .append(&self.t1.to_bytes())
            .append(&self.t2.to_bytes());
        let x = transcript.challenge();
        let x_sq = x * x;

        let y_vec = vector::power_vector(&y, mn);
        let two_vec = vector::power_vector(&Scalar::from_u64(2), n);

        // delta(y, z) = (z - z^2) * <1, y^(mn)> - sum_k z^(k+2) * <1, 2^n>
        let mut delta = (z - z_sq) * vector::sum(&y_vec);
        let mut z_sum = Scalar::ZERO;
        let mut z_pow = z_sq;
        for _ in 0..padded {
            z_pow = z_pow * z;
            z_sum += z_pow;
        }
        delta = delta - z_sum * vector::sum(&two_vec);

        // t_hat * G + tau_x * H
        //   == delta * G + x * T1 + x^2 * T2 + sum_k z^(k+1) * V_k
        let left = pedersen::commit(&self.t_hat, &self.tau_x);
        let mut scalars = vec![delta, x, x_sq];
        let mut z_pow = z;
        for _ in 0..padded {
            z_pow = z_pow * z;
            scalars.push(z_pow);
        }
        let mut points = vec![pedersen::value_generator(), self.t1, self.t2];
        points.extend_from_slice(&commitments);
        let right = Point::msm_vartime(&scalars, &points);
        if left != right {
            return Err(Error::Statement);
        }

        // Inner-product check over the derived generators.
        if single {
            let transient = gens.substitute_h(h_prime(&gens, &y));
            let ipp_gens = transient.view();
            if fast {
                self.inner.verify_fast(&ipp_gens)
            } else {
                self.inner.verify(&ipp_gens)
            }
        } else if fast {
            self.inner.verify_fast(&gens)
        } else {
            self.inner.verify(&gens)
        }
    }
}

/// Starts the statement transcript: generator seed, then the commitment
/// bytes in the single-value variant.
fn statement_transcript(
    gens: &GeneratorView,
    single: bool,
    commitments: &[Point],
) -> Transcript {
    let mut transcript = Transcript::new(&gens.seed);
    if single {
        for commitment in commitments {
            transcript.append(&commitment.to_bytes());
        }
    }
    transcript
}

/// The aggregation term of `r(X)`: slot `j` carries `z^(j+2) * 2^i`.
fn aggregated_z_vector(two_vec: &[Scalar], z: &Scalar, padded: usize) -> Vec<Scalar> {
    let mut out = Vec::with_capacity(padded * two_vec.len());
    let mut z_pow = *z;
    for _ in 0..padded {
        z_pow = z_pow * *z;
        out.extend(two_vec.iter().map(|t| *t * z_pow));
    }
    out
}

/// The substituted generator vector `h_i <- y^(-i) * h_i`.
fn h_prime(gens: &GeneratorView, y: &Scalar) -> Vec<Point> {
    let y_inv = y.invert();
    let mut exp = Scalar::ONE;
    gens.h
        .iter()
        .map(|h| {
            let out = exp * *h;
            exp = exp * y_inv;
            out
        })
        .collect()
}

impl Write for RangeProof {
    fn write(&self, buf: &mut impl BufMut) {
        (self.commitments.len() as u8).write(buf);
        for commitment in &self.commitments {
            commitment.write(buf);
        }
        self.a.write(buf);
        self.s.write(buf);
        self.t1.write(buf);
        self.t2.write(buf);
        self.tau_x.write(buf);
        self.t_hat.write(buf);
        self.mu.write(buf);
        self.inner.write(buf);
    }
}

impl EncodeSize for RangeProof {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + self.commitments.len() * Point::SIZE
            + 4 * Point::SIZE
            + 3 * Scalar::SIZE
            + self.inner.encode_size()
    }
}

impl Read for RangeProof {
    fn read(buf: &mut impl Buf) -> Result<Self, codec::Error> {
        let m = u8::read(buf)? as usize;
        if m == 0 || m > MAX_AGGREGATION {
            return Err(codec::Error::InvalidLength(m));
        }
        let mut commitments = Vec::with_capacity(m);
        for _ in 0..m {
            commitments.push(Point::read(buf)?);
        }
        let a = Point::read(buf)?;
        let s = Point::read(buf)?;
        let t1 = Point::read(buf)?;
        let t2 = Point::read(buf)?;
        let tau_x = Scalar::read(buf)?;
        let t_hat = Scalar::read(buf)?;
        let mu = Scalar::read(buf)?;
        let inner = InnerProductProof::read(buf)?;
        Ok(Self {
            commitments,
            a,
            s,
            t1,
            t2,
            tau_x,
            t_hat,
            mu,
            inner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Decode, Encode};
    use rand::{rngs::StdRng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn witness_for(values: &[u64], seed: u64) -> RangeWitness {
        let mut rng = StdRng::seed_from_u64(seed);
        let blindings: Vec<Scalar> = values.iter().map(|_| Scalar::random(&mut rng)).collect();
        RangeWitness::new(values, &blindings).unwrap()
    }

    #[test]
    fn test_single_proof_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let witness = witness_for(&[1_001], 0);
        let proof = witness.prove(&mut rng).unwrap();

        let encoded = proof.encode();
        assert_eq!(encoded.len(), estimate_size(1));
        let parsed = RangeProof::decode(encoded.as_slice()).unwrap();
        assert_eq!(parsed, proof);
        assert!(parsed.verify().is_ok());
        assert!(parsed.verify_fast().is_ok());
    }

    #[test]
    fn test_aggregated_proof_boundaries() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let witness = witness_for(&[0, 1, 1 << 63, u64::MAX], 1);
        let proof = witness.prove(&mut rng).unwrap();
        assert!(proof.verify().is_ok());
        assert!(proof.verify_fast().is_ok());

        // Flipping bit 0 of tau_x breaks the statement check.
        let mut encoded = proof.encode();
        let tau_x_offset = 1 + 4 * 32 + 4 * 32;
        encoded[tau_x_offset] ^= 1;
        match RangeProof::decode(encoded.as_slice()) {
            Ok(tampered) => {
                assert_eq!(tampered.verify(), Err(Error::Statement));
                assert_eq!(tampered.verify_fast(), Err(Error::Statement));
            }
            Err(_) => {} // non-canonical scalar is also a rejection
        }
    }

    #[test]
    fn test_padded_aggregation_size() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let values = [5u64, 10, 15, 20, 25, 30, 35];
        let witness = witness_for(&values, 2);
        let proof = witness.prove(&mut rng).unwrap();
        assert!(proof.verify_fast().is_ok());

        // m = 7 pads to 8; the serialized size matches the estimate.
        let encoded = proof.encode();
        assert_eq!(encoded.len(), estimate_size(7));
        assert_eq!(proof.commitments().len(), 7);
    }

    #[test]
    fn test_two_values() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let witness = witness_for(&[42, 999_999], 3);
        let proof = witness.prove(&mut rng).unwrap();
        assert!(proof.verify().is_ok());
        assert!(proof.verify_fast().is_ok());
    }

    #[test]
    fn test_commitments_match_witness() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let mut blinding_rng = StdRng::seed_from_u64(4);
        let blinding = Scalar::random(&mut blinding_rng);
        let witness = RangeWitness::new(&[77], &[blinding]).unwrap();
        let proof = witness.prove(&mut rng).unwrap();
        assert_eq!(
            proof.commitments()[0],
            pedersen::commit(&Scalar::from_u64(77), &blinding)
        );
    }

    #[test]
    fn test_tampered_commitment_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let witness = witness_for(&[123, 456], 5);
        let mut proof = witness.prove(&mut rng).unwrap();
        proof.commitments[0] = proof.commitments[0] + Point::generator();
        assert!(proof.verify().is_err());
        assert!(proof.verify_fast().is_err());
    }

    #[test]
    fn test_witness_shape_errors() {
        let mut rng = StdRng::seed_from_u64(6);
        let blinding = Scalar::random(&mut rng);
        assert!(matches!(RangeWitness::new(&[], &[]), Err(Error::Empty)));
        assert!(matches!(
            RangeWitness::new(&[1], &[]),
            Err(Error::LengthMismatch)
        ));
        let too_many = vec![1u64; MAX_AGGREGATION + 1];
        let blindings = vec![blinding; MAX_AGGREGATION + 1];
        assert!(matches!(
            RangeWitness::new(&too_many, &blindings),
            Err(Error::TooManyValues(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_counts() {
        // len(V) = 0 is malformed.
        let bytes = [0u8; 40];
        assert!(RangeProof::decode(&bytes[..]).is_err());

        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let proof = witness_for(&[9], 7).prove(&mut rng).unwrap();
        let mut encoded = proof.encode();
        encoded[0] = (MAX_AGGREGATION + 1) as u8;
        assert!(RangeProof::decode(encoded.as_slice()).is_err());
    }

    #[test]
    fn test_estimate_size_formula() {
        // (m + 2 * log2(64 * pad(m)) + 10) * 32 + 2
        assert_eq!(estimate_size(1), (1 + 2 * 6 + 10) * 32 + 2);
        assert_eq!(estimate_size(2), (2 + 2 * 7 + 10) * 32 + 2);
        assert_eq!(estimate_size(7), (7 + 2 * 9 + 10) * 32 + 2);
        assert_eq!(estimate_size(32), (32 + 2 * 11 + 10) * 32 + 2);
    }
}
