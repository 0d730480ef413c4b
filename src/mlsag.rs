//! Multilayer Linkable Spontaneous Anonymous Group (MLSAG) ring signatures.
//!
//! The prover knows the secret keys of one column (`index`) of an `8 x m`
//! public-key matrix and produces a rotating challenge chain over all eight
//! columns that only closes if some column's keys are known, without
//! revealing which. For the first `ds_cols` key rows the proof also carries
//! key images `I_j = sk_j * hash_to_point(PK[index][j])`: deterministic
//! per-key tags that link any re-use of the same key across proofs.
//!
//! Reference: <https://web.getmonero.org/library/Zero-to-Monero-1-0-0.pdf>
//! (Chapter 3.3)

use crate::{
    codec::{self, EncodeSize, FixedSize, Read, Write},
    curve25519::{Point, Scalar},
};
use bytes::BufMut;
use rand_core::CryptoRngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of columns in the public-key matrix (the ring).
pub const RING_SIZE: usize = 8;

/// Errors that can occur when proving or verifying ring signatures.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("at least 2 key rows are required")]
    TooFewRows,
    #[error("secret index out of range: {0} >= {RING_SIZE}")]
    IndexOutOfRange(usize),
    #[error("double-spend row count out of range: {0}")]
    InvalidDsCols(usize),
    #[error("public-key matrix must be {RING_SIZE} rectangular columns")]
    MalformedRing,
    #[error("response matrix shape mismatch")]
    MalformedResponses,
    #[error("key image is not a valid prime-order point")]
    InvalidKeyImage,
    #[error("challenge chain does not close")]
    Unsatisfied,
    #[error(transparent)]
    Codec(#[from] codec::Error),
}

/// Derives the key image `sk * hash_to_point(pk)`.
///
/// Constant-time in the secret key.
pub fn key_image(secret: &Scalar, public: &Point) -> Point {
    *secret * Point::hash_to_point(&public.to_bytes())
}

/// The signing witness: a column of secret keys inside the ring.
pub struct RingWitness {
    secrets: Vec<Scalar>,
    index: usize,
    ds_cols: usize,
    ring: Vec<Vec<Point>>,
    message: Vec<u8>,
}

impl RingWitness {
    /// Builds a witness.
    ///
    /// `ring` is indexed `ring[column][row]` with [RING_SIZE] columns of
    /// `m = secrets.len()` rows each; the prover must know the secrets of
    /// column `index` (`ring[index][j] = secrets[j] * G`). The first
    /// `ds_cols` rows (`1 <= ds_cols <= m`) emit key images.
    pub fn new(
        secrets: Vec<Scalar>,
        index: usize,
        ds_cols: usize,
        ring: Vec<Vec<Point>>,
        message: Vec<u8>,
    ) -> Result<Self, Error> {
        let m = secrets.len();
        if m < 2 {
            return Err(Error::TooFewRows);
        }
        if index >= RING_SIZE {
            return Err(Error::IndexOutOfRange(index));
        }
        if ds_cols == 0 || ds_cols > m {
            return Err(Error::InvalidDsCols(ds_cols));
        }
        if ring.len() != RING_SIZE || ring.iter().any(|column| column.len() != m) {
            return Err(Error::MalformedRing);
        }
        Ok(Self {
            secrets,
            index,
            ds_cols,
            ring,
            message,
        })
    }

    /// Produces a ring signature over the witness message.
    pub fn prove<R: CryptoRngCore>(&self, rng: &mut R) -> Result<RingProof, Error> {
        let n = RING_SIZE;
        let m = self.secrets.len();
        let index = self.index;

        // Key images for the double-spend rows.
        let key_images: Vec<Point> = (0..self.ds_cols)
            .map(|j| key_image(&self.secrets[j], &self.ring[index][j]))
            .collect();

        // Commit to the real column with fresh nonces:
        // L = alpha_j * G and, for double-spend rows,
        // R = alpha_j * hash_to_point(PK[index][j]).
        let alphas: Vec<Scalar> = (0..m).map(|_| Scalar::random(rng)).collect();
        let mut data = self.message.clone();
        for j in 0..m {
            let l = Point::mul_base(&alphas[j]);
            data.extend_from_slice(&self.ring[index][j].to_bytes());
            data.extend_from_slice(&l.to_bytes());
            if j < self.ds_cols {
                let base = Point::hash_to_point(&self.ring[index][j].to_bytes());
                let r = alphas[j] * base;
                data.extend_from_slice(&r.to_bytes());
            }
        }
        let mut c = Scalar::hash_to_scalar(&data);

        let mut responses = vec![vec![Scalar::ZERO; m]; n];
        let mut c0 = None;

        // Walk the remaining columns with random responses, deriving each
        // next challenge from the simulated commitment pairs. The cursor
        // wraps past column 0 exactly once, capturing c_0.
        let mut i = (index + 1) % n;
        if i == 0 {
            c0 = Some(c);
        }
        while i != index {
            for j in 0..m {
                responses[i][j] = Scalar::random(rng);
            }

            let mut data = self.message.clone();
            for j in 0..m {
                let l = Point::double_mul(
                    &responses[i][j],
                    &Point::generator(),
                    &c,
                    &self.ring[i][j],
                );
                data.extend_from_slice(&self.ring[i][j].to_bytes());
                data.extend_from_slice(&l.to_bytes());
                if j < self.ds_cols {
                    let base = Point::hash_to_point(&self.ring[i][j].to_bytes());
                    let r = Point::double_mul(&responses[i][j], &base, &c, &key_images[j]);
                    data.extend_from_slice(&r.to_bytes());
                }
            }
            c = Scalar::hash_to_scalar(&data);

            i = (i + 1) % n;
            if i == 0 {
                c0 = Some(c);
            }
        }
        let c0 = c0.expect("challenge chain wraps past column 0");

        // Close the loop: r[index][j] = alpha_j - c_index * sk_j.
        for j in 0..m {
            responses[index][j] = alphas[j] - c * self.secrets[j];
        }

        Ok(RingProof {
            c0,
            responses,
            key_images,
            ring: self.ring.clone(),
            message: self.message.clone(),
        })
    }
}

impl Zeroize for RingWitness {
    fn zeroize(&mut self) {
        self.secrets.zeroize();
    }
}

impl Drop for RingWitness {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for RingWitness {}

/// A ring signature with key images for its double-spend rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingProof {
    c0: Scalar,
    responses: Vec<Vec<Scalar>>,
    key_images: Vec<Point>,
    ring: Vec<Vec<Point>>,
    message: Vec<u8>,
}

impl RingProof {
    /// Returns the key images of the double-spend rows.
    pub fn key_images(&self) -> &[Point] {
        &self.key_images
    }

    /// Verifies the signature.
    ///
    /// Reconstructs the challenge chain from `c_0` over all eight columns
    /// and accepts iff it closes back to `c_0`.
    pub fn verify(&self) -> Result<(), Error> {
        let n = RING_SIZE;
        if self.ring.len() != n {
            return Err(Error::MalformedRing);
        }
        let m = self.ring[0].len();
        if m < 2 {
            return Err(Error::TooFewRows);
        }
        if self.ring.iter().any(|column| column.len() != m) {
            return Err(Error::MalformedRing);
        }
        let ds_cols = self.key_images.len();
        if ds_cols == 0 || ds_cols > m {
            return Err(Error::InvalidDsCols(ds_cols));
        }
        if self.responses.len() != n || self.responses.iter().any(|row| row.len() != m) {
            return Err(Error::MalformedResponses);
        }
        // In-memory points are prime-order by construction, but an identity
        // key image would make the linking tag vacuous.
        if self.key_images.iter().any(|image| image.is_identity()) {
            return Err(Error::InvalidKeyImage);
        }

        let mut c = self.c0;
        for i in 0..n {
            let mut data = self.message.clone();
            for j in 0..m {
                let l = Point::double_mul_vartime(
                    &self.responses[i][j],
                    &Point::generator(),
                    &c,
                    &self.ring[i][j],
                );
                data.extend_from_slice(&self.ring[i][j].to_bytes());
                data.extend_from_slice(&l.to_bytes());
                if j < ds_cols {
                    let base = Point::hash_to_point(&self.ring[i][j].to_bytes());
                    let r = Point::double_mul_vartime(
                        &self.responses[i][j],
                        &base,
                        &c,
                        &self.key_images[j],
                    );
                    data.extend_from_slice(&r.to_bytes());
                }
            }
            c = Scalar::hash_to_scalar(&data);
        }

        if c != self.c0 {
            return Err(Error::Unsatisfied);
        }
        Ok(())
    }

    /// Parses a proof serialized by [codec::Encode::encode].
    ///
    /// The public-key matrix and message are not part of the wire format
    /// and must be supplied by the caller; the row count is taken from the
    /// matrix shape.
    pub fn from_bytes(
        bytes: &[u8],
        ring: Vec<Vec<Point>>,
        message: Vec<u8>,
    ) -> Result<Self, Error> {
        if ring.len() != RING_SIZE {
            return Err(Error::MalformedRing);
        }
        let m = ring[0].len();
        if m < 2 {
            return Err(Error::TooFewRows);
        }
        if ring.iter().any(|column| column.len() != m) {
            return Err(Error::MalformedRing);
        }

        let mut buf = bytes;
        let c0 = Scalar::read(&mut buf)?;
        let ds_cols = u8::read(&mut buf)? as usize;
        if ds_cols == 0 || ds_cols > m {
            return Err(Error::InvalidDsCols(ds_cols));
        }
        let mut key_images = Vec::with_capacity(ds_cols);
        for _ in 0..ds_cols {
            key_images.push(Point::read(&mut buf)?);
        }
        let mut responses = Vec::with_capacity(RING_SIZE);
        for _ in 0..RING_SIZE {
            let mut row = Vec::with_capacity(m);
            for _ in 0..m {
                row.push(Scalar::read(&mut buf)?);
            }
            responses.push(row);
        }
        if !buf.is_empty() {
            return Err(codec::Error::ExtraData(buf.len()).into());
        }

        Ok(Self {
            c0,
            responses,
            key_images,
            ring,
            message,
        })
    }
}

impl Write for RingProof {
    fn write(&self, buf: &mut impl BufMut) {
        self.c0.write(buf);
        (self.key_images.len() as u8).write(buf);
        for image in &self.key_images {
            image.write(buf);
        }
        for row in &self.responses {
            for response in row {
                response.write(buf);
            }
        }
    }
}

impl EncodeSize for RingProof {
    fn encode_size(&self) -> usize {
        Scalar::SIZE
            + u8::SIZE
            + self.key_images.len() * Point::SIZE
            + RING_SIZE * self.ring[0].len() * Scalar::SIZE
    }
}
