//! Fiat–Shamir challenge derivation.
//!
//! This module provides a [Transcript] abstraction: a strictly ordered byte
//! sequence, seeded with a commitment to the active generator set, from
//! which challenge scalars are derived. Prover and verifier must append the
//! same messages in the same order; any permutation produces different
//! challenges and the proof is rejected.
//!
//! The seed binds every challenge to the generator set a proof was produced
//! against. Without it, a proof could be replayed against a system using
//! different generators.

use crate::curve25519::Scalar;

/// A challenge oracle over a seeded, strictly ordered byte sequence.
///
/// `challenge()` hashes the seed followed by every appended message:
/// `hash_to_scalar(seed || x_1 || ... || x_k)`. Appending more messages
/// after extracting a challenge extends the same sequence, which is how
/// dependent challenges (e.g. `z` after `y`) are derived.
#[derive(Clone)]
pub struct Transcript {
    data: Vec<u8>,
}

impl Transcript {
    /// Creates a transcript from a generator-set commitment seed.
    pub fn new(seed: &[u8]) -> Self {
        Self {
            data: seed.to_vec(),
        }
    }

    /// Appends a message to the sequence.
    pub fn append(&mut self, message: &[u8]) -> &mut Self {
        self.data.extend_from_slice(message);
        self
    }

    /// Derives the challenge scalar for the current sequence.
    pub fn challenge(&self) -> Scalar {
        Scalar::hash_to_scalar(&self.data)
    }
}
