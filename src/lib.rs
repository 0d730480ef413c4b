//! Prove statements about hidden values: range proofs over Pedersen
//! commitments and linkable ring signatures, built on the Ed25519/Curve25519
//! prime-order group.
//!
//! # Status
//!
//! `confidential` is **ALPHA** software and is not yet recommended for
//! production use. Developers should expect breaking changes and occasional
//! instability.
//!
//! # Design
//!
//! The two protocols share a lower substrate:
//!
//! - [curve25519]: constant-time [Scalar](curve25519::Scalar) and
//!   [Point](curve25519::Point) façades, multiscalar multiplication, and
//!   deterministic hash-to-group maps.
//! - [pedersen]: commitments `v * G + r * H` over two fixed independent
//!   generators.
//! - [transcript]: Fiat–Shamir challenge derivation over a strictly ordered
//!   byte sequence, seeded with a commitment to the active generator set.
//! - [codec]: the wire formats, with all validation (canonical scalars,
//!   prime-order points) at the decode boundary.
//!
//! On top of it sit [bulletproofs] (aggregated range proofs with a recursive
//! inner-product argument) and [mlsag] (linkable ring signatures with key
//! images).
//!
//! Provers take an explicit cryptographically secure RNG and are otherwise
//! pure functions of their inputs; verifiers are deterministic. The shared
//! generator tables are computed once per process and only ever borrowed.
//!
//! # Example
//!
//! ```rust
//! use confidential::{bulletproofs::RangeWitness, curve25519::Scalar};
//! use rand::rngs::OsRng;
//!
//! // Prove that two committed amounts both lie in [0, 2^64).
//! let values = [1_001u64, 42];
//! let blindings: Vec<Scalar> = values.iter().map(|_| Scalar::random(&mut OsRng)).collect();
//! let witness = RangeWitness::new(&values, &blindings).unwrap();
//! let proof = witness.prove(&mut OsRng).unwrap();
//! assert!(proof.verify_fast().is_ok());
//! ```

pub mod bulletproofs;
pub mod codec;
pub mod curve25519;
pub mod mlsag;
pub mod pedersen;
pub mod transcript;
