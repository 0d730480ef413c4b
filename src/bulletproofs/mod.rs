//! Aggregated Bulletproof range proofs.
//!
//! Proves that one or more Pedersen commitments `V_k = v_k * G + r_k * H`
//! each hide a value `v_k` in `[0, 2^64)`, without revealing `v_k` or `r_k`.
//! Proof size is logarithmic in the number of committed bits thanks to the
//! recursive inner-product argument.
//!
//! Reference: <https://eprint.iacr.org/2017/1066.pdf> (Chapters 3, 4.1 and 4.2)
//!
//! # Example
//!
//! ```rust
//! use confidential::{bulletproofs::RangeWitness, curve25519::Scalar};
//! use rand::rngs::OsRng;
//!
//! let values = [0u64, 1, 1 << 63, u64::MAX];
//! let blindings: Vec<Scalar> = values.iter().map(|_| Scalar::random(&mut OsRng)).collect();
//! let witness = RangeWitness::new(&values, &blindings).unwrap();
//! let proof = witness.prove(&mut OsRng).unwrap();
//! assert!(proof.verify_fast().is_ok());
//! ```

mod inner_product;
mod params;
mod range;
mod vector;

pub use inner_product::{InnerProductProof, InnerProductWitness};
pub use params::{params, BulletParams, GeneratorView, TransientParams};
pub use range::{estimate_size, RangeProof, RangeWitness};

use thiserror::Error;

/// Number of bits each committed value is proven to fit in.
pub const RANGE_BITS: usize = 64;

/// Maximum number of values a single aggregated proof may cover.
pub const MAX_AGGREGATION: usize = 32;

/// Errors that can occur when proving or verifying range proofs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("no values to prove")]
    Empty,
    #[error("too many values: {0} > {MAX_AGGREGATION}")]
    TooManyValues(usize),
    #[error("vector length mismatch")]
    LengthMismatch,
    #[error("input length must be a power of two")]
    NotPowerOfTwo,
    #[error("range statement check failed")]
    Statement,
    #[error("inner product argument check failed")]
    InnerProduct,
}
