//! Scalar and point arithmetic over the Ed25519/Curve25519 prime-order group.
//!
//! This module wraps [curve25519-dalek](https://crates.io/crates/curve25519-dalek)
//! behind [Scalar] and [Point] façades so the rest of the crate never touches
//! backend types. All arithmetic on secret data is constant-time; variable-time
//! shortcuts ([Point::msm_vartime], [Point::double_mul_vartime]) are reserved
//! for verifiers, which only operate on public data.
//!
//! # Warning
//!
//! Points decoded from untrusted bytes are checked to lie in the prime-order
//! subgroup (no torsion component). Skipping this check would allow small
//! subgroup confinement attacks against key images and proof transcripts.

mod group;

pub use group::{Point, Scalar};
