//! Deterministic generator tables for range proofs.
//!
//! A proof over `m` values needs `pad(m) * 64` generator pairs `(g_i, h_i)`
//! plus a point `u`, all derived by hashing under the crate's fixed
//! domain-separation tag. The full table (sized for the maximum aggregation)
//! is computed once per process and treated as read-only afterwards; every
//! consumer borrows a [GeneratorView] of its prefix.
//!
//! The `g`, `h`, and `u` index spaces are disjoint for every parameter set
//! because the `h` and `u` offsets are computed from the maximum derivation
//! capacity rather than the active one.

use super::{vector::pad, Error, MAX_AGGREGATION, RANGE_BITS};
use crate::{
    curve25519::{Point, Scalar},
    pedersen::{GENERATOR_TAG, RESERVED_GENERATORS},
};
use std::sync::LazyLock;

/// Upper bound on derivable generator pairs (`256 * 64`); fixes the `h` and
/// `u` index offsets independently of the active table size.
const DERIVATION_CAPACITY: u64 = 256 * 64;

static PARAMS: LazyLock<BulletParams> = LazyLock::new(|| BulletParams::new(MAX_AGGREGATION));

/// Returns the process-wide generator table, sized for [MAX_AGGREGATION].
///
/// Built lazily on first use; immutable thereafter.
pub fn params() -> &'static BulletParams {
    &PARAMS
}

/// A derived generator table: `(g_i, h_i)` pairs, the inner-product point
/// `u`, and a cached challenge seed per power-of-two prefix.
pub struct BulletParams {
    g: Vec<Point>,
    h: Vec<Point>,
    u: Point,
    // seeds[k] commits to the first 64 * 2^k generator pairs.
    seeds: Vec<[u8; 32]>,
}

impl BulletParams {
    fn new(max_values: usize) -> Self {
        let capacity = RANGE_BITS * max_values;
        let mut g = Vec::with_capacity(capacity);
        let mut h = Vec::with_capacity(capacity);
        for i in 0..capacity as u64 {
            g.push(Point::hash_to_point_from_index(
                RESERVED_GENERATORS + i,
                GENERATOR_TAG,
            ));
            h.push(Point::hash_to_point_from_index(
                RESERVED_GENERATORS + i + DERIVATION_CAPACITY,
                GENERATOR_TAG,
            ));
        }
        let u = Point::hash_to_point_from_index(
            RESERVED_GENERATORS + 2 * DERIVATION_CAPACITY,
            GENERATOR_TAG,
        );

        let mut seeds = Vec::new();
        let mut size = RANGE_BITS;
        while size <= capacity {
            seeds.push(derive_seed(&g[..size], &h[..size], &u));
            size *= 2;
        }

        Self { g, h, u, seeds }
    }

    /// Returns a view of the first `pad(values) * 64` generator pairs, with
    /// the matching cached challenge seed.
    pub fn view(&self, values: usize) -> Result<GeneratorView<'_>, Error> {
        if values == 0 {
            return Err(Error::Empty);
        }
        let padded = pad(values);
        let size = padded * RANGE_BITS;
        if size > self.g.len() {
            return Err(Error::TooManyValues(values));
        }
        Ok(GeneratorView {
            g: &self.g[..size],
            h: &self.h[..size],
            u: self.u,
            seed: self.seeds[padded.trailing_zeros() as usize],
        })
    }
}

/// A non-owning view of a generator table prefix.
#[derive(Clone)]
pub struct GeneratorView<'a> {
    /// Vector-commitment generators for the left vector.
    pub g: &'a [Point],
    /// Vector-commitment generators for the right vector.
    pub h: &'a [Point],
    /// The generator carrying the inner-product value.
    pub u: Point,
    /// 32-byte commitment to `(g, h, u)`, prefixed into every challenge.
    pub seed: [u8; 32],
}

impl GeneratorView<'_> {
    /// Builds a transient parameter set with a substituted `h` vector and a
    /// re-derived challenge seed.
    ///
    /// Used by the single-value proof path, which rewrites
    /// `h_i <- y^(-i) * h_i` before the inner-product phase.
    pub fn substitute_h(&self, h: Vec<Point>) -> TransientParams {
        let seed = derive_seed(self.g, &h, &self.u);
        TransientParams {
            g: self.g.to_vec(),
            h,
            u: self.u,
            seed,
        }
    }
}

/// An owned, single-use parameter set produced by
/// [GeneratorView::substitute_h].
pub struct TransientParams {
    g: Vec<Point>,
    h: Vec<Point>,
    u: Point,
    seed: [u8; 32],
}

impl TransientParams {
    /// Borrows this set as a [GeneratorView].
    pub fn view(&self) -> GeneratorView<'_> {
        GeneratorView {
            g: &self.g,
            h: &self.h,
            u: self.u,
            seed: self.seed,
        }
    }
}

/// Commits to a generator set: `hash_to_scalar(g_0 || .. || h_0 || .. || u)`.
fn derive_seed(g: &[Point], h: &[Point], u: &Point) -> [u8; 32] {
    let mut data = Vec::with_capacity((g.len() + h.len() + 1) * 32);
    for point in g {
        data.extend_from_slice(&point.to_bytes());
    }
    for point in h {
        data.extend_from_slice(&point.to_bytes());
    }
    data.extend_from_slice(&u.to_bytes());
    Scalar::hash_to_scalar(&data).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_sizes() {
        let table = params();
        assert_eq!(table.view(1).unwrap().g.len(), 64);
        assert_eq!(table.view(2).unwrap().g.len(), 128);
        assert_eq!(table.view(3).unwrap().g.len(), 256);
        assert_eq!(table.view(MAX_AGGREGATION).unwrap().g.len(), 2048);
        assert!(matches!(table.view(0), Err(Error::Empty)));
        assert!(matches!(
            table.view(MAX_AGGREGATION + 1),
            Err(Error::TooManyValues(_))
        ));
    }

    #[test]
    fn test_seeds_cached_per_prefix() {
        let table = params();
        let v1 = table.view(1).unwrap();
        let v2 = table.view(2).unwrap();
        assert_ne!(v1.seed, v2.seed);
        // Same padded size, same seed.
        assert_eq!(table.view(3).unwrap().seed, table.view(4).unwrap().seed);
    }

    #[test]
    fn test_index_spaces_disjoint() {
        let view = params().view(MAX_AGGREGATION).unwrap();
        for i in 0..view.g.len() {
            assert_ne!(view.g[i], view.h[i]);
            assert_ne!(view.g[i], view.u);
            assert_ne!(view.h[i], view.u);
        }
    }

    #[test]
    fn test_substitute_h_rederives_seed() {
        let view = params().view(1).unwrap();
        let transient = view.substitute_h(view.g.to_vec());
        assert_ne!(transient.view().seed, view.seed);
        assert_eq!(transient.view().g, view.g);
    }
}
