//! Deterministic query shuffling: queries are permuted with a fixed
//! seed-`0` PRNG before the prefilter stage runs, so adjacent,
//! likely-similar reads spread across bins instead of clumping.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub const SHUFFLE_SEED: u64 = 0;

/// Returns a permutation of `0..len`, shuffled deterministically.
pub fn shuffled_indices(len: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = SmallRng::seed_from_u64(SHUFFLE_SEED);
    indices.shuffle(&mut rng);
    indices
}
