//! Random number plumbing.
//!
//! Every candidate attempt owns a private [`StdRng`] seeded from a single
//! `u64` drawn from the caller's source. Attempts therefore never share
//! generator state, which keeps sequential and parallel execution
//! bit-for-bit identical.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Creates a deterministic generator from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Shuffles a slice in place (Fisher-Yates).
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// Draws `count` attempt seeds from `rng`, in order.
pub(crate) fn draw_seeds<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<u64> {
    (0..count).map(|_| rng.random::<u64>()).collect()
}
